mod tracker;

pub use tracker::DegradationTracker;
