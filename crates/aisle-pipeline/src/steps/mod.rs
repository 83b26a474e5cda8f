//! One module per pipeline state. Each step fills `RequestContext::candidates`
//! and returns the next state; failures degrade and are recorded, never
//! raised.

mod complex;
mod emergency;
mod filter_only;
mod two_step;
