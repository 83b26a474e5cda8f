//! # aisle-session
//!
//! Load-more support: server-held pagination sessions with optimistic
//! concurrent updates, and the opaque continuation tokens handed to clients.

pub mod manager;
pub mod memory_store;
pub mod token;

pub use manager::PaginationSessionManager;
pub use memory_store::InMemorySessionStore;
pub use token::ContinuationToken;
