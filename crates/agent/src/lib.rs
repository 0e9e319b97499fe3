//! The pinshelf agent: generation lifecycle, request interception, and
//! inbound command handling on top of the core cache and the client
//! transport.

pub mod commands;
pub mod manager;
pub mod router;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;

pub use commands::CommandMessage;
pub use manager::{GenerationManager, PurgeOutcome};
pub use router::{Router, Served};
pub use store::FsFavoriteStore;
