//! Client code for pinshelf.
//!
//! This crate provides the network transport seam used by the agent:
//! the [`Transport`] trait, its reqwest-backed implementation, and
//! resolution of resource URLs against the agent's scope.

pub mod fetch;

pub use fetch::{FetchConfig, FetchResponse, HttpTransport, Transport};
