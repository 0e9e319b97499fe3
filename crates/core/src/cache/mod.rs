//! SQLite-backed, generation-scoped response cache.
//!
//! This module provides the persistent cache behind the agent using
//! SQLite with async access via tokio-rusqlite. It supports:
//!
//! - Named generations identified by a version tag
//! - Per-key upsert of stored response snapshots
//! - Whole-generation deletion for obsolete version tags
//! - Automatic schema migrations
//! - WAL mode, with all writes serialized through one connection actor

pub mod connection;
pub mod generations;
pub mod key;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
pub use generations::CachedResponse;
