//! Core types and shared functionality for pinshelf.
//!
//! This crate provides:
//! - Generation-scoped response cache with SQLite backend
//! - Cache-key derivation and the offline-guarantee classifier
//! - Favorite record types and the favorites lister
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod favorites;

pub use cache::{CacheDb, CachedResponse};
pub use config::AppConfig;
pub use error::Error;
pub use favorites::{FavoriteRecord, FavoriteStore};
