//! File-backed favorite store.
//!
//! The favorites store is an external collaborator; for standalone runs
//! the agent reads it from a JSON object file mapping store keys to
//! favorite records:
//!
//! ```json
//! {
//!   "favorites:1": {"fallback": "/img/a.png", "sources": [{"url": "/img/a-2x.png"}]}
//! }
//! ```
//!
//! The file is re-read on every access so edits made while the agent
//! runs are picked up. The agent never writes it.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use pinshelf_core::{Error, FavoriteStore};

/// Favorite store reading a JSON object file.
pub struct FsFavoriteStore {
    path: PathBuf,
}

impl FsFavoriteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_items(&self) -> Result<serde_json::Map<String, Value>, Error> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::StoreRead(format!("{}: {}", self.path.display(), e)))?;

        let value: Value =
            serde_json::from_str(&raw).map_err(|e| Error::StoreRead(format!("{}: {}", self.path.display(), e)))?;

        match value {
            Value::Object(items) => Ok(items),
            _ => Err(Error::StoreRead(format!(
                "{}: expected a JSON object at the top level",
                self.path.display()
            ))),
        }
    }
}

#[async_trait]
impl FavoriteStore for FsFavoriteStore {
    async fn keys(&self) -> Result<Vec<String>, Error> {
        Ok(self.read_items().await?.keys().cloned().collect())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let items = self.read_items().await?;
        match items.get(key) {
            // Values may be stored either as serialized strings or as
            // plain JSON objects; both read back as record JSON.
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(value) => Ok(Some(value.to_string())),
            None => Ok(None),
        }
    }
}
