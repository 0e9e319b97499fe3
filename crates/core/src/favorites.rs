//! Favorite records and the favorites lister.
//!
//! Favorited items live in an external key/value store under
//! `favorites:<id>` keys, each value a JSON-serialized record naming a
//! fallback resource URL and optional alternate sources. This module
//! owns the record shape and the listing pass that resolves every
//! favorite to its full set of resource URLs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Key prefix under which favorite records are stored.
pub const KEY_PREFIX: &str = "favorites:";

/// One alternate source of a favorited resource.
///
/// Records may carry extra per-source fields (dimensions, media
/// queries); only `url` matters here and the rest is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteSource {
    pub url: String,
}

/// A persisted favorite record.
///
/// `fallback` is required; a record without it is malformed. `sources`
/// may be absent or empty and reads as an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteRecord {
    pub fallback: String,
    #[serde(default)]
    pub sources: Vec<FavoriteSource>,
}

impl FavoriteRecord {
    /// All resource URLs of this favorite: the fallback first, then
    /// every alternate source.
    pub fn resource_urls(&self) -> Vec<String> {
        let mut urls = Vec::with_capacity(1 + self.sources.len());
        urls.push(self.fallback.clone());
        urls.extend(self.sources.iter().map(|s| s.url.clone()));
        urls
    }

    /// Parse a record from its serialized store value.
    pub fn parse(key: &str, value: &str) -> Result<Self, Error> {
        serde_json::from_str(value).map_err(|e| Error::MalformedRecord(format!("{key}: {e}")))
    }
}

/// External key/value store holding favorite records.
///
/// The store is an outside collaborator; the agent only enumerates and
/// reads it, never writes. New records are announced over the inbound
/// command channel instead.
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    /// Enumerate every key in the store.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Read the raw value stored under a key.
    async fn get(&self, key: &str) -> Result<Option<String>, Error>;
}

/// Resolve every favorited item to its resource URLs, flattened.
///
/// Any single read or parse failure aborts the whole listing; there is
/// no partial-success mode.
pub async fn list_all_resource_urls(store: &dyn FavoriteStore) -> Result<Vec<String>, Error> {
    let keys = store.keys().await?;

    let reads = keys
        .iter()
        .filter(|key| key.starts_with(KEY_PREFIX))
        .map(|key| async move {
            let value = store
                .get(key)
                .await?
                .ok_or_else(|| Error::StoreRead(format!("{key}: enumerated key has no value")))?;
            let record = FavoriteRecord::parse(key, &value)?;
            Ok::<_, Error>(record.resource_urls())
        });

    let groups = futures::future::try_join_all(reads).await?;

    Ok(groups.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapStore {
        items: HashMap<String, String>,
        fail_keys: bool,
    }

    impl MapStore {
        fn new(items: &[(&str, &str)]) -> Self {
            Self {
                items: items
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                fail_keys: false,
            }
        }
    }

    #[async_trait]
    impl FavoriteStore for MapStore {
        async fn keys(&self) -> Result<Vec<String>, Error> {
            if self.fail_keys {
                return Err(Error::StoreRead("store unavailable".into()));
            }
            let mut keys: Vec<String> = self.items.keys().cloned().collect();
            keys.sort();
            Ok(keys)
        }

        async fn get(&self, key: &str) -> Result<Option<String>, Error> {
            Ok(self.items.get(key).cloned())
        }
    }

    #[tokio::test]
    async fn test_lists_fallback_then_sources() {
        let store = MapStore::new(&[(
            "favorites:1",
            r#"{"fallback": "/img/a.png", "sources": [{"url": "/img/a-2x.png"}]}"#,
        )]);

        let urls = list_all_resource_urls(&store).await.unwrap();
        assert_eq!(urls, vec!["/img/a.png".to_string(), "/img/a-2x.png".to_string()]);
    }

    #[tokio::test]
    async fn test_ignores_foreign_keys() {
        let store = MapStore::new(&[
            ("favorites:1", r#"{"fallback": "/img/a.png"}"#),
            ("settings:theme", "dark"),
        ]);

        let urls = list_all_resource_urls(&store).await.unwrap();
        assert_eq!(urls, vec!["/img/a.png".to_string()]);
    }

    #[tokio::test]
    async fn test_absent_sources_reads_as_empty() {
        let record = FavoriteRecord::parse("favorites:1", r#"{"fallback": "/img/a.png"}"#).unwrap();
        assert_eq!(record.sources, Vec::new());
        assert_eq!(record.resource_urls(), vec!["/img/a.png".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_fallback_is_malformed() {
        let store = MapStore::new(&[("favorites:1", r#"{"sources": [{"url": "/img/a.png"}]}"#)]);

        let result = list_all_resource_urls(&store).await;
        assert!(matches!(result, Err(Error::MalformedRecord(_))));
    }

    #[tokio::test]
    async fn test_one_bad_record_aborts_listing() {
        let store = MapStore::new(&[
            ("favorites:1", r#"{"fallback": "/img/a.png"}"#),
            ("favorites:2", "not json"),
        ]);

        let result = list_all_resource_urls(&store).await;
        assert!(matches!(result, Err(Error::MalformedRecord(_))));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut store = MapStore::new(&[]);
        store.fail_keys = true;

        let result = list_all_resource_urls(&store).await;
        assert!(matches!(result, Err(Error::StoreRead(_))));
    }

    #[tokio::test]
    async fn test_extra_source_fields_ignored() {
        let record = FavoriteRecord::parse(
            "favorites:1",
            r#"{"fallback": "/img/a.png", "sources": [{"url": "/img/a-2x.png", "width": 800}]}"#,
        );
        // Unknown fields are tolerated; only url is read.
        assert!(record.is_ok());
    }
}
