//! Generation-scoped entry operations.
//!
//! A generation is a named collection of (key, stored response) entries,
//! identified by the version tag it was created under. Entries are
//! upserted per key; deleting a generation drops all of its entries.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A stored response snapshot.
///
/// The body is an independent copy of the bytes that went over the
/// wire: storing a response never consumes or aliases the copy the
/// requester receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    /// Resolved URL the response was fetched from.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Content-Type header, if the origin sent one.
    pub content_type: Option<String>,
    /// Response body bytes.
    pub body: Vec<u8>,
    /// RFC 3339 timestamp of when the entry was stored.
    pub stored_at: String,
}

impl CacheDb {
    /// Create a generation if it doesn't exist yet.
    ///
    /// Install creates the current generation up front so it exists
    /// even while the favorites set is empty.
    pub async fn create_generation(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO generations (name, created_at) VALUES (?1, ?2)",
                    params![name, chrono::Utc::now().to_rfc3339()],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or update one entry in a generation.
    ///
    /// Uses UPSERT semantics keyed on (generation, key), so re-storing
    /// the same key replaces the previous snapshot. The generation row
    /// is created on demand.
    pub async fn upsert_entry(&self, generation: &str, key: &str, entry: &CachedResponse) -> Result<(), Error> {
        let generation = generation.to_string();
        let key = key.to_string();
        let entry = entry.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO generations (name, created_at) VALUES (?1, ?2)",
                    params![generation, chrono::Utc::now().to_rfc3339()],
                )?;
                conn.execute(
                    "INSERT INTO entries (
                        generation, key, url, status, content_type, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    ON CONFLICT(generation, key) DO UPDATE SET
                        url = excluded.url,
                        status = excluded.status,
                        content_type = excluded.content_type,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        &generation,
                        &key,
                        &entry.url,
                        entry.status,
                        &entry.content_type,
                        &entry.body,
                        &entry.stored_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up an entry by key within a single generation.
    ///
    /// Returns None if the key doesn't exist in that generation. Other
    /// generations are never consulted.
    pub async fn get_entry(&self, generation: &str, key: &str) -> Result<Option<CachedResponse>, Error> {
        let generation = generation.to_string();
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CachedResponse>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT url, status, content_type, body, stored_at
                     FROM entries WHERE generation = ?1 AND key = ?2",
                )?;

                let result = stmt.query_row(params![generation, key], |row| {
                    Ok(CachedResponse {
                        url: row.get(0)?,
                        status: row.get(1)?,
                        content_type: row.get(2)?,
                        body: row.get(3)?,
                        stored_at: row.get(4)?,
                    })
                });

                match result {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// List the names of all existing generations.
    pub async fn generation_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM generations ORDER BY name")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a generation and all of its entries.
    ///
    /// Returns the number of entries dropped. Deleting a generation
    /// that doesn't exist is a no-op.
    pub async fn delete_generation(&self, name: &str) -> Result<u64, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let entries: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM entries WHERE generation = ?1",
                    params![name],
                    |row| row.get(0),
                )?;
                conn.execute("DELETE FROM generations WHERE name = ?1", params![name])?;
                Ok(entries as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Count entries in a generation.
    pub async fn entry_count(&self, generation: &str) -> Result<u64, Error> {
        let generation = generation.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM entries WHERE generation = ?1",
                    params![generation],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_entry(url: &str, body: &[u8]) -> CachedResponse {
        CachedResponse {
            url: url.to_string(),
            status: 200,
            content_type: Some("image/png".to_string()),
            body: body.to_vec(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[tokio::test]
    async fn test_upsert_and_get_entry() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let entry = make_entry("https://site.test/img/a.png", b"png-bytes");

        db.upsert_entry("v1", "https://site.test/img/a.png", &entry)
            .await
            .unwrap();

        let found = db.get_entry("v1", "https://site.test/img/a.png").await.unwrap();
        assert_eq!(found, Some(entry));
    }

    #[tokio::test]
    async fn test_get_entry_other_generation_misses() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let entry = make_entry("https://site.test/img/a.png", b"png-bytes");

        db.upsert_entry("v0", "https://site.test/img/a.png", &entry)
            .await
            .unwrap();

        let found = db.get_entry("v1", "https://site.test/img/a.png").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_key() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let key = "https://site.test/vendor/lib.js";

        db.upsert_entry("v1", key, &make_entry(key, b"old")).await.unwrap();
        db.upsert_entry("v1", key, &make_entry(key, b"new")).await.unwrap();

        let found = db.get_entry("v1", key).await.unwrap().unwrap();
        assert_eq!(found.body, b"new");
        assert_eq!(db.entry_count("v1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_generation_is_idempotent() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.create_generation("v1").await.unwrap();
        db.create_generation("v1").await.unwrap();
        assert_eq!(db.generation_names().await.unwrap(), vec!["v1".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_generation_drops_entries() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.upsert_entry("v0", "a", &make_entry("a", b"1")).await.unwrap();
        db.upsert_entry("v0", "b", &make_entry("b", b"2")).await.unwrap();
        db.upsert_entry("v1", "a", &make_entry("a", b"3")).await.unwrap();

        let dropped = db.delete_generation("v0").await.unwrap();
        assert_eq!(dropped, 2);

        assert_eq!(db.generation_names().await.unwrap(), vec!["v1".to_string()]);
        assert!(db.get_entry("v0", "a").await.unwrap().is_none());
        assert!(db.get_entry("v1", "a").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_missing_generation_is_noop() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let dropped = db.delete_generation("ghost").await.unwrap();
        assert_eq!(dropped, 0);
    }
}
