//! Cache generation lifecycle.
//!
//! The generation manager owns the single current generation, named by
//! the configured version tag. It populates the generation at install,
//! deletes every other generation at activation, and exposes the
//! per-key put/lookup operations the router and command handler use.

use std::sync::Arc;

use pinshelf_client::Transport;
use pinshelf_core::favorites::{self, FavoriteStore};
use pinshelf_core::{CacheDb, CachedResponse, Error};

/// Owner of the current cache generation.
pub struct GenerationManager {
    db: CacheDb,
    version: String,
    store: Arc<dyn FavoriteStore>,
    transport: Arc<dyn Transport>,
    #[cfg(test)]
    faults: std::sync::Mutex<Faults>,
}

/// Test-only fault injection for database writes.
#[cfg(test)]
#[derive(Default)]
struct Faults {
    puts: bool,
    deletes: std::collections::HashSet<String>,
}

/// Result of a best-effort purge pass.
///
/// Every obsolete generation gets its own deletion attempt; failures
/// are collected here and never cancel sibling deletions.
#[derive(Debug, Default)]
pub struct PurgeOutcome {
    /// Names of generations that were deleted.
    pub deleted: Vec<String>,
    /// Names that failed to delete, with the error text.
    pub failed: Vec<(String, String)>,
}

impl GenerationManager {
    /// Create a manager for the generation named by `version`.
    pub fn new(
        db: CacheDb, version: impl Into<String>, store: Arc<dyn FavoriteStore>, transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            db,
            version: version.into(),
            store,
            transport,
            #[cfg(test)]
            faults: std::sync::Mutex::default(),
        }
    }

    /// Make every subsequent `put` fail.
    #[cfg(test)]
    pub(crate) fn fail_puts(&self) {
        self.faults.lock().unwrap().puts = true;
    }

    /// Make deletion of the named generation fail.
    #[cfg(test)]
    pub(crate) fn fail_delete_of(&self, name: &str) {
        self.faults.lock().unwrap().deletes.insert(name.to_string());
    }

    /// The current version tag.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Populate the current generation from the favorites store.
    ///
    /// Lists every favorited resource URL, fetches them all
    /// concurrently (all must succeed), and stores each response under
    /// its own resolved URL. Store and record errors pass through
    /// unchanged; fetch and storage failures surface as `Precache`.
    /// Any error here must abort install. The generation row is only
    /// created once every fetch has succeeded, so a failed install
    /// leaves no generation behind.
    pub async fn precache_all(&self) -> Result<(), Error> {
        let urls = favorites::list_all_resource_urls(self.store.as_ref()).await?;

        let responses = futures::future::try_join_all(urls.iter().map(|url| self.transport.fetch(url)))
            .await
            .map_err(|e| Error::Precache(e.to_string()))?;

        self.db
            .create_generation(&self.version)
            .await
            .map_err(|e| Error::Precache(e.to_string()))?;

        futures::future::try_join_all(responses.iter().map(|response| {
            let key = response.final_url.to_string();
            async move { self.db.upsert_entry(&self.version, &key, &response.to_cached()).await }
        }))
        .await
        .map_err(|e| Error::Precache(e.to_string()))?;

        tracing::info!(
            generation = %self.version,
            entries = responses.len(),
            "precached all favorites"
        );

        Ok(())
    }

    /// Delete every generation whose name differs from the current tag.
    ///
    /// Deletions run independently; an individual failure is logged and
    /// reported in the outcome without blocking the others. Only the
    /// initial name listing can fail the call.
    pub async fn purge_obsolete_generations(&self) -> Result<PurgeOutcome, Error> {
        let names = self.db.generation_names().await?;

        let attempts = names
            .into_iter()
            .filter(|name| name != &self.version)
            .map(|name| async move {
                let result = self.delete_one(&name).await;
                (name, result)
            });

        let mut outcome = PurgeOutcome::default();
        for (name, result) in futures::future::join_all(attempts).await {
            match result {
                Ok(entries) => {
                    tracing::info!(generation = %name, entries, "deleted obsolete generation");
                    outcome.deleted.push(name);
                }
                Err(e) => {
                    tracing::warn!(generation = %name, error = %e, "failed to delete obsolete generation");
                    outcome.failed.push((name, e.to_string()));
                }
            }
        }

        Ok(outcome)
    }

    async fn delete_one(&self, name: &str) -> Result<u64, Error> {
        #[cfg(test)]
        if self.faults.lock().unwrap().deletes.contains(name) {
            return Err(Error::Database(tokio_rusqlite::Error::ConnectionClosed));
        }
        self.db.delete_generation(name).await
    }

    /// Store one response snapshot under a key in the current generation.
    pub async fn put(&self, key: &str, response: &CachedResponse) -> Result<(), Error> {
        #[cfg(test)]
        if self.faults.lock().unwrap().puts {
            return Err(Error::Database(tokio_rusqlite::Error::ConnectionClosed));
        }
        self.db.upsert_entry(&self.version, key, response).await
    }

    /// Look up a key in the current generation only.
    pub async fn lookup(&self, key: &str) -> Result<Option<CachedResponse>, Error> {
        self.db.get_entry(&self.version, key).await
    }
}
