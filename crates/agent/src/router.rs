//! The interception router.
//!
//! One explicit object owns the generation manager and the transport
//! and exposes a method per external trigger: `on_install`,
//! `on_activate`, `on_request`, and `on_command`. Request handling
//! always terminates in a served or explicitly unavailable outcome;
//! network failures are recovered locally and never surface to the
//! requesting page.

use std::sync::Arc;

use pinshelf_client::{FetchResponse, Transport};
use pinshelf_core::cache::key;
use pinshelf_core::{CachedResponse, Error, classify};

use crate::commands::{self, CommandMessage};
use crate::manager::GenerationManager;

/// Outcome of one intercepted request.
#[derive(Debug)]
pub enum Served {
    /// Fresh response straight from the network.
    Network(FetchResponse),
    /// Stored snapshot replayed from the current generation.
    Cached(CachedResponse),
    /// Network failed and the cache had nothing; the requester sees a
    /// failed resource load.
    Unavailable,
}

impl Served {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Served::Unavailable)
    }

    /// Response body, when there is one.
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            Served::Network(response) => Some(&response.bytes),
            Served::Cached(entry) => Some(&entry.body),
            Served::Unavailable => None,
        }
    }

    /// Convert the unavailable outcome into a `CacheMiss` error.
    pub fn into_result(self, request_url: &str) -> Result<Self, Error> {
        match self {
            Served::Unavailable => Err(Error::CacheMiss(request_url.to_string())),
            served => Ok(served),
        }
    }
}

/// Router dispatching lifecycle events, requests, and commands.
pub struct Router {
    manager: GenerationManager,
    transport: Arc<dyn Transport>,
}

impl Router {
    pub fn new(manager: GenerationManager, transport: Arc<dyn Transport>) -> Self {
        Self { manager, transport }
    }

    pub fn manager(&self) -> &GenerationManager {
        &self.manager
    }

    /// Install: populate the current generation.
    ///
    /// Must fully succeed before activation; a failure here aborts the
    /// install and the previous generation keeps serving.
    pub async fn on_install(&self) -> Result<(), Error> {
        self.manager.precache_all().await?;
        tracing::info!(generation = %self.manager.version(), "installed");
        Ok(())
    }

    /// Activate: purge obsolete generations, then claim the scope.
    ///
    /// Purge problems are logged and never abort activation.
    pub async fn on_activate(&self) {
        match self.manager.purge_obsolete_generations().await {
            Ok(outcome) => {
                if !outcome.failed.is_empty() {
                    tracing::warn!(failed = outcome.failed.len(), "some obsolete generations were not deleted");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not enumerate generations for purge");
            }
        }
        tracing::info!(generation = %self.manager.version(), "activated, claiming scope");
    }

    /// Intercept one outgoing request.
    ///
    /// Offline-guarantee resources are served cache-first; everything
    /// else network-first with a cache fallback. Every path resolves.
    pub async fn on_request(&self, request_url: &str) -> Served {
        match key::derive(request_url) {
            Ok(cache_key) if classify::needs_offline_guarantee(&cache_key) => {
                self.cache_first(&cache_key, request_url).await
            }
            Ok(_) => self.network_first(request_url).await,
            Err(e) => {
                tracing::warn!(url = request_url, error = %e, "unparseable request URL, serving network-first");
                self.network_first(request_url).await
            }
        }
    }

    /// Handle one inbound command from a client.
    ///
    /// Unrecognized messages are silently ignored. Runs outside the
    /// request path; concurrent writes to the generation are safe
    /// because single puts are atomic.
    pub async fn on_command(&self, msg: &CommandMessage) -> Result<(), Error> {
        tracing::debug!(message = %msg.message, id = %msg.id, "got command");
        match msg.message.as_str() {
            commands::FAVORITE_ADD => {
                commands::handle_favorite_add(&self.manager, self.transport.as_ref(), &msg.id, msg.data.clone()).await
            }
            _ => Ok(()),
        }
    }

    /// Cache-first strategy for offline-guarantee resources.
    ///
    /// A hit short-circuits without any network call. On a miss the
    /// resource is fetched and a snapshot stored under the normalized
    /// cache key; a store failure is logged and the network response is
    /// returned anyway, since the requester already has its resource
    /// and only the offline copy is lost. Only a fetch failure engages
    /// the fallback lookup, whose miss is the terminal unavailable
    /// outcome.
    async fn cache_first(&self, cache_key: &str, request_url: &str) -> Served {
        match self.manager.lookup(cache_key).await {
            Ok(Some(entry)) => return Served::Cached(entry),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(key = cache_key, error = %e, "cache lookup failed, treating as miss");
            }
        }

        match self.transport.fetch(request_url).await {
            Ok(response) => {
                if let Err(e) = self.manager.put(cache_key, &response.to_cached()).await {
                    tracing::warn!(key = cache_key, error = %e, "failed to store offline copy");
                }
                Served::Network(response)
            }
            Err(e) => {
                tracing::warn!(key = cache_key, error = %e, "fetch failed, falling back to offline cache");
                match self.manager.lookup(cache_key).await {
                    Ok(Some(entry)) => Served::Cached(entry),
                    Ok(None) => Served::Unavailable,
                    Err(e) => {
                        tracing::warn!(key = cache_key, error = %e, "fallback lookup failed");
                        Served::Unavailable
                    }
                }
            }
        }
    }

    /// Network-first strategy for best-effort resources.
    ///
    /// A successful fetch always wins over any cached copy. The
    /// fallback looks up the full original request URL, not the
    /// normalized cache key. That asymmetry is carried over from the
    /// deployed behavior for compatibility; do not unify the two
    /// keyings without confirming the intended semantics.
    async fn network_first(&self, request_url: &str) -> Served {
        match self.transport.fetch(request_url).await {
            Ok(response) => Served::Network(response),
            Err(e) => {
                tracing::debug!(url = request_url, error = %e, "falling back to offline cache");
                match self.manager.lookup(request_url).await {
                    Ok(Some(entry)) => Served::Cached(entry),
                    Ok(None) => Served::Unavailable,
                    Err(e) => {
                        tracing::warn!(url = request_url, error = %e, "fallback lookup failed");
                        Served::Unavailable
                    }
                }
            }
        }
    }
}
