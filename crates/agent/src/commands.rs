//! Inbound command messages and their handlers.
//!
//! Clients announce changes over an opaque message channel; each
//! message carries a `message` discriminator, the id of the item it
//! concerns, and a payload. Recognized commands mutate the current
//! generation incrementally; everything else is a no-op.

use serde::{Deserialize, Serialize};

use pinshelf_client::Transport;
use pinshelf_core::{Error, FavoriteRecord};

use crate::manager::GenerationManager;

/// A new favorite was added; its resources should be cached now.
pub const FAVORITE_ADD: &str = "favorite:add";

/// One inbound command message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMessage {
    /// Command discriminator, e.g. `favorite:add`.
    pub message: String,
    /// Id of the favorited item the command concerns.
    pub id: String,
    /// Command payload; shape depends on `message`.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Handle `favorite:add`: fetch the new favorite's resources (all must
/// succeed) and store each under its resolved URL in the current
/// generation.
pub(crate) async fn handle_favorite_add(
    manager: &GenerationManager, transport: &dyn Transport, id: &str, data: serde_json::Value,
) -> Result<(), Error> {
    let record: FavoriteRecord =
        serde_json::from_value(data).map_err(|e| Error::MalformedRecord(format!("favorite:add {id}: {e}")))?;

    let urls = record.resource_urls();
    let responses = futures::future::try_join_all(urls.iter().map(|url| transport.fetch(url))).await?;

    futures::future::try_join_all(responses.iter().map(|response| {
        let key = response.final_url.to_string();
        async move { manager.put(&key, &response.to_cached()).await }
    }))
    .await?;

    tracing::info!(id, entries = responses.len(), "cached new favorite");

    Ok(())
}
