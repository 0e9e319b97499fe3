//! pinshelf agent entry point.
//!
//! Boots the agent through its lifecycle: install (precache the current
//! generation), activate (purge obsolete generations), then serve
//! inbound commands as newline-delimited JSON on stdin until EOF.
//! Logging goes to stderr so stdout stays free for the command stream.

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use pinshelf_agent::{CommandMessage, FsFavoriteStore, GenerationManager, Router};
use pinshelf_client::{FetchConfig, HttpTransport, Transport};
use pinshelf_core::{AppConfig, CacheDb};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load()?;

    let db = CacheDb::open(&config.db_path).await?;

    let fetch_config = FetchConfig {
        base_url: url::Url::parse(&config.base_url)?,
        user_agent: config.user_agent.clone(),
        max_bytes: config.max_bytes,
        timeout: config.timeout(),
        ..Default::default()
    };
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(fetch_config)?);

    let store = Arc::new(FsFavoriteStore::new(config.favorites_path.clone()));
    let manager = GenerationManager::new(db, config.cache_version.clone(), store, transport.clone());
    let router = Router::new(manager, transport);

    router.on_install().await?;
    router.on_activate().await;

    tracing::info!("pinshelf agent ready, reading commands from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<CommandMessage>(line) {
            Ok(msg) => {
                if let Err(e) = router.on_command(&msg).await {
                    tracing::warn!(message = %msg.message, id = %msg.id, error = %e, "command failed");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unparseable command line");
            }
        }
    }

    Ok(())
}
