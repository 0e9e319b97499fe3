//! In-memory fakes shared by the agent's tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use url::Url;

use pinshelf_client::{FetchResponse, Transport};
use pinshelf_core::{CachedResponse, Error, FavoriteStore};

/// Scope every fake fetch resolves against.
const SCOPE: &str = "https://site.test/";

/// Transport fake: serves registered bodies, fails everything else,
/// and counts fetches per resolved URL.
pub(crate) struct FakeTransport {
    bodies: Mutex<HashMap<String, Vec<u8>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self { bodies: Mutex::new(HashMap::new()), calls: Mutex::new(Vec::new()) }
    }

    /// Serve `body` for `url`; relative URLs resolve against the scope.
    pub fn serve(&self, url: &str, body: &[u8]) {
        let url = Self::resolve(url).to_string();
        self.bodies.lock().unwrap().insert(url, body.to_vec());
    }

    /// Number of fetches issued for `url`.
    pub fn calls_for(&self, url: &str) -> usize {
        let url = Self::resolve(url).to_string();
        self.calls.lock().unwrap().iter().filter(|u| **u == url).count()
    }

    /// Number of fetches issued in total.
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn resolve(url: &str) -> Url {
        Url::parse(SCOPE).unwrap().join(url).unwrap()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn fetch(&self, url_str: &str) -> Result<FetchResponse, Error> {
        let url = Self::resolve(url_str);
        self.calls.lock().unwrap().push(url.to_string());

        let body = self.bodies.lock().unwrap().get(url.as_str()).cloned();
        match body {
            Some(body) => Ok(FetchResponse {
                url: url.clone(),
                final_url: url,
                status: StatusCode::OK,
                content_type: Some("application/octet-stream".to_string()),
                bytes: Bytes::from(body),
                fetch_ms: 0,
            }),
            None => Err(Error::Network(format!("{url}: unreachable"))),
        }
    }
}

/// Favorite store fake over a fixed key/value map.
pub(crate) struct MapStore {
    items: HashMap<String, String>,
}

impl MapStore {
    pub fn new(items: &[(&str, &str)]) -> Self {
        Self {
            items: items
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl FavoriteStore for MapStore {
    async fn keys(&self) -> Result<Vec<String>, Error> {
        let mut keys: Vec<String> = self.items.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.items.get(key).cloned())
    }
}

/// A stored response snapshot with the given body.
pub(crate) fn entry(url: &str, body: &[u8]) -> CachedResponse {
    CachedResponse {
        url: url.to_string(),
        status: 200,
        content_type: Some("application/octet-stream".to_string()),
        body: body.to_vec(),
        stored_at: chrono::Utc::now().to_rfc3339(),
    }
}
