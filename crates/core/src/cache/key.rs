//! Cache-key derivation from request URLs.

use crate::Error;
use url::Url;

/// Derive the cache key for a request URL: origin + path.
///
/// Query string and fragment are discarded, so two requests that differ
/// only in query parameters collide to the same entry. That collision
/// is a documented limitation of the keying scheme, not something to
/// compensate for here.
pub fn cache_key(url: &Url) -> String {
    format!("{}{}", url.origin().ascii_serialization(), url.path())
}

/// Parse a request URL string and derive its cache key.
pub fn derive(url_str: &str) -> Result<String, Error> {
    let url = Url::parse(url_str).map_err(|e| Error::InvalidUrl(format!("{url_str}: {e}")))?;
    Ok(cache_key(&url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_dropped() {
        let key = derive("https://site.test/vendor/lib.js?x=1").unwrap();
        assert_eq!(key, "https://site.test/vendor/lib.js");
    }

    #[test]
    fn test_fragment_dropped() {
        let key = derive("https://site.test/assets/app.css#top").unwrap();
        assert_eq!(key, "https://site.test/assets/app.css");
    }

    #[test]
    fn test_query_variants_collide() {
        let a = derive("https://site.test/img/a.png?size=1x").unwrap();
        let b = derive("https://site.test/img/a.png?size=2x").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_port_preserved() {
        let key = derive("http://localhost:8080/assets/app.js").unwrap();
        assert_eq!(key, "http://localhost:8080/assets/app.js");
    }

    #[test]
    fn test_invalid_url() {
        let result = derive("not a url");
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }
}
