//! Resolution of resource URLs against the agent's scope.

use url::Url;

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve a resource URL against the agent's scope.
///
/// Favorite records and inbound commands routinely carry site-relative
/// paths like `/img/a.png`; those resolve against the configured base.
/// Absolute URLs pass through untouched apart from validation.
pub fn resolve(base: &Url, input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let resolved = base.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match resolved.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://site.test/").unwrap()
    }

    #[test]
    fn test_resolve_relative_path() {
        let url = resolve(&base(), "/img/a.png").unwrap();
        assert_eq!(url.as_str(), "https://site.test/img/a.png");
    }

    #[test]
    fn test_resolve_absolute_passthrough() {
        let url = resolve(&base(), "https://cdn.test/lib/jquery.min.js").unwrap();
        assert_eq!(url.as_str(), "https://cdn.test/lib/jquery.min.js");
    }

    #[test]
    fn test_resolve_keeps_query() {
        let url = resolve(&base(), "/vendor/lib.js?x=1").unwrap();
        assert_eq!(url.query(), Some("x=1"));
    }

    #[test]
    fn test_resolve_trims_whitespace() {
        let url = resolve(&base(), "  /img/a.png  ").unwrap();
        assert_eq!(url.path(), "/img/a.png");
    }

    #[test]
    fn test_resolve_empty() {
        let result = resolve(&base(), "   ");
        assert!(matches!(result, Err(UrlError::Empty)));
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        let result = resolve(&base(), "file:///etc/passwd");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }
}
