use crate::UrlError;
use url::Url;

/// Normalizes a URL so equivalent addresses compare equal
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an http(s) scheme and a host
/// 3. Remove the fragment (everything after #)
/// 4. Remove a trailing slash from the path; an empty path becomes `/`
///
/// Query strings are kept as-is. Host lowercasing and dot-segment removal
/// come from the parser itself. Normalizing an already normalized URL
/// returns it unchanged.
///
/// # Examples
///
/// ```
/// use seo_audit::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.COM/page/#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    let trimmed = url.path().trim_end_matches('/').to_string();
    if trimmed.is_empty() {
        url.set_path("/");
    } else {
        url.set_path(&trimmed);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(s: &str) -> String {
        normalize_url(s).unwrap().to_string()
    }

    #[test]
    fn test_remove_trailing_slash() {
        assert_eq!(norm("https://example.com/page/"), "https://example.com/page");
    }

    #[test]
    fn test_keep_root_slash() {
        assert_eq!(norm("https://example.com/"), "https://example.com/");
        assert_eq!(norm("https://example.com"), "https://example.com/");
    }

    #[test]
    fn test_remove_fragment() {
        assert_eq!(norm("https://example.com/page#section"), "https://example.com/page");
        assert_eq!(norm("https://example.com/#top"), "https://example.com/");
    }

    #[test]
    fn test_query_is_preserved() {
        assert_eq!(
            norm("https://example.com/search/?q=law&page=2#results"),
            "https://example.com/search?q=law&page=2"
        );
    }

    #[test]
    fn test_scheme_and_port_are_preserved() {
        assert_eq!(norm("http://127.0.0.1:8080/a/"), "http://127.0.0.1:8080/a");
    }

    #[test]
    fn test_repeated_trailing_slashes() {
        assert_eq!(norm("https://example.com/docs///"), "https://example.com/docs");
        assert_eq!(norm("https://example.com//"), "https://example.com/");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let samples = [
            "https://example.com",
            "https://EXAMPLE.com/About/",
            "https://example.com/a/../b/./c/",
            "http://example.com:8080/x/?y=1#z",
            "https://example.com/path//",
            "https://example.com/?",
        ];

        for sample in samples {
            let once = normalize_url(sample).unwrap();
            let twice = normalize_url(once.as_str()).unwrap();
            assert_eq!(once, twice, "normalization not idempotent for {}", sample);
        }
    }

    #[test]
    fn test_invalid_scheme() {
        let result = normalize_url("ftp://example.com/page");
        assert!(matches!(result.unwrap_err(), UrlError::InvalidScheme(_)));
    }

    #[test]
    fn test_malformed_url() {
        assert!(matches!(
            normalize_url("not a url").unwrap_err(),
            UrlError::Parse(_)
        ));
    }
}
