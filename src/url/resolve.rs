use url::Url;

/// Resolves an href against the URL of the document it appears in
///
/// Follows RFC 3986 reference resolution:
/// - absolute URLs are returned unchanged
/// - protocol-relative (`//host/x`) take the base scheme
/// - root-relative (`/x`) take the base scheme, host and port
/// - anything else resolves against the directory of the base path
///
/// Returns `None` for hrefs that never point at a crawlable document
/// (`javascript:`, `mailto:`, `tel:`, `data:`, fragment-only, empty) and for
/// results that are not http(s).
pub fn resolve_url(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let resolved = base.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com:8443/practice/family-law").unwrap()
    }

    fn resolve(href: &str) -> Option<String> {
        resolve_url(href, &base()).map(|u| u.to_string())
    }

    #[test]
    fn test_absolute_unchanged() {
        assert_eq!(
            resolve("https://other.com/page"),
            Some("https://other.com/page".to_string())
        );
    }

    #[test]
    fn test_protocol_relative_takes_base_scheme() {
        assert_eq!(
            resolve("//cdn.example.com/logo"),
            Some("https://cdn.example.com/logo".to_string())
        );
    }

    #[test]
    fn test_root_relative_keeps_port() {
        assert_eq!(
            resolve("/contact"),
            Some("https://example.com:8443/contact".to_string())
        );
    }

    #[test]
    fn test_relative_resolves_against_directory() {
        assert_eq!(
            resolve("divorce"),
            Some("https://example.com:8443/practice/divorce".to_string())
        );
        assert_eq!(
            resolve("../team"),
            Some("https://example.com:8443/team".to_string())
        );
    }

    #[test]
    fn test_skipped_schemes() {
        assert_eq!(resolve("javascript:void(0)"), None);
        assert_eq!(resolve("MAILTO:office@example.com"), None);
        assert_eq!(resolve("tel:+15555550100"), None);
        assert_eq!(resolve("data:text/html,<p>x</p>"), None);
        assert_eq!(resolve("ftp://files.example.com/a"), None);
    }

    #[test]
    fn test_fragment_only_and_empty() {
        assert_eq!(resolve("#reviews"), None);
        assert_eq!(resolve("   "), None);
    }
}
