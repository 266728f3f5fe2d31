//! URL normalization for cache keys and the analysis skip-list.
//!
//! Normalization keeps scheme, host and path, lowercased:
//! 1. Parse the URL
//! 2. Drop port, query string and fragment
//! 3. Lowercase the result
//!
//! Unparseable input is lowercased verbatim so normalization never fails.

use url::Url;

/// Canonicalize a page URL into its cache key form.
pub fn normalize(input: &str) -> String {
    match Url::parse(input) {
        Ok(parsed) => format!("{}://{}{}", parsed.scheme(), parsed.host_str().unwrap_or_default(), parsed.path())
            .to_lowercase(),
        Err(e) => {
            tracing::debug!(error = %e, "url did not parse, normalizing verbatim");
            input.to_lowercase()
        }
    }
}

/// Whether the URL uses a scheme that can carry a website.
pub fn is_web_url(input: &str) -> bool {
    Url::parse(input)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Lowercase host of the URL, if it has one.
pub fn host(input: &str) -> Option<String> {
    Url::parse(input)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .filter(|h| !h.is_empty())
}

/// Whether analysis should be skipped for this URL.
///
/// Browser-internal pages (`chrome://`, `chrome-extension://`, `edge://`,
/// `about:`) and any other non-web scheme are skipped, as are hosts matching
/// `skip_hosts` exactly or as a parent domain.
pub fn should_skip(input: &str, skip_hosts: &[String]) -> bool {
    if !is_web_url(input) {
        return true;
    }

    match host(input) {
        Some(host) => skip_hosts.iter().any(|skip| {
            let skip = skip.trim().to_lowercase();
            !skip.is_empty() && (host == skip || host.ends_with(&format!(".{skip}")))
        }),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize("https://example.com/page"), "https://example.com/page");
    }

    #[test]
    fn test_normalize_root_path() {
        assert_eq!(normalize("https://example.com"), "https://example.com/");
    }

    #[test]
    fn test_normalize_strips_query_and_fragment() {
        assert_eq!(normalize("https://example.com/page?x=1#top"), "https://example.com/page");
    }

    #[test]
    fn test_normalize_lowercases() {
        assert_eq!(normalize("HTTPS://Example.COM/Path/To"), "https://example.com/path/to");
    }

    #[test]
    fn test_normalize_drops_port() {
        assert_eq!(normalize("http://example.com:8080/a"), "http://example.com/a");
    }

    #[test]
    fn test_normalize_collapses_variants() {
        let variants = [
            "https://example.com/page",
            "https://example.com/page?x=1",
            "https://example.com/page#frag",
            "HTTPS://EXAMPLE.com/page?y=2#z",
        ];
        let keys: Vec<String> = variants.iter().map(|u| normalize(u)).collect();
        assert!(keys.iter().all(|k| k == &keys[0]));
    }

    #[test]
    fn test_normalize_malformed_falls_back() {
        assert_eq!(normalize("Not A URL"), "not a url");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_deterministic() {
        assert_eq!(normalize("https://a.com/x?q"), normalize("https://a.com/x?q"));
    }

    #[test]
    fn test_is_web_url() {
        assert!(is_web_url("http://example.com"));
        assert!(is_web_url("https://example.com"));
        assert!(!is_web_url("chrome://settings"));
        assert!(!is_web_url("about:blank"));
        assert!(!is_web_url("example.com"));
    }

    #[test]
    fn test_host() {
        assert_eq!(host("https://Sub.Example.com/path"), Some("sub.example.com".to_string()));
        assert_eq!(host("not a url"), None);
    }

    #[test]
    fn test_should_skip_internal_pages() {
        let skip = vec!["privacy-ai.netlify.app".to_string()];
        assert!(should_skip("chrome://extensions", &skip));
        assert!(should_skip("chrome-extension://abcdef/popup.html", &skip));
        assert!(should_skip("edge://settings", &skip));
        assert!(should_skip("about:blank", &skip));
        assert!(should_skip("file:///etc/passwd", &skip));
    }

    #[test]
    fn test_should_skip_companion_site() {
        let skip = vec!["privacy-ai.netlify.app".to_string()];
        assert!(should_skip("https://privacy-ai.netlify.app/setup", &skip));
        assert!(should_skip("https://www.privacy-ai.netlify.app/", &skip));
        assert!(!should_skip("https://example.com/", &skip));
        assert!(!should_skip("https://notprivacy-ai.netlify.app/", &skip));
    }
}
