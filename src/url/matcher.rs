use crate::url::domain::{extract_domain, registrable_domain};
use url::Url;

/// Checks if a domain matches a wildcard pattern
///
/// This function supports two types of patterns:
/// 1. Exact match: "example.com" matches only "example.com"
/// 2. Wildcard match: "*.example.com" matches:
///    - "example.com" (the bare domain)
///    - "blog.example.com" (single subdomain)
///    - "api.v2.example.com" (nested subdomains)
///
/// # Examples
///
/// ```
/// use scope_harvest::url::matches_wildcard;
///
/// assert!(matches_wildcard("example.com", "example.com"));
/// assert!(!matches_wildcard("example.com", "other.com"));
///
/// assert!(matches_wildcard("*.example.com", "example.com"));
/// assert!(matches_wildcard("*.example.com", "api.v2.example.com"));
/// assert!(!matches_wildcard("*.example.com", "example.org"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    if let Some(base) = pattern.strip_prefix("*.") {
        candidate == base || candidate.ends_with(&format!(".{}", base))
    } else {
        candidate == pattern
    }
}

/// Checks a URL against a blocked-path entry
///
/// Literal, case-sensitive prefix comparison on the normalized URL string.
/// An entry naming a bare origin (`https://example.com`) also matches its
/// normalized root form (`https://example.com/`).
pub fn matches_prefix(prefix: &str, url: &Url) -> bool {
    !prefix.is_empty() && url.as_str().starts_with(prefix)
}

/// Checks a URL against one whitelisted external entry
///
/// Entries containing `://` are URL prefixes: scheme, host and port must
/// match exactly and the path must start with the entry's path. Other
/// entries are domain patterns that match the host itself, any of its
/// subdomains, or its registrable domain.
pub fn matches_external_entry(entry: &str, url: &Url) -> bool {
    let entry = entry.trim();

    if entry.contains("://") {
        return match Url::parse(entry) {
            Ok(prefix) => {
                prefix.scheme() == url.scheme()
                    && prefix.host_str() == url.host_str()
                    && prefix.port_or_known_default() == url.port_or_known_default()
                    && url.path().starts_with(prefix.path())
            }
            Err(_) => false,
        };
    }

    let Some(host) = extract_domain(url) else {
        return false;
    };
    let pattern = entry.trim_end_matches('/').to_lowercase();

    if pattern.starts_with("*.") {
        return matches_wildcard(&pattern, &host);
    }

    host == pattern
        || host.ends_with(&format!(".{}", pattern))
        || registrable_domain(url).map_or(false, |domain| domain == pattern)
}
