use crate::UrlError;
use url::Url;

/// Normalizes an absolute URL according to Scope-Harvest's canonical form
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an `http` or `https` scheme
/// 3. Require a host
/// 4. Remove the fragment (everything after #)
///
/// Parsing already lowercases the host, removes dot segments and default
/// ports, and turns an empty path into `/`. Query strings and trailing
/// slashes are kept as-is, since either can select a different resource.
///
/// The resulting string is the identity used for the visited set, for
/// per-page de-duplication and for blocked-prefix matching.
///
/// # Examples
///
/// ```
/// use scope_harvest::url::normalize_url;
///
/// let url = normalize_url("HTTPS://Example.COM:443/a/../page.html#intro").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page.html");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize(url)
}

/// Resolves a link target against the page it was found on, then normalizes it
///
/// Absolute targets are accepted unchanged apart from normalization.
pub fn resolve_link(base: &Url, href: &str) -> Result<Url, UrlError> {
    let url = base
        .join(href.trim())
        .map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize(url)
}

/// Brings a configured URL prefix into the same canonical form as crawled URLs
///
/// Host case, default ports and percent-encoding follow [`normalize_url`];
/// path case is untouched so prefix comparison stays case-sensitive.
/// Entries that do not parse as absolute HTTP(S) URLs are only trimmed.
pub fn normalize_prefix(prefix: &str) -> String {
    match normalize_url(prefix) {
        Ok(url) => url.to_string(),
        Err(_) => prefix.trim().to_string(),
    }
}

fn canonicalize(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlError::MissingDomain),
    }

    url.set_fragment(None);

    Ok(url)
}
