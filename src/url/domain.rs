use crate::UrlError;
use std::fmt;
use url::{Host, Url};

/// Extracts the host from a URL
///
/// The `url` crate already lowercases domain hosts; IP literals are returned
/// in their serialized form.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use scope_harvest::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the registrable domain (eTLD+1) of a URL's host
///
/// Uses the Public Suffix List, so multi-label suffixes such as `co.uk` are
/// treated as one unit. Hosts that have no registrable part (IP literals,
/// single-label names like `localhost`, bare suffixes) map to themselves.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use scope_harvest::url::registrable_domain;
///
/// let url = Url::parse("https://shop.example.co.uk/").unwrap();
/// assert_eq!(registrable_domain(&url), Some("example.co.uk".to_string()));
/// ```
pub fn registrable_domain(url: &Url) -> Option<String> {
    match url.host()? {
        Host::Domain(domain) => {
            let domain = domain.trim_end_matches('.').to_lowercase();
            if domain.is_empty() {
                return None;
            }
            let registrable = psl::domain_str(&domain).unwrap_or(&domain).to_string();
            Some(registrable)
        }
        Host::Ipv4(addr) => Some(addr.to_string()),
        Host::Ipv6(addr) => Some(format!("[{}]", addr)),
    }
}

/// The registrable domain of the start URL
///
/// Derived once at startup and used as the anchor for internal scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RootDomain(String);

impl RootDomain {
    /// Derives the root domain from the start URL
    pub fn from_url(url: &Url) -> Result<Self, UrlError> {
        registrable_domain(url)
            .map(Self)
            .ok_or(UrlError::MissingDomain)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the URL's registrable domain equals this root
    ///
    /// Subdomains match because they share the registrable domain. URLs
    /// without a parseable host are never internal.
    pub fn contains(&self, url: &Url) -> bool {
        registrable_domain(url).map_or(false, |domain| domain == self.0)
    }
}

impl fmt::Display for RootDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decides whether `url` belongs to the same site as `root`
pub fn is_internal(url: &Url, root: &RootDomain) -> bool {
    root.contains(url)
}
