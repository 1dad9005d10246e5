//! Content classification
//!
//! Page detection (parse for links) and file detection (persist / count)
//! are two independent answers. Filtering by file type never suppresses
//! link discovery.

use crate::config::{FileTypePolicy, WEB_PAGE_EXTENSIONS};
use crate::state::ResourceKind;
use url::Url;

/// Classification of a fetched resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContentClass {
    /// Should be parsed for links
    pub is_page: bool,
    /// Matches the file-type policy
    pub is_target_file: bool,
}

impl ContentClass {
    /// Collapses the two flags into the kind shown in reports
    pub fn kind(&self) -> ResourceKind {
        if self.is_page {
            ResourceKind::Page
        } else if self.is_target_file {
            ResourceKind::File
        } else {
            ResourceKind::Ignored
        }
    }
}

/// Returns the lowercase extension of the URL's last path segment
///
/// A trailing slash, a segment without a dot, or a leading-dot name such as
/// `.htaccess` all count as "no extension".
///
/// # Examples
///
/// ```
/// use scope_harvest::crawler::url_extension;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/files/Report.PDF?v=2").unwrap();
/// assert_eq!(url_extension(&url), Some("pdf".to_string()));
///
/// let url = Url::parse("https://example.com/docs/").unwrap();
/// assert_eq!(url_extension(&url), None);
/// ```
pub fn url_extension(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.last()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Returns true if the extension names a web page
pub fn is_web_extension(ext: &str) -> bool {
    WEB_PAGE_EXTENSIONS.contains(&ext)
}

/// Returns true for declared HTML content types
fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}

/// Classifies a resource by URL, declared content type and file-type policy
///
/// # Rules
///
/// | Policy | Target file when |
/// |--------|------------------|
/// | `All` | always |
/// | `WebPreset` | web extension or no extension |
/// | `CustomSet` | extension in the set (case-insensitive) |
///
/// A resource is a page under every policy when it has a web extension, no
/// extension at all, or a declared HTML content type.
pub fn classify_content(
    url: &Url,
    content_type: Option<&str>,
    policy: &FileTypePolicy,
) -> ContentClass {
    let ext = url_extension(url);
    let web_like = ext.as_deref().map_or(true, is_web_extension);

    let is_page = web_like || content_type.map_or(false, is_html_content_type);

    let is_target_file = match policy {
        FileTypePolicy::All => true,
        FileTypePolicy::WebPreset => web_like,
        FileTypePolicy::CustomSet(extensions) => ext
            .as_ref()
            .map_or(false, |ext| extensions.contains(ext)),
    };

    ContentClass {
        is_page,
        is_target_file,
    }
}
