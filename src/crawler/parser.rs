//! HTML link extraction
//!
//! This module turns a fetched document body into the raw anchor targets
//! it links to, in document order.

use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

/// Errors from link extraction
///
/// These never abort a crawl; the page is recorded with zero links.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("document body is not text")]
    NotText,
}

/// Capability to pull link targets out of a document body
pub trait LinkExtractor: Send + Sync {
    /// Returns absolute URL strings in document order
    fn extract_links(&self, body: &[u8], base_url: &Url) -> Result<Vec<String>, ParseError>;
}

/// Default [`LinkExtractor`] backed by `scraper`
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_links(&self, body: &[u8], base_url: &Url) -> Result<Vec<String>, ParseError> {
        if body.contains(&0) {
            return Err(ParseError::NotText);
        }
        let html = String::from_utf8_lossy(body);
        Ok(extract_links(&html, base_url))
    }
}

/// Extracts link targets from HTML
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only and empty hrefs
/// - Targets that do not resolve to HTTP(S)
///
/// # Example
///
/// ```
/// use scope_harvest::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// assert_eq!(extract_links(html, &base_url), vec!["https://example.com/page"]);
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_href(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
fn resolve_href(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/docs/page.html").unwrap()
    }

    #[test]
    fn test_extract_relative_and_absolute() {
        let html = r#"<html><body>
            <a href="other.html">Relative</a>
            <a href="/root.pdf">Root</a>
            <a href="https://partner.com/doc.pdf">External</a>
        </body></html>"#;

        let links = extract_links(html, &base_url());
        assert_eq!(
            links,
            vec![
                "https://example.com/docs/other.html",
                "https://example.com/root.pdf",
                "https://partner.com/doc.pdf",
            ]
        );
    }

    #[test]
    fn test_skip_special_schemes() {
        let html = r##"<html><body>
            <a href="javascript:void(0)">JS</a>
            <a href="MAILTO:test@example.com">Email</a>
            <a href="tel:+1234567890">Phone</a>
            <a href="data:text/plain,hello">Data</a>
            <a href="ftp://example.com/file">FTP</a>
            <a href="#section">Anchor</a>
            <a href="">Empty</a>
            <a href="/valid">Valid</a>
        </body></html>"##;

        let links = extract_links(html, &base_url());
        assert_eq!(links, vec!["https://example.com/valid"]);
    }

    #[test]
    fn test_document_order_kept_with_duplicates() {
        let html = r#"<a href="/b">B</a><a href="/a">A</a><a href="/b">B again</a>"#;
        let links = extract_links(html, &base_url());
        assert_eq!(
            links,
            vec![
                "https://example.com/b",
                "https://example.com/a",
                "https://example.com/b",
            ]
        );
    }

    #[test]
    fn test_malformed_html_still_yields_links() {
        let html = r#"<html><body><div><a href="/ok">ok<p></div"#;
        let links = extract_links(html, &base_url());
        assert_eq!(links, vec!["https://example.com/ok"]);
    }

    #[test]
    fn test_binary_body_is_parse_error() {
        let body = b"%PDF-1.4\x00\x01\x02";
        let result = HtmlLinkExtractor.extract_links(body, &base_url());
        assert_eq!(result, Err(ParseError::NotText));
    }

    #[test]
    fn test_extractor_on_bytes() {
        let body = br#"<a href="next.html">next</a>"#;
        let links = HtmlLinkExtractor.extract_links(body, &base_url()).unwrap();
        assert_eq!(links, vec!["https://example.com/docs/next.html"]);
    }
}
