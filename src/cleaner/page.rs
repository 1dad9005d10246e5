//! Per-page cleaning and compact output

use crate::cleaner::dom::{parse_document, CleanElement};
use crate::cleaner::rules::{clean_structure, remove_empty, remove_menu_lists};

/// Closing tags followed by a line break in compact output
const BLOCK_CLOSERS: &[&str] = &[
    "</section>", "</article>", "</main>", "</body>", "</html>", "</h1>", "</h2>", "</h3>",
    "</h4>", "</h5>", "</h6>", "</p>", "</div>", "</li>", "</tr>",
];

/// How much of a page survives cleaning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanMode {
    /// Whole document, headers, footers and navigation included
    FullStructure,
    /// `<main>` only, or the body without menus when there is no `<main>`
    MainContent,
}

/// Cleans one HTML page and returns compact markup
///
/// # Example
///
/// ```
/// use scope_harvest::cleaner::{clean_page, CleanMode};
///
/// let html = "<html><body><nav><a href='/'>Home</a></nav><main><p>Hello</p></main></body></html>";
/// assert_eq!(clean_page(html, CleanMode::MainContent), "<main><p>Hello</p>\n</main>");
/// ```
pub fn clean_page(html: &str, mode: CleanMode) -> String {
    let mut document = parse_document(html);
    clean_structure(&mut document, mode == CleanMode::MainContent);

    match mode {
        CleanMode::FullStructure => finalize(&document),
        CleanMode::MainContent => {
            if let Some(main) = document.find("main") {
                return finalize(main);
            }

            let body = document.find("body").cloned();
            let mut root = body.unwrap_or(document);
            remove_menu_lists(&mut root);
            remove_empty(&mut root);
            finalize(&root)
        }
    }
}

/// Serializes with collapsed whitespace and one block per line
pub fn finalize(element: &CleanElement) -> String {
    let mut html = element
        .to_html()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    for closer in BLOCK_CLOSERS {
        html = html.replace(closer, &format!("{}\n", closer));
    }

    html.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
