//! Cleaning passes over the owned HTML tree

use crate::cleaner::dom::{CleanElement, CleanNode};

/// Elements removed from every page, subtree included
pub const TAGS_ALWAYS_REMOVE: &[&str] = &[
    // Scripts and styles
    "script", "style", "noscript",
    // Metadata
    "meta", "link",
    // Media
    "img", "picture", "video", "audio", "source", "track", "canvas", "iframe", "embed", "object",
    "param",
    // Graphics
    "svg", "path", "circle", "rect", "line", "polygon", "polyline", "ellipse", "g", "defs", "use",
    "symbol", "clipPath", "mask",
    // Interactive elements
    "button", "input", "select", "textarea", "option", "optgroup", "datalist", "output",
    // Misc
    "template", "slot", "portal",
];

/// Structural elements kept only on the first page of a directory
pub const TAGS_BOILERPLATE: &[&str] = &["header", "footer", "nav", "form", "aside", "menu", "menuitem"];

/// Substrings of class or id values that mark boilerplate
pub const BOILERPLATE_PATTERNS: &[&str] = &[
    // Navigation
    "nav", "menu", "navigation", "navbar", "topbar", "sidebar", "breadcrumb",
    // Headers and footers
    "header", "footer", "foot", "masthead",
    // Popups
    "modal", "popup", "poptin", "overlay", "lightbox", "dialog",
    // Consent banners
    "cookie", "consent", "gdpr", "privacy-banner", "cookiebot",
    // Chat widgets
    "chat", "chatbot", "messenger", "intercom", "drift", "crisp", "zendesk", "hubspot",
    "magicform", "widget",
    // Ads and tracking
    "ad-", "ads-", "advertisement", "banner", "promo", "sponsor", "tracking", "analytics", "gtm",
    "google-tag",
    // Social
    "social", "share", "follow-us",
    // Language selectors
    "lang-", "language", "locale", "wpml", "dropdown",
    // Sign-up and login boxes
    "newsletter", "subscribe", "signup", "login", "signin",
    // Misc
    "skip-link", "sr-only", "visually-hidden", "hidden", "back-to-top", "scroll-top",
];

/// Attributes that survive cleaning
pub const ATTRIBUTES_TO_KEEP: &[&str] = &["href", "alt", "title"];

/// Elements never removed by class or id patterns
const PROTECTED_TAGS: &[&str] = &["html", "body"];

/// Direct `<ul>` children with more links than this are treated as menus
const MENU_LINK_THRESHOLD: usize = 3;

/// Drops every descendant element for which `remove` returns true
pub fn remove_elements<P>(element: &mut CleanElement, remove: &P)
where
    P: Fn(&CleanElement) -> bool,
{
    element.children.retain(|child| match child {
        CleanNode::Element(e) => !remove(e),
        CleanNode::Text(_) => true,
    });
    for child in &mut element.children {
        if let CleanNode::Element(e) = child {
            remove_elements(e, remove);
        }
    }
}

/// Returns true if the element's class or id contains a boilerplate pattern
pub fn is_boilerplate_element(element: &CleanElement) -> bool {
    if PROTECTED_TAGS.contains(&element.name.as_str()) {
        return false;
    }

    let class = element.attr("class").unwrap_or("");
    let id = element.attr("id").unwrap_or("");
    if class.is_empty() && id.is_empty() {
        return false;
    }

    let haystack = format!("{} {}", class, id).to_lowercase();
    BOILERPLATE_PATTERNS
        .iter()
        .any(|pattern| haystack.contains(pattern))
}

/// Keeps only whitelisted attributes, recursively
pub fn strip_attributes(element: &mut CleanElement) {
    element
        .attrs
        .retain(|(key, _)| ATTRIBUTES_TO_KEEP.contains(&key.as_str()));
    for child in &mut element.children {
        if let CleanNode::Element(e) = child {
            strip_attributes(e);
        }
    }
}

/// Removes elements left with nothing but whitespace, innermost first
///
/// Void elements such as `<br>` are kept and keep their parent alive.
pub fn remove_empty(element: &mut CleanElement) {
    for child in &mut element.children {
        if let CleanNode::Element(e) = child {
            remove_empty(e);
        }
    }
    element.children.retain(|child| match child {
        CleanNode::Element(e) => e.is_void() || !is_blank(e),
        CleanNode::Text(_) => true,
    });
}

fn is_blank(element: &CleanElement) -> bool {
    element.children.iter().all(|child| match child {
        CleanNode::Text(text) => text.trim().is_empty(),
        CleanNode::Element(_) => false,
    })
}

/// Replaces attribute-less `<div>` and `<span>` elements with their children
pub fn unwrap_plain_containers(element: &mut CleanElement) {
    let children = std::mem::take(&mut element.children);
    for child in children {
        match child {
            CleanNode::Element(mut e) => {
                unwrap_plain_containers(&mut e);
                if matches!(e.name.as_str(), "div" | "span") && e.attrs.is_empty() {
                    element.children.extend(e.children);
                } else {
                    element.children.push(CleanNode::Element(e));
                }
            }
            text => element.children.push(text),
        }
    }
}

/// Removes direct `<ul>` children that look like navigation menus
pub fn remove_menu_lists(element: &mut CleanElement) {
    element.children.retain(|child| match child {
        CleanNode::Element(e) if e.name == "ul" => {
            e.count_descendants("a") <= MENU_LINK_THRESHOLD
        }
        _ => true,
    });
}

/// Runs the structural passes shared by both cleaning modes
///
/// Tag-name boilerplate (`header`, `nav`, ...) is only removed when
/// `remove_boilerplate` is set; class and id patterns always apply.
pub fn clean_structure(document: &mut CleanElement, remove_boilerplate: bool) {
    remove_elements(document, &|e: &CleanElement| {
        TAGS_ALWAYS_REMOVE.contains(&e.name.as_str())
    });

    // Patterns need class and id, so this runs before attributes are stripped
    remove_elements(document, &is_boilerplate_element);

    if remove_boilerplate {
        remove_elements(document, &|e: &CleanElement| {
            TAGS_BOILERPLATE.contains(&e.name.as_str())
        });
    }

    strip_attributes(document);
    remove_empty(document);
    unwrap_plain_containers(document);
    remove_empty(document);
}
