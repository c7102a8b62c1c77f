//! Markup queries over fetched pages
//!
//! Discovery needs exactly two views of a page: its `<link>` elements and
//! its `<a href>` values, both in document order.

use scraper::{Html, Selector};

/// A `<link>` element with the attributes discovery looks at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkTag {
    /// `rel` attribute, if present
    ///
    /// Discovery selects feed links by `type` alone, since sites often omit
    /// `rel="alternate"`; `rel` is only logged.
    pub rel: Option<String>,
    /// `type` attribute, if present
    pub link_type: Option<String>,
    /// `href` attribute, empty when absent
    pub href: String,
}

/// Capability to enumerate links and anchors in a page body
///
/// Implementations must not fail: unparsable markup yields empty lists.
pub trait MarkupQuery: Send + Sync {
    /// Every `<link>` element, in document order
    fn link_tags(&self, body: &str) -> Vec<LinkTag>;

    /// Every `href` of an `<a>` element, in document order
    fn anchor_hrefs(&self, body: &str) -> Vec<String>;
}

/// HTML5 markup query backed by `scraper`
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlMarkup;

impl HtmlMarkup {
    /// Create a new HTML markup query
    pub fn new() -> Self {
        Self
    }
}

impl MarkupQuery for HtmlMarkup {
    fn link_tags(&self, body: &str) -> Vec<LinkTag> {
        let Ok(selector) = Selector::parse("link") else {
            return Vec::new();
        };
        let document = Html::parse_document(body);
        document
            .select(&selector)
            .map(|element| {
                let attrs = element.value();
                LinkTag {
                    rel: attrs.attr("rel").map(str::to_string),
                    link_type: attrs.attr("type").map(str::to_string),
                    href: attrs.attr("href").unwrap_or_default().to_string(),
                }
            })
            .collect()
    }

    fn anchor_hrefs(&self, body: &str) -> Vec<String> {
        let Ok(selector) = Selector::parse("a[href]") else {
            return Vec::new();
        };
        let document = Html::parse_document(body);
        document
            .select(&selector)
            .filter_map(|element| element.value().attr("href"))
            .map(str::to_string)
            .collect()
    }
}
