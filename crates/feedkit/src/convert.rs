//! Plain-text extraction for article pages and entry summaries

use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose content is never article text
const SKIP_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "iframe", "svg", "nav", "form", "template",
];

/// Elements that start a new paragraph
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "br", "h1", "h2", "h3", "h4", "h5", "h6", "li", "tr", "section", "article",
    "blockquote", "pre", "figcaption", "ul", "ol", "table",
];

/// Containers tried in order when looking for the article body
const CONTENT_ROOTS: &[&str] = &["article", "main", "body"];

/// Extract readable text from a full HTML page
///
/// Uses the first `<article>`, else `<main>`, else `<body>`. Scripts,
/// styles and navigation are dropped; block elements become paragraph
/// breaks and entities are decoded by the parser.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let root = CONTENT_ROOTS
        .iter()
        .filter_map(|name| Selector::parse(name).ok())
        .find_map(|selector| document.select(&selector).next())
        .unwrap_or_else(|| document.root_element());

    let mut text = String::new();
    collect_text(root, &mut text);
    clean_whitespace(&text)
}

/// Extract text from an HTML fragment such as a feed entry summary
pub fn fragment_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut text = String::new();
    collect_text(fragment.root_element(), &mut text);
    clean_whitespace(&text)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIP_ELEMENTS.contains(&name) {
                    continue;
                }
                let block = BLOCK_ELEMENTS.contains(&name);
                if block {
                    out.push_str("\n\n");
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
                if block {
                    out.push_str("\n\n");
                }
            }
            _ => {}
        }
    }
}

/// Collapse whitespace into single spaces and blank-line separated paragraphs
pub fn clean_whitespace(s: &str) -> String {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in s.lines() {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join(" "));
                current.clear();
            }
        } else {
            current.extend(words);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }

    paragraphs.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text_paragraphs() {
        let html = "<html><body><p>Hello</p><p>World</p></body></html>";
        assert_eq!(html_to_text(html), "Hello\n\nWorld");
    }

    #[test]
    fn test_html_to_text_prefers_article() {
        let html = r#"<html><body>
            <nav><a href="/">Home</a></nav>
            <p>Sidebar teaser</p>
            <article><h1>Headline</h1><p>Body text.</p></article>
        </body></html>"#;
        let text = html_to_text(html);
        assert_eq!(text, "Headline\n\nBody text.");
    }

    #[test]
    fn test_html_to_text_skips_scripts() {
        let html = "<p>Before</p><script>alert('bad');</script><style>p{}</style><p>After</p>";
        let text = html_to_text(html);
        assert!(text.contains("Before"));
        assert!(text.contains("After"));
        assert!(!text.contains("alert"));
        assert!(!text.contains("p{}"));
    }

    #[test]
    fn test_entities_decoded() {
        let text = html_to_text("<p>Tom &amp; Jerry &lt;3 &quot;quoted&quot; &mdash; &copy;</p>");
        assert_eq!(text, "Tom & Jerry <3 \"quoted\" — ©");
    }

    #[test]
    fn test_fragment_to_text() {
        assert_eq!(
            fragment_to_text("A <b>bold</b>\n   summary<br>with break"),
            "A bold summary\n\nwith break"
        );
        assert_eq!(fragment_to_text("plain"), "plain");
        assert_eq!(fragment_to_text(""), "");
    }

    #[test]
    fn test_clean_whitespace() {
        let input = "  hello   world  \n\n\n\n  test  ";
        assert_eq!(clean_whitespace(input), "hello world\n\ntest");
        assert_eq!(clean_whitespace("a\nb"), "a b");
        assert_eq!(clean_whitespace(" \n \n"), "");
    }
}
