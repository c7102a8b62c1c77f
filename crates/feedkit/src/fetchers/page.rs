//! Fetched page bodies and their character encoding

use bytes::Bytes;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use std::borrow::Cow;

/// How far into a body in-document encoding declarations are looked for
const SNIFF_LIMIT: usize = 1024;

/// Raw body of a fetched URL plus its declared content type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    body: Bytes,
    content_type: Option<String>,
}

impl Page {
    /// Create a page from raw bytes and the `Content-Type` header value
    pub fn new(body: impl Into<Bytes>, content_type: Option<String>) -> Self {
        Self {
            body: body.into(),
            content_type,
        }
    }

    /// Undecoded body
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// `Content-Type` header value, if the server sent one
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Character encoding of the body
    ///
    /// Checked in order: byte order mark, `charset` of the content type,
    /// an XML `encoding` or HTML `charset` declaration near the start of the
    /// body. Undeclared bodies are UTF-8 when valid, else windows-1252.
    pub fn encoding(&self) -> &'static Encoding {
        if let Some((encoding, _)) = Encoding::for_bom(&self.body) {
            return encoding;
        }
        self.content_type
            .as_deref()
            .and_then(header_charset)
            .or_else(|| declared_charset(&self.body))
            .unwrap_or_else(|| {
                if std::str::from_utf8(&self.body).is_ok() {
                    UTF_8
                } else {
                    WINDOWS_1252
                }
            })
    }

    /// Body decoded to text
    pub fn text(&self) -> String {
        let (text, _, had_errors) = self.encoding().decode(&self.body);
        if had_errors {
            tracing::debug!(encoding = self.encoding().name(), "Body has malformed sequences");
        }
        text.into_owned()
    }

    /// Body as handed to an XML feed parser
    ///
    /// The parser honours a byte order mark and the XML declaration itself,
    /// so such bodies pass through untouched. Bodies whose encoding is only
    /// known from the content type are transcoded to UTF-8.
    pub fn feed_bytes(&self) -> Cow<'_, [u8]> {
        if Encoding::for_bom(&self.body).is_some() || xml_declared_charset(&self.body).is_some() {
            return Cow::Borrowed(&self.body);
        }
        let encoding = self.encoding();
        if encoding == UTF_8 {
            Cow::Borrowed(&self.body)
        } else {
            Cow::Owned(self.text().into_bytes())
        }
    }
}

impl From<String> for Page {
    fn from(body: String) -> Self {
        Self::new(body, None)
    }
}

impl From<&str> for Page {
    fn from(body: &str) -> Self {
        Self::new(body.to_string(), None)
    }
}

/// `charset` parameter of a content type such as `text/html; charset=ISO-8859-1`
fn header_charset(content_type: &str) -> Option<&'static Encoding> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
        .and_then(|(_, value)| Encoding::for_label(value.trim().trim_matches('"').as_bytes()))
}

/// `encoding="…"` of a leading XML declaration
fn xml_declared_charset(body: &[u8]) -> Option<&'static Encoding> {
    let head = sniff_head(body);
    if !head.trim_start().starts_with("<?xml") {
        return None;
    }
    let decl_end = head.find("?>")?;
    attribute_label(&head[..decl_end], "encoding=")
}

/// XML declaration or HTML `<meta charset>` near the start of the body
fn declared_charset(body: &[u8]) -> Option<&'static Encoding> {
    xml_declared_charset(body).or_else(|| attribute_label(&sniff_head(body), "charset="))
}

fn sniff_head(body: &[u8]) -> String {
    let head = &body[..body.len().min(SNIFF_LIMIT)];
    String::from_utf8_lossy(head).to_ascii_lowercase()
}

fn attribute_label(haystack: &str, key: &str) -> Option<&'static Encoding> {
    let start = haystack.find(key)? + key.len();
    let label: String = haystack[start..]
        .trim_start_matches(['"', '\''])
        .chars()
        .take_while(|c| !matches!(c, '"' | '\'' | ' ' | ';' | '>' | '/'))
        .collect();
    Encoding::for_label(label.as_bytes())
}
