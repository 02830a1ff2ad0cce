//! PageSnapshot - Immutable capture of the page inputs extraction needs
//!
//! A snapshot holds the structured-data blocks, meta tags, title, visible
//! text and hostname of one page view. It is built once, either from raw
//! HTML via [`PageSnapshot::from_html`] or deserialized from JSON produced
//! by some other capture step, and is never mutated by the extractors.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

/// Selector for the checkout-total element some checkout pages expose
pub const EXPLICIT_TOTAL_SELECTOR: &str = "#checkout-total-amount";

/// Elements whose text is never rendered
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements that start a new line in rendered text
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tbody", "thead", "tfoot",
    "tr", "ul",
];

static HORIZONTAL_WS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\S\n]+").expect("Invalid whitespace regex pattern")
});

/// Everything the extractors read from a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSnapshot {
    /// Raw text of each structured-data (JSON-LD) block
    pub structured_data_blocks: Vec<String>,
    /// Meta tags (name/property -> content)
    pub meta_tags: HashMap<String, String>,
    /// Document title
    pub title: String,
    /// Visible body text, one rendered line per `\n`
    pub body_text: String,
    /// Page hostname
    pub hostname: String,
    /// Text of the checkout-total element, if the page has one
    pub explicit_total_text: Option<String>,
    /// Currency declared on the checkout-total element
    pub explicit_total_currency: Option<String>,
}

impl PageSnapshot {
    /// Create an empty snapshot for a hostname
    pub fn new(hostname: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            ..Default::default()
        }
    }

    pub fn with_structured_data(mut self, block: &str) -> Self {
        self.structured_data_blocks.push(block.to_string());
        self
    }

    pub fn with_meta(mut self, key: &str, content: &str) -> Self {
        self.meta_tags.insert(key.to_string(), content.to_string());
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_body_text(mut self, text: &str) -> Self {
        self.body_text = text.to_string();
        self
    }

    pub fn with_explicit_total(mut self, text: &str, currency: Option<&str>) -> Self {
        self.explicit_total_text = Some(text.to_string());
        self.explicit_total_currency = currency.map(String::from);
        self
    }

    /// Capture a snapshot from an HTML document and the URL it was loaded from
    pub fn from_html(html: &str, url: &str) -> Self {
        let document = Html::parse_document(html);

        let mut snapshot = Self::new(&hostname_of(url));
        snapshot.extract_structured_data(&document);
        snapshot.extract_meta_tags(&document);
        snapshot.extract_title(&document);
        snapshot.extract_body_text(&document);
        snapshot.extract_explicit_total(&document);
        snapshot
    }

    /// Collect the raw text of JSON-LD blocks; parsing happens during extraction
    fn extract_structured_data(&mut self, document: &Html) {
        if let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) {
            for element in document.select(&selector) {
                let text: String = element.text().collect();
                self.structured_data_blocks.push(text);
            }
        }
    }

    /// Extract meta tags; the first tag with a given key wins
    fn extract_meta_tags(&mut self, document: &Html) {
        if let Ok(selector) = Selector::parse("meta[name], meta[property]") {
            for element in document.select(&selector) {
                let key = element
                    .value()
                    .attr("name")
                    .or_else(|| element.value().attr("property"));
                let content = element.value().attr("content");

                if let (Some(k), Some(c)) = (key, content) {
                    self.meta_tags
                        .entry(k.to_string())
                        .or_insert_with(|| c.to_string());
                }
            }
        }
    }

    fn extract_title(&mut self, document: &Html) {
        if let Ok(selector) = Selector::parse("title") {
            if let Some(element) = document.select(&selector).next() {
                let title: String = element.text().collect();
                self.title = title.trim().to_string();
            }
        }
    }

    fn extract_body_text(&mut self, document: &Html) {
        if let Ok(selector) = Selector::parse("body") {
            if let Some(body) = document.select(&selector).next() {
                self.body_text = rendered_text(body);
            }
        }
    }

    fn extract_explicit_total(&mut self, document: &Html) {
        if let Ok(selector) = Selector::parse(EXPLICIT_TOTAL_SELECTOR) {
            if let Some(element) = document.select(&selector).next() {
                self.explicit_total_text = Some(rendered_text(element));
                self.explicit_total_currency =
                    element.value().attr("data-currency").map(String::from);
            }
        }
    }
}

/// Approximate the rendered text of an element: hidden elements dropped,
/// block elements on their own lines, runs of spaces collapsed.
pub fn rendered_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);

    raw.lines()
        .map(|line| HORIZONTAL_WS_RE.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            // Source newlines inside a text node are not line breaks
            out.push_str(&text.replace('\n', " "));
        } else if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();
            if HIDDEN_TAGS.contains(&name) {
                continue;
            }
            let block = BLOCK_TAGS.contains(&name);
            if block {
                out.push('\n');
            }
            collect_text(child_element, out);
            if block {
                out.push('\n');
            }
        }
    }
}

/// Hostname of a page URL; bare hostnames are accepted as-is
pub fn hostname_of(url: &str) -> String {
    let trimmed = url.trim();
    let parsed = Url::parse(trimmed)
        .ok()
        .filter(|u| u.host_str().is_some())
        .or_else(|| Url::parse(&format!("https://{}", trimmed)).ok());

    parsed
        .and_then(|u| u.host_str().map(String::from))
        .unwrap_or_else(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKOUT_HTML: &str = r#"
        <!DOCTYPE html>
        <html>
        <head>
            <title>Checkout | Acme Store</title>
            <meta property="og:site_name" content="Acme Store">
            <meta property="og:site_name" content="Ignored Duplicate">
            <meta name="application-name" content="AcmeApp">
            <script type="application/ld+json">{"@type": "Organization", "name": "Acme Corp"}</script>
            <style>.total { color: red; }</style>
        </head>
        <body>
            <h1>Your order</h1>
            <p>Subtotal: <span>$</span><span>45.00</span></p>
            <div id="checkout-total-amount" data-currency="EUR">€ 1,234.50</div>
            <script>window.cart = { total: 999 };</script>
            <footer>© 2024 Acme Corp. All rights reserved.</footer>
        </body>
        </html>
    "#;

    #[test]
    fn test_capture_from_html() {
        let snapshot = PageSnapshot::from_html(CHECKOUT_HTML, "https://shop.acme.com/checkout");

        assert_eq!(snapshot.hostname, "shop.acme.com");
        assert_eq!(snapshot.title, "Checkout | Acme Store");
        assert_eq!(snapshot.structured_data_blocks.len(), 1);
        assert!(snapshot.structured_data_blocks[0].contains("Acme Corp"));
        assert_eq!(snapshot.meta_tags.get("og:site_name").map(String::as_str), Some("Acme Store"));
        assert_eq!(snapshot.meta_tags.get("application-name").map(String::as_str), Some("AcmeApp"));
        assert_eq!(snapshot.explicit_total_text.as_deref(), Some("€ 1,234.50"));
        assert_eq!(snapshot.explicit_total_currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn test_body_text_is_rendered() {
        let snapshot = PageSnapshot::from_html(CHECKOUT_HTML, "https://shop.acme.com/");
        let lines: Vec<&str> = snapshot.body_text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "Your order",
                "Subtotal: $45.00",
                "€ 1,234.50",
                "© 2024 Acme Corp. All rights reserved.",
            ]
        );
        assert!(!snapshot.body_text.contains("window.cart"));
    }

    #[test]
    fn test_page_without_total_element() {
        let html = "<html><head><title>Hi</title></head><body><p>Hello</p></body></html>";
        let snapshot = PageSnapshot::from_html(html, "https://example.com");
        assert!(snapshot.explicit_total_text.is_none());
        assert!(snapshot.explicit_total_currency.is_none());
        assert!(snapshot.structured_data_blocks.is_empty());
    }

    #[test]
    fn test_hostname_of() {
        assert_eq!(hostname_of("https://www.example.co.uk/cart?x=1"), "www.example.co.uk");
        assert_eq!(hostname_of("example.com"), "example.com");
        assert_eq!(hostname_of("localhost:8000"), "localhost");
        assert_eq!(hostname_of("HTTPS://Shop.Example.com"), "shop.example.com");
    }

    #[test]
    fn test_snapshot_json_roundtrip_with_missing_fields() {
        let snapshot: PageSnapshot =
            serde_json::from_str(r#"{"hostname": "example.com", "title": "Example"}"#).unwrap();
        assert_eq!(snapshot, PageSnapshot::new("example.com").with_title("Example"));
    }
}
