use std::io::Read;
use std::path::Path;
use std::time::Duration;

use once_cell::sync::Lazy;
use ureq::ResponseExt;

use crate::error::{LensError, Result};
use crate::snapshot::PageSnapshot;

/// Default HTTP request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Shared HTTP agent for page downloads
static HTTP_AGENT: Lazy<ureq::Agent> = Lazy::new(|| {
    ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)))
        .build()
        .into()
});

/// Raw page content and where it came from
#[derive(Debug, Clone)]
pub struct PageContent {
    /// Final URL after redirects (or the caller-supplied page URL)
    pub url: String,
    /// Raw HTML, or snapshot JSON when read as a snapshot
    pub body: String,
}

/// Where a page is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    Url(String),
    File(String),
    Stdin,
}

impl PageSource {
    /// `-` is stdin, http(s) URLs are fetched, anything else is a file path
    pub fn parse(input: &str) -> Self {
        if input == "-" {
            PageSource::Stdin
        } else if input.starts_with("http://") || input.starts_with("https://") {
            PageSource::Url(input.to_string())
        } else {
            PageSource::File(input.to_string())
        }
    }
}

/// Read a page; `page_url` overrides the URL used for the hostname
pub fn read_page(source: &PageSource, page_url: Option<&str>) -> Result<PageContent> {
    let mut content = match source {
        PageSource::Url(url) => fetch_http(url)?,
        PageSource::File(path) => PageContent {
            url: String::new(),
            body: std::fs::read_to_string(Path::new(path))?,
        },
        PageSource::Stdin => {
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body)?;
            PageContent {
                url: String::new(),
                body,
            }
        }
    };

    if let Some(url) = page_url {
        content.url = url.to_string();
    }
    Ok(content)
}

/// Turn page content into a snapshot, either by parsing HTML or by reading
/// a snapshot captured elsewhere as JSON
pub fn snapshot_of(content: &PageContent, as_snapshot_json: bool) -> Result<PageSnapshot> {
    if as_snapshot_json {
        let mut snapshot: PageSnapshot = serde_json::from_str(&content.body)?;
        if snapshot.hostname.is_empty() && !content.url.is_empty() {
            snapshot.hostname = crate::snapshot::hostname_of(&content.url);
        }
        return Ok(snapshot);
    }

    if content.url.is_empty() {
        return Err(LensError::ConfigError(
            "Page URL unknown: pass --url so the hostname can be determined".into(),
        ));
    }
    Ok(PageSnapshot::from_html(&content.body, &content.url))
}

/// Fetch using HTTP (ureq)
fn fetch_http(url: &str) -> Result<PageContent> {
    let response = HTTP_AGENT
        .get(url)
        .header(
            "User-Agent",
            "Mozilla/5.0 (compatible; merchant-lens/0.1)",
        )
        .call()?;
    let final_url = response.get_uri().to_string();
    let body = response.into_body().read_to_string()?;

    Ok(PageContent {
        url: final_url,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_source_parse() {
        assert_eq!(PageSource::parse("-"), PageSource::Stdin);
        assert_eq!(
            PageSource::parse("https://shop.example.com/cart"),
            PageSource::Url("https://shop.example.com/cart".into())
        );
        assert_eq!(PageSource::parse("page.html"), PageSource::File("page.html".into()));
    }

    #[test]
    fn test_read_file_with_url_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<html><body>Total: $9.99</body></html>").unwrap();

        let source = PageSource::File(path.to_string_lossy().to_string());
        let content = read_page(&source, Some("https://www.acme.co.uk/checkout")).unwrap();
        let snapshot = snapshot_of(&content, false).unwrap();
        assert_eq!(snapshot.hostname, "www.acme.co.uk");
        assert_eq!(snapshot.body_text, "Total: $9.99");
    }

    #[test]
    fn test_html_without_url_is_rejected() {
        let content = PageContent {
            url: String::new(),
            body: "<html></html>".into(),
        };
        assert!(snapshot_of(&content, false).is_err());
    }

    #[test]
    fn test_snapshot_json_takes_hostname_from_url() {
        let content = PageContent {
            url: "https://open.spotify.com/".into(),
            body: r#"{"title": "Spotify - Web Player"}"#.into(),
        };
        let snapshot = snapshot_of(&content, true).unwrap();
        assert_eq!(snapshot.hostname, "open.spotify.com");
        assert_eq!(snapshot.title, "Spotify - Web Player");
    }
}
