//! Plain HTTP page fetcher that reduces HTML to readable text

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::agents::error::{BackendError, BackendResult};
use crate::domain::{BrowsePort, WebPage};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// [`BrowsePort`] that issues a single GET with a desktop user agent
pub struct HttpPageFetcher {
    client: Client,
    hidden: Regex,
    comment: Regex,
    tag: Regex,
    title: Regex,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration) -> BackendResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Request(e.to_string()))?;

        Ok(Self {
            client,
            hidden: pattern(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")?,
            comment: pattern(r"(?s)<!--.*?-->")?,
            tag: pattern(r"(?s)<[^>]*>")?,
            title: pattern(r"(?is)<title\b[^>]*>(.*?)</title\s*>")?,
        })
    }

    /// Visible text: scripts and styles dropped, one trimmed text run per line
    fn extract_text(&self, html: &str) -> String {
        let visible = self.hidden.replace_all(html, "");
        let visible = self.comment.replace_all(&visible, "");

        self.tag
            .split(&visible)
            .map(|run| decode_entities(run.trim()))
            .map(|run| run.trim().to_string())
            .filter(|run| !run.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn extract_title(&self, html: &str) -> Option<String> {
        let visible = self.hidden.replace_all(html, "");
        self.title
            .captures(&visible)
            .and_then(|captures| captures.get(1))
            .map(|m| decode_entities(m.as_str().trim()))
    }
}

fn pattern(source: &str) -> BackendResult<Regex> {
    Regex::new(source).map_err(|e| BackendError::Parse(e.to_string()))
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

#[async_trait]
impl BrowsePort for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> BackendResult<WebPage> {
        debug!(url = %url, "fetching page");

        let response = self.client.get(url).send().await?.error_for_status()?;
        let status_code = response.status().as_u16();
        let html = response
            .text()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        Ok(WebPage {
            url: url.to_string(),
            status_code,
            text: self.extract_text(&html),
            title: self.extract_title(&html),
            html,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <title>Northwind &amp; Co</title>
    <style>body { color: red; }</style>
    <script type="text/javascript">var tracking = "<b>no</b>";</script>
  </head>
  <body>
    <!-- hero -->
    <h1>Northwind</h1>
    <p>We are   hiring <b>SOC analysts</b>.</p>
    <SCRIPT>alert(1)</SCRIPT>
  </body>
</html>"#;

    fn fetcher() -> HttpPageFetcher {
        HttpPageFetcher::new(Duration::from_secs(10)).unwrap()
    }

    #[test]
    fn test_text_drops_scripts_styles_and_markup() {
        let text = fetcher().extract_text(PAGE);
        assert_eq!(
            text,
            "Northwind & Co\nNorthwind\nWe are   hiring\nSOC analysts\n."
        );
    }

    #[test]
    fn test_title_is_decoded() {
        assert_eq!(fetcher().extract_title(PAGE).as_deref(), Some("Northwind & Co"));
        assert_eq!(fetcher().extract_title("<p>untitled</p>"), None);
    }
}
