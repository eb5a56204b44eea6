//! Search + scrape client.
//!
//! Queries the DuckDuckGo instant-answer index, then optionally fetches the
//! top result page and extracts its visible text. Scraped text is hard-capped
//! so a long article cannot flood the context block, and all fetches go out
//! under the crate's fixed client identity string.

use async_trait::async_trait;
use deskmate_core::collaborator::SearchClient;
use deskmate_core::error::CollaboratorError;
use serde::Deserialize;
use tracing::{debug, warn};

/// Web search client backed by the DuckDuckGo instant-answer API.
pub struct WebSearchClient {
    api_url: String,
    max_fetch_chars: usize,
    fetch_top_result: bool,
    client: reqwest::Client,
}

impl WebSearchClient {
    pub fn new(max_fetch_chars: usize, fetch_top_result: bool) -> Self {
        Self {
            api_url: "https://api.duckduckgo.com".into(),
            max_fetch_chars,
            fetch_top_result,
            client: crate::http_client(20),
        }
    }

    /// Override the index endpoint (for tests and self-hosted proxies).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Fetch a result page and extract its visible text, capped.
    async fn fetch_page_text(&self, url: &str) -> Result<String, CollaboratorError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CollaboratorError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CollaboratorError::Unavailable(format!(
                "Result page returned status {}",
                response.status().as_u16()
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| CollaboratorError::Network(e.to_string()))?;

        Ok(truncate_content(
            &extract_text_from_html(&html),
            self.max_fetch_chars,
        ))
    }
}

#[async_trait]
impl SearchClient for WebSearchClient {
    async fn search(&self, query: &str) -> Result<String, CollaboratorError> {
        let url = format!(
            "{}/?q={}&format=json&no_html=1",
            self.api_url,
            urlencode(query)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CollaboratorError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CollaboratorError::Unavailable(format!(
                "Search index returned status {}",
                response.status().as_u16()
            )));
        }

        let answer: InstantAnswer = response
            .json()
            .await
            .map_err(|e| CollaboratorError::Parse(e.to_string()))?;

        let (snippet, source_url) = answer.best_hit();
        if snippet.is_empty() && source_url.is_empty() {
            return Ok(format!("No results found for \"{query}\"."));
        }

        let mut rendered = String::new();
        if !source_url.is_empty() {
            rendered.push_str(&format!("SOURCE: {source_url}\n"));
        }
        rendered.push_str(&format!("CONTENT: {snippet}"));

        // Enrich with the page body when configured and a URL exists.
        if self.fetch_top_result && !source_url.is_empty() {
            match self.fetch_page_text(&source_url).await {
                Ok(page_text) if !page_text.is_empty() => {
                    debug!(url = %source_url, chars = page_text.len(), "Scraped top result");
                    rendered.push_str(&format!("\nPAGE TEXT: {page_text}"));
                }
                Ok(_) => {}
                Err(e) => {
                    // The index snippet is still a usable answer.
                    warn!(url = %source_url, error = %e, "Top-result fetch failed, keeping snippet");
                }
            }
        }

        Ok(truncate_content(&rendered, self.max_fetch_chars))
    }
}

// --- Wire types ---

#[derive(Debug, Deserialize)]
struct InstantAnswer {
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Deserialize)]
struct RelatedTopic {
    #[serde(rename = "Text", default)]
    text: String,
    #[serde(rename = "FirstURL", default)]
    first_url: String,
}

impl InstantAnswer {
    /// The abstract when present, else the first related topic.
    fn best_hit(&self) -> (String, String) {
        if !self.abstract_text.is_empty() {
            return (self.abstract_text.clone(), self.abstract_url.clone());
        }
        self.related_topics
            .iter()
            .find(|t| !t.text.is_empty())
            .map(|t| (t.text.clone(), t.first_url.clone()))
            .unwrap_or_default()
    }
}

// --- Helpers ---

/// Extract visible text content from HTML.
fn extract_text_from_html(html: &str) -> String {
    let document = scraper::Html::parse_document(html);

    document
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate content to a maximum length at a word boundary.
fn truncate_content(content: &str, max_len: usize) -> String {
    if content.len() <= max_len {
        return content.to_string();
    }

    let mut end = max_len;
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    let truncated = &content[..end];
    if let Some(last_space) = truncated.rfind(' ') {
        format!("{}...", &truncated[..last_space])
    } else {
        format!("{truncated}...")
    }
}

fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' | '~' => out.push(c),
            ' ' => out.push('+'),
            _ => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    out.push_str(&format!("%{byte:02X}"));
                }
            }
        }
    }
    out
}
