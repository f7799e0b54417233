//! Display-only embed HTML via the public oEmbed endpoint.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;

/// Returned whenever the embed cannot be fetched.
pub const EMBED_NOT_FOUND: &str = "<p>Tweet not found</p>";

const OEMBED_URL: &str = "https://publish.twitter.com/oembed";

/// Renders a post URL as embeddable HTML. Never fails; falls back to
/// [`EMBED_NOT_FOUND`].
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed_html(&self, post_url: &str) -> String;
}

pub struct OEmbedClient {
    client: Client,
}

impl OEmbedClient {
    pub fn new() -> Self {
        OEmbedClient {
            client: Client::new(),
        }
    }

    async fn fetch(
        &self,
        post_url: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let query = serde_urlencoded::to_string([("url", post_url), ("omit_script", "true")])?;
        let response = self
            .client
            .get(format!("{}?{}", OEMBED_URL, query))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(format!("oEmbed returned {}", response.status()).into());
        }

        let json: serde_json::Value = response.json().await?;
        json.get("html")
            .and_then(|v| v.as_str())
            .map(String::from)
            .ok_or_else(|| "oEmbed response has no html field".into())
    }
}

impl Default for OEmbedClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for OEmbedClient {
    async fn embed_html(&self, post_url: &str) -> String {
        match self.fetch(post_url).await {
            Ok(html) => {
                debug!("Fetched embed for {} ({} bytes)", post_url, html.len());
                html
            }
            Err(e) => {
                warn!("Failed to fetch embed for {}: {}", post_url, e);
                EMBED_NOT_FOUND.to_string()
            }
        }
    }
}
