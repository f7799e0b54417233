//! Natural-language services consumed by the keyword extraction.
//!
//! Sentiment scoring and part-of-speech tagging are external capabilities. The
//! traits here are the seams; [`HttpNlpClient`] talks to a remote service that
//! implements both.

mod extract;

pub use extract::{Extraction, KeywordSentimentExtractor};

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// One token and its grammatical tag, e.g. `("rocket", "NN")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedToken {
    pub token: String,
    pub tag: String,
}

impl TaggedToken {
    pub fn new(token: impl Into<String>, tag: impl Into<String>) -> Self {
        TaggedToken {
            token: token.into(),
            tag: tag.into(),
        }
    }
}

/// Scores the overall polarity of a text.
#[async_trait]
pub trait SentimentScorer: Send + Sync {
    /// Compound score in `[-1, 1]`.
    async fn score(&self, text: &str) -> Result<f64, SourceError>;
}

/// Tokenizes a text and tags each token with its part of speech.
#[async_trait]
pub trait PosTagger: Send + Sync {
    async fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, SourceError>;

    /// Whether `tag` marks a common or proper noun.
    ///
    /// The default covers the Penn Treebank tag set (`NN`, `NNS`, `NNP`, `NNPS`).
    /// Taggers with another vocabulary override this.
    fn is_noun_tag(&self, tag: &str) -> bool {
        tag.starts_with("NN")
    }
}

#[derive(Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct SentimentResponse {
    compound: f64,
}

#[derive(Deserialize)]
struct TagResponse {
    tokens: Vec<TaggedToken>,
}

/// Client for an NLP service exposing `POST /sentiment` and `POST /tag`.
///
/// `/sentiment` answers `{"compound": <f64>}` and `/tag` answers
/// `{"tokens": [{"token": "...", "tag": "..."}]}`, both for a `{"text": "..."}`
/// request body.
pub struct HttpNlpClient {
    client: Client,
    base_url: String,
}

impl HttpNlpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpNlpClient {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        text: &str,
    ) -> Result<T, SourceError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("NLP request to {} ({} bytes of text)", url, text.len());

        let response = self
            .client
            .post(&url)
            .json(&TextRequest { text })
            .send()
            .await
            .map_err(|e| SourceError::Nlp(format!("{} request failed: {}", endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            error!("NLP endpoint '{}' failed - Status: {}", endpoint, status);
            return Err(SourceError::Nlp(format!("{} returned {}", endpoint, status)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SourceError::Nlp(format!("{} returned malformed body: {}", endpoint, e)))
    }
}

#[async_trait]
impl SentimentScorer for HttpNlpClient {
    async fn score(&self, text: &str) -> Result<f64, SourceError> {
        let response: SentimentResponse = self.post("sentiment", text).await?;
        Ok(response.compound)
    }
}

#[async_trait]
impl PosTagger for HttpNlpClient {
    async fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, SourceError> {
        let response: TagResponse = self.post("tag", text).await?;
        Ok(response.tokens)
    }
}
