//! Per-post sentiment and candidate keyword extraction.

use log::debug;

use super::{PosTagger, SentimentScorer};
use crate::error::SourceError;
use crate::twitter::Post;

/// Sentiment of one post and the noun-like tokens found in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub sentiment: f64,
    /// Lowercased, in token order, repeats kept.
    pub candidates: Vec<String>,
}

pub struct KeywordSentimentExtractor<'a> {
    scorer: &'a dyn SentimentScorer,
    tagger: &'a dyn PosTagger,
}

impl<'a> KeywordSentimentExtractor<'a> {
    pub fn new(scorer: &'a dyn SentimentScorer, tagger: &'a dyn PosTagger) -> Self {
        KeywordSentimentExtractor { scorer, tagger }
    }

    /// Scores `post` and collects its noun tokens.
    ///
    /// A score outside `[-1, 1]` is treated as a service failure rather than
    /// clamped.
    pub async fn extract(&self, post: &Post) -> Result<Extraction, SourceError> {
        let sentiment = self.scorer.score(&post.text).await?;
        if !(-1.0..=1.0).contains(&sentiment) {
            return Err(SourceError::Nlp(format!(
                "sentiment score {} for post {} is outside [-1, 1]",
                sentiment, post.id
            )));
        }

        let candidates: Vec<String> = self
            .tagger
            .tag(&post.text)
            .await?
            .into_iter()
            .filter(|t| self.tagger.is_noun_tag(&t.tag))
            .map(|t| t.token.to_lowercase())
            .collect();

        debug!(
            "Post {}: sentiment {:.3}, {} candidate words",
            post.id,
            sentiment,
            candidates.len()
        );
        Ok(Extraction {
            sentiment,
            candidates,
        })
    }
}
