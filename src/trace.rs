//! End-to-end tracing of a post URL: resolve the original, then summarize its
//! author.

use std::sync::Arc;

use log::info;
use serde::Serialize;

use crate::config::{ServiceSettings, TwitterConfig};
use crate::error::SourceError;
use crate::nlp::{HttpNlpClient, KeywordSentimentExtractor, PosTagger, SentimentScorer};
use crate::source::{OriginalSourceResolver, Resolution};
use crate::summary::{AggregationLimits, TimelineSemanticAggregator, UserSummary};
use crate::twitter::{parse_status_url, Post, TwitterApi, XApiClient};

/// Everything one trace produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceReport {
    pub input: Post,
    pub resolution: Resolution,
    /// Web URL of the original, when there is one.
    pub original_url: Option<String>,
    /// Summary of the original's author; absent when nothing could be searched.
    pub summary: Option<UserSummary>,
}

/// Holds the injected services for tracing. Cheap to clone.
#[derive(Clone)]
pub struct SourceTracer {
    api: Arc<dyn TwitterApi>,
    scorer: Arc<dyn SentimentScorer>,
    tagger: Arc<dyn PosTagger>,
    limits: AggregationLimits,
}

impl SourceTracer {
    pub fn new(
        api: Arc<dyn TwitterApi>,
        scorer: Arc<dyn SentimentScorer>,
        tagger: Arc<dyn PosTagger>,
        limits: AggregationLimits,
    ) -> Self {
        SourceTracer {
            api,
            scorer,
            tagger,
            limits,
        }
    }

    /// Wires the production clients: the X API v1.1 client and one NLP service
    /// client acting as both scorer and tagger.
    pub fn from_settings(config: TwitterConfig, settings: &ServiceSettings) -> Self {
        let api = Arc::new(XApiClient::new(config, settings.api_base_url.clone()));
        let nlp = Arc::new(HttpNlpClient::new(settings.nlp_service_url.clone()));
        SourceTracer::new(api, nlp.clone(), nlp, settings.limits)
    }

    /// Traces the post at `post_url`.
    ///
    /// # Returns
    ///
    /// - `Ok(TraceReport)`: The resolution and, when an original exists, its
    ///   author's summary
    /// - `Err(SourceError)`: Invalid URL, missing post or user, or an upstream
    ///   API or NLP failure
    pub async fn trace(&self, post_url: &str) -> Result<TraceReport, SourceError> {
        let id = parse_status_url(post_url)?;
        info!("Tracing source of post {}", id);

        let input = self.api.get_status(id).await?;
        let resolution = OriginalSourceResolver::new(self.api.as_ref())
            .resolve(input.clone())
            .await?;

        let summary = match resolution.original() {
            Some(original) => {
                let extractor =
                    KeywordSentimentExtractor::new(self.scorer.as_ref(), self.tagger.as_ref());
                let aggregator =
                    TimelineSemanticAggregator::new(self.api.as_ref(), extractor, self.limits);
                Some(aggregator.aggregate(&original.author_id).await?)
            }
            None => None,
        };

        Ok(TraceReport {
            original_url: resolution.original().map(Post::url),
            input,
            resolution,
            summary,
        })
    }
}
