//! # Sourcetrace Library
//!
//! Traces an X/Twitter post back to the earliest post the search API can reach
//! that shares its hashtags or links, then summarizes the source author's recent
//! posts as a ranked list of topical words with their average sentiment.
//!
//! ## Pipeline
//!
//! - [`twitter::parse_status_url`] turns the submitted URL into a post id
//! - [`source::OriginalSourceResolver`] pages backwards through search results
//!   and picks the oldest match
//! - [`twitter::TimelineFetcher`] pulls a bounded window of the author's posts
//! - [`nlp::KeywordSentimentExtractor`] scores each post and keeps its nouns
//! - [`summary::TimelineSemanticAggregator`] folds everything into ranked
//!   [`summary::WordStat`]s
//!
//! ## Configuration
//!
//! - `xapi_access_token`: Bearer token for the X API (required)
//! - `xapi_refresh_token`, `xapi_client_id`, `xapi_client_secret`: Optional token refresh
//! - `XAPI_BASE_URL`, `NLP_SERVICE_URL`: Upstream endpoints
//! - `SOURCE_TIMELINE_PAGES`, `SOURCE_TIMELINE_PAGE_SIZE`, `SOURCE_TOP_WORDS`: Limits
//! - `PORT`: Server port (defaults to 3000)
//!
//! ## API Endpoints
//!
//! - `GET /`: URL form
//! - `POST /`: Traces the submitted URL and renders the result
//! - `GET /api/source?url=...`: JSON trace report
//! - `GET /health`: Returns service health status

pub mod config;
pub mod error;
pub mod handlers;
pub mod nlp;
pub mod oauth;
pub mod source;
pub mod summary;
pub mod trace;
pub mod twitter;

// Re-export commonly used types and functions
pub use config::{get_server_port, ServiceSettings, TwitterConfig};
pub use error::SourceError;
pub use handlers::{router, AppState};
pub use oauth::build_oauth2_user_context_header;
pub use source::{OriginalSourceResolver, Resolution};
pub use summary::{TimelineSemanticAggregator, UserSummary, WordStat};
pub use trace::{SourceTracer, TraceReport};
