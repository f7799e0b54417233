//! X/Twitter API integration module.
//!
//! This module contains the post and user types, the API seam and its v1.1
//! client, post URL parsing, single-page search, timeline pagination and the
//! oEmbed helper used for display.

mod api;
mod embed;
mod models;
mod parsing;
mod search;
mod timeline;

pub use api::{TwitterApi, XApiClient};
pub use embed::{Embedder, OEmbedClient, EMBED_NOT_FOUND};
pub use models::{Post, PostId, UserProfile};
pub use parsing::parse_status_url;
pub use search::{SearchPage, SearchPager, SearchQuery, SearchTerms, SEARCH_PAGE_LIMIT};
pub use timeline::{TimelineFetcher, DEFAULT_TIMELINE_PAGES, DEFAULT_TIMELINE_PAGE_SIZE};

// Crate-internal re-exports
pub(crate) use api::sanitize_for_logging;
// Used by tests
#[allow(unused_imports)]
pub(crate) use api::refreshed_token;
#[allow(unused_imports)]
pub(crate) use models::{parse_v1_timestamp, RawStatus};
