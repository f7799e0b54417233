//! Search queries and single-page search fetching.
//!
//! Pagination is left to callers; see [`crate::source::OriginalSourceResolver`].

use log::{debug, info, warn};

use super::api::TwitterApi;
use super::models::{Post, PostId};
use crate::error::SourceError;

/// Most posts the search endpoint returns per page.
pub const SEARCH_PAGE_LIMIT: usize = 100;

/// The searchable signal of a post. Hashtags and URLs are never mixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTerms {
    Hashtags(Vec<String>),
    Urls(Vec<String>),
}

/// A conjunction of terms restricted to recent results, optionally paged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    terms: SearchTerms,
    before: Option<PostId>,
}

impl SearchQuery {
    pub fn new(terms: SearchTerms) -> Self {
        SearchQuery {
            terms,
            before: None,
        }
    }

    /// Builds the query for a post: its hashtags if it has any, otherwise its
    /// expanded URLs. `None` when the post carries neither.
    pub fn for_post(post: &Post) -> Option<Self> {
        if !post.hashtags.is_empty() {
            Some(Self::new(SearchTerms::Hashtags(post.hashtags.clone())))
        } else if !post.urls.is_empty() {
            Some(Self::new(SearchTerms::Urls(post.urls.clone())))
        } else {
            None
        }
    }

    /// The same query restricted to posts strictly older than `cursor`.
    pub fn before(&self, cursor: PostId) -> Self {
        SearchQuery {
            terms: self.terms.clone(),
            before: Some(cursor),
        }
    }

    pub fn terms(&self) -> &SearchTerms {
        &self.terms
    }

    pub fn cursor(&self) -> Option<PostId> {
        self.before
    }

    pub fn result_type(&self) -> &'static str {
        "recent"
    }

    /// Inclusive `max_id` equivalent of the exclusive cursor.
    pub fn max_id(&self) -> Option<u64> {
        self.before.map(|id| id.0.saturating_sub(1))
    }

    /// Renders the terms in search syntax, e.g. `#tech #ai` or
    /// `url:http%3A%2F%2Fexample.com%2Fx`. Space-separated terms are conjoined.
    pub fn to_query_string(&self) -> String {
        match &self.terms {
            SearchTerms::Hashtags(tags) => tags
                .iter()
                .map(|tag| format!("#{}", tag.trim_start_matches('#')))
                .collect::<Vec<_>>()
                .join(" "),
            SearchTerms::Urls(urls) => urls
                .iter()
                .map(|url| format!("url:{}", urlencoding::encode(url)))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// One page of normalized results, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    posts: Vec<Post>,
}

impl SearchPage {
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.posts.len() == SEARCH_PAGE_LIMIT
    }

    /// Last element, which is the oldest post of the page.
    pub fn oldest(&self) -> Option<&Post> {
        self.posts.last()
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn into_posts(self) -> Vec<Post> {
        self.posts
    }
}

/// Fetches single search pages and puts them in canonical form.
pub struct SearchPager<'a> {
    api: &'a dyn TwitterApi,
}

impl<'a> SearchPager<'a> {
    pub fn new(api: &'a dyn TwitterApi) -> Self {
        SearchPager { api }
    }

    /// Runs `query`, collapses retweets to their originals and sorts the result by
    /// creation time, newest first. Posts sharing a timestamp keep the order the API
    /// returned them in.
    pub async fn fetch_page(&self, query: &SearchQuery) -> Result<SearchPage, SourceError> {
        debug!(
            "Searching '{}' (cursor: {:?})",
            query.to_query_string(),
            query.cursor()
        );

        let raw = self.api.search(query).await?;
        let mut posts: Vec<Post> = raw.into_iter().map(Post::normalized).collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        if posts.len() > SEARCH_PAGE_LIMIT {
            warn!(
                "Search returned {} posts, more than the page limit of {}; truncating",
                posts.len(),
                SEARCH_PAGE_LIMIT
            );
            posts.truncate(SEARCH_PAGE_LIMIT);
        }

        info!("Search page holds {} posts", posts.len());
        Ok(SearchPage { posts })
    }
}
