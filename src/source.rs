//! Original source resolution.
//!
//! Searches for older posts sharing a post's hashtags (or, failing that, its
//! links) and picks the oldest one the search can reach.

use log::{info, warn};
use serde::Serialize;

use crate::error::SourceError;
use crate::twitter::{Post, SearchPage, SearchPager, SearchQuery, TwitterApi};

/// Outcome of a resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "post", rename_all = "snake_case")]
pub enum Resolution {
    /// The oldest matching post the search reached, re-fetched in full.
    Found(Post),
    /// The search found nothing; the (normalized) input is its own original.
    NoEarlierMatch(Post),
    /// The post has neither hashtags nor links, so there was nothing to search.
    NoSignal,
}

impl Resolution {
    /// The post considered the original, if any.
    pub fn original(&self) -> Option<&Post> {
        match self {
            Resolution::Found(post) | Resolution::NoEarlierMatch(post) => Some(post),
            Resolution::NoSignal => None,
        }
    }

    pub fn into_original(self) -> Option<Post> {
        match self {
            Resolution::Found(post) | Resolution::NoEarlierMatch(post) => Some(post),
            Resolution::NoSignal => None,
        }
    }
}

pub struct OriginalSourceResolver<'a> {
    api: &'a dyn TwitterApi,
    pager: SearchPager<'a>,
}

impl<'a> OriginalSourceResolver<'a> {
    pub fn new(api: &'a dyn TwitterApi) -> Self {
        OriginalSourceResolver {
            api,
            pager: SearchPager::new(api),
        }
    }

    /// Resolves the original source of `post`.
    ///
    /// Pages backwards through the search results while pages come back full. A
    /// full page followed by an empty one ends the walk on the full page. The
    /// oldest post of the last page reached is the answer.
    ///
    /// # Returns
    ///
    /// - `Ok(Resolution::Found(_))`: An older matching post was found
    /// - `Ok(Resolution::NoEarlierMatch(_))`: The search returned nothing
    /// - `Ok(Resolution::NoSignal)`: The post has no hashtags and no links
    /// - `Err(SourceError)`: A search page or the final re-fetch failed
    pub async fn resolve(&self, post: Post) -> Result<Resolution, SourceError> {
        let post = post.normalized();

        let query = match SearchQuery::for_post(&post) {
            Some(query) => query,
            None => {
                info!("Post {} has no hashtags or links to search for", post.id);
                return Ok(Resolution::NoSignal);
            }
        };
        info!(
            "Resolving original of post {} with query '{}'",
            post.id,
            query.to_query_string()
        );

        let final_page = self.walk_pages(&query).await?;

        match final_page.oldest() {
            None => {
                info!("No earlier match for post {}", post.id);
                Ok(Resolution::NoEarlierMatch(post))
            }
            Some(oldest) => {
                info!("Oldest match for post {} is {}", post.id, oldest.id);
                let original = self.api.get_status(oldest.id).await?;
                Ok(Resolution::Found(original.normalized()))
            }
        }
    }

    /// Walks back through search pages and returns the last one worth keeping.
    async fn walk_pages(&self, query: &SearchQuery) -> Result<SearchPage, SourceError> {
        let mut current = self.pager.fetch_page(query).await?;
        let mut pages = 1;

        while current.is_full() {
            // Cursor invariant: the oldest post seen so far ends the current page.
            let cursor = match current.oldest() {
                Some(oldest) => oldest.id,
                None => break,
            };

            let next = self.pager.fetch_page(&query.before(cursor)).await?;
            pages += 1;

            if next.is_empty() {
                break;
            }

            let progressed = next.oldest().is_some_and(|oldest| oldest.id < cursor);
            if !progressed {
                warn!(
                    "Search cursor did not move past {}; stopping after {} pages",
                    cursor, pages
                );
                break;
            }

            current = next;
        }

        info!(
            "Search finished after {} pages, final page holds {} posts",
            pages,
            current.len()
        );
        Ok(current)
    }
}
