//! Bounded, cursor-paginated fetching of a user's recent posts.

use log::{info, warn};

use super::api::TwitterApi;
use super::models::{Post, PostId};
use crate::error::SourceError;

pub const DEFAULT_TIMELINE_PAGES: usize = 5;
/// Also the largest page the timeline endpoint serves.
pub const DEFAULT_TIMELINE_PAGE_SIZE: usize = 200;

pub struct TimelineFetcher<'a> {
    api: &'a dyn TwitterApi,
}

impl<'a> TimelineFetcher<'a> {
    pub fn new(api: &'a dyn TwitterApi) -> Self {
        TimelineFetcher { api }
    }

    /// Fetches up to `max_pages` pages of `page_size` posts, newest first.
    ///
    /// Every page after the first asks for posts older than the oldest post
    /// fetched so far. Stops early when a page comes back empty. Pages are
    /// concatenated in fetch order without sorting or deduplication, and retweets
    /// are collapsed to their originals.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Post>)`: At most `max_pages * page_size` posts; oversized pages
    ///   are cut to `page_size` before the cursor is taken
    /// - `Err(SourceError)`: If any page request fails
    pub async fn fetch_window(
        &self,
        user_id: &str,
        max_pages: usize,
        page_size: usize,
    ) -> Result<Vec<Post>, SourceError> {
        let mut window = Vec::new();
        // Cursor invariant: id of the oldest raw post fetched so far.
        let mut cursor: Option<PostId> = None;
        let mut page_count = 0;

        while page_count < max_pages {
            let mut page = self.api.user_timeline(user_id, cursor, page_size).await?;
            page_count += 1;

            if page.is_empty() {
                info!(
                    "Timeline of user {} exhausted after {} pages",
                    user_id, page_count
                );
                break;
            }

            if page.len() > page_size {
                warn!(
                    "Timeline page of {} posts exceeds requested size {}; truncating",
                    page.len(),
                    page_size
                );
                page.truncate(page_size);
            }

            // Taken from the raw ids: a retweet's original can be far older than
            // the retweet and would skip part of the timeline.
            let oldest = page.iter().map(|p| p.id).min();
            cursor = match (cursor, oldest) {
                (Some(current), Some(oldest)) => Some(current.min(oldest)),
                (None, oldest) => oldest,
                (current, None) => current,
            };

            window.extend(page.into_iter().map(Post::normalized));
        }

        info!(
            "Fetched {} posts for user {} in {} pages",
            window.len(),
            user_id,
            page_count
        );
        Ok(window)
    }
}
