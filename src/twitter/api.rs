//! Core X API access.
//!
//! This module defines the [`TwitterApi`] seam used by the resolver, timeline
//! fetcher and aggregator, and its production implementation [`XApiClient`] over
//! the v1.1 REST endpoints, including automatic token refresh on 401 errors.

use async_trait::async_trait;
use log::{debug, error, info, warn};
use reqwest::Client;
use tokio::sync::Mutex;

use super::models::{Post, PostId, RawSearchResponse, RawStatus, RawUser, UserProfile};
use super::search::{SearchQuery, SEARCH_PAGE_LIMIT};
use crate::config::TwitterConfig;
use crate::error::SourceError;
use crate::oauth::build_oauth2_user_context_header;

/// Sanitizes text for safe logging by truncating and escaping control characters.
///
/// This function:
/// - Truncates long text to prevent log flooding
/// - Replaces control characters that could manipulate log output
/// - Escapes newlines to prevent log injection
///
/// # Parameters
///
/// - `text`: The text to sanitize
/// - `max_chars`: Maximum number of characters before truncation
///
/// # Returns
///
/// A sanitized string safe for logging
pub(crate) fn sanitize_for_logging(text: &str, max_chars: usize) -> String {
    let sanitized: String = text
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            c if c.is_control() => '?',
            c => c,
        })
        .collect();

    if sanitized.chars().count() > max_chars {
        let head: String = sanitized.chars().take(max_chars).collect();
        format!("{}... [truncated, {} total bytes]", head, text.len())
    } else {
        sanitized
    }
}

/// Read access to posts, search, timelines and profiles.
///
/// All results are raw: retweet wrappers are returned as wrappers, and callers
/// normalize them.
#[async_trait]
pub trait TwitterApi: Send + Sync {
    /// Fetches one post by id. Missing or inaccessible posts yield
    /// [`SourceError::PostNotFound`].
    async fn get_status(&self, id: PostId) -> Result<Post, SourceError>;

    /// Runs one page of a search (at most [`SEARCH_PAGE_LIMIT`] posts).
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Post>, SourceError>;

    /// Fetches up to `page_size` posts of a user, newest first, strictly older than
    /// `before` when given.
    async fn user_timeline(
        &self,
        user_id: &str,
        before: Option<PostId>,
        page_size: usize,
    ) -> Result<Vec<Post>, SourceError>;

    /// Fetches a user's profile fields.
    async fn get_user(&self, user_id: &str) -> Result<UserProfile, SourceError>;
}

/// Sends one GET with `access_token` as the Bearer token.
async fn send_with_token(
    client: &Client,
    url: &str,
    access_token: &str,
) -> Result<reqwest::Response, SourceError> {
    Ok(client
        .get(url)
        .header("Authorization", build_oauth2_user_context_header(access_token))
        .send()
        .await?)
}

/// Sends a GET to the X API, refreshing the access token once on a 401.
///
/// The credential lock is held only to read the token and, after a 401, to
/// replace it. Requests themselves run unlocked, so concurrent callers sharing
/// one client are not serialized. When another caller has already replaced the
/// token that got the 401, the new token is reused without a second refresh.
///
/// # Parameters
///
/// - `client`: The shared HTTP client
/// - `config`: The shared credentials (the token may be replaced)
/// - `url`: Fully built request URL
/// - `operation_name`: Human-readable name for the operation (for logging)
///
/// # Returns
///
/// - `Ok(String)`: The API response body on success
/// - `Err(SourceError)`: If the request fails or token refresh fails
pub(crate) async fn make_authenticated_request(
    client: &Client,
    config: &Mutex<TwitterConfig>,
    url: &str,
    operation_name: &str,
) -> Result<String, SourceError> {
    info!(
        "Making authenticated request for operation: {}",
        operation_name
    );
    debug!("Request URL: {}", url);

    let access_token = config.lock().await.access_token.clone();
    let response = send_with_token(client, url, &access_token).await?;

    let status = response.status();
    debug!(
        "Received response with status: {} for operation: {}",
        status, operation_name
    );

    if status.is_success() {
        let response_text = response.text().await?;
        debug!(
            "Response summary for '{}': {} bytes received",
            operation_name,
            response_text.len()
        );
        return Ok(response_text);
    }

    if status == reqwest::StatusCode::UNAUTHORIZED {
        if let Some(fresh_token) = refreshed_token(config, &access_token, operation_name).await? {
            info!("Retrying operation '{}' with refreshed token", operation_name);
            let retry_response = send_with_token(client, url, &fresh_token).await?;

            let retry_status = retry_response.status();
            if retry_status.is_success() {
                info!(
                    "Operation '{}' completed successfully after token refresh",
                    operation_name
                );
                return Ok(retry_response.text().await?);
            }

            let error_text = retry_response.text().await?;
            error!(
                "Operation '{}' failed after token refresh - Status: {}",
                operation_name, retry_status
            );
            debug!(
                "Error response for '{}': {}",
                operation_name,
                sanitize_for_logging(&error_text, 200)
            );
            return Err(SourceError::Api {
                operation: operation_name.to_string(),
                status: retry_status.as_u16(),
            });
        }
    }

    let error_text = response.text().await?;
    error!("Operation '{}' failed - Status: {}", operation_name, status);
    debug!(
        "Error response for '{}': {}",
        operation_name,
        sanitize_for_logging(&error_text, 200)
    );
    Err(SourceError::Api {
        operation: operation_name.to_string(),
        status: status.as_u16(),
    })
}

/// Returns a token to retry with after `rejected_token` got a 401, or `None`
/// when refreshing is not configured.
pub(crate) async fn refreshed_token(
    config: &Mutex<TwitterConfig>,
    rejected_token: &str,
    operation_name: &str,
) -> Result<Option<String>, SourceError> {
    let mut config = config.lock().await;
    if !config.can_refresh_token() {
        return Ok(None);
    }

    if config.access_token != rejected_token {
        debug!(
            "Token was already refreshed by another request, reusing it for '{}'",
            operation_name
        );
        return Ok(Some(config.access_token.clone()));
    }

    warn!(
        "Received 401 Unauthorized for operation '{}' - attempting token refresh",
        operation_name
    );
    config
        .refresh_access_token()
        .await
        .map_err(|e| SourceError::Auth(e.to_string()))?;
    Ok(Some(config.access_token.clone()))
}

/// Status codes the v1.1 API uses for deleted, unknown, protected or suspended
/// content.
fn is_missing_status(err: &SourceError) -> bool {
    matches!(err, SourceError::Api { status, .. } if *status == 404 || *status == 403)
}

/// [`TwitterApi`] over the X API v1.1 REST endpoints.
pub struct XApiClient {
    client: Client,
    base_url: String,
    config: Mutex<TwitterConfig>,
}

impl XApiClient {
    /// Creates a client for `base_url` (for example `https://api.x.com/1.1`).
    pub fn new(config: TwitterConfig, base_url: impl Into<String>) -> Self {
        XApiClient {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            config: Mutex::new(config),
        }
    }

    fn build_url(&self, path: &str, params: &[(&str, String)]) -> Result<String, SourceError> {
        let query = serde_urlencoded::to_string(params)?;
        Ok(format!("{}/{}?{}", self.base_url, path, query))
    }

    async fn get(
        &self,
        path: &str,
        params: &[(&str, String)],
        operation_name: &str,
    ) -> Result<String, SourceError> {
        let url = self.build_url(path, params)?;
        make_authenticated_request(&self.client, &self.config, &url, operation_name).await
    }

    fn decode_statuses(raw: Vec<RawStatus>) -> Result<Vec<Post>, SourceError> {
        raw.into_iter().map(Post::try_from).collect()
    }
}

#[async_trait]
impl TwitterApi for XApiClient {
    async fn get_status(&self, id: PostId) -> Result<Post, SourceError> {
        info!("Fetching post {}", id);
        let params = [
            ("id", id.to_string()),
            ("tweet_mode", "extended".to_string()),
            ("include_entities", "true".to_string()),
        ];

        let body = match self.get("statuses/show.json", &params, "get_status").await {
            Ok(body) => body,
            Err(e) if is_missing_status(&e) => {
                warn!("Post {} not found: {}", id, e);
                return Err(SourceError::PostNotFound(id));
            }
            Err(e) => return Err(e),
        };

        let raw: RawStatus = serde_json::from_str(&body)?;
        Post::try_from(raw)
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Post>, SourceError> {
        let mut params = vec![
            ("q", query.to_query_string()),
            ("result_type", query.result_type().to_string()),
            ("count", SEARCH_PAGE_LIMIT.to_string()),
            ("tweet_mode", "extended".to_string()),
            ("include_entities", "true".to_string()),
        ];
        if let Some(max_id) = query.max_id() {
            params.push(("max_id", max_id.to_string()));
        }

        let body = self.get("search/tweets.json", &params, "search").await?;
        let response: RawSearchResponse = serde_json::from_str(&body)?;
        Self::decode_statuses(response.statuses)
    }

    async fn user_timeline(
        &self,
        user_id: &str,
        before: Option<PostId>,
        page_size: usize,
    ) -> Result<Vec<Post>, SourceError> {
        let mut params = vec![
            ("user_id", user_id.to_string()),
            ("count", page_size.to_string()),
            ("tweet_mode", "extended".to_string()),
            ("include_rts", "true".to_string()),
        ];
        // max_id is inclusive on this endpoint.
        if let Some(before) = before {
            params.push(("max_id", before.0.saturating_sub(1).to_string()));
        }

        let body = match self
            .get("statuses/user_timeline.json", &params, "user_timeline")
            .await
        {
            Ok(body) => body,
            Err(e) if is_missing_status(&e) => {
                warn!("Timeline of user {} not accessible: {}", user_id, e);
                return Err(SourceError::UserNotFound(user_id.to_string()));
            }
            Err(e) => return Err(e),
        };

        let raw: Vec<RawStatus> = serde_json::from_str(&body)?;
        Self::decode_statuses(raw)
    }

    async fn get_user(&self, user_id: &str) -> Result<UserProfile, SourceError> {
        info!("Looking up user {}", user_id);
        let params = [
            ("user_id", user_id.to_string()),
            ("include_entities", "false".to_string()),
        ];

        let body = match self.get("users/show.json", &params, "get_user").await {
            Ok(body) => body,
            Err(e) if is_missing_status(&e) => {
                warn!("User {} not found: {}", user_id, e);
                return Err(SourceError::UserNotFound(user_id.to_string()));
            }
            Err(e) => return Err(e),
        };

        let raw: RawUser = serde_json::from_str(&body)?;
        Ok(UserProfile::from(raw))
    }
}
