//! Parsing of user-supplied post URLs.

use url::Url;

use super::models::PostId;
use crate::error::SourceError;

const POST_HOSTS: [&str; 2] = ["twitter.com", "x.com"];

/// Extracts the status id from a post URL.
///
/// Accepts `https://twitter.com/<user>/status/<id>` and the `x.com`, `www.` and
/// `mobile.` variants, with or without a query string or trailing segments such as
/// `/photo/1`. The legacy `/statuses/` path is accepted too.
///
/// # Returns
///
/// - `Ok(PostId)`: The id found in the path
/// - `Err(SourceError::InvalidPostUrl)`: If the URL is not a post URL
pub fn parse_status_url(input: &str) -> Result<PostId, SourceError> {
    let invalid = || SourceError::InvalidPostUrl(input.to_string());

    let url = Url::parse(input.trim()).map_err(|_| invalid())?;
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(invalid());
    }

    let host = url.host_str().ok_or_else(invalid)?.to_ascii_lowercase();
    let known_host = POST_HOSTS
        .iter()
        .any(|h| host == *h || host.ends_with(&format!(".{}", h)));
    if !known_host {
        return Err(invalid());
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    segments
        .windows(2)
        .find(|pair| pair[0] == "status" || pair[0] == "statuses")
        .and_then(|pair| pair[1].parse::<PostId>().ok())
        .ok_or_else(invalid)
}
