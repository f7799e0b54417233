//! OAuth 2.0 helpers for X API authentication.
//!
//! This module builds Bearer Authorization headers and exchanges a refresh
//! token for a new access token.

use log::{error, info};

const TOKEN_URL: &str = "https://api.x.com/2/oauth2/token";

/// Builds the Authorization header for OAuth 2.0 authentication.
///
/// The same `Bearer` format serves app-only tokens and User Context access
/// tokens.
///
/// # Example
///
/// ```rust
/// use sourcetrace::build_oauth2_user_context_header;
///
/// let header = build_oauth2_user_context_header("your_access_token");
/// assert_eq!(header, "Bearer your_access_token");
/// ```
pub fn build_oauth2_user_context_header(access_token: &str) -> String {
    format!("Bearer {}", access_token)
}

/// Refreshes an OAuth 2.0 User Context access token using a refresh token.
///
/// # Returns
///
/// - `Ok((access_token, Some(refresh_token)))`: When X rotated the refresh token too
/// - `Ok((access_token, None))`: When only the access token was renewed
/// - `Err(...)`: If the token endpoint rejects the request
pub async fn refresh_access_token(
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<(String, Option<String>), Box<dyn std::error::Error + Send + Sync>> {
    info!("Requesting new access token from the OAuth 2.0 token endpoint");

    let params = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
    ];

    let response = reqwest::Client::new()
        .post(TOKEN_URL)
        .basic_auth(client_id, Some(client_secret))
        .form(&params)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        error!("Token refresh failed - Status: {}", status);
        return Err(format!("Token refresh failed ({})", status).into());
    }

    let json: serde_json::Value = response.json().await?;
    let access_token = json
        .get("access_token")
        .and_then(|v| v.as_str())
        .ok_or("No access_token in response")?
        .to_string();
    let new_refresh_token = json
        .get("refresh_token")
        .and_then(|v| v.as_str())
        .map(String::from);

    Ok((access_token, new_refresh_token))
}
