//! Configuration module for the sourcetrace service.
//!
//! This module contains configuration structures and environment variable
//! handling for the X API credentials, the NLP service and the analysis limits.

use log::{debug, error, info, warn};
use std::env;

use crate::summary::{AggregationLimits, DEFAULT_TOP_WORDS};
use crate::twitter::{DEFAULT_TIMELINE_PAGES, DEFAULT_TIMELINE_PAGE_SIZE};

pub const DEFAULT_API_BASE_URL: &str = "https://api.x.com/1.1";
pub const DEFAULT_NLP_SERVICE_URL: &str = "http://127.0.0.1:5005";

/// Masks a secret for logging, keeping at most eight leading and trailing
/// characters.
fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    let len = chars.len();
    let prefix: String = chars.iter().take(8).collect();
    if len > 16 {
        let suffix: String = chars[len - 8..].iter().collect();
        format!("{}...{}", prefix, suffix)
    } else {
        format!("{}...", prefix)
    }
}

/// Configuration struct for X API credentials.
///
/// Holds the Bearer access token used for every request, plus the optional
/// refresh token and client credentials that enable automatic token renewal.
#[derive(Debug)]
pub struct TwitterConfig {
    /// The Access Token sent as a Bearer token
    pub access_token: String,
    /// The Refresh Token for automatically refreshing expired access tokens
    pub refresh_token: Option<String>,
    /// The Client ID for OAuth 2.0 operations
    pub client_id: Option<String>,
    /// The Client Secret for OAuth 2.0 operations
    pub client_secret: Option<String>,
}

impl TwitterConfig {
    /// Creates a new `TwitterConfig` with only an access token.
    pub fn new(access_token: impl Into<String>) -> Self {
        TwitterConfig {
            access_token: access_token.into(),
            refresh_token: None,
            client_id: None,
            client_secret: None,
        }
    }

    /// Loads credentials from environment variables.
    ///
    /// # Required Environment Variables
    ///
    /// - `xapi_access_token`: Bearer token for all requests
    ///
    /// # Optional Environment Variables (for automatic token refresh)
    ///
    /// - `xapi_refresh_token`: Refresh Token
    /// - `xapi_client_id`: Client ID for OAuth 2.0 operations
    /// - `xapi_client_secret`: Client Secret for OAuth 2.0 operations
    ///
    /// # Returns
    ///
    /// - `Ok(TwitterConfig)`: If the access token is present and non-empty
    /// - `Err(...)`: If the access token is missing or empty
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        info!("Loading X API configuration from environment variables");

        let access_token = match env::var("xapi_access_token") {
            Ok(token) => {
                info!(
                    "Found xapi_access_token environment variable with length: {}",
                    token.len()
                );
                debug!("Access token (masked): {}", mask_secret(&token));

                if token.is_empty() {
                    error!("Access token is empty");
                    return Err("Access token cannot be empty".into());
                }
                if token.len() < 10 {
                    warn!(
                        "Access token seems unusually short ({} characters)",
                        token.len()
                    );
                }
                token
            }
            Err(e) => {
                error!("Failed to load xapi_access_token from environment: {}", e);
                return Err(
                    format!("Missing xapi_access_token environment variable: {}", e).into(),
                );
            }
        };

        let refresh_token = optional_secret("xapi_refresh_token");
        let client_id = optional_secret("xapi_client_id");
        let client_secret = optional_secret("xapi_client_secret");

        if refresh_token.is_some() && (client_id.is_none() || client_secret.is_none()) {
            warn!("Refresh token is provided but client credentials are missing - automatic token refresh will be disabled");
        }

        let config = TwitterConfig {
            access_token,
            refresh_token,
            client_id,
            client_secret,
        };

        if config.can_refresh_token() {
            info!("Automatic token refresh is enabled");
        } else {
            info!("Automatic token refresh is disabled - manual token refresh required");
        }

        Ok(config)
    }

    /// Attempts to refresh the access token using the stored refresh token and
    /// client credentials, updating both tokens in place.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: If the token was successfully refreshed
    /// - `Err(...)`: If refresh failed or credentials are missing
    pub async fn refresh_access_token(
        &mut self,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let (client_id, client_secret, refresh_token) = match (
            self.client_id.as_ref(),
            self.client_secret.as_ref(),
            self.refresh_token.as_ref(),
        ) {
            (Some(id), Some(secret), Some(token)) => (id, secret, token),
            _ => {
                error!("Cannot refresh token: missing required credentials");
                return Err("Missing required credentials for token refresh".into());
            }
        };

        let (new_access_token, new_refresh_token) =
            crate::oauth::refresh_access_token(client_id, client_secret, refresh_token).await?;

        self.access_token = new_access_token;
        debug!(
            "Updated access token (masked): {}",
            mask_secret(&self.access_token)
        );

        if let Some(new_refresh) = new_refresh_token {
            info!("Refresh token was rotated; the new one is kept in memory only");
            self.refresh_token = Some(new_refresh);
        }

        warn!("Access token has been refreshed - consider updating your xapi_access_token environment variable");
        Ok(())
    }

    /// Returns true if client_id, client_secret and refresh_token are all set.
    pub fn can_refresh_token(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some() && self.refresh_token.is_some()
    }
}

fn optional_secret(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => {
            info!("Found {} environment variable", name);
            debug!("{} (masked): {}", name, mask_secret(&value));
            Some(value)
        }
        Ok(_) => {
            warn!("{} is set but empty, ignoring it", name);
            None
        }
        Err(_) => {
            info!("No {} found in environment variables", name);
            None
        }
    }
}

/// Endpoints and limits for the tracing pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    pub api_base_url: String,
    pub nlp_service_url: String,
    pub limits: AggregationLimits,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        ServiceSettings {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            nlp_service_url: DEFAULT_NLP_SERVICE_URL.to_string(),
            limits: AggregationLimits::default(),
        }
    }
}

impl ServiceSettings {
    /// Reads settings from the environment, falling back to defaults.
    ///
    /// # Environment Variables
    ///
    /// - `XAPI_BASE_URL` (default `https://api.x.com/1.1`)
    /// - `NLP_SERVICE_URL` (default `http://127.0.0.1:5005`)
    /// - `SOURCE_TIMELINE_PAGES` (default 5)
    /// - `SOURCE_TIMELINE_PAGE_SIZE` (default 200, capped at 200)
    /// - `SOURCE_TOP_WORDS` (default 50)
    pub fn from_env() -> Self {
        let api_base_url =
            env::var("XAPI_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let nlp_service_url =
            env::var("NLP_SERVICE_URL").unwrap_or_else(|_| DEFAULT_NLP_SERVICE_URL.to_string());

        let limits = AggregationLimits {
            timeline_pages: usize_from_env("SOURCE_TIMELINE_PAGES", DEFAULT_TIMELINE_PAGES),
            timeline_page_size: usize_from_env(
                "SOURCE_TIMELINE_PAGE_SIZE",
                DEFAULT_TIMELINE_PAGE_SIZE,
            )
            .min(DEFAULT_TIMELINE_PAGE_SIZE),
            top_words: usize_from_env("SOURCE_TOP_WORDS", DEFAULT_TOP_WORDS),
        };

        info!(
            "Service settings: API {}, NLP {}, {:?}",
            api_base_url, nlp_service_url, limits
        );

        ServiceSettings {
            api_base_url,
            nlp_service_url,
            limits,
        }
    }
}

fn usize_from_env(name: &str, default: usize) -> usize {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse::<usize>() {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    "Ignoring {}='{}' ({}), using default {}",
                    name, raw, e, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

/// Gets the server port from environment variables or returns the default.
///
/// This function reads the `PORT` environment variable and parses it as a u16.
/// If the environment variable is not set, it defaults to 3000.
///
/// # Panics
///
/// This function will panic if the `PORT` environment variable is set to a value
/// that cannot be parsed as a valid port number.
pub fn get_server_port() -> u16 {
    env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .expect("PORT must be a valid number")
}
