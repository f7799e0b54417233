//! HTTP route handlers for the sourcetrace service.
//!
//! This module contains the handlers for the URL form page, the JSON tracing
//! endpoint and the health check.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Json},
    routing::get,
    Form, Router,
};
use log::{error, info};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::SourceError;
use crate::source::Resolution;
use crate::trace::{SourceTracer, TraceReport};
use crate::twitter::{sanitize_for_logging, Embedder};

/// Shown whenever a trace cannot complete.
pub const FALLBACK_MESSAGE: &str = "Sorry, we could not trace the source of that tweet.";

/// Submitted URLs are user input; they are sanitized and cut to this length
/// before being logged.
const MAX_LOGGED_URL_CHARS: usize = 200;

/// Services shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub tracer: SourceTracer,
    pub embedder: Arc<dyn Embedder>,
}

/// The submitted post URL, from the form body or the query string.
#[derive(Debug, Deserialize)]
pub struct TraceRequest {
    pub url: String,
}

/// Builds the application routes.
///
/// - `GET /`: URL form
/// - `POST /`: Form submission, renders the trace
/// - `GET /api/source?url=...`: JSON trace report
/// - `GET /health`: Health check
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_root).post(handle_trace_form))
        .route("/api/source", get(handle_trace_api))
        .route("/health", get(handle_health))
        .with_state(state)
}

/// Handles GET requests to the `/health` endpoint.
///
/// # Example Response
///
/// ```json
/// {
///   "status": "healthy",
///   "service": "sourcetrace"
/// }
/// ```
pub async fn handle_health() -> Json<Value> {
    Json(json!({"status": "healthy", "service": "sourcetrace"}))
}

/// Handles GET requests to the root `/` endpoint with the URL form.
pub async fn handle_root() -> Html<String> {
    Html(render_page("", ""))
}

/// Handles POST requests to `/`: traces the submitted URL and renders the
/// original post, its author and their top words.
///
/// Any failure renders the form again with [`FALLBACK_MESSAGE`].
pub async fn handle_trace_form(
    State(state): State<AppState>,
    Form(request): Form<TraceRequest>,
) -> Html<String> {
    let logged_url = sanitize_for_logging(&request.url, MAX_LOGGED_URL_CHARS);
    info!("Looking for tweet source of {}", logged_url);

    match state.tracer.trace(&request.url).await {
        Ok(report) => {
            let embed = match &report.original_url {
                Some(url) => state.embedder.embed_html(url).await,
                None => String::new(),
            };
            Html(render_page(
                &html_escape(&request.url),
                &render_report(&report, &embed),
            ))
        }
        Err(e) => {
            error!("Failed to trace {}: {}", logged_url, e);
            Html(render_page(
                &html_escape(&request.url),
                &format!("<p class=\"message\">{}</p>", FALLBACK_MESSAGE),
            ))
        }
    }
}

/// Handles GET requests to `/api/source?url=...`.
///
/// # Returns
///
/// - `200` with the JSON trace report
/// - `400` for a URL that is not a post URL
/// - `404` when the post or its author cannot be found
/// - `502` for other upstream failures
pub async fn handle_trace_api(
    State(state): State<AppState>,
    Query(request): Query<TraceRequest>,
) -> Result<Json<TraceReport>, (StatusCode, Json<Value>)> {
    match state.tracer.trace(&request.url).await {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            error!(
                "Failed to trace {}: {}",
                sanitize_for_logging(&request.url, MAX_LOGGED_URL_CHARS),
                e
            );
            let status = match &e {
                SourceError::InvalidPostUrl(_) => StatusCode::BAD_REQUEST,
                e if e.is_not_found() => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_GATEWAY,
            };
            Err((
                status,
                Json(json!({
                    "status": "error",
                    "message": FALLBACK_MESSAGE,
                    "error": e.to_string()
                })),
            ))
        }
    }
}

fn render_report(report: &TraceReport, embed: &str) -> String {
    let mut html = String::new();

    let message = match &report.resolution {
        Resolution::Found(_) => "Found an earlier source for this tweet.",
        Resolution::NoEarlierMatch(_) => "No earlier tweet found; this tweet is its own source.",
        Resolution::NoSignal => "This tweet has no hashtags or links to trace.",
    };
    html.push_str(&format!("        <p class=\"message\">{}</p>\n", message));

    if let Some(url) = &report.original_url {
        html.push_str(&format!(
            "        <p><a href=\"{0}\">{0}</a></p>\n",
            html_escape(url)
        ));
    }
    // oEmbed markup is rendered as-is.
    html.push_str(embed);

    if let Some(summary) = &report.summary {
        html.push_str(&format!(
            "        <h2><img src=\"{}\" alt=\"\"> {} (@{})</h2>\n        <p>{}</p>\n",
            html_escape(&summary.avatar_url),
            html_escape(&summary.name),
            html_escape(&summary.screen_name),
            html_escape(&summary.description)
        ));
        html.push_str(
            "        <table>\n            <thead>\n                <tr>\n                    <th>word</th>\n                    <th class=\"count\">count</th>\n                    <th class=\"count\">average sentiment</th>\n                </tr>\n            </thead>\n            <tbody>\n",
        );
        for stat in &summary.words {
            html.push_str(&format!(
                "                <tr>\n                    <td>{}</td>\n                    <td class=\"count\">{}</td>\n                    <td class=\"count\">{:.3}</td>\n                </tr>\n",
                html_escape(&stat.word),
                stat.count,
                stat.avg_sentiment
            ));
        }
        html.push_str("            </tbody>\n        </table>\n");
    }

    html
}

fn render_page(url_value: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Sourcetrace - Tweet Source</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
            margin: 0;
            padding: 20px;
            background-color: #f5f5f5;
        }}
        .container {{
            max-width: 1200px;
            margin: 0 auto;
            background-color: white;
            padding: 30px;
            border-radius: 8px;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }}
        table {{
            width: 100%;
            border-collapse: collapse;
            margin-top: 20px;
        }}
        th, td {{
            padding: 12px;
            text-align: left;
            border-bottom: 1px solid #ddd;
        }}
        .count {{
            text-align: right;
            font-variant-numeric: tabular-nums;
        }}
    </style>
</head>
<body>
    <div class="container">
        <h1>Find a tweet's source</h1>
        <form method="post" action="/">
            <label for="url">Tweet Url:</label>
            <input id="url" name="url" type="url" required value="{}">
            <button type="submit">Submit</button>
        </form>
{}
    </div>
</body>
</html>"#,
        url_value, body
    )
}

/// Escapes HTML special characters to prevent XSS attacks.
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
