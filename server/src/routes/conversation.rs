//! `POST /conversation` relay.
//!
//! The request body is forwarded untouched. A successful upstream reply is
//! streamed back chunk by chunk as NDJSON; if the upstream stream breaks
//! partway, the client still receives a well-formed final
//! `{"error": "..."}` line instead of a truncated body.

#[cfg(test)]
#[path = "conversation_test.rs"]
mod conversation_test;

use std::convert::Infallible;
use std::pin::Pin;

use axum::Json;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use futures::{Stream, StreamExt};

use crate::state::AppState;

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Relay one chat turn to the configured upstream.
pub async fn relay(State(state): State<AppState>, Json(body): Json<serde_json::Value>) -> Response {
    let Some(upstream) = state.config.upstream.as_deref() else {
        tracing::warn!("conversation request rejected: CHAT_API_UPSTREAM not set");
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "chat backend not configured");
    };

    let resp = match state.http.post(upstream).json(&body).send().await {
        Ok(resp) => resp,
        Err(e) => {
            tracing::warn!(error = %e, %upstream, "upstream request failed");
            return error_response(StatusCode::BAD_GATEWAY, "chat backend unreachable");
        }
    };

    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), body = %text, "upstream rejected conversation");
        let status = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        let message = if text.trim().is_empty() { status.to_string() } else { text };
        return error_response(status, &message);
    }

    tracing::debug!(%upstream, "streaming conversation reply");
    let body = Body::from_stream(relay_stream(resp.bytes_stream()));
    ([(CONTENT_TYPE, NDJSON_CONTENT_TYPE)], body).into_response()
}

/// Pass chunks through until the upstream errors, then emit one error line
/// and end. The error line always starts on a fresh line.
pub fn relay_stream<S, E>(upstream: S) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    struct Relay<S> {
        upstream: Pin<Box<S>>,
        at_line_start: bool,
    }

    let relay = Relay { upstream: Box::pin(upstream), at_line_start: true };
    futures::stream::unfold(Some(relay), |relay| async move {
        let mut relay = relay?;
        match relay.upstream.next().await {
            Some(Ok(chunk)) => {
                if let Some(last) = chunk.last() {
                    relay.at_line_start = *last == b'\n';
                }
                Some((Ok(chunk), Some(relay)))
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "upstream stream failed mid-reply");
                let mut line = if relay.at_line_start { String::new() } else { "\n".to_owned() };
                line.push_str(&error_line(&e.to_string()));
                Some((Ok(Bytes::from(line)), None))
            }
            None => None,
        }
    })
}

/// `{"error": message}` followed by a newline.
pub fn error_line(message: &str) -> String {
    format!("{}\n", serde_json::json!({ "error": message }))
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
