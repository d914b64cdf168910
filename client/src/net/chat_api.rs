//! Streaming transport for `POST /conversation`.
//!
//! Client-side (csr): `gloo-net` request, body read through the browser's
//! `ReadableStream` so chunks reach the store as they arrive.
//! Native builds: returns [`ChatApiError::Unavailable`].

#![allow(clippy::unused_async)]

use super::ChatApiError;
use super::reply::StreamControl;
use super::types::{ChatRequest, StreamEvent, parse_stream_line};

#[cfg(test)]
#[path = "chat_api_test.rs"]
mod chat_api_test;

/// Parse a line and hand any event to `on_event`.
#[cfg_attr(not(feature = "csr"), allow(dead_code))]
fn handle_line(
    line: &str,
    on_event: &mut impl FnMut(StreamEvent) -> StreamControl,
) -> Result<StreamControl, ChatApiError> {
    match parse_stream_line(line)? {
        Some(event) => Ok(on_event(event)),
        None => Ok(StreamControl::Continue),
    }
}

/// Send one turn and stream the reply into `on_event` until the body ends or
/// the callback asks to stop.
///
/// # Errors
///
/// Returns a [`ChatApiError`] if the request cannot be sent, the server
/// answers with a non-success status, the body stream breaks, or a line is
/// not valid JSON.
pub async fn stream_chat(
    request: &ChatRequest,
    mut on_event: impl FnMut(StreamEvent) -> StreamControl,
) -> Result<(), ChatApiError> {
    #[cfg(feature = "csr")]
    {
        use wasm_bindgen::JsCast;
        use wasm_bindgen_futures::JsFuture;

        use super::CHAT_ENDPOINT;
        use super::ndjson::NdjsonDecoder;

        let resp = gloo_net::http::Request::post(CHAT_ENDPOINT)
            .json(request)
            .map_err(|e| ChatApiError::Request(e.to_string()))?
            .send()
            .await
            .map_err(|e| ChatApiError::Request(e.to_string()))?;
        if !resp.ok() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ChatApiError::Status { status, body });
        }
        let Some(body) = resp.body() else {
            return Ok(());
        };

        let reader: web_sys::ReadableStreamDefaultReader = body.get_reader().unchecked_into();
        let mut decoder = NdjsonDecoder::new();
        loop {
            let chunk = JsFuture::from(reader.read())
                .await
                .map_err(|e| ChatApiError::Stream(format!("{e:?}")))?;
            let done = js_sys::Reflect::get(&chunk, &"done".into())
                .ok()
                .and_then(|v| v.as_bool())
                .unwrap_or(true);
            if done {
                break;
            }
            let value = js_sys::Reflect::get(&chunk, &"value".into())
                .map_err(|e| ChatApiError::Stream(format!("{e:?}")))?;
            let bytes = js_sys::Uint8Array::new(&value).to_vec();
            for line in decoder.push(&bytes) {
                if handle_line(&line, &mut on_event)? == StreamControl::Stop {
                    let _ = reader.cancel();
                    return Ok(());
                }
            }
        }
        if let Some(line) = decoder.finish() {
            handle_line(&line, &mut on_event)?;
        }
        Ok(())
    }
    #[cfg(not(feature = "csr"))]
    {
        let _ = (request, &mut on_event);
        Err(ChatApiError::Unavailable)
    }
}
