//! The bounded upstream call and its error taxonomy.
//!
//! [`forward`] sends the relayed POST to the upstream origin with a
//! timeout and classifies every failure mode: a non-2xx upstream
//! status, a transport error, an elapsed timeout, or anything else.
//! The caller maps each [`UpstreamError`] variant to exactly one HTTP
//! response; nothing is retried.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::CONTENT_TYPE;
use hyper::StatusCode;

use crate::server::HttpClient;

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream responded with HTTP {0}")]
    ErrorStatus(StatusCode),

    #[error("upstream connection failed: {0}")]
    Unreachable(String),

    #[error("upstream request timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),

    #[error("{0}")]
    Internal(String),
}

/// POST the payload to `<base><path>` and collect the response body.
///
/// The payload is opaque: it is forwarded byte-identical, never parsed.
/// Success means the upstream returned 2xx; its status is echoed to the
/// caller along with the collected body.
pub async fn forward(
    client: &HttpClient,
    base: &str,
    path: &str,
    body: Bytes,
    timeout: Duration,
) -> Result<(StatusCode, Bytes), UpstreamError> {
    let url = format!("{base}{path}");

    let req = hyper::Request::builder()
        .method(hyper::Method::POST)
        .uri(url.as_str())
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(body))
        .map_err(|e| UpstreamError::Internal(format!("failed to build request for {url}: {e}")))?;

    let response = match tokio::time::timeout(timeout, client.request(req)).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => return Err(UpstreamError::Unreachable(e.to_string())),
        Err(_) => return Err(UpstreamError::TimedOut(timeout)),
    };

    let status = response.status();
    if !status.is_success() {
        // The upstream's error body is deliberately dropped, only the
        // status code travels back to the client.
        return Err(UpstreamError::ErrorStatus(status));
    }

    let collected = response
        .into_body()
        .collect()
        .await
        .map_err(|e| UpstreamError::Internal(format!("body read error: {e}")))?;

    Ok((status, collected.to_bytes()))
}
