//! Core CORS relay handler.
//!
//! The [`handle`] function is the Axum fallback that receives every
//! non-`/health` request and classifies it: OPTIONS gets a permissive
//! preflight answer, POST under the API prefix is forwarded to the
//! upstream origin, and everything else goes to the static file
//! fallback. Submodules build the CORS header set ([`cors`]) and run
//! the bounded upstream call ([`upstream`]).
//!
//! Each request is handled in one linear pass: receive, classify,
//! validate, forward, relay-or-error. There are no retries and no
//! state survives a request.

pub mod cors;
pub mod upstream;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::server::AppState;

use cors::CorsHeaders;
use upstream::UpstreamError;

/// Fixed body for unexpected relay faults. Raw error text is logged,
/// never sent to the client.
const INTERNAL_ERROR_BODY: &str = r#"{"error": "API request failed"}"#;

pub async fn handle(State(state): State<Arc<AppState>>, req: Request<Body>) -> Response {
    if req.method() == Method::OPTIONS {
        state.stats.preflights.fetch_add(1, Ordering::Relaxed);
        return preflight(&state.cors);
    }

    if req.method() == Method::POST
        && req.uri().path().starts_with(state.config.api_prefix.as_str())
    {
        return relay_api(&state, req).await;
    }

    state.static_files.serve(req).await
}

/// Answer a preflight request. Always 200 with the full permissive
/// header set and no body; this path never fails.
fn preflight(cors: &CorsHeaders) -> Response {
    let mut response = StatusCode::OK.into_response();
    cors.apply_preflight(response.headers_mut());
    response
}

async fn relay_api(state: &AppState, req: Request<Body>) -> Response {
    let (parts, body) = req.into_parts();
    let path = parts.uri.path().to_string();
    let correlation_id = uuid::Uuid::new_v4().to_string();

    let declared_len = match read_content_length(&parts.headers) {
        Ok(len) => len,
        Err(reason) => {
            // Client input fault, not a server one.
            tracing::debug!(
                correlation_id = %correlation_id,
                path = %path,
                reason = %reason,
                "rejecting relay request"
            );
            state.stats.failed.fetch_add(1, Ordering::Relaxed);
            return with_origin(
                &state.cors,
                (StatusCode::BAD_REQUEST, reason).into_response(),
            );
        }
    };

    // The body limit layer bounds this read; the payload stays opaque bytes.
    let payload = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(
                correlation_id = %correlation_id,
                path = %path,
                error = %e,
                "failed to read request body"
            );
            state.stats.failed.fetch_add(1, Ordering::Relaxed);
            return with_origin(
                &state.cors,
                (StatusCode::PAYLOAD_TOO_LARGE, "request body too large".to_string())
                    .into_response(),
            );
        }
    };

    tracing::info!(
        correlation_id = %correlation_id,
        path = %path,
        declared_len,
        "relaying request upstream"
    );

    let timeout = Duration::from_millis(state.config.upstream.timeout);
    let result = upstream::forward(
        &state.http_client,
        state.config.upstream_base(),
        &path,
        payload,
        timeout,
    )
    .await;

    match result {
        Ok((status, body)) => {
            state.stats.relayed.fetch_add(1, Ordering::Relaxed);
            tracing::info!(
                correlation_id = %correlation_id,
                path = %path,
                status = status.as_u16(),
                bytes = body.len(),
                "upstream responded"
            );
            relay_success(&state.cors, status, body)
        }
        Err(e) => {
            state.stats.failed.fetch_add(1, Ordering::Relaxed);
            match &e {
                UpstreamError::Internal(detail) => {
                    tracing::error!(
                        correlation_id = %correlation_id,
                        path = %path,
                        error = %detail,
                        "relay failed unexpectedly"
                    );
                }
                other => {
                    tracing::warn!(
                        correlation_id = %correlation_id,
                        path = %path,
                        error = %other,
                        "relay failed"
                    );
                }
            }
            relay_error(&state.cors, &e)
        }
    }
}

/// The upstream's status and body travel back verbatim; the origin
/// header and a JSON content type are added on top.
fn relay_success(cors: &CorsHeaders, status: StatusCode, body: Bytes) -> Response {
    let response = (
        status,
        [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        Body::from(body),
    )
        .into_response();
    with_origin(cors, response)
}

fn relay_error(cors: &CorsHeaders, err: &UpstreamError) -> Response {
    let response = match err {
        UpstreamError::ErrorStatus(status) => (*status, err.to_string()).into_response(),
        UpstreamError::Unreachable(_) => {
            (StatusCode::BAD_GATEWAY, err.to_string()).into_response()
        }
        UpstreamError::TimedOut(_) => {
            (StatusCode::GATEWAY_TIMEOUT, err.to_string()).into_response()
        }
        UpstreamError::Internal(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            INTERNAL_ERROR_BODY,
        )
            .into_response(),
    };
    with_origin(cors, response)
}

fn with_origin(cors: &CorsHeaders, mut response: Response) -> Response {
    cors.apply_origin(response.headers_mut());
    response
}

/// Require a well-formed `Content-Length` before touching the body.
/// Trusting an absent or malformed length risks misreading the stream,
/// so the request is rejected up front and never reaches the upstream.
fn read_content_length(headers: &HeaderMap) -> Result<u64, String> {
    let Some(value) = headers.get(CONTENT_LENGTH) else {
        return Err("missing Content-Length header".to_string());
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .ok_or_else(|| {
            format!(
                "invalid Content-Length header: '{}'",
                String::from_utf8_lossy(value.as_bytes())
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::CorsPolicy;
    use axum::http::header::{
        ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    };

    fn headers_with_length(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, value.parse().unwrap());
        headers
    }

    #[test]
    fn content_length_present_and_numeric() {
        assert_eq!(read_content_length(&headers_with_length("17")), Ok(17));
        assert_eq!(read_content_length(&headers_with_length("0")), Ok(0));
    }

    #[test]
    fn content_length_missing() {
        let err = read_content_length(&HeaderMap::new()).unwrap_err();
        assert!(err.contains("missing Content-Length"));
    }

    #[test]
    fn content_length_non_numeric() {
        let err = read_content_length(&headers_with_length("abc")).unwrap_err();
        assert!(err.contains("invalid Content-Length"));
    }

    #[test]
    fn content_length_negative() {
        let err = read_content_length(&headers_with_length("-5")).unwrap_err();
        assert!(err.contains("invalid Content-Length"));
    }

    #[test]
    fn preflight_carries_full_header_set() {
        let cors = CorsHeaders::from_policy(&CorsPolicy::default()).unwrap();
        let response = preflight(&cors);

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
        assert_eq!(
            headers.get(ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert_eq!(
            headers.get(ACCESS_CONTROL_ALLOW_HEADERS).unwrap(),
            "Origin, Content-Type, Accept, Authorization"
        );
    }

    #[test]
    fn upstream_error_bodies_stay_generic() {
        let cors = CorsHeaders::from_policy(&CorsPolicy::default()).unwrap();
        let response = relay_error(&cors, &UpstreamError::ErrorStatus(StatusCode::NOT_FOUND));

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[test]
    fn internal_error_body_is_sanitized() {
        let cors = CorsHeaders::from_policy(&CorsPolicy::default()).unwrap();
        let response = relay_error(
            &cors,
            &UpstreamError::Internal("secret backtrace".to_string()),
        );

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
