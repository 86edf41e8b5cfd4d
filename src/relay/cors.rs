//! CORS header construction.
//!
//! [`CorsHeaders`] precomputes the three permissive CORS header values
//! from the configured policy once at startup, so request handlers
//! apply them without re-joining or re-validating lists per request.

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderMap, HeaderValue};

use crate::config::model::CorsPolicy;
use crate::error::RelayError;

/// The relay is a development shim: every origin is allowed, always.
pub const ALLOW_ANY_ORIGIN: HeaderValue = HeaderValue::from_static("*");

#[derive(Debug, Clone)]
pub struct CorsHeaders {
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
}

impl CorsHeaders {
    pub fn from_policy(policy: &CorsPolicy) -> Result<Self, RelayError> {
        Ok(Self {
            allow_methods: join_list(&policy.allow_methods)?,
            allow_headers: join_list(&policy.allow_headers)?,
        })
    }

    /// Add the origin header alone. Used on relay responses, where the
    /// method/header allowances only belong on the preflight answer.
    pub fn apply_origin(&self, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW_ANY_ORIGIN);
    }

    /// Add the full preflight header set.
    pub fn apply_preflight(&self, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW_ANY_ORIGIN);
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
    }
}

fn join_list(values: &[String]) -> Result<HeaderValue, RelayError> {
    let joined = values.join(", ");
    HeaderValue::from_str(&joined).map_err(|e| RelayError::InvalidCorsValue {
        value: joined,
        reason: e.to_string(),
    })
}
