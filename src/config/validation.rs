//! Configuration validation with detailed error reporting.
//!
//! The [`validate`] function checks a parsed [`Config`] for structural
//! errors such as a malformed upstream URL, a zero timeout, a bad API
//! prefix, or invalid CORS method/header names. Returns a list of
//! [`ValidationError`] values with per-field suggestions.

use url::Url;

use super::model::Config;
use crate::error::ValidationError;

pub const VALID_METHODS: &[&str] = &[
    "GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS", "*",
];

/// Validate the upstream base URL. Returns `Ok(())` or a human-readable error.
pub fn validate_base_url(url: &str) -> Result<(), String> {
    match Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            if scheme != "http" && scheme != "https" {
                Err(format!(
                    "unsupported scheme '{scheme}' (expected http or https)"
                ))
            } else if parsed.host_str().is_none() {
                Err(format!("'{url}' has no host"))
            } else {
                Ok(())
            }
        }
        Err(_) => Err(format!("'{url}' is not a valid URL")),
    }
}

/// Validate an HTTP method string. Returns `Ok(())` or a human-readable error.
pub fn validate_method(method: &str) -> Result<(), String> {
    let upper = method.to_uppercase();
    if VALID_METHODS.contains(&upper.as_str()) {
        Ok(())
    } else {
        Err(format!("'{method}' is not a valid HTTP method"))
    }
}

/// Validate a CORS list entry for use inside a header value: visible
/// ASCII only, no separators that would corrupt the joined list.
pub fn validate_header_token(token: &str) -> Result<(), String> {
    if token.is_empty() {
        return Err("empty entry".into());
    }
    if token
        .chars()
        .any(|c| !c.is_ascii() || c.is_ascii_control() || c == ',')
    {
        return Err(format!("'{token}' contains characters not allowed in a header value"));
    }
    Ok(())
}

pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(msg) = validate_base_url(&config.upstream.base_url) {
        errors.push(ValidationError {
            field: "upstream.base_url".into(),
            message: msg,
            suggestion: Some("e.g. http://localhost:8080".into()),
        });
    }

    if config.upstream.timeout == 0 {
        errors.push(ValidationError {
            field: "upstream.timeout".into(),
            message: "timeout must be greater than zero".into(),
            suggestion: Some("the default is 30000 (milliseconds)".into()),
        });
    }

    if !config.api_prefix.starts_with('/') {
        errors.push(ValidationError {
            field: "api_prefix".into(),
            message: "prefix must start with '/'".into(),
            suggestion: Some(format!("did you mean '/{}'?", config.api_prefix)),
        });
    } else if !config.api_prefix.ends_with('/') {
        errors.push(ValidationError {
            field: "api_prefix".into(),
            message: "prefix must end with '/'".into(),
            suggestion: Some(format!("did you mean '{}/'?", config.api_prefix)),
        });
    }

    if config.cors.allow_methods.is_empty() {
        errors.push(ValidationError {
            field: "cors.allow_methods".into(),
            message: "at least one method must be allowed".into(),
            suggestion: None,
        });
    }
    for method in &config.cors.allow_methods {
        if let Err(msg) = validate_method(method) {
            errors.push(ValidationError {
                field: "cors.allow_methods".into(),
                message: msg,
                suggestion: None,
            });
        }
    }

    for header in &config.cors.allow_headers {
        if let Err(msg) = validate_header_token(header) {
            errors.push(ValidationError {
                field: "cors.allow_headers".into(),
                message: msg,
                suggestion: None,
            });
        }
    }

    if config.static_files.root.as_os_str().is_empty() {
        errors.push(ValidationError {
            field: "static_files.root".into(),
            message: "root directory cannot be empty".into(),
            suggestion: Some("use '.' to serve the working directory".into()),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[must_use]
pub fn format_validation_report(path: &str, config: &Config) -> String {
    let lines = [
        format!(
            "  listen:   {}:{}",
            config.listen.host, config.listen.port
        ),
        format!(
            "  upstream: {} (timeout {}ms)",
            config.upstream.base_url, config.upstream.timeout
        ),
        format!(
            "  relay:    POST {}* -> {}",
            config.api_prefix,
            config.upstream_base()
        ),
        format!("  fallback: files under {}", config.static_files.root.display()),
    ];

    format!("{} is valid\n{}", path, lines.join("\n"))
}
