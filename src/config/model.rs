//! Serde data structures for the cors-relay configuration file.
//!
//! Contains [`Config`] (the root), [`Listen`], [`Upstream`],
//! [`CorsPolicy`], and [`StaticFilesConfig`]. All types derive
//! `Serialize` and `Deserialize` with `deny_unknown_fields` for strict
//! parsing. Every field has a default, so the proxy can run with no
//! config file at all.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3007
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

const fn default_timeout() -> u64 {
    30_000
}

fn default_allow_methods() -> Vec<String> {
    ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn default_allow_headers() -> Vec<String> {
    ["Origin", "Content-Type", "Accept", "Authorization"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_api_prefix() -> String {
    "/api/".to_string()
}

fn is_default_host(v: &str) -> bool {
    v == default_host()
}

fn is_default_port(v: &u16) -> bool {
    *v == default_port()
}

fn is_default_base_url(v: &str) -> bool {
    v == default_base_url()
}

fn is_default_timeout(v: &u64) -> bool {
    *v == default_timeout()
}

fn is_default_allow_methods(v: &[String]) -> bool {
    v == default_allow_methods()
}

fn is_default_allow_headers(v: &[String]) -> bool {
    v == default_allow_headers()
}

fn is_default_root(v: &PathBuf) -> bool {
    *v == default_root()
}

fn is_default_api_prefix(v: &str) -> bool {
    v == default_api_prefix()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Listen::is_default")]
    pub listen: Listen,

    #[serde(default, skip_serializing_if = "Upstream::is_default")]
    pub upstream: Upstream,

    #[serde(default, skip_serializing_if = "CorsPolicy::is_default")]
    pub cors: CorsPolicy,

    #[serde(default, skip_serializing_if = "StaticFilesConfig::is_default")]
    pub static_files: StaticFilesConfig,

    #[serde(
        default = "default_api_prefix",
        skip_serializing_if = "is_default_api_prefix"
    )]
    pub api_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: Listen::default(),
            upstream: Upstream::default(),
            cors: CorsPolicy::default(),
            static_files: StaticFilesConfig::default(),
            api_prefix: default_api_prefix(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Listen {
    #[serde(default = "default_host", skip_serializing_if = "is_default_host")]
    pub host: String,

    #[serde(default = "default_port", skip_serializing_if = "is_default_port")]
    pub port: u16,
}

impl Default for Listen {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Listen {
    fn is_default(&self) -> bool {
        self.host == default_host() && self.port == default_port()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Upstream {
    #[serde(
        default = "default_base_url",
        skip_serializing_if = "is_default_base_url"
    )]
    pub base_url: String,

    /// Upstream call bound in milliseconds.
    #[serde(
        default = "default_timeout",
        skip_serializing_if = "is_default_timeout"
    )]
    pub timeout: u64,
}

impl Default for Upstream {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
        }
    }
}

impl Upstream {
    fn is_default(&self) -> bool {
        self.base_url == default_base_url() && self.timeout == default_timeout()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CorsPolicy {
    #[serde(
        default = "default_allow_methods",
        skip_serializing_if = "is_default_allow_methods"
    )]
    pub allow_methods: Vec<String>,

    #[serde(
        default = "default_allow_headers",
        skip_serializing_if = "is_default_allow_headers"
    )]
    pub allow_headers: Vec<String>,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            allow_methods: default_allow_methods(),
            allow_headers: default_allow_headers(),
        }
    }
}

impl CorsPolicy {
    fn is_default(&self) -> bool {
        self.allow_methods == default_allow_methods()
            && self.allow_headers == default_allow_headers()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StaticFilesConfig {
    #[serde(default = "default_root", skip_serializing_if = "is_default_root")]
    pub root: PathBuf,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

impl StaticFilesConfig {
    fn is_default(&self) -> bool {
        self.root == default_root()
    }
}

impl Config {
    /// Upstream base URL without a trailing slash, ready for path concatenation.
    #[must_use]
    pub fn upstream_base(&self) -> &str {
        self.upstream.base_url.trim_end_matches('/')
    }
}
