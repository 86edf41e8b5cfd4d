//! cors-relay is a CORS-relaxing local development proxy.
//!
//! It answers browser preflight (OPTIONS) requests with permissive
//! CORS headers, forwards POST requests under a configurable `/api/`
//! prefix to a fixed upstream origin (injecting the CORS origin header
//! into the relayed response), and serves local files for everything
//! else. It exists so a frontend served from one local port can talk
//! to a backend on another without the backend opting into CORS.
//!
//! It is a development convenience shim, not infrastructure: no
//! caching, no retries, no authentication, no TLS termination. A slow
//! upstream call occupies its request for up to the configured timeout.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, init, validate, health).
//! - [`config`] -- Configuration loading and validation; every field defaulted.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`health`] -- `GET /health` endpoint handler returning runtime diagnostics.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`relay`] -- Core CORS relay: preflight answers, upstream forwarding with
//!   a bounded timeout and a full error taxonomy, request classification.
//! - [`server`] -- Axum server setup, shared application state, HTTP client,
//!   and graceful shutdown.
//! - [`static_files`] -- File-serving fallback for non-API traffic.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML config file support _(enabled by default)_ |
//! | `json` | JSON config file support |
//! | `toml` | TOML config file support |
//! | `file-backends` | All file format backends |
//! | `full` | All features |

// Binary crate — public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod relay;
pub mod server;
pub mod static_files;
