//! `cors-relay run` — start the proxy server.
//!
//! Resolves configuration (explicit file, auto-detected file, or
//! built-in defaults), applies CLI overrides, and starts the Axum
//! server with graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::cli::RunArgs;
use crate::config;
use crate::error::RelayError;
use crate::logging;
use crate::relay::cors::CorsHeaders;
use crate::server::{self, AppState, Stats};
use crate::static_files::StaticFiles;

pub async fn execute(args: RunArgs) -> Result<(), RelayError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let (mut config, config_source) = config::resolve(args.config.as_deref()).await?;

    // CLI overrides win over the file
    if let Some(port) = args.port {
        config.listen.port = port;
    }
    if let Some(host) = args.host {
        config.listen.host = host;
    }
    if let Some(upstream) = args.upstream {
        config.upstream.base_url = upstream;
    }
    if let Some(timeout) = args.timeout {
        config.upstream.timeout = timeout;
    }
    if let Some(root) = args.static_root {
        config.static_files.root = root;
    }

    // A flag can be as wrong as a file entry, so validate the merged result.
    if let Err(errors) = config::validation::validate(&config) {
        return Err(RelayError::ConfigValidation { errors });
    }

    let cors = CorsHeaders::from_policy(&config.cors)?;
    let static_files = StaticFiles::new(&config.static_files.root);

    let addr: SocketAddr = format!("{}:{}", config.listen.host, config.listen.port).parse()?;

    let state = Arc::new(AppState {
        config: Arc::new(config),
        config_source,
        cors,
        static_files,
        http_client: server::build_http_client(),
        start_time: Instant::now(),
        stats: Stats::new(),
    });

    let router = server::build_router(Arc::clone(&state), args.max_body);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        upstream = %state.config.upstream.base_url,
        prefix = %state.config.api_prefix,
        static_root = %state.config.static_files.root.display(),
        config = %state.config_source,
        "cors-relay started"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    tracing::info!("cors-relay stopped");
    Ok(())
}
