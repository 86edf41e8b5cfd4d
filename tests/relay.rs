//! End-to-end tests for the CORS relay: preflight answers, upstream
//! forwarding, the error taxonomy, and the static fallback boundary.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use cors_relay::config::model::Config;
use cors_relay::relay::cors::CorsHeaders;
use cors_relay::server::{self, AppState, Stats};
use cors_relay::static_files::StaticFiles;

/// Stub upstream with one route per relay scenario. The hit counter
/// records how many requests actually arrived.
async fn spawn_upstream() -> (SocketAddr, tokio::sync::oneshot::Sender<()>, Arc<AtomicU64>) {
    let hits = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&hits);

    let app = Router::new()
        .route("/api/echo", post(|body: Bytes| async move { body }))
        .route(
            "/api/created",
            post(|| async { (StatusCode::CREATED, r#"{"id":1}"#) }),
        )
        .route(
            "/api/missing",
            post(|| async { (StatusCode::NOT_FOUND, "upstream-secret-detail") }),
        )
        .route(
            "/api/slow",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "late"
            }),
        )
        .route(
            "/api/count",
            post(move || {
                let counter = Arc::clone(&counter);
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    n.to_string()
                }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    (addr, shutdown_tx, hits)
}

async fn spawn_relay(config: Config) -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
    let cors = CorsHeaders::from_policy(&config.cors).unwrap();
    let static_files = StaticFiles::new(&config.static_files.root);

    let state = Arc::new(AppState {
        config: Arc::new(config),
        config_source: "test".into(),
        cors,
        static_files,
        http_client: server::build_http_client(),
        start_time: Instant::now(),
        stats: Stats::new(),
    });

    let router = server::build_router(state, 1_048_576);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    (addr, shutdown_tx)
}

fn config_for(upstream_addr: SocketAddr) -> Config {
    let mut config = Config::default();
    config.upstream.base_url = format!("http://{upstream_addr}");
    config
}

/// A port with nothing listening on it.
async fn dead_port() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

#[tokio::test]
async fn options_any_path_gets_preflight_headers() {
    let (upstream, _upstream_shutdown, _) = spawn_upstream().await;
    let (relay, _shutdown) = spawn_relay(config_for(upstream)).await;

    let client = reqwest::Client::new();
    for path in ["/", "/api/echo", "/deep/nested/path"] {
        let resp = client
            .request(reqwest::Method::OPTIONS, format!("http://{relay}{path}"))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 200, "path {path}");
        let headers = resp.headers();
        assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
        assert_eq!(
            headers.get("access-control-allow-methods").unwrap(),
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert_eq!(
            headers.get("access-control-allow-headers").unwrap(),
            "Origin, Content-Type, Accept, Authorization"
        );
        assert!(resp.bytes().await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn echo_round_trip_is_byte_identical() {
    let (upstream, _upstream_shutdown, _) = spawn_upstream().await;
    let (relay, _shutdown) = spawn_relay(config_for(upstream)).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{relay}/api/echo"))
        .body(r#"{"a":1}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/json"
    );
    assert_eq!(resp.bytes().await.unwrap().as_ref(), br#"{"a":1}"#);
}

#[tokio::test]
async fn upstream_success_status_is_echoed_verbatim() {
    let (upstream, _upstream_shutdown, _) = spawn_upstream().await;
    let (relay, _shutdown) = spawn_relay(config_for(upstream)).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{relay}/api/created"))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 201);
    assert_eq!(resp.text().await.unwrap(), r#"{"id":1}"#);
}

#[tokio::test]
async fn upstream_error_status_relayed_without_its_body() {
    let (upstream, _upstream_shutdown, _) = spawn_upstream().await;
    let (relay, _shutdown) = spawn_relay(config_for(upstream)).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{relay}/api/missing"))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
    let body = resp.text().await.unwrap();
    assert!(!body.contains("upstream-secret-detail"));
    assert!(body.contains("404"));
}

#[tokio::test]
async fn unreachable_upstream_returns_502() {
    let mut config = Config::default();
    config.upstream.base_url = format!("http://{}", dead_port().await);
    let (relay, _shutdown) = spawn_relay(config).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{relay}/api/x"))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 502);
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}

#[tokio::test]
async fn slow_upstream_returns_504() {
    let (upstream, _upstream_shutdown, _) = spawn_upstream().await;
    let mut config = config_for(upstream);
    config.upstream.timeout = 200;
    let (relay, _shutdown) = spawn_relay(config).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{relay}/api/slow"))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 504);
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
    assert!(resp.text().await.unwrap().contains("timed out"));
}

#[tokio::test]
async fn missing_content_length_is_rejected_before_upstream() {
    let (upstream, _upstream_shutdown, hits) = spawn_upstream().await;
    let (relay, _shutdown) = spawn_relay(config_for(upstream)).await;

    // reqwest always sets Content-Length, so speak HTTP by hand.
    let mut stream = tokio::net::TcpStream::connect(relay).await.unwrap();
    stream
        .write_all(b"POST /api/count HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 400"), "got: {response}");
    assert!(
        response
            .to_ascii_lowercase()
            .contains("access-control-allow-origin: *"),
        "got: {response}"
    );
    assert!(response.contains("Content-Length"));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn two_identical_posts_reach_upstream_twice() {
    let (upstream, _upstream_shutdown, hits) = spawn_upstream().await;
    let (relay, _shutdown) = spawn_relay(config_for(upstream)).await;

    let client = reqwest::Client::new();
    let url = format!("http://{relay}/api/count");

    let first = client.post(&url).body("{}").send().await.unwrap();
    assert_eq!(first.text().await.unwrap(), "1");

    let second = client.post(&url).body("{}").send().await.unwrap();
    assert_eq!(second.text().await.unwrap(), "2");

    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn post_outside_prefix_skips_the_relay() {
    let (upstream, _upstream_shutdown, hits) = spawn_upstream().await;
    let (relay, _shutdown) = spawn_relay(config_for(upstream)).await;

    // ServeDir answers POST with 405; the relay never runs.
    let resp = reqwest::Client::new()
        .post(format!("http://{relay}/Cargo.toml"))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 405);
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn prefix_requires_trailing_segment_boundary() {
    let (upstream, _upstream_shutdown, hits) = spawn_upstream().await;
    let (relay, _shutdown) = spawn_relay(config_for(upstream)).await;

    // "/api" without the trailing slash is not under the prefix.
    let resp = reqwest::Client::new()
        .post(format!("http://{relay}/api"))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 405);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}
