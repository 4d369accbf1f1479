//! Purpose: Provide the HTTP/JSON server for the sum endpoint.
//! Exports: `ServeConfig`, `validate_config`, `bind`, `router`, `serve`, `serve_listener`.
//! Role: Axum transport around an owned `SumService`.
//! Invariants: Only `POST /sum` and `GET /healthz` are routed; everything else is 404.
//! Invariants: Error bodies use the shared `{"error": {...}}` envelope.
//! Invariants: Loopback-only unless explicitly allowed.

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use sumweb::api::{Error, ErrorEnvelope, ErrorKind, Precision, SumResponse, SumService};

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_MAX_BODY_BYTES: u64 = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct ServeConfig {
    pub bind: SocketAddr,
    pub max_body_bytes: u64,
    pub allow_non_loopback: bool,
    pub precision: Precision,
}

impl ServeConfig {
    pub fn loopback(bind: SocketAddr) -> Self {
        Self {
            bind,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            allow_non_loopback: false,
            precision: Precision::default(),
        }
    }
}

pub async fn serve(config: ServeConfig) -> Result<(), Error> {
    let listener = bind(&config).await?;
    serve_listener(listener, &config, shutdown_signal()).await
}

/// Validates the config and binds its socket without serving yet.
pub async fn bind(config: &ServeConfig) -> Result<TcpListener, Error> {
    validate_config(config)?;
    TcpListener::bind(config.bind).await.map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message(format!("failed to bind {}", config.bind))
            .with_hint("Pick a free port with --bind.")
            .with_source(err)
    })
}

pub async fn serve_listener<F>(
    listener: TcpListener,
    config: &ServeConfig,
    shutdown: F,
) -> Result<(), Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let max_body_bytes = body_limit(config)?;
    let service = Arc::new(SumService::new().with_precision(config.precision));
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, decimals = service.precision().decimals(), "starting server");
    }
    let app = router(service, max_body_bytes);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("server failed")
                .with_source(err)
        })
}

pub fn router(service: Arc<SumService>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/sum", post(sum))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

fn is_loopback(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(addr) => addr.is_loopback(),
        IpAddr::V6(addr) => addr.is_loopback(),
    }
}

pub fn validate_config(config: &ServeConfig) -> Result<(), Error> {
    if !is_loopback(config.bind.ip()) && !config.allow_non_loopback {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("non-loopback bind requires explicit opt-in")
            .with_hint("Re-run with --allow-non-loopback or use a loopback address."));
    }

    if config.max_body_bytes == 0 {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("--max-body-bytes must be greater than zero")
            .with_hint("Use a positive value like 1048576."));
    }

    body_limit(config).map(|_| ())
}

fn body_limit(config: &ServeConfig) -> Result<usize, Error> {
    config.max_body_bytes.try_into().map_err(|_| {
        Error::new(ErrorKind::Usage)
            .with_message("--max-body-bytes exceeds platform limits")
            .with_hint("Use a smaller value that fits in memory.")
    })
}

pub fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    #[cfg(not(unix))]
    ctrl_c.await;
    info!("shutting down");
}

async fn healthz() -> Response {
    Json(json!({ "ok": true })).into_response()
}

async fn sum(State(service): State<Arc<SumService>>, body: Bytes) -> Response {
    let result = service.handle(&body).and_then(|response| {
        let encoded = encode_sum(&response)?;
        info!(sum = response.sum, "returning sum");
        Ok(encoded)
    });
    match result {
        Ok(encoded) => encoded,
        Err(err) => error_response(err),
    }
}

async fn not_found(uri: Uri) -> Response {
    error_response(
        Error::new(ErrorKind::NotFound).with_message(format!("no route for {}", uri.path())),
    )
}

/// JSON cannot carry infinities or NaN, so an overflowed real sum is an
/// encoding failure rather than a silent `null`.
fn encode_sum(response: &SumResponse) -> Result<Response, Error> {
    if !response.sum.is_finite() {
        return Err(Error::new(ErrorKind::Encoding)
            .with_message("sum is not representable as a json number"));
    }
    let body = serde_json::to_vec(response).map_err(|err| {
        Error::new(ErrorKind::Encoding)
            .with_message("failed to encode response")
            .with_source(err)
    })?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Usage | ErrorKind::MalformedPayload => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Encoding | ErrorKind::Transport | ErrorKind::Io | ErrorKind::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(err: Error) -> Response {
    let status = status_for(err.kind());
    if status.is_server_error() {
        warn!(error = %err, "request failed");
    } else {
        warn!(error = %err, "request rejected");
    }
    (status, Json(ErrorEnvelope::from_error(&err))).into_response()
}
