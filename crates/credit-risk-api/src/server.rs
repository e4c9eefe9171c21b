use std::any::Any;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use credit_risk_storage::BorrowerRecord;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServiceConfig;
use crate::error::{ApiError, ServerError};
use crate::protocol::{CreditLossResponse, ErrorBody, HealthResponse, RiskScoreResponse};
use crate::service::CreditRiskService;

pub type SharedService = Arc<CreditRiskService>;

pub fn router(service: SharedService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(cors::Any);

    Router::new()
        .route("/health", get(health))
        .route("/get_data", post(get_data))
        .route("/risk_score", post(risk_score))
        .route("/calc_ecl", post(calc_ecl))
        .fallback(unknown_route)
        .with_state(service)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Loads the borrower table, binds, and serves until Ctrl-C. The table is
/// complete before the listener accepts its first connection.
pub async fn run(config: ServiceConfig) -> Result<(), ServerError> {
    let service = Arc::new(CreditRiskService::load(&config.data_path));
    let listener = TcpListener::bind(&config.http_addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.http_addr.clone(),
            source,
        })?;
    log_banner(listener.local_addr()?, service.store().len());
    serve(listener, service).await?;
    info!("credit risk api stopped");
    Ok(())
}

pub async fn serve(listener: TcpListener, service: SharedService) -> io::Result<()> {
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn health(State(service): State<SharedService>) -> Json<HealthResponse> {
    Json(service.health())
}

async fn get_data(
    State(service): State<SharedService>,
    body: Bytes,
) -> Result<Json<BorrowerRecord>, ApiError> {
    service.get_data(&body).map(Json)
}

async fn risk_score(
    State(service): State<SharedService>,
    body: Bytes,
) -> Result<Json<RiskScoreResponse>, ApiError> {
    service.risk_score(&body).map(Json)
}

async fn calc_ecl(
    State(service): State<SharedService>,
    body: Bytes,
) -> Result<Json<CreditLossResponse>, ApiError> {
    service.calc_ecl(&body).map(Json)
}

async fn unknown_route() -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Not found")))
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    };
    ApiError::Internal(detail).into_response()
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install ctrl-c handler, shutdown only by kill");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

fn log_banner(addr: SocketAddr, records: usize) {
    info!("credit risk api starting");
    info!(records, "borrower records loaded");
    info!(%addr, "listening");
    info!("  GET  /health      - health check");
    info!("  POST /get_data    - retrieve borrower data");
    info!("  POST /risk_score  - calculate risk score");
    info!("  POST /calc_ecl    - calculate expected credit loss");
}
