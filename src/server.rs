use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use log::{info, warn};

use crate::config::ServerConfig;
use crate::data::{Diagnostics, GenerateRequest, GenerationResult, PenaltyRequest};
use crate::diagnostics::compute_diagnostics;
use crate::error::{ConfigError, ServerError};
use crate::solver;

type HandlerError = (StatusCode, String);

fn rejected(e: ConfigError) -> HandlerError {
    warn!("Rejected configuration: {}", e);
    (StatusCode::BAD_REQUEST, e.to_string())
}

async fn generate_handler(
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerationResult>, HandlerError> {
    request.config.check_shape().map_err(rejected)?;
    tokio::task::spawn_blocking(move || solver::generate(&request.config, &request.options))
        .await
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

async fn penalty_handler(
    Json(request): Json<PenaltyRequest>,
) -> Result<Json<Diagnostics>, HandlerError> {
    request.config.check_shape().map_err(rejected)?;
    request
        .config
        .check_timetable_shape(&request.timetable)
        .map_err(rejected)?;
    Ok(Json(compute_diagnostics(
        &request.timetable,
        &request.config,
        &request.weights,
    )))
}

pub fn router() -> Router {
    Router::new()
        .route("/v1/timetable/generate", post(generate_handler))
        .route("/v1/timetable/penalty", post(penalty_handler))
}

pub async fn run_server(config: &ServerConfig) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, router()).await?;
    Ok(())
}
