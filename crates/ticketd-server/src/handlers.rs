use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use ticketd_core::{ResolveError, Resolved, Source, TierStats};
use tokio::time::Instant;

use crate::metrics;
use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
}

/// Successful resolution body.
#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub identity: String,
    pub ticket: String,
    pub source: Source,
    pub elapsed_ms: u64,
}

/// Failed resolution body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    pub elapsed_ms: u64,
}

#[derive(Serialize)]
struct TierReadiness {
    backend: &'static str,
    #[serde(flatten)]
    stats: TierStats,
}

pub async fn root(uri: Uri) -> impl IntoResponse {
    let body = json!({
        "error": format!("no route for {}", uri.path()),
        "code": StatusCode::NOT_FOUND.as_u16(),
    });
    (StatusCode::NOT_FOUND, Json(body))
}

pub async fn resolve_user(
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> Response {
    resolve(&state, identity).await
}

/// `/user/` with nothing after it: the empty identity.
pub async fn resolve_empty_user(State(state): State<AppState>) -> Response {
    resolve(&state, String::new()).await
}

async fn resolve(state: &AppState, identity: String) -> Response {
    let start = Instant::now();
    let outcome = state.resolver.resolve(&identity).await;
    let elapsed = start.elapsed();
    let elapsed_ms = elapsed.as_millis() as u64;

    metrics::record_tier_stats(&state.resolver.stats());

    match outcome {
        Ok(Resolved { ticket, source }) => {
            metrics::record_resolution(source, elapsed);
            tracing::info!(
                identity = %identity,
                ticket = %ticket,
                source = %source,
                code = 200,
                elapsed_ms,
                "ticket resolved"
            );
            let body = TicketResponse {
                identity,
                ticket: ticket.into_inner(),
                source,
                elapsed_ms,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            metrics::record_failure(&e, elapsed);
            let status = error_status(&e);
            tracing::info!(
                identity = %identity,
                code = status.as_u16(),
                error = %e,
                elapsed_ms,
                "ticket resolution failed"
            );
            let body = ErrorResponse {
                error: e.to_string(),
                code: status.as_u16(),
                elapsed_ms,
            };
            (status, Json(body)).into_response()
        }
    }
}

fn error_status(e: &ResolveError) -> StatusCode {
    StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let resolver = &state.resolver;
    let stats = resolver.stats();
    let cache = TierReadiness {
        backend: resolver.cache().backend_name(),
        stats: stats.cache,
    };
    let store = TierReadiness {
        backend: resolver.store().backend_name(),
        stats: stats.store,
    };
    let compute = TierReadiness {
        backend: "sequence",
        stats: stats.compute,
    };
    let body = json!({
        "status": "ready",
        "tiers": { "cache": cache, "store": store, "compute": compute },
        "tickets_issued": stats.tickets_issued,
    });
    (StatusCode::OK, Json(body))
}

pub async fn prometheus_metrics() -> Response {
    match metrics::render_metrics() {
        Some(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics not initialized").into_response(),
    }
}
