// src/api.rs
//! Public HTTP surface: health check and the enriched events endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::service::EventService;
use crate::upstream::{parse_compact_date, EventQuery};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<EventService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/sentiment", get(sentiment_events))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct EventsParams {
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

fn error_body(status: StatusCode, error: &str, details: String) -> Response {
    (status, Json(json!({ "error": error, "details": details }))).into_response()
}

async fn sentiment_events(
    State(state): State<AppState>,
    Query(params): Query<EventsParams>,
) -> Response {
    let date = match params.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => match parse_compact_date(raw) {
            Some(d) => d,
            None => {
                return error_body(
                    StatusCode::BAD_REQUEST,
                    "Invalid date",
                    format!("expected YYYYMMDD, got {raw:?}"),
                )
            }
        },
        None => chrono::Utc::now().date_naive(),
    };
    let query = EventQuery::new(params.q.unwrap_or_default(), date);

    match state.service.events(&query).await {
        Ok(resp) => Json(resp).into_response(),
        Err(e) => {
            tracing::error!(target: "api", error = %e, "error fetching events");
            error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                e.to_string(),
            )
        }
    }
}
