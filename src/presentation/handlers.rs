// HTTP request handlers
use crate::application::range_service::RangeError;
use crate::infrastructure::csv_stream::csv_attachment;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::views::{
    ErrorView, PresetView, current_view, export_view, history_view, ranges_view,
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_HISTORY_HOURS: u32 = 24;

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub hours: Option<u32>,
}

async fn respond<T: Serialize>(status: StatusCode, data: &T, headers: &HeaderMap) -> Response {
    match json_response(status, data, accepts_brotli(headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Live reading from the device
pub async fn current_reading(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    match state.dashboard_service.current_reading().await {
        Ok(reading) => respond(StatusCode::OK, &current_view(&reading), &headers).await,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read sensor");
            respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                &ErrorView::new(e.to_string()),
                &headers,
            )
            .await
        }
    }
}

/// Historical series for every metric
pub async fn history(
    Query(query): Query<HistoryQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let hours = query.hours.unwrap_or(DEFAULT_HISTORY_HOURS).max(1);
    let history = state.dashboard_service.history(hours).await;
    respond(StatusCode::OK, &history_view(&history, &Local), &headers).await
}

/// Available tank presets
pub async fn list_presets(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let presets: Vec<PresetView> = state
        .range_service
        .presets()
        .iter()
        .map(PresetView::from)
        .collect();
    respond(StatusCode::OK, &presets, &headers).await
}

/// Safe operating ranges for a tank preset
pub async fn ranges(
    Path(tank_type): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.range_service.infer_ranges(&tank_type).await {
        Ok(bands) => respond(StatusCode::OK, &ranges_view(&bands), &headers).await,
        Err(e @ RangeError::UnknownPreset(_)) => {
            respond(StatusCode::NOT_FOUND, &ErrorView::new(e.to_string()), &headers).await
        }
    }
}

/// Bulk export as a JSON table
pub async fn export_table(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let table = state.dashboard_service.export().await;
    if table.is_empty() {
        return respond(StatusCode::NOT_FOUND, &ErrorView::new("No data available"), &headers).await;
    }
    respond(StatusCode::OK, &export_view(&table, &Local), &headers).await
}

/// Bulk export as a streamed CSV attachment
pub async fn export_csv(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let table = state.dashboard_service.export().await;
    if table.is_empty() {
        return respond(StatusCode::NOT_FOUND, &ErrorView::new("No data available"), &headers).await;
    }
    match csv_attachment(table) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
