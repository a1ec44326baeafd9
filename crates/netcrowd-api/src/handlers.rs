//! Request handlers

use crate::{ApiError, AppState};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use netcrowd_core::{
    NewReport, Report, ReportFilter, ReportPatch, campus, stats,
    stats::{IssueTypeSlice, LocationStats, Summary, TrendPoint},
    transfer::{self, ImportOutcome},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

type Shared = State<Arc<AppState>>;

/// Query parameters for listing reports; "all" means unrestricted
#[derive(Debug, Deserialize)]
pub(crate) struct ListQuery {
    #[serde(default)]
    building: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    severity: Option<String>,
    /// Free text matched against name, building, room and description
    #[serde(default)]
    search: Option<String>,
}

/// Health check endpoint
pub(crate) async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// List reports, newest first
pub(crate) async fn list_reports(
    State(state): Shared,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Report>>, ApiError> {
    let filter = ReportFilter::from_query(
        query.building.as_deref(),
        query.status.as_deref(),
        query.severity.as_deref(),
        query.search.as_deref(),
    )?;
    let reports = state.read()?.list(&filter);
    tracing::debug!(count = reports.len(), "Listed reports");
    Ok(Json(reports))
}

/// Get a single report by ID
pub(crate) async fn get_report(
    State(state): Shared,
    Path(id): Path<String>,
) -> Result<Json<Report>, ApiError> {
    let store = state.read()?;
    store
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(ApiError::NotFound(id))
}

/// File a new report
pub(crate) async fn create_report(
    State(state): Shared,
    Json(fields): Json<NewReport>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state.write()?.create(fields);
    tracing::info!(id = %report.id, building = %report.building, "Report created");
    Ok((StatusCode::CREATED, Json(report)))
}

/// Apply a partial update
pub(crate) async fn update_report(
    State(state): Shared,
    Path(id): Path<String>,
    Json(patch): Json<ReportPatch>,
) -> Result<Json<Report>, ApiError> {
    let report = state.write()?.update(&id, patch)?;
    tracing::info!(id = %report.id, status = %report.status, "Report updated");
    Ok(Json(report))
}

/// Delete a report
pub(crate) async fn delete_report(
    State(state): Shared,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let removed = state.write()?.delete(&id)?;
    tracing::info!(id = %removed.id, "Report deleted");
    Ok(Json(json!({ "message": "Report deleted successfully" })))
}

/// Per-building aggregates
pub(crate) async fn location_stats(
    State(state): Shared,
) -> Result<Json<Vec<LocationStats>>, ApiError> {
    Ok(Json(stats::location_stats(state.read()?.snapshot())))
}

pub(crate) async fn summary(State(state): Shared) -> Result<Json<Summary>, ApiError> {
    Ok(Json(stats::summary(state.read()?.snapshot())))
}

pub(crate) async fn weekly_trend(State(state): Shared) -> Result<Json<Vec<TrendPoint>>, ApiError> {
    let locale = state.locale();
    Ok(Json(stats::weekly_trend(state.read()?.snapshot(), locale)))
}

pub(crate) async fn issue_types(
    State(state): Shared,
) -> Result<Json<Vec<IssueTypeSlice>>, ApiError> {
    Ok(Json(stats::issue_type_distribution(state.read()?.snapshot())))
}

/// Download the full collection as an export document
pub(crate) async fn export(State(state): Shared) -> Result<impl IntoResponse, ApiError> {
    let document = transfer::export(&*state.read()?);
    let disposition = format!("attachment; filename=\"{}\"", document.file_name());
    tracing::info!(count = document.reports.len(), "Exported reports");
    Ok(([(header::CONTENT_DISPOSITION, disposition)], Json(document)))
}

/// Merge an export document into the store
///
/// The body is read as text so malformed documents get an import outcome
/// rather than an extractor rejection.
pub(crate) async fn import(
    State(state): Shared,
    body: String,
) -> Result<(StatusCode, Json<ImportOutcome>), ApiError> {
    let outcome = transfer::import_str(&mut *state.write()?, &body);
    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    Ok((status, Json(outcome)))
}

pub(crate) async fn reset(State(state): Shared) -> Result<Json<Value>, ApiError> {
    let mut store = state.write()?;
    store.reset_to_default();
    Ok(Json(json!({
        "message": "Reports reset to defaults",
        "total": store.len(),
    })))
}

pub(crate) async fn clear(State(state): Shared) -> Result<Json<Value>, ApiError> {
    state.write()?.clear_all();
    Ok(Json(json!({ "message": "All reports cleared" })))
}

/// Buildings, rooms and form option lists
pub(crate) async fn campus() -> impl IntoResponse {
    Json(json!({
        "buildings": campus::buildings(),
        "issueTypes": campus::ISSUE_TYPES,
        "devices": campus::DEVICES,
    }))
}
