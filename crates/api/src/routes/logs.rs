//! Campaign log endpoint handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::{Form, Query};
use chrono::{Local, Utc};
use domain::error::LogError;
use domain::models::log_entry::{
    DeleteLogResponse, ListLogsQuery, LogEntryResponse, LogMutationResponse, SubmitLogForm,
    UpdateLogForm,
};
use domain::services::{build_listing, ensure_unique, ListLogsResponse, LogFilter};
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{
    record_duplicate_rejected, record_log_deleted, record_log_updated, record_logs_created,
};

/// Counts duplicate rejections before handing the error to the web layer.
fn rejected(err: LogError) -> ApiError {
    if matches!(err, LogError::Duplicate { .. }) {
        record_duplicate_rejected();
    }
    err.into()
}

/// List logs.
///
/// GET /api/v1/logs
///
/// Without filters, returns the recent window plus the campaign gap report.
/// Any of `location` (repeatable), `campaign` (repeatable), `log_date` or
/// `abnormal` switches to filtering over every stored log.
pub async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<ListLogsQuery>,
) -> Result<Json<ListLogsResponse>, ApiError> {
    let filter = LogFilter::from(query);
    let entries = state.store.list_all().await?;
    let today = Local::now().date_naive();

    let listing = build_listing(entries, &filter, today, state.config.listing.recent_days);

    Ok(Json(listing.into()))
}

/// Create logs, one per selected location.
///
/// POST /api/v1/logs
///
/// The whole submission is validated and checked for duplicates before any
/// record is written. New records get consecutive ids and share a timestamp.
pub async fn create_logs(
    State(state): State<AppState>,
    Form(form): Form<SubmitLogForm>,
) -> Result<(StatusCode, Json<LogMutationResponse>), ApiError> {
    let details = form.into_details()?;

    for detail in &details {
        ensure_unique(state.store.as_ref(), detail, None)
            .await
            .map_err(rejected)?;
    }

    let first_id = state.store.next_id().await?;
    let timestamp = Utc::now();
    let entries: Vec<_> = details
        .into_iter()
        .zip(first_id..)
        .map(|(detail, id)| detail.into_entry(id, timestamp))
        .collect();

    state.store.upsert_many(&entries).await?;
    record_logs_created(entries.len());

    for entry in &entries {
        info!(
            log_id = entry.id,
            campaign_number = %entry.campaign_number,
            location = %entry.location,
            log_date = %entry.log_date,
            "Log created"
        );
    }

    let message = if entries.len() == 1 {
        "Log successfully added!".to_string()
    } else {
        format!("Log added for {} locations.", entries.len())
    };

    Ok((
        StatusCode::CREATED,
        Json(LogMutationResponse {
            message,
            logs: entries.into_iter().map(Into::into).collect(),
        }),
    ))
}

/// Fetch a single log.
///
/// GET /api/v1/logs/:log_id
pub async fn get_log(
    State(state): State<AppState>,
    Path(log_id): Path<i64>,
) -> Result<Json<LogEntryResponse>, ApiError> {
    let entry = state
        .store
        .get(log_id)
        .await?
        .ok_or(LogError::NotFound(log_id))?;

    Ok(Json(entry.into()))
}

/// Replace a log's content, keeping its id.
///
/// PUT or POST /api/v1/logs/:log_id
pub async fn update_log(
    State(state): State<AppState>,
    Path(log_id): Path<i64>,
    Form(form): Form<UpdateLogForm>,
) -> Result<Json<LogMutationResponse>, ApiError> {
    if state.store.get(log_id).await?.is_none() {
        return Err(LogError::NotFound(log_id).into());
    }

    let details = form.into_details()?;
    ensure_unique(state.store.as_ref(), &details, Some(log_id))
        .await
        .map_err(rejected)?;

    let entry = details.into_entry(log_id, Utc::now());
    state.store.upsert(&entry).await?;
    record_log_updated();

    info!(
        log_id = entry.id,
        campaign_number = %entry.campaign_number,
        location = %entry.location,
        "Log updated"
    );

    Ok(Json(LogMutationResponse {
        message: "Log successfully updated!".to_string(),
        logs: vec![entry.into()],
    }))
}

/// Delete a log.
///
/// DELETE /api/v1/logs/:log_id
pub async fn delete_log(
    State(state): State<AppState>,
    Path(log_id): Path<i64>,
) -> Result<Json<DeleteLogResponse>, ApiError> {
    if !state.store.delete(log_id).await? {
        return Err(LogError::NotFound(log_id).into());
    }
    record_log_deleted();

    info!(log_id, "Log deleted");

    Ok(Json(DeleteLogResponse {
        message: "Log deleted successfully.".to_string(),
        id: log_id,
    }))
}
