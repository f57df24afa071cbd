//! Maintenance aggregate handlers (list, get, create, update, delete).

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use maint_core::{Maintenance, MaintenanceDraft, MaintenanceId, MaintenanceUpdate};

use crate::error::ApiError;
use crate::state::AppState;

/// Lists every maintenance task with its full subtree.
///
/// `GET /api/maintenance`
pub async fn list_maintenances(
    State(state): State<AppState>,
) -> Result<Json<Vec<Maintenance>>, ApiError> {
    let service = state.service.lock().await;
    Ok(Json(service.list_maintenances()?))
}

/// Fetches one maintenance task.
///
/// `GET /api/maintenance/{id}`
pub async fn get_maintenance(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Maintenance>, ApiError> {
    let Path(id) = id?;
    let service = state.service.lock().await;
    Ok(Json(service.get_maintenance(MaintenanceId(id))?))
}

/// Creates a maintenance task together with its nested settings, items and
/// variants. Responds 201 with a `Location` header.
///
/// `POST /api/maintenance`
pub async fn create_maintenance(
    State(state): State<AppState>,
    body: Result<Json<MaintenanceDraft>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(draft) = body?;
    let mut service = state.service.lock().await;
    let created = service.create_maintenance(&draft)?;
    let location = format!("/api/maintenance/{}", created.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)))
}

/// Replaces a maintenance task's `number` and `description`.
///
/// `PUT /api/maintenance/{id}`
pub async fn update_maintenance(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<MaintenanceUpdate>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let Json(update) = body?;
    let mut service = state.service.lock().await;
    service.update_maintenance(MaintenanceId(id), &update)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Deletes a maintenance task and everything beneath it.
///
/// `DELETE /api/maintenance/{id}`
pub async fn delete_maintenance(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let mut service = state.service.lock().await;
    service.delete_maintenance(MaintenanceId(id))?;
    Ok(StatusCode::NO_CONTENT)
}
