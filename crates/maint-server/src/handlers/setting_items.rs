//! Setting item handlers (get, create, patch, delete).

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use maint_core::{PatchOperation, SettingItem, SettingItemDraft, SettingItemId};

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/maintenance/settingitem/{id}`
pub async fn get_setting_item(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<SettingItem>, ApiError> {
    let Path(id) = id?;
    let service = state.service.lock().await;
    Ok(Json(service.get_setting_item(SettingItemId(id))?))
}

/// Creates a setting item under an existing setting (`settingId` in the body).
///
/// `POST /api/maintenance/settingitem`
pub async fn create_setting_item(
    State(state): State<AppState>,
    body: Result<Json<SettingItemDraft>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(draft) = body?;
    let mut service = state.service.lock().await;
    let created = service.create_setting_item(&draft)?;
    let location = format!("/api/maintenance/settingitem/{}", created.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)))
}

/// Applies a JSON Patch document. The whole document is rejected if any
/// operation fails or the result breaks the variant rule.
///
/// `PATCH /api/maintenance/settingitem/{id}`
pub async fn patch_setting_item(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<Vec<PatchOperation>>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let Json(operations) = body?;
    let mut service = state.service.lock().await;
    service.patch_setting_item(SettingItemId(id), &operations)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/maintenance/settingitem/{id}`
pub async fn delete_setting_item(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let mut service = state.service.lock().await;
    service.delete_setting_item(SettingItemId(id))?;
    Ok(StatusCode::NO_CONTENT)
}
