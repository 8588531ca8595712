use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::{ApiJson, ApiPath};
use crate::app::AppState;
use crate::database::models::Summary;
use crate::database::ContentStore;
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// Summaries of other users look missing rather than forbidden
async fn owned_summary(state: &AppState, user: &AuthUser, id: Uuid) -> Result<Summary, ApiError> {
    state
        .store
        .find_summary(id)
        .await?
        .filter(|s| s.user_id == user.id)
        .ok_or_else(|| ApiError::not_found("Resumo não encontrado"))
}

/// GET /api/resumos
pub async fn summaries_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let resumos = state.store.list_summaries(user.id).await?;
    Ok(Json(json!({ "resumos": resumos })))
}

/// GET /api/resumos/:id
pub async fn summary_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Summary>, ApiError> {
    Ok(Json(owned_summary(&state, &user, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    pub publico: bool,
}

/// PATCH /api/resumos/:id - share or unshare
pub async fn summary_patch(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<ShareRequest>,
) -> Result<Json<Summary>, ApiError> {
    let summary = owned_summary(&state, &user, id).await?;
    Ok(Json(state.store.set_summary_public(summary.id, request.publico).await?))
}
