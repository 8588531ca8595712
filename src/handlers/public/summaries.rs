use axum::{extract::State, Json};
use uuid::Uuid;

use crate::api::ApiPath;
use crate::app::AppState;
use crate::database::models::Summary;
use crate::database::ContentStore;
use crate::error::ApiError;

/// GET /api/publico/resumos/:id - a summary its owner chose to share
///
/// Private and missing summaries are indistinguishable (404).
pub async fn shared_summary_get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Summary>, ApiError> {
    state
        .store
        .find_summary(id)
        .await?
        .filter(|s| s.publico)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Resumo não encontrado"))
}
