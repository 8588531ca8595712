use axum::{extract::State, Json};

use crate::app::AppState;
use crate::database::models::ExamBoard;
use crate::database::CatalogStore;
use crate::error::ApiError;
use crate::services::filters::{build_filter_tree, DisciplineNode};

/// GET /api/filtros - disciplines with nested subjects and subtopics
pub async fn filters_get(State(state): State<AppState>) -> Result<Json<Vec<DisciplineNode>>, ApiError> {
    let disciplines = state.store.list_disciplines().await?;
    let subjects = state.store.list_subjects().await?;
    let subtopics = state.store.list_subtopics().await?;

    Ok(Json(build_filter_tree(&disciplines, &subjects, &subtopics)))
}

/// GET /api/bancas - exam boards ordered by name
pub async fn exam_boards_get(State(state): State<AppState>) -> Result<Json<Vec<ExamBoard>>, ApiError> {
    Ok(Json(state.store.list_exam_boards().await?))
}
