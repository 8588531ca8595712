use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::caller_plan;
use crate::api::{ApiJson, ApiPath, ApiQuery, Pagination};
use crate::app::AppState;
use crate::database::models::{Answer, ReadingProgress};
use crate::database::{ContentStore, QuestionStore};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::content::{serve_theory, ServedTheory};
use crate::types::AccessLevel;

#[derive(Debug, Default, Deserialize)]
pub struct TheoryQuery {
    pub nivel: Option<AccessLevel>,
}

/// GET /api/teorias/:id?nivel= - tiered content capped by the caller's plan
pub async fn theory_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<TheoryQuery>,
) -> Result<Json<ServedTheory>, ApiError> {
    let theory = state
        .store
        .find_theory(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Teoria não encontrada"))?;
    let (_, plan) = caller_plan(&state, &user).await?;

    Ok(Json(serve_theory(&theory, query.nivel.unwrap_or_default(), plan)))
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub questao_id: Uuid,
    pub alternativa: String,
}

/// POST /api/respostas - record an answer and reveal the key
pub async fn answer_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<AnswerRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let alternativa = request.alternativa.trim();
    if alternativa.is_empty() {
        return Err(ApiError::bad_request("Campo obrigatório: alternativa"));
    }

    let question = state
        .store
        .find_question(request.questao_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Questão não encontrada"))?;

    let correta = question
        .gabarito
        .as_deref()
        .map_or(false, |g| g.trim().eq_ignore_ascii_case(alternativa));

    let answer = Answer {
        id: Uuid::new_v4(),
        user_id: user.id,
        questao_id: question.id,
        alternativa: alternativa.to_string(),
        correta,
        created_at: Utc::now(),
    };
    state.store.insert_answer(&answer).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "correta": correta,
            "gabarito": question.gabarito,
            "explicacao": question.explicacao,
        })),
    ))
}

/// GET /api/respostas - the caller's answers, newest first
pub async fn answers_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> Result<Json<Value>, ApiError> {
    let range = pagination.to_range(&state.config.limits);
    let respostas = state.store.list_answers(user.id, range).await?;
    Ok(Json(json!({ "respostas": respostas })))
}

#[derive(Debug, Deserialize)]
pub struct ReadingProgressRequest {
    pub teoria_id: Uuid,
    pub percentual: i16,
}

/// POST /api/progresso-leitura - upsert per (user, theory); 100% marks it done
pub async fn reading_progress_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<ReadingProgressRequest>,
) -> Result<Json<ReadingProgress>, ApiError> {
    if !(0..=100).contains(&request.percentual) {
        return Err(ApiError::bad_request("percentual deve estar entre 0 e 100"));
    }
    if state.store.find_theory(request.teoria_id).await?.is_none() {
        return Err(ApiError::not_found("Teoria não encontrada"));
    }

    let progress = ReadingProgress {
        user_id: user.id,
        teoria_id: request.teoria_id,
        percentual: request.percentual,
        concluido: request.percentual == 100,
        updated_at: Utc::now(),
    };
    Ok(Json(state.store.upsert_reading_progress(&progress).await?))
}

/// GET /api/progresso-leitura
pub async fn reading_progress_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let progresso = state.store.list_reading_progress(user.id).await?;
    Ok(Json(json!({ "progresso": progresso })))
}
