use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{caller_plan, required_text};
use crate::api::{ApiJson, ApiQuery, Pagination};
use crate::app::AppState;
use crate::database::models::QuestionFilter;
use crate::database::QuestionStore;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::corrections::{apply_corrections, CorrectionItem, CorrectionReport};
use crate::services::hashing::hash_text;
use crate::types::Role;

#[derive(Debug, Default, Deserialize)]
pub struct QuestionQuery {
    pub disciplina_id: Option<i64>,
    pub assunto_id: Option<i64>,
    pub subassunto_id: Option<i64>,
    pub banca: Option<String>,
    pub termo: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// GET /api/questoes - filtered, paginated question list
pub async fn questions_get(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<QuestionQuery>,
) -> Result<Json<Value>, ApiError> {
    let pagination = Pagination { page: query.page, per_page: query.per_page };
    let limits = &state.config.limits;

    let filter = QuestionFilter {
        disciplina_id: query.disciplina_id,
        assunto_id: query.assunto_id,
        subassunto_id: query.subassunto_id,
        banca: query.banca.filter(|b| !b.trim().is_empty()),
        termo: query.termo.filter(|t| !t.trim().is_empty()),
        range: Some(pagination.to_range(limits)),
    };
    let questoes = state.store.list_questions(&filter).await?;

    Ok(Json(json!({
        "questoes": questoes,
        "page": pagination.page(),
        "per_page": pagination.per_page(limits),
    })))
}

#[derive(Debug, Deserialize)]
pub struct HashRequest {
    pub texto: Option<String>,
    pub textos: Option<Vec<String>>,
}

/// POST /api/questoes/hash - normalized SHA-256 of one text or a list
///
/// `{texto}` → `{hash}`, `{textos: [...]}` → `{hashes: [...]}` in input order.
pub async fn question_hash_post(ApiJson(request): ApiJson<HashRequest>) -> Result<Json<Value>, ApiError> {
    match (request.texto, request.textos) {
        (Some(texto), None) => {
            required_text(&texto, "texto")?;
            Ok(Json(json!({ "hash": hash_text(&texto) })))
        }
        (None, Some(textos)) => {
            if textos.is_empty() {
                return Err(ApiError::bad_request("Campo obrigatório: textos"));
            }
            let hashes = textos
                .iter()
                .map(|t| required_text(t, "textos").map(|_| hash_text(t)))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Json(json!({ "hashes": hashes })))
        }
        _ => Err(ApiError::bad_request("Informe texto ou textos")),
    }
}

#[derive(Debug, Deserialize)]
pub struct CorrectionsRequest {
    pub correcoes: Vec<CorrectionItem>,
}

/// POST /api/questoes/correcoes - admin batch correction
///
/// Each item is applied on its own; the report lists the failures.
pub async fn corrections_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<CorrectionsRequest>,
) -> Result<Json<CorrectionReport>, ApiError> {
    let (profile, _) = caller_plan(&state, &user).await?;
    if profile.role() != Role::Admin {
        return Err(ApiError::forbidden("Apenas administradores podem corrigir questões"));
    }

    let max = state.config.limits.max_batch_size;
    if request.correcoes.len() > max {
        return Err(ApiError::bad_request(format!("No máximo {} correções por lote", max)));
    }

    let report = apply_corrections(state.store.as_ref(), &request.correcoes).await;
    tracing::info!(
        "User {} corrected {}/{} questions",
        user.id,
        report.sucesso,
        report.total
    );
    Ok(Json(report))
}
