use axum::{extract::State, http::HeaderMap, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::ApiJson;
use crate::app::AppState;
use crate::error::ApiError;
use crate::services::billing;
use crate::types::SubscriptionStatus;

pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

#[derive(Debug, Deserialize)]
pub struct PaymentNotification {
    pub referencia: String,
    pub status: String,
}

/// POST /api/webhooks/pagamento - payment provider notification
///
/// Expected Input:
/// ```json
/// { "referencia": "4f1c...", "status": "approved" }
/// ```
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(notification): ApiJson<PaymentNotification>,
) -> Result<Json<Value>, ApiError> {
    let expected = &state.config.security.webhook_secret;
    if expected.is_empty() {
        return Err(ApiError::service_unavailable("Segredo do webhook não configurado"));
    }
    let provided = headers.get(WEBHOOK_SECRET_HEADER).and_then(|v| v.to_str().ok());
    if provided != Some(expected.as_str()) {
        tracing::warn!("Rejected payment webhook with invalid secret");
        return Err(ApiError::unauthorized("Segredo do webhook inválido"));
    }

    let status = SubscriptionStatus::from_provider(&notification.status)
        .ok_or_else(|| ApiError::bad_request(format!("Status de pagamento desconhecido: {}", notification.status)))?;

    let subscription = billing::apply_payment_update(
        state.store.as_ref(),
        &state.config.billing,
        notification.referencia.trim(),
        status,
    )
    .await?;

    Ok(Json(json!({
        "referencia": subscription.referencia,
        "status": subscription.status,
    })))
}
