use axum::{extract::State, Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{ApiJson, ApiQuery};
use crate::app::AppState;
use crate::database::SubscriptionStore;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::billing::{self, SubscriptionSummary};
use crate::services::profile::ensure_profile;
use crate::types::Plan;

/// GET /api/assinatura - `{plano, assinatura, isPro}`
pub async fn subscription_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<SubscriptionSummary>, ApiError> {
    let profile = ensure_profile(state.store.as_ref(), &user).await?;
    let latest = state.store.latest_subscription(user.id).await?;
    Ok(Json(billing::summarize(&profile, latest, Utc::now())))
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub plano: Plan,
}

/// POST /api/checkout - pending subscription plus the hosted checkout link
pub async fn checkout_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<CheckoutRequest>,
) -> Result<Json<Value>, ApiError> {
    if !request.plano.is_paid() {
        return Err(ApiError::bad_request("Plano gratuito não requer pagamento"));
    }
    let profile = ensure_profile(state.store.as_ref(), &user).await?;

    let subscription = billing::start_checkout(state.store.as_ref(), user.id, request.plano).await?;
    let email = profile.email.as_deref().or(user.email.as_deref());
    let url = billing::checkout_url(&state.config.billing, request.plano, &subscription.referencia, user.id, email)
        .map_err(|e| {
            tracing::error!("Invalid billing URL configuration: {}", e);
            ApiError::service_unavailable("Checkout não configurado")
        })?;

    Ok(Json(json!({
        "url": url.as_str(),
        "referencia": subscription.referencia,
    })))
}

#[derive(Debug, Deserialize)]
pub struct CheckoutStatusQuery {
    pub referencia: String,
}

/// GET /api/checkout/status?referencia= - only the owner can see a checkout
pub async fn checkout_status_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(query): ApiQuery<CheckoutStatusQuery>,
) -> Result<Json<Value>, ApiError> {
    let subscription = state
        .store
        .find_subscription_by_reference(query.referencia.trim())
        .await?
        .filter(|s| s.user_id == user.id)
        .ok_or_else(|| ApiError::not_found("Checkout não encontrado"))?;

    Ok(Json(json!({
        "referencia": subscription.referencia,
        "status": subscription.status,
        "plano": subscription.plano,
    })))
}
