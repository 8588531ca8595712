// Protected handlers (bearer JWT required)
//
// `jwt_auth_middleware` runs first and leaves an `AuthUser` in the request
// extensions; handlers read it with `Extension<AuthUser>`.

pub mod ai;
pub mod billing;
pub mod catalog;
pub mod profile;
pub mod questions;
pub mod study;
pub mod summaries;

pub use ai::{
    ai_audio_post, ai_chat_post, ai_image_prompt_post, ai_summary_post, ai_transcription_post, ai_usage_get,
    images_get,
};
pub use billing::{checkout_post, checkout_status_get, subscription_get};
pub use catalog::{exam_boards_get, filters_get};
pub use profile::profile_get;
pub use questions::{corrections_post, question_hash_post, questions_get};
pub use study::{answer_post, answers_get, reading_progress_get, reading_progress_post, theory_get};
pub use summaries::{summaries_get, summary_get, summary_patch};

use chrono::Utc;

use crate::app::AppState;
use crate::database::models::Profile;
use crate::database::SubscriptionStore;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::{billing as billing_service, profile as profile_service};
use crate::types::Plan;

/// The caller's profile and the plan currently in effect for them
pub(crate) async fn caller_plan(state: &AppState, user: &AuthUser) -> Result<(Profile, Plan), ApiError> {
    let profile = profile_service::ensure_profile(state.store.as_ref(), user).await?;
    let latest = state.store.latest_subscription(user.id).await?;
    let plan = billing_service::summarize(&profile, latest, Utc::now()).plano;
    Ok((profile, plan))
}

/// Rejects blank required text fields with a 400
pub(crate) fn required_text<'a>(value: &'a str, field: &str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::bad_request(format!("Campo obrigatório: {}", field)));
    }
    Ok(trimmed)
}
