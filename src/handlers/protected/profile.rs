use axum::{extract::State, Extension, Json};

use crate::app::AppState;
use crate::database::models::Profile;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::profile::ensure_profile;

/// GET /api/perfil - the caller's profile, created on first access
pub async fn profile_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Profile>, ApiError> {
    Ok(Json(ensure_profile(state.store.as_ref(), &user).await?))
}
