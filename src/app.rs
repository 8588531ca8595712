use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::database::StudyStore;
use crate::handlers::{protected, public};
use crate::middleware::{envelope_payload_too_large, jwt_auth_middleware};
use crate::vendors::Vendors;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn StudyStore>,
    pub vendors: Vendors,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn StudyStore>, vendors: Vendors) -> Self {
        Self { config: Arc::new(config), store, vendors }
    }
}

pub fn app(state: AppState) -> Router {
    let body_limit = state.config.server.max_request_size_bytes;
    let cors = cors_layer(&state.config.security.cors_origins);

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/api/publico/resumos/:id", get(public::shared_summary_get))
        .route("/api/webhooks/pagamento", post(public::payment_webhook))
        // Protected API
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(envelope_payload_too_large))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::*;

    Router::new()
        .route("/api/perfil", get(profile_get))
        .route("/api/filtros", get(filters_get))
        .route("/api/bancas", get(exam_boards_get))
        .route("/api/questoes", get(questions_get))
        .route("/api/questoes/hash", post(question_hash_post))
        .route("/api/questoes/correcoes", post(corrections_post))
        .route("/api/teorias/:id", get(theory_get))
        .route("/api/respostas", get(answers_get).post(answer_post))
        .route("/api/progresso-leitura", get(reading_progress_get).post(reading_progress_post))
        .route("/api/assinatura", get(subscription_get))
        .route("/api/checkout", post(checkout_post))
        .route("/api/checkout/status", get(checkout_status_get))
        .route("/api/resumos", get(summaries_get))
        .route("/api/resumos/:id", get(summary_get).patch(summary_patch))
        .route("/api/ia/resumo", post(ai_summary_post))
        .route("/api/ia/chat", post(ai_chat_post))
        .route("/api/ia/audio", post(ai_audio_post))
        .route("/api/ia/transcricao", post(ai_transcription_post))
        .route("/api/ia/imagem-prompt", post(ai_image_prompt_post))
        .route("/api/ia/uso", get(ai_usage_get))
        .route("/api/imagens", get(images_get))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

/// `*` allows any origin; otherwise only the configured ones
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    layer.allow_origin(allowed)
}
