use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::StudyStore;

/// GET / - service description
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "StudyHub API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Question bank, study content, AI tutoring and subscriptions for exam preparation",
        "endpoints": {
            "health": "/health (public)",
            "publico": "/api/publico/resumos/:id (public)",
            "webhooks": "/api/webhooks/pagamento (shared secret)",
            "questoes": "/api/filtros, /api/bancas, /api/questoes[/hash|/correcoes] (protected)",
            "estudo": "/api/teorias/:id, /api/respostas, /api/progresso-leitura (protected)",
            "assinatura": "/api/assinatura, /api/checkout[/status] (protected)",
            "ia": "/api/ia/{resumo,chat,audio,transcricao,imagem-prompt,uso}, /api/imagens, /api/resumos (protected)",
        }
    }))
}

/// GET /health - store connectivity
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok",
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable",
                })),
            )
        }
    }
}
