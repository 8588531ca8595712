use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

pub const BODY_TOO_LARGE: &str = "Corpo da requisição excede o limite permitido";

/// Rewrites plain-text 413 responses from body limits into the error envelope
pub async fn envelope_payload_too_large(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    if response.status() != StatusCode::PAYLOAD_TOO_LARGE || is_json(&response) {
        return response;
    }
    ApiError::payload_too_large(BODY_TOO_LARGE).into_response()
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v.starts_with("application/json"))
}
