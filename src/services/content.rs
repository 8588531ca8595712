use serde::Serialize;
use uuid::Uuid;

use crate::database::models::Theory;
use crate::types::{AccessLevel, Plan};

fn non_blank(content: &Option<String>) -> Option<&str> {
    content.as_deref().filter(|s| !s.trim().is_empty())
}

/// Richest non-blank content at or below `level`, with the tier it came from.
pub fn content_for_level(theory: &Theory, level: AccessLevel) -> (AccessLevel, &str) {
    if level >= AccessLevel::Expert {
        if let Some(content) = non_blank(&theory.conteudo_expert) {
            return (AccessLevel::Expert, content);
        }
    }
    if level >= AccessLevel::Advanced {
        if let Some(content) = non_blank(&theory.conteudo_avancado) {
            return (AccessLevel::Advanced, content);
        }
    }
    (AccessLevel::Basic, theory.conteudo_basico.as_str())
}

#[derive(Debug, Clone, Serialize)]
pub struct ServedTheory {
    pub id: Uuid,
    pub titulo: String,
    pub conteudo: String,
    pub nivel_solicitado: AccessLevel,
    pub nivel_permitido: AccessLevel,
    pub nivel_servido: AccessLevel,
}

/// The plan caps the requested level before the tier fallback applies.
pub fn serve_theory(theory: &Theory, requested: AccessLevel, plan: Plan) -> ServedTheory {
    let allowed = requested.min(plan.max_access_level());
    let (served, content) = content_for_level(theory, allowed);

    ServedTheory {
        id: theory.id,
        titulo: theory.titulo.clone(),
        conteudo: content.to_string(),
        nivel_solicitado: requested,
        nivel_permitido: allowed,
        nivel_servido: served,
    }
}
