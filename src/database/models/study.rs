use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// `teorias_med`: reading content with one variant per access level
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Theory {
    pub id: Uuid,
    pub titulo: String,
    pub conteudo_basico: String,
    pub conteudo_avancado: Option<String>,
    pub conteudo_expert: Option<String>,
    pub disciplina_id: Option<i64>,
}

/// `respostas_med`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Answer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub questao_id: Uuid,
    pub alternativa: String,
    pub correta: bool,
    pub created_at: DateTime<Utc>,
}

/// `progresso_leitura_med`, one row per (user, theory)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReadingProgress {
    pub user_id: Uuid,
    pub teoria_id: Uuid,
    pub percentual: i16,
    pub concluido: bool,
    pub updated_at: DateTime<Utc>,
}

/// `resumos_ia`: generated summary, shareable through `publico`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Summary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub titulo: String,
    pub conteudo: String,
    pub publico: bool,
    pub created_at: DateTime<Utc>,
}
