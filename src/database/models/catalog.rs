use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::query::Range;

/// Top level of the classification hierarchy (`disciplinas`)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Discipline {
    pub id: i64,
    pub nome: String,
}

/// `assuntos`, child of a discipline
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subject {
    pub id: i64,
    pub nome: String,
    pub disciplina_id: i64,
}

/// `subassuntos`, child of a subject
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subtopic {
    pub id: i64,
    pub nome: String,
    pub assunto_id: i64,
}

/// `bancas`, exam-board registry with a denormalized question count
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExamBoard {
    pub id: i64,
    pub nome: String,
    pub sigla: Option<String>,
    pub total_questoes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: Uuid,
    pub enunciado: String,
    /// Array of `{letra, texto}` objects as stored by the importer
    pub alternativas: Value,
    pub gabarito: Option<String>,
    pub explicacao: Option<String>,
    pub banca: Option<String>,
    pub ano: Option<i32>,
    pub disciplina_id: Option<i64>,
    pub assunto_id: Option<i64>,
    pub subassunto_id: Option<i64>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct QuestionFilter {
    pub disciplina_id: Option<i64>,
    pub assunto_id: Option<i64>,
    pub subassunto_id: Option<i64>,
    pub banca: Option<String>,
    /// Case-insensitive substring of the statement
    pub termo: Option<String>,
    pub range: Option<Range>,
}

/// Fields an editor may correct on a question
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionCorrection {
    pub gabarito: Option<String>,
    pub explicacao: Option<String>,
    pub enunciado: Option<String>,
}

impl QuestionCorrection {
    pub fn is_empty(&self) -> bool {
        self.gabarito.is_none() && self.explicacao.is_none() && self.enunciado.is_none()
    }
}
