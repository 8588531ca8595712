use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::database::models::QuestionCorrection;
use crate::database::{DatabaseError, QuestionStore};

#[derive(Debug, Clone, Deserialize)]
pub struct CorrectionItem {
    /// Kept raw and parsed per item; a missing or non-string id fails only its item
    #[serde(default)]
    pub id: Value,
    #[serde(flatten)]
    pub correction: QuestionCorrection,
}

impl CorrectionItem {
    /// The id as echoed back in a failure entry
    pub fn id_text(&self) -> String {
        match &self.id {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrectionFailure {
    pub id: String,
    pub erro: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CorrectionReport {
    pub total: usize,
    pub sucesso: usize,
    pub erros: usize,
    pub falhas: Vec<CorrectionFailure>,
}

/// Applies each correction independently; `sucesso + erros == total`.
pub async fn apply_corrections<S>(store: &S, items: &[CorrectionItem]) -> CorrectionReport
where
    S: QuestionStore + ?Sized,
{
    let mut report = CorrectionReport { total: items.len(), ..Default::default() };

    for item in items {
        match apply_one(store, item).await {
            Ok(()) => report.sucesso += 1,
            Err(erro) => {
                let id = item.id_text();
                warn!("Correction of question {} failed: {}", id, erro);
                report.erros += 1;
                report.falhas.push(CorrectionFailure { id, erro });
            }
        }
    }

    report
}

async fn apply_one<S>(store: &S, item: &CorrectionItem) -> Result<(), String>
where
    S: QuestionStore + ?Sized,
{
    let id = item
        .id
        .as_str()
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
        .ok_or_else(|| "id inválido".to_string())?;
    if item.correction.is_empty() {
        return Err("nenhum campo para corrigir".to_string());
    }

    match store.correct_question(id, &item.correction).await {
        Ok(_) => Ok(()),
        Err(DatabaseError::NotFound(_)) => Err("questão não encontrada".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Question;
    use crate::database::{MemoryStore, MemoryTables};
    use serde_json::json;

    fn question(id: Uuid) -> Question {
        Question {
            id,
            enunciado: "Enunciado".into(),
            alternativas: json!([]),
            gabarito: Some("A".into()),
            explicacao: None,
            banca: None,
            ano: None,
            disciplina_id: None,
            assunto_id: None,
            subassunto_id: None,
            updated_at: None,
        }
    }

    fn item(id: &str, gabarito: Option<&str>) -> CorrectionItem {
        CorrectionItem {
            id: Value::String(id.to_string()),
            correction: QuestionCorrection { gabarito: gabarito.map(Into::into), ..Default::default() },
        }
    }

    #[tokio::test]
    async fn failures_are_isolated_and_counted() {
        let known = Uuid::new_v4();
        let store = MemoryStore::with_tables(MemoryTables { questions: vec![question(known)], ..Default::default() });

        let items = vec![
            item(&known.to_string(), Some("C")),
            item(&Uuid::new_v4().to_string(), Some("B")),
            item("not-a-uuid", Some("B")),
            item(&known.to_string(), None),
        ];
        let report = apply_corrections(&store, &items).await;

        assert_eq!(report.total, 4);
        assert_eq!(report.sucesso, 1);
        assert_eq!(report.erros, 3);
        assert_eq!(report.sucesso + report.erros, report.total);
        assert_eq!(report.falhas.len(), 3);
        assert_eq!(report.falhas[1].erro, "id inválido");

        let stored = store.find_question(known).await.unwrap().unwrap();
        assert_eq!(stored.gabarito.as_deref(), Some("C"));
        assert!(stored.updated_at.is_some());
    }

    #[tokio::test]
    async fn empty_batch_reports_zero() {
        let report = apply_corrections(&MemoryStore::new(), &[]).await;
        assert_eq!((report.total, report.sucesso, report.erros), (0, 0, 0));
    }

    #[tokio::test]
    async fn non_string_or_missing_ids_fail_only_their_item() {
        let known = Uuid::new_v4();
        let store = MemoryStore::with_tables(MemoryTables { questions: vec![question(known)], ..Default::default() });

        let items: Vec<CorrectionItem> = serde_json::from_value(json!([
            {"id": known.to_string(), "gabarito": "B"},
            {"id": 42, "gabarito": "C"},
            {"gabarito": "D"},
        ]))
        .unwrap();
        let report = apply_corrections(&store, &items).await;

        assert_eq!((report.total, report.sucesso, report.erros), (3, 1, 2));
        assert_eq!(report.falhas[0], CorrectionFailure { id: "42".into(), erro: "id inválido".into() });
        assert_eq!(report.falhas[1], CorrectionFailure { id: String::new(), erro: "id inválido".into() });
    }

    #[test]
    fn item_deserializes_flat_fields() {
        let item: CorrectionItem =
            serde_json::from_value(json!({"id": "x", "gabarito": "D", "explicacao": "porque"})).unwrap();
        assert_eq!(item.correction.gabarito.as_deref(), Some("D"));
        assert!(item.correction.enunciado.is_none());
    }
}
