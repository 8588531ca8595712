use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::*;
use super::query::Range;
use super::store::*;
use crate::types::{AiResource, SubscriptionStatus};

/// Table contents backing a `MemoryStore`
#[derive(Debug, Clone, Default)]
pub struct MemoryTables {
    pub profiles: Vec<Profile>,
    pub user_stats: Vec<UserStats>,
    pub disciplines: Vec<Discipline>,
    pub subjects: Vec<Subject>,
    pub subtopics: Vec<Subtopic>,
    pub exam_boards: Vec<ExamBoard>,
    pub questions: Vec<Question>,
    pub theories: Vec<Theory>,
    pub answers: Vec<Answer>,
    pub reading_progress: Vec<ReadingProgress>,
    pub summaries: Vec<Summary>,
    pub subscriptions: Vec<Subscription>,
    pub usage: Vec<UsageRecord>,
}

/// In-process store used by the test suite and by development runs
/// without `DATABASE_URL`. Orderings mirror the Postgres queries.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<MemoryTables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tables(tables: MemoryTables) -> Self {
        Self { tables: RwLock::new(tables) }
    }

    pub async fn snapshot(&self) -> MemoryTables {
        self.tables.read().await.clone()
    }
}

fn not_found(table: &str) -> DatabaseError {
    DatabaseError::NotFound(format!("no matching row in {}", table))
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn apply_range<T>(rows: Vec<T>, range: Range) -> Result<Vec<T>, DatabaseError> {
    if range.from < 0 || range.to < range.from {
        return Err(DatabaseError::InvalidQuery(format!("invalid range {}..={}", range.from, range.to)));
    }
    Ok(rows
        .into_iter()
        .skip(range.from as usize)
        .take(range.limit() as usize)
        .collect())
}

fn by_name<T, F: Fn(&T) -> &str>(mut rows: Vec<T>, name: F) -> Vec<T> {
    rows.sort_by(|a, b| name(a).cmp(name(b)));
    rows
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>, DatabaseError> {
        Ok(self.tables.read().await.profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<Profile, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.profiles.iter().any(|p| p.id == profile.id) {
            return Err(DatabaseError::Conflict(format!("profile {} already exists", profile.id)));
        }
        tables.profiles.push(profile.clone());
        Ok(profile.clone())
    }

    async fn insert_user_stats(&self, stats: &UserStats) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.user_stats.iter().any(|s| s.user_id == stats.user_id) {
            return Err(DatabaseError::Conflict(format!("stats for {} already exist", stats.user_id)));
        }
        tables.user_stats.push(stats.clone());
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_disciplines(&self) -> Result<Vec<Discipline>, DatabaseError> {
        let rows = self.tables.read().await.disciplines.clone();
        Ok(by_name(rows, |d| d.nome.as_str()))
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>, DatabaseError> {
        let rows = self.tables.read().await.subjects.clone();
        Ok(by_name(rows, |s| s.nome.as_str()))
    }

    async fn list_subtopics(&self) -> Result<Vec<Subtopic>, DatabaseError> {
        let rows = self.tables.read().await.subtopics.clone();
        Ok(by_name(rows, |s| s.nome.as_str()))
    }

    async fn list_exam_boards(&self) -> Result<Vec<ExamBoard>, DatabaseError> {
        let rows = self.tables.read().await.exam_boards.clone();
        Ok(by_name(rows, |b| b.nome.as_str()))
    }
}

#[async_trait]
impl QuestionStore for MemoryStore {
    async fn list_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Question> = tables
            .questions
            .iter()
            .filter(|q| filter.disciplina_id.map_or(true, |id| q.disciplina_id == Some(id)))
            .filter(|q| filter.assunto_id.map_or(true, |id| q.assunto_id == Some(id)))
            .filter(|q| filter.subassunto_id.map_or(true, |id| q.subassunto_id == Some(id)))
            .filter(|q| filter.banca.as_deref().map_or(true, |b| q.banca.as_deref() == Some(b)))
            .filter(|q| filter.termo.as_deref().map_or(true, |t| contains_ci(&q.enunciado, t)))
            .cloned()
            .collect();
        // ano DESC puts NULLs first in Postgres
        rows.sort_by(|a, b| match (a.ano, b.ano) {
            (None, None) => a.id.cmp(&b.id),
            (None, Some(_)) => std::cmp::Ordering::Less,
            (Some(_), None) => std::cmp::Ordering::Greater,
            (Some(x), Some(y)) => y.cmp(&x).then_with(|| a.id.cmp(&b.id)),
        });
        match filter.range {
            Some(range) => apply_range(rows, range),
            None => Ok(rows),
        }
    }

    async fn find_question(&self, id: Uuid) -> Result<Option<Question>, DatabaseError> {
        Ok(self.tables.read().await.questions.iter().find(|q| q.id == id).cloned())
    }

    async fn correct_question(&self, id: Uuid, correction: &QuestionCorrection) -> Result<Question, DatabaseError> {
        let mut tables = self.tables.write().await;
        let question = tables.questions.iter_mut().find(|q| q.id == id).ok_or_else(|| not_found("questoes_med"))?;
        if let Some(gabarito) = &correction.gabarito {
            question.gabarito = Some(gabarito.clone());
        }
        if let Some(explicacao) = &correction.explicacao {
            question.explicacao = Some(explicacao.clone());
        }
        if let Some(enunciado) = &correction.enunciado {
            question.enunciado = enunciado.clone();
        }
        question.updated_at = Some(Utc::now());
        Ok(question.clone())
    }

    async fn insert_answer(&self, answer: &Answer) -> Result<Answer, DatabaseError> {
        self.tables.write().await.answers.push(answer.clone());
        Ok(answer.clone())
    }

    async fn list_answers(&self, user_id: Uuid, range: Range) -> Result<Vec<Answer>, DatabaseError> {
        let mut rows: Vec<Answer> = self
            .tables
            .read()
            .await
            .answers
            .iter()
            .rev()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        apply_range(rows, range)
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn find_theory(&self, id: Uuid) -> Result<Option<Theory>, DatabaseError> {
        Ok(self.tables.read().await.theories.iter().find(|t| t.id == id).cloned())
    }

    async fn search_theories(&self, term: &str, limit: i64) -> Result<Vec<Theory>, DatabaseError> {
        let rows: Vec<Theory> = self
            .tables
            .read()
            .await
            .theories
            .iter()
            .filter(|t| contains_ci(&t.titulo, term))
            .cloned()
            .collect();
        let mut rows = by_name(rows, |t| t.titulo.as_str());
        rows.truncate(limit.max(1) as usize);
        Ok(rows)
    }

    async fn upsert_reading_progress(&self, progress: &ReadingProgress) -> Result<ReadingProgress, DatabaseError> {
        let mut tables = self.tables.write().await;
        match tables
            .reading_progress
            .iter_mut()
            .find(|p| p.user_id == progress.user_id && p.teoria_id == progress.teoria_id)
        {
            Some(existing) => *existing = progress.clone(),
            None => tables.reading_progress.push(progress.clone()),
        }
        Ok(progress.clone())
    }

    async fn list_reading_progress(&self, user_id: Uuid) -> Result<Vec<ReadingProgress>, DatabaseError> {
        let mut rows: Vec<ReadingProgress> = self
            .tables
            .read()
            .await
            .reading_progress
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(rows)
    }

    async fn insert_summary(&self, summary: &Summary) -> Result<Summary, DatabaseError> {
        self.tables.write().await.summaries.push(summary.clone());
        Ok(summary.clone())
    }

    async fn find_summary(&self, id: Uuid) -> Result<Option<Summary>, DatabaseError> {
        Ok(self.tables.read().await.summaries.iter().find(|s| s.id == id).cloned())
    }

    async fn list_summaries(&self, user_id: Uuid) -> Result<Vec<Summary>, DatabaseError> {
        let mut rows: Vec<Summary> = self
            .tables
            .read()
            .await
            .summaries
            .iter()
            .rev()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn set_summary_public(&self, id: Uuid, publico: bool) -> Result<Summary, DatabaseError> {
        let mut tables = self.tables.write().await;
        let summary = tables.summaries.iter_mut().find(|s| s.id == id).ok_or_else(|| not_found("resumos_ia"))?;
        summary.publico = publico;
        Ok(summary.clone())
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn latest_subscription(&self, user_id: Uuid) -> Result<Option<Subscription>, DatabaseError> {
        Ok(self
            .tables
            .read()
            .await
            .subscriptions
            .iter()
            .filter(|s| s.user_id == user_id)
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn insert_subscription(&self, subscription: &Subscription) -> Result<Subscription, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.subscriptions.iter().any(|s| s.referencia == subscription.referencia) {
            return Err(DatabaseError::Conflict(format!("reference {} already used", subscription.referencia)));
        }
        tables.subscriptions.push(subscription.clone());
        Ok(subscription.clone())
    }

    async fn find_subscription_by_reference(&self, referencia: &str) -> Result<Option<Subscription>, DatabaseError> {
        Ok(self
            .tables
            .read()
            .await
            .subscriptions
            .iter()
            .find(|s| s.referencia == referencia)
            .cloned())
    }

    async fn update_subscription(
        &self,
        id: Uuid,
        status: SubscriptionStatus,
        inicio: Option<DateTime<Utc>>,
        fim: Option<DateTime<Utc>>,
    ) -> Result<Subscription, DatabaseError> {
        let mut tables = self.tables.write().await;
        let subscription = tables
            .subscriptions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found("assinaturas"))?;
        subscription.status = status.as_str().to_string();
        if inicio.is_some() {
            subscription.inicio = inicio;
        }
        if fim.is_some() {
            subscription.fim = fim;
        }
        Ok(subscription.clone())
    }
}

#[async_trait]
impl UsageStore for MemoryStore {
    async fn count_usage_since(
        &self,
        user_id: Uuid,
        resource: AiResource,
        since: DateTime<Utc>,
    ) -> Result<i64, DatabaseError> {
        Ok(self
            .tables
            .read()
            .await
            .usage
            .iter()
            .filter(|u| u.user_id == user_id && u.recurso == resource.as_str() && u.created_at >= since)
            .count() as i64)
    }

    async fn insert_usage(&self, record: &UsageRecord) -> Result<(), DatabaseError> {
        self.tables.write().await.usage.push(record.clone());
        Ok(())
    }
}

#[async_trait]
impl StudyStore for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn question(enunciado: &str, ano: Option<i32>, banca: &str) -> Question {
        Question {
            id: Uuid::new_v4(),
            enunciado: enunciado.to_string(),
            alternativas: json!([]),
            gabarito: Some("A".into()),
            explicacao: None,
            banca: Some(banca.to_string()),
            ano,
            disciplina_id: Some(1),
            assunto_id: None,
            subassunto_id: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn duplicate_profile_is_a_conflict() {
        let store = MemoryStore::new();
        let profile = Profile::new(Uuid::new_v4(), None);
        store.insert_profile(&profile).await.unwrap();
        let err = store.insert_profile(&profile).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
    }

    #[tokio::test]
    async fn questions_filter_and_order_like_postgres() {
        let store = MemoryStore::with_tables(MemoryTables {
            questions: vec![
                question("Cardiomiopatia dilatada", Some(2021), "ENARE"),
                question("Asma grave", Some(2023), "ENARE"),
                question("Cardiopatia congênita", Some(2022), "USP"),
            ],
            ..Default::default()
        });

        let enare = store
            .list_questions(&QuestionFilter { banca: Some("ENARE".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(enare.iter().map(|q| q.ano).collect::<Vec<_>>(), vec![Some(2023), Some(2021)]);

        let cardio = store
            .list_questions(&QuestionFilter { termo: Some("CARDI".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(cardio.len(), 2);

        let paged = store
            .list_questions(&QuestionFilter { range: Some(Range::new(1, 1)), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(paged.len(), 1);
        assert_eq!(paged[0].ano, Some(2022));
    }

    #[tokio::test]
    async fn reading_progress_upserts_per_theory() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let teoria = Uuid::new_v4();
        for percentual in [30, 80] {
            store
                .upsert_reading_progress(&ReadingProgress {
                    user_id: user,
                    teoria_id: teoria,
                    percentual,
                    concluido: false,
                    updated_at: Utc::now(),
                })
                .await
                .unwrap();
        }
        let rows = store.list_reading_progress(user).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].percentual, 80);
    }

    #[tokio::test]
    async fn usage_count_respects_window_and_resource() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let now = Utc::now();
        for (recurso, created_at) in [("resumo", now), ("resumo", now - Duration::days(40)), ("chat", now)] {
            store
                .insert_usage(&UsageRecord {
                    id: Uuid::new_v4(),
                    user_id: user,
                    recurso: recurso.into(),
                    modelo: "gemini-1.5-flash".into(),
                    tokens_entrada: 10,
                    tokens_saida: 10,
                    custo: Decimal::ZERO,
                    created_at,
                })
                .await
                .unwrap();
        }
        let count = store
            .count_usage_since(user, AiResource::Summary, now - Duration::days(30))
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let store = MemoryStore::new();
        let err = store.set_summary_public(Uuid::new_v4(), true).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(_)));
    }
}
