use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::*;
use super::query::{like_pattern, Insert, Range, Select, SortDirection, Update};
use super::store::*;
use crate::config::DatabaseConfig;
use crate::types::{AiResource, SubscriptionStatus};

/// Store backed by the managed Postgres database
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        Ok(Self::new(DatabaseManager::connect(config).await?))
    }
}

/// Unique violations surface as `Conflict` instead of a generic SQL error
fn unique_violation(err: DatabaseError) -> DatabaseError {
    match err {
        DatabaseError::Sqlx(sqlx::Error::Database(db)) if db.code().as_deref() == Some("23505") => {
            DatabaseError::Conflict(db.message().to_string())
        }
        other => other,
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>, DatabaseError> {
        Select::from("profiles").eq("id", id).fetch_optional(&self.pool).await
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<Profile, DatabaseError> {
        Insert::table("profiles")
            .value("id", profile.id)
            .value_opt("email", profile.email.clone())
            .value_opt("nome", profile.nome.clone())
            .value("plano", profile.plano.as_str())
            .value("papel", profile.papel.as_str())
            .value("created_at", profile.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(unique_violation)
    }

    async fn insert_user_stats(&self, stats: &UserStats) -> Result<(), DatabaseError> {
        Insert::table("estatisticas_usuario")
            .value("user_id", stats.user_id)
            .value("questoes_respondidas", stats.questoes_respondidas)
            .value("acertos", stats.acertos)
            .value("created_at", stats.created_at)
            .execute(&self.pool)
            .await
            .map_err(unique_violation)?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn list_disciplines(&self) -> Result<Vec<Discipline>, DatabaseError> {
        Select::from("disciplinas").order("nome", SortDirection::Asc).fetch_all(&self.pool).await
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>, DatabaseError> {
        Select::from("assuntos").order("nome", SortDirection::Asc).fetch_all(&self.pool).await
    }

    async fn list_subtopics(&self) -> Result<Vec<Subtopic>, DatabaseError> {
        Select::from("subassuntos").order("nome", SortDirection::Asc).fetch_all(&self.pool).await
    }

    async fn list_exam_boards(&self) -> Result<Vec<ExamBoard>, DatabaseError> {
        Select::from("bancas").order("nome", SortDirection::Asc).fetch_all(&self.pool).await
    }
}

#[async_trait]
impl QuestionStore for PgStore {
    async fn list_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>, DatabaseError> {
        let mut select = Select::from("questoes_med")
            .eq_opt("disciplina_id", filter.disciplina_id)
            .eq_opt("assunto_id", filter.assunto_id)
            .eq_opt("subassunto_id", filter.subassunto_id)
            .eq_opt("banca", filter.banca.clone());
        if let Some(termo) = &filter.termo {
            select = select.ilike("enunciado", like_pattern(termo));
        }
        if let Some(range) = filter.range {
            select = select.with_range(range);
        }
        select
            .order("ano", SortDirection::Desc)
            .order("id", SortDirection::Asc)
            .fetch_all(&self.pool)
            .await
    }

    async fn find_question(&self, id: Uuid) -> Result<Option<Question>, DatabaseError> {
        Select::from("questoes_med").eq("id", id).fetch_optional(&self.pool).await
    }

    async fn correct_question(&self, id: Uuid, correction: &QuestionCorrection) -> Result<Question, DatabaseError> {
        Update::table("questoes_med")
            .set_opt("gabarito", correction.gabarito.clone())
            .set_opt("explicacao", correction.explicacao.clone())
            .set_opt("enunciado", correction.enunciado.clone())
            .set("updated_at", Utc::now())
            .eq("id", id)
            .fetch_one(&self.pool)
            .await
    }

    async fn insert_answer(&self, answer: &Answer) -> Result<Answer, DatabaseError> {
        Insert::table("respostas_med")
            .value("id", answer.id)
            .value("user_id", answer.user_id)
            .value("questao_id", answer.questao_id)
            .value("alternativa", answer.alternativa.as_str())
            .value("correta", answer.correta)
            .value("created_at", answer.created_at)
            .fetch_one(&self.pool)
            .await
    }

    async fn list_answers(&self, user_id: Uuid, range: Range) -> Result<Vec<Answer>, DatabaseError> {
        Select::from("respostas_med")
            .eq("user_id", user_id)
            .order("created_at", SortDirection::Desc)
            .with_range(range)
            .fetch_all(&self.pool)
            .await
    }
}

#[async_trait]
impl ContentStore for PgStore {
    async fn find_theory(&self, id: Uuid) -> Result<Option<Theory>, DatabaseError> {
        Select::from("teorias_med").eq("id", id).fetch_optional(&self.pool).await
    }

    async fn search_theories(&self, term: &str, limit: i64) -> Result<Vec<Theory>, DatabaseError> {
        Select::from("teorias_med")
            .ilike("titulo", like_pattern(term))
            .order("titulo", SortDirection::Asc)
            .range(0, limit.max(1) - 1)
            .fetch_all(&self.pool)
            .await
    }

    async fn upsert_reading_progress(&self, progress: &ReadingProgress) -> Result<ReadingProgress, DatabaseError> {
        Insert::table("progresso_leitura_med")
            .value("user_id", progress.user_id)
            .value("teoria_id", progress.teoria_id)
            .value("percentual", progress.percentual)
            .value("concluido", progress.concluido)
            .value("updated_at", progress.updated_at)
            .on_conflict(&["user_id", "teoria_id"])
            .fetch_one(&self.pool)
            .await
    }

    async fn list_reading_progress(&self, user_id: Uuid) -> Result<Vec<ReadingProgress>, DatabaseError> {
        Select::from("progresso_leitura_med")
            .eq("user_id", user_id)
            .order("updated_at", SortDirection::Desc)
            .fetch_all(&self.pool)
            .await
    }

    async fn insert_summary(&self, summary: &Summary) -> Result<Summary, DatabaseError> {
        Insert::table("resumos_ia")
            .value("id", summary.id)
            .value("user_id", summary.user_id)
            .value("titulo", summary.titulo.as_str())
            .value("conteudo", summary.conteudo.as_str())
            .value("publico", summary.publico)
            .value("created_at", summary.created_at)
            .fetch_one(&self.pool)
            .await
    }

    async fn find_summary(&self, id: Uuid) -> Result<Option<Summary>, DatabaseError> {
        Select::from("resumos_ia").eq("id", id).fetch_optional(&self.pool).await
    }

    async fn list_summaries(&self, user_id: Uuid) -> Result<Vec<Summary>, DatabaseError> {
        Select::from("resumos_ia")
            .eq("user_id", user_id)
            .order("created_at", SortDirection::Desc)
            .fetch_all(&self.pool)
            .await
    }

    async fn set_summary_public(&self, id: Uuid, publico: bool) -> Result<Summary, DatabaseError> {
        Update::table("resumos_ia").set("publico", publico).eq("id", id).fetch_one(&self.pool).await
    }
}

#[async_trait]
impl SubscriptionStore for PgStore {
    async fn latest_subscription(&self, user_id: Uuid) -> Result<Option<Subscription>, DatabaseError> {
        Select::from("assinaturas")
            .eq("user_id", user_id)
            .order("created_at", SortDirection::Desc)
            .range(0, 0)
            .fetch_optional(&self.pool)
            .await
    }

    async fn insert_subscription(&self, subscription: &Subscription) -> Result<Subscription, DatabaseError> {
        Insert::table("assinaturas")
            .value("id", subscription.id)
            .value("user_id", subscription.user_id)
            .value("plano", subscription.plano.as_str())
            .value("status", subscription.status.as_str())
            .value("referencia", subscription.referencia.as_str())
            .value_opt("inicio", subscription.inicio)
            .value_opt("fim", subscription.fim)
            .value("created_at", subscription.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(unique_violation)
    }

    async fn find_subscription_by_reference(&self, referencia: &str) -> Result<Option<Subscription>, DatabaseError> {
        Select::from("assinaturas").eq("referencia", referencia).fetch_optional(&self.pool).await
    }

    async fn update_subscription(
        &self,
        id: Uuid,
        status: SubscriptionStatus,
        inicio: Option<DateTime<Utc>>,
        fim: Option<DateTime<Utc>>,
    ) -> Result<Subscription, DatabaseError> {
        Update::table("assinaturas")
            .set("status", status.as_str())
            .set_opt("inicio", inicio)
            .set_opt("fim", fim)
            .eq("id", id)
            .fetch_one(&self.pool)
            .await
    }
}

#[async_trait]
impl UsageStore for PgStore {
    async fn count_usage_since(
        &self,
        user_id: Uuid,
        resource: AiResource,
        since: DateTime<Utc>,
    ) -> Result<i64, DatabaseError> {
        Select::from("uso_ia")
            .eq("user_id", user_id)
            .eq("recurso", resource.as_str())
            .gte("created_at", since)
            .count(&self.pool)
            .await
    }

    async fn insert_usage(&self, record: &UsageRecord) -> Result<(), DatabaseError> {
        Insert::table("uso_ia")
            .value("id", record.id)
            .value("user_id", record.user_id)
            .value("recurso", record.recurso.as_str())
            .value("modelo", record.modelo.as_str())
            .value("tokens_entrada", record.tokens_entrada)
            .value("tokens_saida", record.tokens_saida)
            .value("custo", record.custo)
            .value("created_at", record.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl StudyStore for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
