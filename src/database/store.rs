//! Narrow data-access traits the handlers depend on.
//!
//! `PgStore` implements them over the managed Postgres backend and
//! `MemoryStore` over plain vectors for tests and database-less development.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::*;
use super::query::Range;
use crate::types::{AiResource, SubscriptionStatus};

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>, DatabaseError>;
    async fn insert_profile(&self, profile: &Profile) -> Result<Profile, DatabaseError>;
    async fn insert_user_stats(&self, stats: &UserStats) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Each list is ordered by name
    async fn list_disciplines(&self) -> Result<Vec<Discipline>, DatabaseError>;
    async fn list_subjects(&self) -> Result<Vec<Subject>, DatabaseError>;
    async fn list_subtopics(&self) -> Result<Vec<Subtopic>, DatabaseError>;
    async fn list_exam_boards(&self) -> Result<Vec<ExamBoard>, DatabaseError>;
}

#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn list_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>, DatabaseError>;
    async fn find_question(&self, id: Uuid) -> Result<Option<Question>, DatabaseError>;
    /// `NotFound` when the id does not exist
    async fn correct_question(&self, id: Uuid, correction: &QuestionCorrection) -> Result<Question, DatabaseError>;
    async fn insert_answer(&self, answer: &Answer) -> Result<Answer, DatabaseError>;
    /// Newest first
    async fn list_answers(&self, user_id: Uuid, range: Range) -> Result<Vec<Answer>, DatabaseError>;
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn find_theory(&self, id: Uuid) -> Result<Option<Theory>, DatabaseError>;
    async fn search_theories(&self, term: &str, limit: i64) -> Result<Vec<Theory>, DatabaseError>;
    async fn upsert_reading_progress(&self, progress: &ReadingProgress) -> Result<ReadingProgress, DatabaseError>;
    async fn list_reading_progress(&self, user_id: Uuid) -> Result<Vec<ReadingProgress>, DatabaseError>;
    async fn insert_summary(&self, summary: &Summary) -> Result<Summary, DatabaseError>;
    async fn find_summary(&self, id: Uuid) -> Result<Option<Summary>, DatabaseError>;
    async fn list_summaries(&self, user_id: Uuid) -> Result<Vec<Summary>, DatabaseError>;
    async fn set_summary_public(&self, id: Uuid, publico: bool) -> Result<Summary, DatabaseError>;
}

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn latest_subscription(&self, user_id: Uuid) -> Result<Option<Subscription>, DatabaseError>;
    async fn insert_subscription(&self, subscription: &Subscription) -> Result<Subscription, DatabaseError>;
    async fn find_subscription_by_reference(&self, referencia: &str) -> Result<Option<Subscription>, DatabaseError>;
    async fn update_subscription(
        &self,
        id: Uuid,
        status: SubscriptionStatus,
        inicio: Option<DateTime<Utc>>,
        fim: Option<DateTime<Utc>>,
    ) -> Result<Subscription, DatabaseError>;
}

#[async_trait]
pub trait UsageStore: Send + Sync {
    async fn count_usage_since(
        &self,
        user_id: Uuid,
        resource: AiResource,
        since: DateTime<Utc>,
    ) -> Result<i64, DatabaseError>;
    async fn insert_usage(&self, record: &UsageRecord) -> Result<(), DatabaseError>;
}

/// Everything a request handler may touch
#[async_trait]
pub trait StudyStore:
    ProfileStore + CatalogStore + QuestionStore + ContentStore + SubscriptionStore + UsageStore
{
    async fn ping(&self) -> Result<(), DatabaseError>;
}
