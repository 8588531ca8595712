use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// `uso_ia`: one row per metered AI call
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UsageRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub recurso: String,
    pub modelo: String,
    /// Vendor billing units: tokens, characters or seconds depending on the model
    pub tokens_entrada: i64,
    pub tokens_saida: i64,
    pub custo: Decimal,
    pub created_at: DateTime<Utc>,
}
