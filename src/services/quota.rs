//! Monthly AI usage quota and cost accounting.
//!
//! Every metered call inserts one `uso_ia` row; the limit check counts the
//! rows for (user, resource) since the first instant of the current UTC month.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::QuotaConfig;
use crate::database::models::UsageRecord;
use crate::database::{DatabaseError, UsageStore};
use crate::types::{AiResource, Plan};
use crate::vendors::TokenUsage;

#[derive(Debug, Error)]
pub enum QuotaError {
    #[error("limite mensal de {limit} atingido para {resource:?}")]
    LimitReached { resource: AiResource, limit: u32 },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotaStatus {
    pub recurso: AiResource,
    pub usado: i64,
    /// `None` means unlimited
    pub limite: Option<u32>,
    pub restante: Option<i64>,
}

impl QuotaStatus {
    fn new(recurso: AiResource, usado: i64, limite: Option<u32>) -> Self {
        Self {
            recurso,
            usado,
            limite,
            restante: limite.map(|l| (l as i64 - usado).max(0)),
        }
    }
}

/// Per-million-unit USD prices: (input, output)
struct Price {
    input: Decimal,
    output: Decimal,
}

fn price_for(model: &str) -> Price {
    // Decimal::new(mantissa, scale)
    let (input, output) = match model {
        "gemini-1.5-flash" => (Decimal::new(75, 3), Decimal::new(30, 2)),
        "gemini-1.5-pro" => (Decimal::new(125, 2), Decimal::new(5, 0)),
        "gpt-4o-mini" => (Decimal::new(15, 2), Decimal::new(60, 2)),
        "gpt-4o" => (Decimal::new(25, 1), Decimal::new(10, 0)),
        "tts-1" => (Decimal::new(15, 0), Decimal::ZERO),
        "whisper-1" => (Decimal::new(100, 0), Decimal::ZERO),
        "open-i" => (Decimal::ZERO, Decimal::ZERO),
        _ => (Decimal::ONE, Decimal::new(2, 0)),
    };
    Price { input, output }
}

/// USD cost of a call, rounded to six decimal places
pub fn calculate_cost(model: &str, input_tokens: i64, output_tokens: i64) -> Decimal {
    let price = price_for(model);
    let million = Decimal::new(1_000_000, 0);
    let cost = (Decimal::from(input_tokens.max(0)) * price.input + Decimal::from(output_tokens.max(0)) * price.output)
        / million;
    cost.round_dp(6)
}

/// First instant of the UTC month containing `now`
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

/// Rejects with `LimitReached` once the month's count hits the plan's limit
pub async fn check_limit<S>(
    store: &S,
    quotas: &QuotaConfig,
    user_id: Uuid,
    plan: Plan,
    resource: AiResource,
) -> Result<QuotaStatus, QuotaError>
where
    S: UsageStore + ?Sized,
{
    let limit = quotas.limit_for(plan, resource);
    let used = store.count_usage_since(user_id, resource, month_start(Utc::now())).await?;

    if let Some(limit) = limit {
        if used >= limit as i64 {
            info!("User {} reached {} quota ({}/{})", user_id, resource.as_str(), used, limit);
            return Err(QuotaError::LimitReached { resource, limit });
        }
    }

    Ok(QuotaStatus::new(resource, used, limit))
}

/// Inserts the usage row. The vendor call already succeeded, so a failed
/// insert is logged and swallowed.
pub async fn record_usage<S>(store: &S, user_id: Uuid, resource: AiResource, model: &str, usage: TokenUsage)
where
    S: UsageStore + ?Sized,
{
    let record = UsageRecord {
        id: Uuid::new_v4(),
        user_id,
        recurso: resource.as_str().to_string(),
        modelo: model.to_string(),
        tokens_entrada: usage.input_tokens,
        tokens_saida: usage.output_tokens,
        custo: calculate_cost(model, usage.input_tokens, usage.output_tokens),
        created_at: Utc::now(),
    };

    if let Err(e) = store.insert_usage(&record).await {
        error!("Failed to record {} usage for {}: {}", resource.as_str(), user_id, e);
    }
}

/// Usage and remaining quota for every resource
pub async fn usage_summary<S>(
    store: &S,
    quotas: &QuotaConfig,
    user_id: Uuid,
    plan: Plan,
) -> Result<Vec<QuotaStatus>, DatabaseError>
where
    S: UsageStore + ?Sized,
{
    let since = month_start(Utc::now());
    let mut summary = Vec::with_capacity(AiResource::ALL.len());
    for resource in AiResource::ALL {
        let used = store.count_usage_since(user_id, resource, since).await?;
        summary.push(QuotaStatus::new(resource, used, quotas.limit_for(plan, resource)));
    }
    Ok(summary)
}
