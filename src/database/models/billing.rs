use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::{Plan, SubscriptionStatus};

/// `assinaturas`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plano: String,
    pub status: String,
    /// Opaque reference sent to the checkout and echoed by the payment webhook
    pub referencia: String,
    pub inicio: Option<DateTime<Utc>>,
    pub fim: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    pub fn pending(user_id: Uuid, plan: Plan) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            plano: plan.as_str().to_string(),
            status: SubscriptionStatus::Pending.as_str().to_string(),
            referencia: Uuid::new_v4().simple().to_string(),
            inicio: None,
            fim: None,
            created_at: Utc::now(),
        }
    }

    pub fn plan(&self) -> Plan {
        Plan::parse(&self.plano)
    }

    pub fn status(&self) -> Option<SubscriptionStatus> {
        SubscriptionStatus::from_provider(&self.status)
    }

    /// Active and not past its end date
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.status() == Some(SubscriptionStatus::Active) && self.fim.map_or(true, |fim| fim > now)
    }
}
