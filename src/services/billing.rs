use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::info;
use url::Url;
use uuid::Uuid;

use crate::config::BillingConfig;
use crate::database::models::{Profile, Subscription};
use crate::database::{DatabaseError, SubscriptionStore};
use crate::types::{Plan, SubscriptionStatus};

/// Hosted checkout link for a pending subscription
pub fn checkout_url(
    billing: &BillingConfig,
    plan: Plan,
    referencia: &str,
    user_id: Uuid,
    email: Option<&str>,
) -> Result<Url, url::ParseError> {
    let mut retorno = Url::parse(&billing.app_base_url)?.join("assinatura/retorno")?;
    retorno.query_pairs_mut().append_pair("referencia", referencia);

    let mut url = Url::parse(&billing.checkout_base_url)?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("plano", plan.as_str())
            .append_pair("referencia", referencia)
            .append_pair("usuario", &user_id.to_string());
        if let Some(email) = email {
            query.append_pair("email", email);
        }
        query.append_pair("retorno", retorno.as_str());
    }
    Ok(url)
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionSummary {
    pub plano: Plan,
    pub assinatura: Option<Subscription>,
    #[serde(rename = "isPro")]
    pub is_pro: bool,
}

/// The profile holds the base plan; only a subscription still inside its
/// period raises it, so a paid plan lapses on its own once `fim` passes.
pub fn summarize(profile: &Profile, latest: Option<Subscription>, now: DateTime<Utc>) -> SubscriptionSummary {
    let mut plan = profile.plan();
    if let Some(subscription) = latest.as_ref().filter(|s| s.is_current(now)) {
        plan = plan.max(subscription.plan());
    }
    SubscriptionSummary { plano: plan, is_pro: plan.is_paid(), assinatura: latest }
}

/// Creates the pending subscription row a checkout refers to
pub async fn start_checkout<S>(store: &S, user_id: Uuid, plan: Plan) -> Result<Subscription, DatabaseError>
where
    S: SubscriptionStore + ?Sized,
{
    let subscription = store.insert_subscription(&Subscription::pending(user_id, plan)).await?;
    info!("Checkout {} started for user {} ({})", subscription.referencia, user_id, plan.as_str());
    Ok(subscription)
}

/// Applies a payment provider notification to the subscription row.
///
/// Activation opens a billing period from now and cancellation closes it.
/// The profile is never touched.
pub async fn apply_payment_update<S>(
    store: &S,
    billing: &BillingConfig,
    referencia: &str,
    status: SubscriptionStatus,
) -> Result<Subscription, DatabaseError>
where
    S: SubscriptionStore + ?Sized,
{
    let subscription = store
        .find_subscription_by_reference(referencia)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("subscription {}", referencia)))?;

    let now = Utc::now();
    let updated = match status {
        SubscriptionStatus::Active => {
            let fim = now + Duration::days(billing.period_days);
            store.update_subscription(subscription.id, status, Some(now), Some(fim)).await?
        }
        SubscriptionStatus::Canceled => store.update_subscription(subscription.id, status, None, Some(now)).await?,
        SubscriptionStatus::Pending | SubscriptionStatus::Failed => {
            store.update_subscription(subscription.id, status, None, None).await?
        }
    };

    info!("Subscription {} is now {}", referencia, status.as_str());
    Ok(updated)
}
