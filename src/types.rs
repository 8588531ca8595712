/// Shared types used across the codebase
///
/// Wire values are the Portuguese names the web client and the database use.

use serde::{Deserialize, Serialize};

/// Subscription plan of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Plan {
    #[serde(rename = "gratuito")]
    Free,
    #[serde(rename = "pro")]
    Pro,
    #[serde(rename = "premium")]
    Premium,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "gratuito",
            Plan::Pro => "pro",
            Plan::Premium => "premium",
        }
    }

    /// Unknown or legacy values are treated as the free plan.
    pub fn parse(value: &str) -> Plan {
        match value.trim().to_ascii_lowercase().as_str() {
            "pro" => Plan::Pro,
            "premium" => Plan::Premium,
            _ => Plan::Free,
        }
    }

    pub fn is_paid(&self) -> bool {
        !matches!(self, Plan::Free)
    }

    /// Richest content tier the plan may read
    pub fn max_access_level(&self) -> AccessLevel {
        match self {
            Plan::Free => AccessLevel::Basic,
            Plan::Pro => AccessLevel::Advanced,
            Plan::Premium => AccessLevel::Expert,
        }
    }
}

/// Content-richness tier. Ordering follows richness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AccessLevel {
    #[serde(rename = "basico")]
    Basic,
    #[serde(rename = "avancado")]
    Advanced,
    #[serde(rename = "expert")]
    Expert,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Basic => "basico",
            AccessLevel::Advanced => "avancado",
            AccessLevel::Expert => "expert",
        }
    }
}

impl Default for AccessLevel {
    fn default() -> Self {
        AccessLevel::Basic
    }
}

/// AI feature metered by the usage quota
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiResource {
    #[serde(rename = "resumo")]
    Summary,
    #[serde(rename = "chat")]
    Chat,
    #[serde(rename = "audio")]
    Audio,
    #[serde(rename = "transcricao")]
    Transcription,
    #[serde(rename = "imagem")]
    Image,
}

impl AiResource {
    pub const ALL: [AiResource; 5] = [
        AiResource::Summary,
        AiResource::Chat,
        AiResource::Audio,
        AiResource::Transcription,
        AiResource::Image,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AiResource::Summary => "resumo",
            AiResource::Chat => "chat",
            AiResource::Audio => "audio",
            AiResource::Transcription => "transcricao",
            AiResource::Image => "imagem",
        }
    }
}

/// Role stored on the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "aluno")]
    Student,
    #[serde(rename = "admin")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "aluno",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Role {
        if value.trim().eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::Student
        }
    }
}

/// Lifecycle of a subscription row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionStatus {
    #[serde(rename = "pendente")]
    Pending,
    #[serde(rename = "ativa")]
    Active,
    #[serde(rename = "cancelada")]
    Canceled,
    #[serde(rename = "recusada")]
    Failed,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Pending => "pendente",
            SubscriptionStatus::Active => "ativa",
            SubscriptionStatus::Canceled => "cancelada",
            SubscriptionStatus::Failed => "recusada",
        }
    }

    /// Accepts both the stored names and the payment provider's vocabulary.
    pub fn from_provider(value: &str) -> Option<SubscriptionStatus> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pendente" | "pending" | "waiting_payment" => Some(SubscriptionStatus::Pending),
            "ativa" | "active" | "aprovado" | "approved" | "paid" => Some(SubscriptionStatus::Active),
            "cancelada" | "cancelado" | "canceled" | "cancelled" | "refunded" => {
                Some(SubscriptionStatus::Canceled)
            }
            "recusada" | "recusado" | "failed" | "refused" => Some(SubscriptionStatus::Failed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_levels_are_ordered_by_richness() {
        assert!(AccessLevel::Basic < AccessLevel::Advanced);
        assert!(AccessLevel::Advanced < AccessLevel::Expert);
    }

    #[test]
    fn plan_parse_defaults_to_free() {
        assert_eq!(Plan::parse("PRO"), Plan::Pro);
        assert_eq!(Plan::parse(" premium "), Plan::Premium);
        assert_eq!(Plan::parse("enterprise"), Plan::Free);
        assert!(!Plan::Free.is_paid());
    }

    #[test]
    fn provider_statuses_map_onto_subscription_lifecycle() {
        assert_eq!(SubscriptionStatus::from_provider("approved"), Some(SubscriptionStatus::Active));
        assert_eq!(SubscriptionStatus::from_provider("Cancelado"), Some(SubscriptionStatus::Canceled));
        assert_eq!(SubscriptionStatus::from_provider("chargeback"), None);
    }

    #[test]
    fn wire_names_round_trip_through_serde() {
        let v = serde_json::to_value(AiResource::Transcription).unwrap();
        assert_eq!(v, serde_json::json!("transcricao"));
        let level: AccessLevel = serde_json::from_value(serde_json::json!("avancado")).unwrap();
        assert_eq!(level, AccessLevel::Advanced);
    }
}
