use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::{Plan, Role};

/// Row of `profiles`, keyed by the auth user id
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: Option<String>,
    pub nome: Option<String>,
    pub plano: String,
    pub papel: String,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(id: Uuid, email: Option<String>) -> Self {
        // Display name defaults to the mailbox part of the address
        let nome = email
            .as_deref()
            .and_then(|e| e.split('@').next())
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        Self {
            id,
            email,
            nome,
            plano: Plan::Free.as_str().to_string(),
            papel: Role::Student.as_str().to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn plan(&self) -> Plan {
        Plan::parse(&self.plano)
    }

    pub fn role(&self) -> Role {
        Role::parse(&self.papel)
    }
}

/// Row of `estatisticas_usuario`, created alongside the first profile
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserStats {
    pub user_id: Uuid,
    pub questoes_respondidas: i32,
    pub acertos: i32,
    pub created_at: DateTime<Utc>,
}

impl UserStats {
    pub fn initial(user_id: Uuid) -> Self {
        Self { user_id, questoes_respondidas: 0, acertos: 0, created_at: Utc::now() }
    }
}
