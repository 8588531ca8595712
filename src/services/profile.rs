use tracing::{info, warn};

use crate::database::models::{Profile, UserStats};
use crate::database::{DatabaseError, ProfileStore};
use crate::middleware::AuthUser;

/// Loads the caller's profile, creating it on first access.
///
/// The profile and its stats row are two independent inserts; a failed
/// stats insert is logged and the profile is still returned.
pub async fn ensure_profile<S>(store: &S, user: &AuthUser) -> Result<Profile, DatabaseError>
where
    S: ProfileStore + ?Sized,
{
    if let Some(profile) = store.find_profile(user.id).await? {
        return Ok(profile);
    }

    let profile = match store.insert_profile(&Profile::new(user.id, user.email.clone())).await {
        Ok(profile) => profile,
        // A concurrent first request created it
        Err(DatabaseError::Conflict(_)) => {
            return store
                .find_profile(user.id)
                .await?
                .ok_or_else(|| DatabaseError::NotFound(format!("profile {}", user.id)));
        }
        Err(e) => return Err(e),
    };
    info!("Created profile for user {}", user.id);

    if let Err(e) = store.insert_user_stats(&UserStats::initial(user.id)).await {
        warn!("Failed to create stats for user {}: {}", user.id, e);
    }

    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryStore, MemoryTables};
    use crate::types::Plan;
    use uuid::Uuid;

    fn user() -> AuthUser {
        AuthUser { id: Uuid::new_v4(), email: Some("joao@example.com".into()) }
    }

    #[tokio::test]
    async fn first_call_creates_profile_and_stats() {
        let store = MemoryStore::new();
        let user = user();

        let profile = ensure_profile(&store, &user).await.unwrap();
        assert_eq!(profile.plan(), Plan::Free);
        assert_eq!(profile.nome.as_deref(), Some("joao"));

        let again = ensure_profile(&store, &user).await.unwrap();
        assert_eq!(again.id, profile.id);

        let tables = store.snapshot().await;
        assert_eq!(tables.profiles.len(), 1);
        assert_eq!(tables.user_stats.len(), 1);
    }

    #[tokio::test]
    async fn stats_failure_does_not_fail_profile_creation() {
        let user = user();
        let store = MemoryStore::with_tables(MemoryTables {
            user_stats: vec![UserStats::initial(user.id)],
            ..Default::default()
        });

        let profile = ensure_profile(&store, &user).await.unwrap();
        assert_eq!(profile.id, user.id);
    }
}
