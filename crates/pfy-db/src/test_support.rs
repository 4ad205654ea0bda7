//! Shared test utilities for pfy-db tests.

pub(crate) mod helpers {
    use pfy_core::entities::{Group, User};
    use pfy_core::enums::UserRole;

    use crate::PfyDb;
    use crate::service::PfyService;

    /// Create an in-memory `PfyService`.
    pub async fn test_service() -> PfyService {
        let db = PfyDb::open_local(":memory:").await.unwrap();
        PfyService::from_db(db)
    }

    /// Insert a user with a unique email derived from the name.
    pub async fn seed_user(svc: &PfyService, name: &str) -> User {
        let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
        svc.create_user(name, &email, UserRole::User, None)
            .await
            .unwrap()
    }

    /// Insert a group owned by `creator` with the given members.
    pub async fn seed_group(svc: &PfyService, creator: &str, members: &[&str]) -> Group {
        let members: Vec<String> = members.iter().map(|m| (*m).to_string()).collect();
        svc.create_group(creator, "Team", None, None, &members)
            .await
            .unwrap()
    }
}
