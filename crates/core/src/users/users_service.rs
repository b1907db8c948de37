use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use super::users_model::{NewUser, User};
use super::users_traits::{UserRepositoryTrait, UserServiceTrait};
use crate::auth::Principal;
use crate::errors::{Error, Result};

pub struct UserService {
    repository: Arc<dyn UserRepositoryTrait>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl UserServiceTrait for UserService {
    async fn create_user(&self, principal: &Principal, mut new_user: NewUser) -> Result<User> {
        principal.require_admin()?;
        new_user.validate()?;
        new_user.email = new_user.email.trim().to_lowercase();

        if self.repository.find_by_email(&new_user.email)?.is_some() {
            return Err(Error::invalid_input(format!(
                "A user with email {} already exists",
                new_user.email
            )));
        }

        let user = self.repository.create(new_user).await?;
        info!("Created user {} ({})", user.id, user.role.as_db_str());
        Ok(user)
    }

    fn get_user(&self, principal: &Principal, user_id: &str) -> Result<User> {
        principal.require_owner_or_admin(user_id)?;
        self.repository.get_by_id(user_id)
    }

    fn list_users(&self, principal: &Principal) -> Result<Vec<User>> {
        principal.require_admin()?;
        self.repository.list(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::test_support::InMemoryStore;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            id: None,
            email: email.to_string(),
            name: "Alice".to_string(),
            phone: None,
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_create_user_normalizes_email_and_rejects_duplicates() {
        let service = UserService::new(Arc::new(InMemoryStore::new()));
        let admin = Principal::admin("admin");

        let user = service
            .create_user(&admin, new_user(" Alice@Example.com "))
            .await
            .unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.balance, rust_decimal::Decimal::ZERO);

        let err = service
            .create_user(&admin, new_user("alice@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = service
            .create_user(&Principal::user("bob"), new_user("bob@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_get_user_requires_owner_or_admin() {
        let store = InMemoryStore::new();
        store.seed_user("alice", rust_decimal::Decimal::ZERO);
        let service = UserService::new(Arc::new(store));

        assert!(service.get_user(&Principal::user("alice"), "alice").is_ok());
        assert!(service.get_user(&Principal::admin("admin"), "alice").is_ok());
        assert!(matches!(
            service.get_user(&Principal::user("bob"), "alice"),
            Err(Error::Unauthorized(_))
        ));
        assert!(service.list_users(&Principal::user("alice")).is_err());
    }
}
