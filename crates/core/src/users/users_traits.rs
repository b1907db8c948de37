//! User repository and service traits.

use async_trait::async_trait;

use super::users_model::{NewUser, User};
use crate::auth::{Principal, Role};
use crate::errors::Result;

/// Persistence contract for users.
///
/// There is deliberately no way to write `balance` here; balance changes go
/// through [`LedgerStoreTrait`](crate::ledger::LedgerStoreTrait).
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    async fn create(&self, new_user: NewUser) -> Result<User>;

    fn get_by_id(&self, user_id: &str) -> Result<User>;

    fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    fn list(&self, role: Option<Role>) -> Result<Vec<User>>;
}

#[async_trait]
pub trait UserServiceTrait: Send + Sync {
    /// Seeds a user record. Registration and verification live outside the core.
    async fn create_user(&self, principal: &Principal, new_user: NewUser) -> Result<User>;

    fn get_user(&self, principal: &Principal, user_id: &str) -> Result<User>;

    fn list_users(&self, principal: &Principal) -> Result<Vec<User>>;
}
