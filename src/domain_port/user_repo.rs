use crate::application_port::*;
use crate::domain_model::*;

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub profile: UserProfile,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct UserCredentialsRecord {
    pub user: UserRecord,
    pub password_hash: String,
}

/// View of the user and role tables. Permissions are resolved through the
/// user's role on every call; nothing is cached.
#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    /// Fetch credentials by email (for login). Soft-deleted users are absent.
    async fn find_by_email(&self, email: &str)
    -> Result<Option<UserCredentialsRecord>, AuthError>;

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AuthError>;

    async fn update_password_hash(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<(), AuthError>;
}
