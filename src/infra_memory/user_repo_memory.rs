use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryUserRepo {
    users: RwLock<HashMap<UserId, UserCredentialsRecord>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, profile: UserProfile, password_hash: impl Into<String>) {
        let record = UserCredentialsRecord {
            user: UserRecord {
                profile,
                is_active: true,
            },
            password_hash: password_hash.into(),
        };
        self.users
            .write()
            .await
            .insert(record.user.profile.id, record);
    }

    pub async fn set_active(&self, user_id: UserId, is_active: bool) {
        if let Some(rec) = self.users.write().await.get_mut(&user_id) {
            rec.user.is_active = is_active;
        }
    }

    pub async fn set_permissions(&self, user_id: UserId, permissions: Vec<String>) {
        if let Some(rec) = self.users.write().await.get_mut(&user_id) {
            rec.user.profile.permissions = permissions;
        }
    }

    pub async fn remove(&self, user_id: UserId) {
        self.users.write().await.remove(&user_id);
    }
}

#[async_trait::async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentialsRecord>, AuthError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|rec| rec.user.profile.email == email)
            .cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AuthError> {
        let users = self.users.read().await;
        Ok(users.get(&user_id).map(|rec| rec.user.clone()))
    }

    async fn update_password_hash(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<(), AuthError> {
        if let Some(rec) = self.users.write().await.get_mut(&user_id) {
            rec.password_hash = password_hash.to_string();
        }
        Ok(())
    }
}
