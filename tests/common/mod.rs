#![allow(dead_code)]

use chrono::TimeDelta;
use dealflow::application_impl::*;
use dealflow::application_port::*;
use dealflow::domain_model::*;
use dealflow::domain_port::*;
use dealflow::infra_memory::*;
use std::sync::Arc;

pub const EMAIL: &str = "a@x.com";
pub const PASSWORD: &str = "password123";
pub const USER_ID: UserId = UserId(1);

pub struct TestApp {
    pub service: Arc<dyn AuthService>,
    pub users: Arc<InMemoryUserRepo>,
    pub store: Arc<InMemoryRefreshTokenStore>,
    pub codec: Arc<JwtHs256Codec>,
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        issuer: "dealflow.auth".to_string(),
        audience: "dealflow-web".to_string(),
        access_ttl: TimeDelta::minutes(15),
        refresh_ttl: TimeDelta::days(7),
        access_secret: b"test-access-secret-at-least-32-bytes-long".to_vec(),
        refresh_secret: b"test-refresh-secret-at-least-32-bytes-long".to_vec(),
    }
}

pub fn profile(id: i64, email: &str) -> UserProfile {
    UserProfile {
        id: UserId(id),
        email: email.to_string(),
        name: "Alice Seller".to_string(),
        role: "Sales".to_string(),
        permissions: vec!["rfx.create".to_string(), "rfx.view_own".to_string()],
        organization_id: Some(OrganizationId(10)),
    }
}

/// In-memory service seeded with one active user, `EMAIL` / `PASSWORD`.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(|store| store as Arc<dyn RefreshTokenStore>).await
}

/// Same as `spawn_app`, but the service sees the refresh store through `wrap`.
/// `TestApp::store` still points at the underlying records.
pub async fn spawn_app_with(
    wrap: impl FnOnce(Arc<InMemoryRefreshTokenStore>) -> Arc<dyn RefreshTokenStore>,
) -> TestApp {
    let users = Arc::new(InMemoryUserRepo::new());
    let store = Arc::new(InMemoryRefreshTokenStore::new());
    let codec = Arc::new(JwtHs256Codec::new(jwt_config()));
    let hasher = Arc::new(Argon2PasswordHasher::try_new().expect("Failed to build hasher"));

    let password_hash = hasher
        .hash_password(PASSWORD)
        .await
        .expect("Failed to hash password");
    users.insert(profile(USER_ID.0, EMAIL), password_hash).await;

    let service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
        users.clone(),
        wrap(store.clone()),
        hasher,
        codec.clone(),
    ));

    TestApp {
        service,
        users,
        store,
        codec,
    }
}

impl TestApp {
    pub async fn login(&self) -> IssuedSession {
        self.service
            .login(LoginInput {
                email: EMAIL.to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .expect("Failed to log in")
    }
}
