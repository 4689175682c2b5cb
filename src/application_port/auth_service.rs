use crate::domain_model::{IdentityClaims, UserProfile};
use chrono::{DateTime, Utc};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("token expired")]
    TokenExpired,
    #[error("token invalid")]
    TokenInvalid,
    #[error("refresh token already used")]
    TokenReused,
    #[error("user not found")]
    UserNotFound,
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken(pub String);

#[derive(Debug, Clone)]
pub struct AuthTokens {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

/// Outcome of a successful login or refresh.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub user: UserProfile,
    pub tokens: AuthTokens,
}

#[async_trait::async_trait]
pub trait TokenCodec: Send + Sync {
    async fn issue_access_token(
        &self,
        claims: &IdentityClaims,
    ) -> Result<(AccessToken, DateTime<Utc>), AuthError>;
    async fn issue_refresh_token(
        &self,
        claims: &IdentityClaims,
    ) -> Result<(RefreshToken, DateTime<Utc>), AuthError>;
    /// Fails with `TokenExpired` or `TokenInvalid`, nothing else.
    async fn verify_access_token(&self, token: &AccessToken) -> Result<IdentityClaims, AuthError>;
    /// Fails with `TokenExpired` or `TokenInvalid`, nothing else.
    async fn verify_refresh_token(
        &self,
        token: &RefreshToken,
    ) -> Result<IdentityClaims, AuthError>;
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, AuthError>;
    /// Runs one verification against a throwaway hash and discards the result,
    /// so a login for an unknown account costs the same as a wrong password.
    async fn verify_decoy(&self, password: &str);
    /// True when the hash uses a scheme or parameters new hashes no longer use.
    fn needs_rehash(&self, password_hash: &str) -> bool;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, request: LoginInput) -> Result<IssuedSession, AuthError>;
    /// Verifies the token, then re-resolves the user from storage.
    async fn validate_access_token(&self, token: &str) -> Result<UserProfile, AuthError>;
    /// Exchanges a single-use refresh token for a new token pair.
    async fn refresh(&self, refresh_token: &str) -> Result<IssuedSession, AuthError>;
    /// Best effort; never fails.
    async fn logout(&self, refresh_token: &str);
}
