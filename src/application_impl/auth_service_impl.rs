use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use chrono::Utc;
use std::sync::Arc;

pub struct RealAuthService {
    user_repo: Arc<dyn UserRepo>,
    refresh_store: Arc<dyn RefreshTokenStore>,
    credential_hasher: Arc<dyn CredentialHasher>,
    token_codec: Arc<dyn TokenCodec>,
}

impl RealAuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepo>,
        refresh_store: Arc<dyn RefreshTokenStore>,
        credential_hasher: Arc<dyn CredentialHasher>,
        token_codec: Arc<dyn TokenCodec>,
    ) -> Self {
        Self {
            user_repo,
            refresh_store,
            credential_hasher,
            token_codec,
        }
    }

    /// Signs a fresh access/refresh pair. Persisting the refresh token is up
    /// to the caller.
    async fn mint_tokens(&self, user: &UserProfile) -> Result<AuthTokens, AuthError> {
        let claims = IdentityClaims::from(user);

        let (access_token, access_exp) = self.token_codec.issue_access_token(&claims).await?;
        let (refresh_token, refresh_exp) = self.token_codec.issue_refresh_token(&claims).await?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
            access_token_expires_at: access_exp,
            refresh_token_expires_at: refresh_exp,
        })
    }

    /// Moves a legacy hash to the current scheme. Failure leaves the old hash
    /// in place and does not fail the login.
    async fn upgrade_password_hash(&self, user_id: UserId, password: &str) {
        let upgraded = match self.credential_hasher.hash_password(password).await {
            Ok(hash) => self.user_repo.update_password_hash(user_id, &hash).await,
            Err(e) => Err(e),
        };
        match upgraded {
            Ok(()) => info!(%user_id, "password hash upgraded"),
            Err(e) => warn!(%user_id, "password hash upgrade failed: {}", e),
        }
    }

    async fn expire(&self, refresh_token: &str, record: &RefreshTokenRecord) -> AuthError {
        debug!(record_id = %record.id, user_id = %record.user_id, "refresh token expired");
        if let Err(e) = self.refresh_store.revoke(refresh_token).await {
            return e;
        }
        AuthError::TokenExpired
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn login(&self, request: LoginInput) -> Result<IssuedSession, AuthError> {
        let LoginInput { email, password } = request;

        let rec = match self.user_repo.find_by_email(&email).await? {
            Some(rec) if rec.user.is_active => rec,
            _ => {
                self.credential_hasher.verify_decoy(&password).await;
                return Err(AuthError::InvalidCredentials);
            }
        };

        let ok = self
            .credential_hasher
            .verify_password(&password, &rec.password_hash)
            .await?;
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }

        let user = rec.user.profile;
        if self.credential_hasher.needs_rehash(&rec.password_hash) {
            self.upgrade_password_hash(user.id, &password).await;
        }
        let tokens = self.mint_tokens(&user).await?;

        self.refresh_store
            .store(
                user.id,
                &tokens.refresh_token.0,
                tokens.refresh_token_expires_at,
            )
            .await?;

        info!(user_id = %user.id, "user logged in");
        Ok(IssuedSession { user, tokens })
    }

    async fn validate_access_token(&self, token: &str) -> Result<UserProfile, AuthError> {
        let claims = self
            .token_codec
            .verify_access_token(&AccessToken(token.to_string()))
            .await?;

        // Authority comes from the current user and role rows, not from the token.
        match self.user_repo.find_by_id(claims.subject).await? {
            Some(rec) if rec.is_active => Ok(rec.profile),
            _ => Err(AuthError::TokenInvalid),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<IssuedSession, AuthError> {
        let record = self
            .refresh_store
            .lookup(refresh_token)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        if record.is_expired(Utc::now()) {
            return Err(self.expire(refresh_token, &record).await);
        }

        let claims = self
            .token_codec
            .verify_refresh_token(&RefreshToken(refresh_token.to_string()))
            .await?;
        if claims.subject != record.user_id {
            return Err(AuthError::TokenInvalid);
        }

        if record.is_rotated() {
            warn!(
                record_id = %record.id,
                user_id = %record.user_id,
                "rejected reuse of rotated refresh token"
            );
            return Err(AuthError::TokenReused);
        }

        let user = match self.user_repo.find_by_id(claims.subject).await? {
            Some(rec) if rec.is_active => rec.profile,
            _ => return Err(AuthError::UserNotFound),
        };

        let tokens = self.mint_tokens(&user).await?;

        match self
            .refresh_store
            .rotate(
                refresh_token,
                &tokens.refresh_token.0,
                tokens.refresh_token_expires_at,
            )
            .await?
        {
            RotateOutcome::Rotated { replaced_by } => {
                debug!(record_id = %record.id, %replaced_by, "refresh token rotated");
            }
            RotateOutcome::AlreadyRotated => {
                warn!(
                    record_id = %record.id,
                    user_id = %record.user_id,
                    "lost refresh rotation race"
                );
                return Err(AuthError::TokenReused);
            }
            RotateOutcome::Expired => return Err(self.expire(refresh_token, &record).await),
            RotateOutcome::NotFound => return Err(AuthError::TokenInvalid),
        }

        Ok(IssuedSession { user, tokens })
    }

    async fn logout(&self, refresh_token: &str) {
        if refresh_token.is_empty() {
            return;
        }
        if let Err(e) = self.refresh_store.revoke(refresh_token).await {
            warn!("logout: revoking refresh token failed: {}", e);
        }
    }
}
