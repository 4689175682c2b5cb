use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateOutcome {
    /// Successor inserted and predecessor marked rotated, in one transaction.
    Rotated { replaced_by: RefreshTokenId },
    /// The predecessor was already rotated. Nothing was written.
    AlreadyRotated,
    /// The predecessor has expired. Nothing was written.
    Expired,
    /// No record matches the presented token. Nothing was written.
    NotFound,
}

/// Owns the refresh token records. Raw tokens never reach storage, only
/// their `TokenHash`.
#[async_trait::async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn store(
        &self,
        user_id: UserId,
        raw_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshTokenId, AuthError>;

    /// Only returns records that have not expired.
    async fn find(&self, raw_token: &str) -> Result<Option<RefreshTokenRecord>, AuthError>;

    /// Returns the record whether or not it has expired.
    async fn lookup(&self, raw_token: &str) -> Result<Option<RefreshTokenRecord>, AuthError>;

    /// Atomically replaces `old_raw_token` with `new_raw_token`. The
    /// predecessor is locked for the whole read-check-insert-update sequence.
    async fn rotate(
        &self,
        old_raw_token: &str,
        new_raw_token: &str,
        new_expires_at: DateTime<Utc>,
    ) -> Result<RotateOutcome, AuthError>;

    /// Deletes the matching record. Absent records are not an error.
    async fn revoke(&self, raw_token: &str) -> Result<(), AuthError>;
}
