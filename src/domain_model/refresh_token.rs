use super::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct RefreshTokenId(pub i64);

impl fmt::Display for RefreshTokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lower-case hex SHA-256 of a raw refresh token. Only this value is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenHash(String);

impl TokenHash {
    pub fn of(raw_token: &str) -> Self {
        TokenHash(hex::encode(Sha256::digest(raw_token.as_bytes())))
    }

    /// Wraps a digest read back from storage.
    pub fn from_stored(hex_digest: String) -> Self {
        TokenHash(hex_digest)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub id: RefreshTokenId,
    pub user_id: UserId,
    pub token_hash: TokenHash,
    pub expires_at: DateTime<Utc>,
    pub rotated_at: Option<DateTime<Utc>>,
    pub replaced_by: Option<RefreshTokenId>,
}

impl RefreshTokenRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// A rotated record is terminal: it never authorizes another rotation.
    pub fn is_rotated(&self) -> bool {
        self.rotated_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(expires_at: DateTime<Utc>) -> RefreshTokenRecord {
        RefreshTokenRecord {
            id: RefreshTokenId(1),
            user_id: UserId(7),
            token_hash: TokenHash::of("token"),
            expires_at,
            rotated_at: None,
            replaced_by: None,
        }
    }

    #[test]
    fn test_hash_is_deterministic_hex_digest() {
        let a = TokenHash::of("some.refresh.token");
        let b = TokenHash::of("some.refresh.token");

        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(a.as_str(), "some.refresh.token");
    }

    #[test]
    fn test_hash_of_known_value() {
        assert_eq!(
            TokenHash::of("abc").as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_different_tokens_different_hashes() {
        assert_ne!(TokenHash::of("token-a"), TokenHash::of("token-b"));
    }

    #[test]
    fn test_expiry_boundary_counts_as_expired() {
        let now = Utc::now();
        assert!(record(now).is_expired(now));
        assert!(record(now - Duration::seconds(1)).is_expired(now));
        assert!(!record(now + Duration::seconds(1)).is_expired(now));
    }

    #[test]
    fn test_rotated_record_is_terminal() {
        let mut rec = record(Utc::now() + Duration::days(1));
        assert!(!rec.is_rotated());

        rec.rotated_at = Some(Utc::now());
        rec.replaced_by = Some(RefreshTokenId(2));
        assert!(rec.is_rotated());
    }
}
