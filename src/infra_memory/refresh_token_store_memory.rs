use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Default)]
struct State {
    next_id: i64,
    records: HashMap<TokenHash, RefreshTokenRecord>,
}

impl State {
    fn insert(
        &mut self,
        user_id: UserId,
        token_hash: TokenHash,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshTokenId, AuthError> {
        if self.records.contains_key(&token_hash) {
            return Err(AuthError::Store("duplicate token_hash".to_string()));
        }
        self.next_id += 1;
        let id = RefreshTokenId(self.next_id);
        self.records.insert(
            token_hash.clone(),
            RefreshTokenRecord {
                id,
                user_id,
                token_hash,
                expires_at,
                rotated_at: None,
                replaced_by: None,
            },
        );
        Ok(id)
    }
}

/// Process-local store. One mutex guards the whole table, so `rotate` holds
/// the equivalent of a row lock for its entire read-check-write sequence.
#[derive(Default)]
pub struct InMemoryRefreshTokenStore {
    state: Mutex<State>,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record, ordered by id.
    pub async fn records(&self) -> Vec<RefreshTokenRecord> {
        let state = self.state.lock().await;
        let mut records: Vec<_> = state.records.values().cloned().collect();
        records.sort_by_key(|r| r.id);
        records
    }
}

#[async_trait::async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn store(
        &self,
        user_id: UserId,
        raw_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshTokenId, AuthError> {
        let mut state = self.state.lock().await;
        state.insert(user_id, TokenHash::of(raw_token), expires_at)
    }

    async fn find(&self, raw_token: &str) -> Result<Option<RefreshTokenRecord>, AuthError> {
        let now = Utc::now();
        Ok(self
            .lookup(raw_token)
            .await?
            .filter(|record| !record.is_expired(now)))
    }

    async fn lookup(&self, raw_token: &str) -> Result<Option<RefreshTokenRecord>, AuthError> {
        let state = self.state.lock().await;
        Ok(state.records.get(&TokenHash::of(raw_token)).cloned())
    }

    async fn rotate(
        &self,
        old_raw_token: &str,
        new_raw_token: &str,
        new_expires_at: DateTime<Utc>,
    ) -> Result<RotateOutcome, AuthError> {
        let old_hash = TokenHash::of(old_raw_token);
        let now = Utc::now();
        let mut state = self.state.lock().await;

        let current = match state.records.get(&old_hash) {
            Some(record) => record.clone(),
            None => return Ok(RotateOutcome::NotFound),
        };
        if current.is_rotated() {
            return Ok(RotateOutcome::AlreadyRotated);
        }
        if current.is_expired(now) {
            return Ok(RotateOutcome::Expired);
        }

        let new_id = state.insert(current.user_id, TokenHash::of(new_raw_token), new_expires_at)?;
        if let Some(record) = state.records.get_mut(&old_hash) {
            record.rotated_at = Some(now);
            record.replaced_by = Some(new_id);
        }

        Ok(RotateOutcome::Rotated {
            replaced_by: new_id,
        })
    }

    async fn revoke(&self, raw_token: &str) -> Result<(), AuthError> {
        let mut state = self.state.lock().await;
        state.records.remove(&TokenHash::of(raw_token));
        Ok(())
    }
}
