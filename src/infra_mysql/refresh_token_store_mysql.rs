use super::util::store_err;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlRefreshTokenStore {
    pool: MySqlPool,
}

impl MySqlRefreshTokenStore {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlRefreshTokenStore { pool }
    }

    fn row_to_record(row: &MySqlRow) -> Result<RefreshTokenRecord, AuthError> {
        Ok(RefreshTokenRecord {
            id: row.try_get("id").map_err(store_err)?,
            user_id: row.try_get("user_id").map_err(store_err)?,
            token_hash: TokenHash::from_stored(row.try_get("token_hash").map_err(store_err)?),
            expires_at: row.try_get("expires_at").map_err(store_err)?,
            rotated_at: row.try_get("rotated_at").map_err(store_err)?,
            replaced_by: row.try_get("replaced_by").map_err(store_err)?,
        })
    }
}

#[async_trait::async_trait]
impl RefreshTokenStore for MySqlRefreshTokenStore {
    async fn store(
        &self,
        user_id: UserId,
        raw_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshTokenId, AuthError> {
        let token_hash = TokenHash::of(raw_token);

        let res = sqlx::query(
            r#"
INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
VALUES (?, ?, ?)
"#,
        )
        .bind(user_id)
        .bind(token_hash.as_str())
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(RefreshTokenId(res.last_insert_id() as i64))
    }

    async fn find(&self, raw_token: &str) -> Result<Option<RefreshTokenRecord>, AuthError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT id, user_id, token_hash, expires_at, rotated_at, replaced_by
FROM refresh_tokens
WHERE token_hash = ? AND expires_at > ?
"#,
        )
        .bind(TokenHash::of(raw_token).as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row_opt.as_ref().map(Self::row_to_record).transpose()
    }

    async fn lookup(&self, raw_token: &str) -> Result<Option<RefreshTokenRecord>, AuthError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT id, user_id, token_hash, expires_at, rotated_at, replaced_by
FROM refresh_tokens
WHERE token_hash = ?
"#,
        )
        .bind(TokenHash::of(raw_token).as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row_opt.as_ref().map(Self::row_to_record).transpose()
    }

    async fn rotate(
        &self,
        old_raw_token: &str,
        new_raw_token: &str,
        new_expires_at: DateTime<Utc>,
    ) -> Result<RotateOutcome, AuthError> {
        let old_hash = TokenHash::of(old_raw_token);
        let new_hash = TokenHash::of(new_raw_token);

        // Any early `?` drops `tx`, which rolls the transaction back.
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT id, user_id, token_hash, expires_at, rotated_at, replaced_by
FROM refresh_tokens
WHERE token_hash = ?
FOR UPDATE
"#,
        )
        .bind(old_hash.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_err)?;

        let now = Utc::now();
        let refused = match row_opt.as_ref().map(Self::row_to_record).transpose()? {
            None => Err(RotateOutcome::NotFound),
            Some(current) if current.is_rotated() => Err(RotateOutcome::AlreadyRotated),
            Some(current) if current.is_expired(now) => Err(RotateOutcome::Expired),
            Some(current) => Ok(current),
        };
        let current = match refused {
            Ok(current) => current,
            Err(outcome) => {
                tx.rollback().await.map_err(store_err)?;
                return Ok(outcome);
            }
        };

        let inserted = sqlx::query(
            r#"
INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
VALUES (?, ?, ?)
"#,
        )
        .bind(current.user_id)
        .bind(new_hash.as_str())
        .bind(new_expires_at)
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;
        let new_id = RefreshTokenId(inserted.last_insert_id() as i64);

        sqlx::query(
            r#"
UPDATE refresh_tokens
SET rotated_at = ?, replaced_by = ?
WHERE id = ?
"#,
        )
        .bind(now)
        .bind(new_id)
        .bind(current.id)
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;

        Ok(RotateOutcome::Rotated {
            replaced_by: new_id,
        })
    }

    async fn revoke(&self, raw_token: &str) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM refresh_tokens WHERE token_hash = ?")
            .bind(TokenHash::of(raw_token).as_str())
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        Ok(())
    }
}
