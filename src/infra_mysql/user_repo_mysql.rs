use super::util::store_err;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlUserRepo {
    pool: MySqlPool,
}

impl MySqlUserRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlUserRepo { pool }
    }

    async fn permissions_of_role(&self, role_id: i64) -> Result<Vec<String>, AuthError> {
        sqlx::query_scalar(
            r#"
SELECT permission
FROM role_permissions
WHERE role_id = ?
ORDER BY permission
"#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)
    }

    async fn row_to_record(&self, row: &MySqlRow) -> Result<UserRecord, AuthError> {
        let role_id: i64 = row.try_get("role_id").map_err(store_err)?;
        let permissions = self.permissions_of_role(role_id).await?;

        let profile = UserProfile {
            id: row.try_get("id").map_err(store_err)?,
            email: row.try_get("email").map_err(store_err)?,
            name: row.try_get("name").map_err(store_err)?,
            role: row.try_get("role").map_err(store_err)?,
            permissions,
            organization_id: row.try_get("org_id").map_err(store_err)?,
        };
        let is_active: bool = row.try_get("active").map_err(store_err)?;

        Ok(UserRecord { profile, is_active })
    }
}

#[async_trait::async_trait]
impl UserRepo for MySqlUserRepo {
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentialsRecord>, AuthError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT u.id, u.email, u.name, u.password_hash, u.active, u.org_id,
       r.id AS role_id, r.name AS role
FROM users u
INNER JOIN roles r ON r.id = u.role_id
WHERE u.email = ? AND u.deleted_at IS NULL
LIMIT 1
"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        let Some(row) = row_opt else {
            return Ok(None);
        };
        let user = self.row_to_record(&row).await?;
        let password_hash: String = row.try_get("password_hash").map_err(store_err)?;

        Ok(Some(UserCredentialsRecord {
            user,
            password_hash,
        }))
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AuthError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT u.id, u.email, u.name, u.active, u.org_id,
       r.id AS role_id, r.name AS role
FROM users u
INNER JOIN roles r ON r.id = u.role_id
WHERE u.id = ? AND u.deleted_at IS NULL
LIMIT 1
"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        match row_opt {
            Some(row) => Ok(Some(self.row_to_record(&row).await?)),
            None => Ok(None),
        }
    }

    async fn update_password_hash(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<(), AuthError> {
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        Ok(())
    }
}
