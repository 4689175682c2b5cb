use crate::application_port::{AuthError, CredentialHasher};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

const BCRYPT_PREFIX: &str = "$2";

/// Argon2id for new hashes. Rows written by the legacy user table carry
/// bcrypt hashes (`$2a$`, `$2b$`, `$2y$`) and are still accepted until the
/// next successful login rehashes them.
#[derive(Debug)]
pub struct Argon2PasswordHasher {
    decoy_hash: String,
}

impl Argon2PasswordHasher {
    /// Builds the decoy up front with the same parameters as stored hashes,
    /// so no login pays for it.
    pub fn try_new() -> Result<Self, AuthError> {
        let decoy_hash = Self::hash_blocking(&uuid::Uuid::new_v4().to_string())?;
        Ok(Self { decoy_hash })
    }

    fn hash_blocking(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::InternalError(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    fn verify_blocking(password: &str, password_hash: &str) -> Result<bool, AuthError> {
        if password_hash.starts_with(BCRYPT_PREFIX) {
            return bcrypt::verify(password, password_hash)
                .map_err(|e| AuthError::InternalError(format!("bcrypt verify error: {e}")));
        }

        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| AuthError::InternalError(format!("invalid PHC hash: {e}")))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::InternalError(format!("verify error: {e}"))),
        }
    }
}

#[async_trait::async_trait]
impl CredentialHasher for Argon2PasswordHasher {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        Self::hash_blocking(password)
    }

    async fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, AuthError> {
        Self::verify_blocking(password, password_hash)
    }

    async fn verify_decoy(&self, password: &str) {
        let _ = Self::verify_blocking(password, &self.decoy_hash);
    }

    fn needs_rehash(&self, password_hash: &str) -> bool {
        password_hash.starts_with(BCRYPT_PREFIX)
    }
}
