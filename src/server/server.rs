use crate::api::CookiePolicy;
use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_mysql::*;
use crate::logger::*;
use crate::settings::Settings;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, Pool};
use std::sync::Arc;

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pub cookie_policy: Arc<CookiePolicy>,
    pool: Pool<MySql>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(settings.database.max_connections)
            .connect(&settings.database.url)
            .await?;

        if settings.database.migrate {
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("database migrations applied");
        }

        let jwt = &settings.jwt;
        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
            issuer: jwt.issuer.clone(),
            audience: jwt.audience.clone(),
            access_ttl: jwt.access_ttl()?,
            refresh_ttl: jwt.refresh_ttl()?,
            access_secret: jwt.access_secret.clone().into_bytes(),
            refresh_secret: jwt.refresh_secret.clone().into_bytes(),
        }));
        let credential_hasher: Arc<dyn CredentialHasher> =
            Arc::new(Argon2PasswordHasher::try_new()?);

        let user_repo: Arc<dyn UserRepo> = Arc::new(MySqlUserRepo::new(pool.clone()));
        let refresh_store: Arc<dyn RefreshTokenStore> =
            Arc::new(MySqlRefreshTokenStore::new(pool.clone()));

        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            user_repo,
            refresh_store,
            credential_hasher,
            token_codec,
        ));

        let cookie_policy = Arc::new(CookiePolicy {
            secure: settings.cookie.secure,
            domain: settings.cookie.domain.clone(),
        });

        info!("server started");

        Ok(Self {
            auth_service,
            cookie_policy,
            pool,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");
        self.pool.close().await;
    }
}
