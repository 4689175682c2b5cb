use crate::application_port::{AccessToken, AuthError, RefreshToken, TokenCodec};
use crate::domain_model::{IdentityClaims, OrganizationId, UserId};
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub access_ttl: TimeDelta,
    pub refresh_ttl: TimeDelta,
    pub access_secret: Vec<u8>,
    pub refresh_secret: Vec<u8>,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy)]
enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user id as string
    email: String,
    role: String,
    permissions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    org_id: Option<i64>,
    exp: i64,
    iat: i64,
    iss: String,
    aud: String,
    jti: String, // keeps tokens minted in the same second distinct
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: TimeDelta,
}

pub struct JwtHs256Codec {
    issuer: String,
    audience: String,
    access: Keys,
    refresh: Keys,
}

impl JwtHs256Codec {
    pub fn new(cfg: JwtConfig) -> Self {
        JwtHs256Codec {
            access: Keys {
                encoding: EncodingKey::from_secret(&cfg.access_secret),
                decoding: DecodingKey::from_secret(&cfg.access_secret),
                ttl: cfg.access_ttl,
            },
            refresh: Keys {
                encoding: EncodingKey::from_secret(&cfg.refresh_secret),
                decoding: DecodingKey::from_secret(&cfg.refresh_secret),
                ttl: cfg.refresh_ttl,
            },
            issuer: cfg.issuer,
            audience: cfg.audience,
        }
    }

    fn keys(&self, kind: TokenKind) -> &Keys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    fn encode(
        &self,
        identity: &IdentityClaims,
        kind: TokenKind,
    ) -> Result<(String, DateTime<Utc>), AuthError> {
        let keys = self.keys(kind);
        let iat_dt = Utc::now();
        // Whole seconds, so a stored expiry matches the token's `exp` exactly.
        let exp_dt = DateTime::from_timestamp((iat_dt + keys.ttl).timestamp(), 0)
            .ok_or_else(|| AuthError::InternalError("token expiry out of range".to_string()))?;
        let claims = Claims {
            sub: identity.subject.to_string(),
            email: identity.email.clone(),
            role: identity.role.clone(),
            permissions: identity.permissions.clone(),
            org_id: identity.organization_id.map(|id| id.0),
            exp: exp_dt.timestamp(),
            iat: iat_dt.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|e| AuthError::InternalError(e.to_string()))?;
        Ok((token, exp_dt))
    }

    fn decode(&self, token: &str, kind: TokenKind) -> Result<IdentityClaims, AuthError> {
        let mut v = Validation::new(Algorithm::HS256);
        v.leeway = 0;
        v.validate_exp = true;
        v.set_audience(&[&self.audience]);
        v.set_issuer(&[&self.issuer]);
        v.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        let data = decode::<Claims>(token, &self.keys(kind).decoding, &v).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid,
            }
        })?;

        let claims = data.claims;
        let subject = claims
            .sub
            .parse::<UserId>()
            .map_err(|_| AuthError::TokenInvalid)?;
        Ok(IdentityClaims {
            subject,
            email: claims.email,
            role: claims.role,
            permissions: claims.permissions,
            organization_id: claims.org_id.map(OrganizationId),
        })
    }
}

#[async_trait::async_trait]
impl TokenCodec for JwtHs256Codec {
    async fn issue_access_token(
        &self,
        claims: &IdentityClaims,
    ) -> Result<(AccessToken, DateTime<Utc>), AuthError> {
        let (token, exp_dt) = self.encode(claims, TokenKind::Access)?;
        Ok((AccessToken(token), exp_dt))
    }

    async fn issue_refresh_token(
        &self,
        claims: &IdentityClaims,
    ) -> Result<(RefreshToken, DateTime<Utc>), AuthError> {
        let (token, exp_dt) = self.encode(claims, TokenKind::Refresh)?;
        Ok((RefreshToken(token), exp_dt))
    }

    async fn verify_access_token(&self, token: &AccessToken) -> Result<IdentityClaims, AuthError> {
        self.decode(&token.0, TokenKind::Access)
    }

    async fn verify_refresh_token(
        &self,
        token: &RefreshToken,
    ) -> Result<IdentityClaims, AuthError> {
        self.decode(&token.0, TokenKind::Refresh)
    }
}
