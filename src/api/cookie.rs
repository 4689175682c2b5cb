use crate::application_port::{AccessToken, RefreshToken};
use chrono::{DateTime, Utc};

pub const ACCESS_COOKIE: &str = "dealflow_access";
pub const REFRESH_COOKIE: &str = "dealflow_refresh";

/// The refresh cookie is only ever sent to the refresh endpoint.
pub const REFRESH_COOKIE_PATH: &str = "/auth/refresh";

#[derive(Debug, Clone, Default)]
pub struct CookiePolicy {
    pub secure: bool,
    pub domain: Option<String>,
}

impl CookiePolicy {
    pub fn access_cookie(
        &self,
        token: &AccessToken,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> String {
        let max_age = (expires_at - now).num_seconds().max(0);
        format!(
            "{ACCESS_COOKIE}={}; Max-Age={max_age}{}",
            token.0,
            self.attributes("/")
        )
    }

    pub fn refresh_cookie(&self, token: &RefreshToken, expires_at: DateTime<Utc>) -> String {
        format!(
            "{REFRESH_COOKIE}={}; Expires={}{}",
            token.0,
            expires_at.format("%a, %d %b %Y %H:%M:%S GMT"),
            self.attributes(REFRESH_COOKIE_PATH)
        )
    }

    pub fn cleared(&self) -> [String; 2] {
        [
            format!("{ACCESS_COOKIE}=; Max-Age=0{}", self.attributes("/")),
            format!(
                "{REFRESH_COOKIE}=; Max-Age=0{}",
                self.attributes(REFRESH_COOKIE_PATH)
            ),
        ]
    }

    fn attributes(&self, path: &str) -> String {
        let mut attrs = format!("; Path={path}; HttpOnly; SameSite=Lax");
        if self.secure {
            attrs.push_str("; Secure");
        }
        if let Some(domain) = &self.domain {
            attrs.push_str("; Domain=");
            attrs.push_str(domain);
        }
        attrs
    }
}
