use super::cookie::CookiePolicy;
use super::error::*;
use crate::application_port::{AuthService, IssuedSession, LoginInput};
use crate::domain_model::UserProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::http::header::{HeaderValue, SET_COOKIE};
use warp::reply::Response;
use warp::{self, Reply, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub async fn health() -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::json(&HealthResponse { status: "ok" }))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Tokens travel in cookies only; the body carries the profile and expiries.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: UserProfile,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

pub async fn login(
    body: LoginRequest,
    auth_service: Arc<dyn AuthService>,
    cookie_policy: Arc<CookiePolicy>,
) -> Result<Response, warp::Rejection> {
    let login_input = LoginInput {
        email: body.email,
        password: body.password,
    };
    let session = auth_service
        .login(login_input)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    session_reply(session, &cookie_policy)
}

pub async fn me(user: UserProfile) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::json(&ApiResponse::ok(user)))
}

pub async fn refresh(
    refresh_token: Option<String>,
    auth_service: Arc<dyn AuthService>,
    cookie_policy: Arc<CookiePolicy>,
) -> Result<Response, warp::Rejection> {
    let refresh_token = refresh_token.ok_or_else(|| reject::custom(ApiErrorCode::Unauthorized))?;

    let session = auth_service
        .refresh(&refresh_token)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    session_reply(session, &cookie_policy)
}

pub async fn logout(
    refresh_token: Option<String>,
    auth_service: Arc<dyn AuthService>,
    cookie_policy: Arc<CookiePolicy>,
) -> Result<Response, warp::Rejection> {
    if let Some(refresh_token) = refresh_token {
        auth_service.logout(&refresh_token).await;
    }

    let mut response = warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT).into_response();
    append_cookies(&mut response, cookie_policy.cleared())?;
    Ok(response)
}

fn session_reply(
    session: IssuedSession,
    cookie_policy: &CookiePolicy,
) -> Result<Response, warp::Rejection> {
    let IssuedSession { user, tokens } = session;

    let cookies = [
        cookie_policy.access_cookie(
            &tokens.access_token,
            tokens.access_token_expires_at,
            Utc::now(),
        ),
        cookie_policy.refresh_cookie(&tokens.refresh_token, tokens.refresh_token_expires_at),
    ];
    let body = SessionResponse {
        user,
        access_token_expires_at: tokens.access_token_expires_at,
        refresh_token_expires_at: tokens.refresh_token_expires_at,
    };

    let mut response = warp::reply::json(&ApiResponse::ok(body)).into_response();
    append_cookies(&mut response, cookies)?;
    Ok(response)
}

fn append_cookies(
    response: &mut Response,
    cookies: impl IntoIterator<Item = String>,
) -> Result<(), warp::Rejection> {
    for cookie in cookies {
        let value = HeaderValue::from_str(&cookie)
            .map_err(ApiErrorCode::internal)
            .map_err(reject::custom)?;
        response.headers_mut().append(SET_COOKIE, value);
    }
    Ok(())
}
