use super::cookie::{ACCESS_COOKIE, CookiePolicy, REFRESH_COOKIE};
use super::error::*;
use super::handler;
use crate::application_port::AuthService;
use crate::domain_model::UserProfile;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, reject};

const MAX_BODY_BYTES: u64 = 16 * 1024;

/// Routes plus error recovery, ready to serve.
pub fn app(
    auth_service: Arc<dyn AuthService>,
    cookie_policy: Arc<CookiePolicy>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = Infallible> + Clone {
    routes(auth_service, cookie_policy).recover(recover_error)
}

pub fn routes(
    auth_service: Arc<dyn AuthService>,
    cookie_policy: Arc<CookiePolicy>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    // Path before method, so unknown paths reject as 404 rather than 405.
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(handler::health);

    let login = warp::path!("auth" / "login")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with(auth_service.clone()))
        .and(with(cookie_policy.clone()))
        .and_then(handler::login);

    let me = warp::path!("auth" / "me")
        .and(warp::get())
        .and(with_identity(auth_service.clone()))
        .and_then(handler::me);

    let refresh = warp::path!("auth" / "refresh")
        .and(warp::post())
        .and(warp::cookie::optional::<String>(REFRESH_COOKIE))
        .and(with(auth_service.clone()))
        .and(with(cookie_policy.clone()))
        .and_then(handler::refresh);

    let logout = warp::path!("auth" / "logout")
        .and(warp::post())
        .and(warp::cookie::optional::<String>(REFRESH_COOKIE))
        .and(with(auth_service))
        .and(with(cookie_policy))
        .and_then(handler::logout);

    health.or(login).or(me).or(refresh).or(logout)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_identity(
    auth_service: Arc<dyn AuthService>,
) -> impl Filter<Extract = (UserProfile,), Error = warp::Rejection> + Clone {
    warp::cookie::optional::<String>(ACCESS_COOKIE).and_then(move |token: Option<String>| {
        let auth_service = auth_service.clone();
        async move {
            let Some(token) = token else {
                return Err(reject::custom(ApiErrorCode::Unauthorized));
            };
            auth_service
                .validate_access_token(&token)
                .await
                .map_err(ApiErrorCode::from)
                .map_err(reject::custom)
        }
    })
}
