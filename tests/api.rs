mod common;

use common::*;
use dealflow::api::{self, ACCESS_COOKIE, CookiePolicy, REFRESH_COOKIE};
use serde_json::{Value, json};
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;
use warp::http::StatusCode;
use warp::http::header::SET_COOKIE;
use warp::hyper::body::Bytes;

type Response = warp::http::Response<Bytes>;

fn filter_for(
    test_app: &TestApp,
) -> impl Filter<Extract = (impl warp::Reply,), Error = Infallible> + Clone + 'static {
    api::app(test_app.service.clone(), Arc::new(CookiePolicy::default()))
}

fn set_cookies(res: &Response) -> Vec<String> {
    res.headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

fn set_cookie(res: &Response, name: &str) -> String {
    set_cookies(res)
        .into_iter()
        .find(|c| c.starts_with(&format!("{name}=")))
        .unwrap_or_else(|| panic!("no Set-Cookie for {name}"))
}

fn cookie_value(res: &Response, name: &str) -> String {
    let cookie = set_cookie(res, name);
    let pair = cookie.split(';').next().unwrap();
    pair.split_once('=').unwrap().1.to_string()
}

fn body_json(res: &Response) -> Value {
    serde_json::from_slice(res.body()).unwrap()
}

fn error_code(res: &Response) -> String {
    body_json(res)["error"]["code"].as_str().unwrap().to_string()
}

async fn login<F>(filter: &F, password: &str) -> Response
where
    F: Filter + 'static,
    F::Extract: warp::Reply + Send,
{
    warp::test::request()
        .method("POST")
        .path("/auth/login")
        .json(&json!({ "email": EMAIL, "password": password }))
        .reply(filter)
        .await
}

#[tokio::test]
async fn test_health() {
    let app = spawn_app().await;
    let filter = filter_for(&app);

    let res = warp::test::request().path("/health").reply(&filter).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(&res)["status"], "ok");
}

#[tokio::test]
async fn test_login_sets_http_only_cookies_and_keeps_tokens_out_of_body() {
    let app = spawn_app().await;
    let filter = filter_for(&app);

    let res = login(&filter, PASSWORD).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(set_cookies(&res).len(), 2);

    let access = set_cookie(&res, ACCESS_COOKIE);
    assert!(access.contains("HttpOnly"));
    assert!(access.contains("SameSite=Lax"));
    assert!(access.contains("Path=/;") || access.ends_with("Path=/"));
    assert!(access.contains("Max-Age="));

    let refresh = set_cookie(&res, REFRESH_COOKIE);
    assert!(refresh.contains("HttpOnly"));
    assert!(refresh.contains("Path=/auth/refresh"));
    assert!(refresh.contains("Expires="));

    let body = body_json(&res);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["id"], USER_ID.0);
    assert_eq!(body["data"]["user"]["email"], EMAIL);

    let raw_body = String::from_utf8(res.body().to_vec()).unwrap();
    assert!(!raw_body.contains(&cookie_value(&res, ACCESS_COOKIE)));
    assert!(!raw_body.contains(&cookie_value(&res, REFRESH_COOKIE)));
}

#[tokio::test]
async fn test_login_with_bad_password_is_401() {
    let app = spawn_app().await;
    let filter = filter_for(&app);

    let res = login(&filter, "nope").await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&res), "INVALID_CREDENTIALS");
    assert_eq!(body_json(&res)["success"], false);
    assert!(set_cookies(&res).is_empty());
}

#[tokio::test]
async fn test_login_with_malformed_body_is_422() {
    let app = spawn_app().await;
    let filter = filter_for(&app);

    let res = warp::test::request()
        .method("POST")
        .path("/auth/login")
        .header("content-type", "application/json")
        .body(r#"{"email":"a@x.com"}"#)
        .reply(&filter)
        .await;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&res), "VALIDATION_FAILED");
}

#[tokio::test]
async fn test_me_returns_user_for_access_cookie() {
    let app = spawn_app().await;
    let filter = filter_for(&app);
    let access = cookie_value(&login(&filter, PASSWORD).await, ACCESS_COOKIE);

    let res = warp::test::request()
        .path("/auth/me")
        .header("cookie", format!("{ACCESS_COOKIE}={access}"))
        .reply(&filter)
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(&res);
    assert_eq!(body["data"]["id"], USER_ID.0);
    assert_eq!(body["data"]["role"], "Sales");
}

#[tokio::test]
async fn test_me_without_cookie_is_unauthorized() {
    let app = spawn_app().await;
    let filter = filter_for(&app);

    let res = warp::test::request().path("/auth/me").reply(&filter).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&res), "UNAUTHORIZED");
}

#[tokio::test]
async fn test_me_with_garbage_cookie_is_token_invalid() {
    let app = spawn_app().await;
    let filter = filter_for(&app);

    let res = warp::test::request()
        .path("/auth/me")
        .header("cookie", format!("{ACCESS_COOKIE}=garbage"))
        .reply(&filter)
        .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&res), "TOKEN_INVALID");
}

#[tokio::test]
async fn test_refresh_rotates_cookies_and_replay_is_token_reused() {
    let app = spawn_app().await;
    let filter = filter_for(&app);
    let old = cookie_value(&login(&filter, PASSWORD).await, REFRESH_COOKIE);

    let res = warp::test::request()
        .method("POST")
        .path("/auth/refresh")
        .header("cookie", format!("{REFRESH_COOKIE}={old}"))
        .reply(&filter)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let new = cookie_value(&res, REFRESH_COOKIE);
    assert_ne!(new, old);
    assert!(!cookie_value(&res, ACCESS_COOKIE).is_empty());

    let replay = warp::test::request()
        .method("POST")
        .path("/auth/refresh")
        .header("cookie", format!("{REFRESH_COOKIE}={old}"))
        .reply(&filter)
        .await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&replay), "TOKEN_REUSED");
}

#[tokio::test]
async fn test_refresh_without_cookie_is_unauthorized() {
    let app = spawn_app().await;
    let filter = filter_for(&app);

    let res = warp::test::request()
        .method("POST")
        .path("/auth/refresh")
        .reply(&filter)
        .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&res), "UNAUTHORIZED");
}

#[tokio::test]
async fn test_logout_clears_cookies_and_revokes_refresh_token() {
    let app = spawn_app().await;
    let filter = filter_for(&app);
    let refresh = cookie_value(&login(&filter, PASSWORD).await, REFRESH_COOKIE);

    let res = warp::test::request()
        .method("POST")
        .path("/auth/logout")
        .header("cookie", format!("{REFRESH_COOKIE}={refresh}"))
        .reply(&filter)
        .await;

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(res.body().is_empty());
    assert!(set_cookie(&res, ACCESS_COOKIE).contains("Max-Age=0"));
    assert!(set_cookie(&res, REFRESH_COOKIE).contains("Max-Age=0"));
    assert!(app.store.records().await.is_empty());

    let res = warp::test::request()
        .method("POST")
        .path("/auth/refresh")
        .header("cookie", format!("{REFRESH_COOKIE}={refresh}"))
        .reply(&filter)
        .await;
    assert_eq!(error_code(&res), "TOKEN_INVALID");
}

#[tokio::test]
async fn test_logout_without_cookie_still_succeeds() {
    let app = spawn_app().await;
    let filter = filter_for(&app);

    let res = warp::test::request()
        .method("POST")
        .path("/auth/logout")
        .reply(&filter)
        .await;

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(set_cookies(&res).len(), 2);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = spawn_app().await;
    let filter = filter_for(&app);

    let res = warp::test::request().path("/nope").reply(&filter).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_code(&res), "NOT_FOUND");
}
