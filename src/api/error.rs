use crate::api::handler::ApiResponse;
use crate::application_port::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::filters::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let code = if let Some(code) = err.find::<ApiErrorCode>() {
        *code
    } else if err.is_not_found() {
        ApiErrorCode::NotFound
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        ApiErrorCode::MethodNotAllowed
    } else if err.find::<BodyDeserializeError>().is_some()
        || err.find::<reject::UnsupportedMediaType>().is_some()
        || err.find::<reject::PayloadTooLarge>().is_some()
        || err.find::<reject::LengthRequired>().is_some()
    {
        ApiErrorCode::ValidationFailed
    } else {
        ApiErrorCode::internal(format!("unhandled rejection: {:?}", err))
    };

    let json = warp::reply::json(&ApiResponse::<()>::err(code, code.to_string()));
    Ok(warp::reply::with_status(json, code.status()))
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Token expired")]
    TokenExpired,
    #[error("Token is not valid")]
    TokenInvalid,
    #[error("Refresh token already used")]
    TokenReused,
    #[error("User not found")]
    UserNotFound,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Validation failed")]
    ValidationFailed,
    #[error("Not found")]
    NotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::InvalidCredentials
            | ApiErrorCode::TokenExpired
            | ApiErrorCode::TokenInvalid
            | ApiErrorCode::TokenReused
            | ApiErrorCode::UserNotFound
            | ApiErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiErrorCode::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<AuthError> for ApiErrorCode {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredentials => ApiErrorCode::InvalidCredentials,
            AuthError::TokenExpired => ApiErrorCode::TokenExpired,
            AuthError::TokenInvalid => ApiErrorCode::TokenInvalid,
            AuthError::TokenReused => ApiErrorCode::TokenReused,
            AuthError::UserNotFound => ApiErrorCode::UserNotFound,
            AuthError::Store(e) => ApiErrorCode::internal(e),
            AuthError::InternalError(e) => ApiErrorCode::internal(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failures_are_401() {
        for err in [
            AuthError::InvalidCredentials,
            AuthError::TokenExpired,
            AuthError::TokenInvalid,
            AuthError::TokenReused,
            AuthError::UserNotFound,
        ] {
            assert_eq!(ApiErrorCode::from(err).status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_persistence_failures_are_500() {
        let store = ApiErrorCode::from(AuthError::Store("connection reset".to_string()));
        let internal = ApiErrorCode::from(AuthError::InternalError("sign".to_string()));

        assert_eq!(store, ApiErrorCode::InternalError);
        assert_eq!(store.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_codes_serialize_screaming_snake() {
        let expired = serde_json::to_value(ApiErrorCode::TokenExpired).unwrap();
        let reused = serde_json::to_value(ApiErrorCode::TokenReused).unwrap();

        assert_eq!(expired, "TOKEN_EXPIRED");
        assert_eq!(reused, "TOKEN_REUSED");
    }
}
