//! # REST API Interface Layer
//!
//! HTTP endpoints for the family budget. Each submodule owns one resource and
//! exposes a `router()` that `create_router` nests under `/api`.
//!
//! Every error leaves this layer as `{"error": "<message>"}`:
//!
//! | domain error   | status |
//! |----------------|--------|
//! | `Validation`   | 400    |
//! | `Unauthorized` | 401    |
//! | `Forbidden`    | 403    |
//! | `NotFound`     | 404    |
//! | `Storage`      | 500    |

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use log::error;
use shared::ErrorResponse;

use crate::backend::domain::DomainError;

pub mod account_apis;
pub mod calendar_apis;
pub mod category_apis;
pub mod family_apis;
pub mod mappers;
pub mod recurring_payment_apis;
pub mod static_files;
pub mod summary_apis;
pub mod transaction_apis;
pub mod user_apis;

/// Status code for a domain failure
pub fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Turn a domain failure into the JSON error body.
///
/// Storage failures are logged in full but answered with a generic message.
pub fn error_response(err: DomainError) -> Response {
    let status = status_for(&err);
    let message = match &err {
        DomainError::Storage(inner) => {
            error!("❌ Storage failure: {:#}", inner);
            "Internal server error".to_string()
        }
        other => other.to_string(),
    };
    (status, Json(ErrorResponse { error: message })).into_response()
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        error_response(self)
    }
}

impl From<JsonRejection> for DomainError {
    fn from(rejection: JsonRejection) -> Self {
        DomainError::Validation(rejection.body_text())
    }
}

/// JSON request body whose rejections (malformed JSON, missing fields,
/// unknown enum labels, wrong content type) answer 400 with the usual
/// error body instead of axum's plain text.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(DomainError))]
pub struct ApiJson<T>(pub T);

/// Helpers for driving the full router in handler tests
#[cfg(test)]
pub(crate) mod test_support {
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::backend::storage::MemStorage;
    use crate::backend::{create_router, AppState};

    pub fn test_app() -> (AppState, Router) {
        let state = AppState::new(Arc::new(MemStorage::new()));
        let app = create_router(state.clone(), None);
        (state, app)
    }

    /// Send one request and return the status with the parsed JSON body
    /// (`Value::Null` for an empty body).
    pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// Register a user who founds a family, returning (user id, family id)
    pub async fn register_founder(app: &Router, username: &str) -> (String, String) {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/register",
            Some(serde_json::json!({
                "username": username,
                "password": "password123",
                "firstName": "Анна",
                "lastName": "Иванова",
                "familyName": "Ивановы"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        (
            body["user"]["id"].as_str().unwrap().to_string(),
            body["family"]["id"].as_str().unwrap().to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&DomainError::validation("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&DomainError::Unauthorized("x".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(&DomainError::forbidden("x")), StatusCode::FORBIDDEN);
        assert_eq!(status_for(&DomainError::not_found("x")), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&DomainError::Storage(anyhow::anyhow!("db down"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_bad_request() {
        use axum::body::Body;
        use axum::http::{Method, Request};
        use tower::ServiceExt;

        let (_, app) = test_support::test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/login")
                    .header("content-type", "application/json")
                    .body(Body::from("{\"username\": "))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
    }
}
