//! Account endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use log::{error, info};
use shared::{CreateAccountRequest, SuccessResponse, UpdateAccountRequest};

use crate::backend::io::rest::{error_response, ApiJson};
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/accounts", post(create_account))
        // GET takes a family id, PUT and DELETE an account id
        .route(
            "/accounts/:id",
            get(list_accounts).put(update_account).delete(delete_account),
        )
        .route("/accounts/:id/transactions", get(list_account_transactions))
}

pub async fn create_account(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateAccountRequest>,
) -> impl IntoResponse {
    info!("POST /api/accounts - request: {:?}", request);

    match state.account_service.create_account(request).await {
        Ok(account) => (StatusCode::CREATED, Json(account)).into_response(),
        Err(e) => {
            error!("Failed to create account: {}", e);
            error_response(e)
        }
    }
}

pub async fn list_accounts(State(state): State<AppState>, Path(family_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/accounts/{}", family_id);

    match state.account_service.list_accounts(&family_id).await {
        Ok(accounts) => (StatusCode::OK, Json(accounts)).into_response(),
        Err(e) => {
            error!("Failed to list accounts: {}", e);
            error_response(e)
        }
    }
}

pub async fn update_account(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    ApiJson(request): ApiJson<UpdateAccountRequest>,
) -> impl IntoResponse {
    info!("PUT /api/accounts/{} - request: {:?}", account_id, request);

    match state.account_service.update_account(&account_id, request).await {
        Ok(account) => (StatusCode::OK, Json(account)).into_response(),
        Err(e) => {
            error!("Failed to update account {}: {}", account_id, e);
            error_response(e)
        }
    }
}

pub async fn delete_account(State(state): State<AppState>, Path(account_id): Path<String>) -> impl IntoResponse {
    info!("DELETE /api/accounts/{}", account_id);

    match state.account_service.delete_account(&account_id).await {
        Ok(()) => (StatusCode::OK, Json(SuccessResponse::new("Account deleted successfully"))).into_response(),
        Err(e) => {
            error!("Failed to delete account {}: {}", account_id, e);
            error_response(e)
        }
    }
}

pub async fn list_account_transactions(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/accounts/{}/transactions", account_id);

    match state.account_service.account_transactions(&account_id).await {
        Ok(transactions) => (StatusCode::OK, Json(transactions)).into_response(),
        Err(e) => {
            error!("Failed to list transactions of account {}: {}", account_id, e);
            error_response(e)
        }
    }
}
