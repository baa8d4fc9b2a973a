//! # REST API for Transactions
//!
//! Endpoints for booking, listing, editing and removing ledger entries.
//! Every write keeps the affected account balances in step, so clients
//! should reload accounts after a successful call.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use log::{error, info};
use shared::{CreateTransactionRequest, SuccessResponse, TransactionFilter, UpdateTransactionRequest};

use crate::backend::io::rest::{error_response, ApiJson};
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/transactions", post(create_transaction))
        // GET takes a family id, PUT and DELETE a transaction id
        .route(
            "/transactions/:id",
            get(list_transactions).put(update_transaction).delete(delete_transaction),
        )
}

/// Create a new transaction
pub async fn create_transaction(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateTransactionRequest>,
) -> impl IntoResponse {
    info!("POST /api/transactions - request: {:?}", request);

    match state.transaction_service.create_transaction(request).await {
        Ok(transaction) => (StatusCode::CREATED, Json(transaction)).into_response(),
        Err(e) => {
            error!("Failed to create transaction: {}", e);
            error_response(e)
        }
    }
}

/// List a family's transactions, newest first, optionally filtered
pub async fn list_transactions(
    State(state): State<AppState>,
    Path(family_id): Path<String>,
    Query(filter): Query<TransactionFilter>,
) -> impl IntoResponse {
    info!("GET /api/transactions/{} - query: {:?}", family_id, filter);

    match state.transaction_service.list_transactions(&family_id, &filter).await {
        Ok(transactions) => (StatusCode::OK, Json(transactions)).into_response(),
        Err(e) => {
            error!("Failed to list transactions: {}", e);
            error_response(e)
        }
    }
}

pub async fn update_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
    ApiJson(request): ApiJson<UpdateTransactionRequest>,
) -> impl IntoResponse {
    info!("PUT /api/transactions/{} - request: {:?}", transaction_id, request);

    match state.transaction_service.update_transaction(&transaction_id, request).await {
        Ok(transaction) => (StatusCode::OK, Json(transaction)).into_response(),
        Err(e) => {
            error!("Failed to update transaction {}: {}", transaction_id, e);
            error_response(e)
        }
    }
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/transactions/{}", transaction_id);

    match state.transaction_service.delete_transaction(&transaction_id).await {
        Ok(_) => (StatusCode::OK, Json(SuccessResponse::new("Transaction deleted successfully"))).into_response(),
        Err(e) => {
            error!("Failed to delete transaction {}: {}", transaction_id, e);
            error_response(e)
        }
    }
}
