//! Registration, login and per-user endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
    Router,
};
use log::{error, info, warn};
use shared::{ChangePasswordRequest, DeleteUserAccountRequest, LoginRequest, RegisterRequest, SuccessResponse};

use crate::backend::io::rest::{error_response, ApiJson};
use crate::backend::io::rest::mappers::UserMapper;
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/account/delete", delete(delete_account))
        .route("/users/:userId", get(get_user))
        .route("/users/:userId/invitations", get(list_pending_invitations))
        .route("/users/:userId/families", get(list_user_families))
        .route("/users/:userId/password", put(change_password))
}

/// Create a user, optionally founding or joining a family
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> impl IntoResponse {
    // Never log the password
    info!(
        "POST /api/register - username: {}, family: {:?}, code: {:?}",
        request.username, request.family_name, request.invitation_code
    );

    match state.user_service.register(request).await {
        Ok(registered) => {
            info!("✅ Registered user {}", registered.user.username);
            (StatusCode::CREATED, Json(UserMapper::to_user_with_family_dto(registered))).into_response()
        }
        Err(e) => {
            warn!("Registration rejected: {}", e);
            error_response(e)
        }
    }
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> impl IntoResponse {
    info!("POST /api/login - username: {}", request.username);

    match state.user_service.login(request).await {
        Ok(logged_in) => (StatusCode::OK, Json(UserMapper::to_user_with_family_dto(logged_in))).into_response(),
        Err(e) => {
            warn!("Login failed: {}", e);
            error_response(e)
        }
    }
}

/// Delete a user together with everything they booked.
///
/// A missing or unreadable body is treated like a missing user id.
pub async fn delete_account(
    State(state): State<AppState>,
    body: Option<Json<DeleteUserAccountRequest>>,
) -> impl IntoResponse {
    let user_id = body.and_then(|Json(request)| request.user_id);
    info!("DELETE /api/account/delete - user: {:?}", user_id);

    match state.user_service.delete_account(user_id.as_deref()).await {
        Ok(()) => (StatusCode::OK, Json(SuccessResponse::new("Account deleted successfully"))).into_response(),
        Err(e) => {
            error!("Failed to delete account: {}", e);
            error_response(e)
        }
    }
}

pub async fn get_user(State(state): State<AppState>, Path(user_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/users/{}", user_id);

    match state.user_service.get_user(&user_id).await {
        Ok(user) => (StatusCode::OK, Json(UserMapper::to_public_user(user))).into_response(),
        Err(e) => error_response(e),
    }
}

/// Pending named invitations addressed to this user
pub async fn list_pending_invitations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/users/{}/invitations", user_id);

    match state.family_service.pending_invitations_for_user(&user_id).await {
        Ok(invitations) => (StatusCode::OK, Json(invitations)).into_response(),
        Err(e) => {
            error!("Failed to list invitations for user {}: {}", user_id, e);
            error_response(e)
        }
    }
}

pub async fn list_user_families(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/users/{}/families", user_id);

    match state.family_service.families_of_user(&user_id).await {
        Ok(families) => (StatusCode::OK, Json(families)).into_response(),
        Err(e) => {
            error!("Failed to list families for user {}: {}", user_id, e);
            error_response(e)
        }
    }
}

pub async fn change_password(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> impl IntoResponse {
    info!("PUT /api/users/{}/password", user_id);

    match state.user_service.change_password(&user_id, &request.new_password).await {
        Ok(()) => (StatusCode::OK, Json(SuccessResponse::new("Password changed successfully"))).into_response(),
        Err(e) => {
            warn!("Password change rejected for {}: {}", user_id, e);
            error_response(e)
        }
    }
}
