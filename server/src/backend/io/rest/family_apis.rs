//! Family membership and invitation endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use log::{error, info, warn};
use shared::{AcceptInvitationRequest, CreateInvitationRequest, GenerateInvitationRequest, JoinFamilyRequest};

use crate::backend::io::rest::{error_response, ApiJson};
use crate::backend::io::rest::mappers::UserMapper;
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/families/join", post(join_family))
        .route("/families/:familyId/members", get(list_members))
        .route("/families/:familyId/invitations", get(list_invitations).post(create_invitation))
        .route("/families/:familyId/generate-invitation", post(generate_invitation))
        .route("/invitations/:invitationId/accept", post(accept_invitation))
}

pub async fn list_members(State(state): State<AppState>, Path(family_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/families/{}/members", family_id);

    match state.family_service.members(&family_id).await {
        Ok((family, members)) => (StatusCode::OK, Json(UserMapper::to_members_dto(family, members))).into_response(),
        Err(e) => {
            error!("Failed to list members of family {}: {}", family_id, e);
            error_response(e)
        }
    }
}

pub async fn list_invitations(State(state): State<AppState>, Path(family_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/families/{}/invitations", family_id);

    match state.family_service.invitations(&family_id).await {
        Ok(invitations) => (StatusCode::OK, Json(invitations)).into_response(),
        Err(e) => {
            error!("Failed to list invitations of family {}: {}", family_id, e);
            error_response(e)
        }
    }
}

pub async fn create_invitation(
    State(state): State<AppState>,
    Path(family_id): Path<String>,
    ApiJson(request): ApiJson<CreateInvitationRequest>,
) -> impl IntoResponse {
    info!("POST /api/families/{}/invitations - request: {:?}", family_id, request);

    match state.family_service.invite(&family_id, request).await {
        Ok(invitation) => (StatusCode::CREATED, Json(invitation)).into_response(),
        Err(e) => {
            warn!("Failed to create invitation: {}", e);
            error_response(e)
        }
    }
}

pub async fn generate_invitation(
    State(state): State<AppState>,
    Path(family_id): Path<String>,
    ApiJson(request): ApiJson<GenerateInvitationRequest>,
) -> impl IntoResponse {
    info!("POST /api/families/{}/generate-invitation - request: {:?}", family_id, request);

    match state.family_service.generate_invitation(&family_id, request).await {
        Ok(invitation) => (StatusCode::CREATED, Json(invitation)).into_response(),
        Err(e) => {
            warn!("Failed to generate invitation: {}", e);
            error_response(e)
        }
    }
}

pub async fn join_family(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<JoinFamilyRequest>,
) -> impl IntoResponse {
    info!("POST /api/families/join - request: {:?}", request);

    match state.family_service.join(request).await {
        Ok(joined) => (StatusCode::OK, Json(UserMapper::to_user_with_family_dto(joined))).into_response(),
        Err(e) => {
            warn!("Failed to join family: {}", e);
            error_response(e)
        }
    }
}

pub async fn accept_invitation(
    State(state): State<AppState>,
    Path(invitation_id): Path<String>,
    ApiJson(request): ApiJson<AcceptInvitationRequest>,
) -> impl IntoResponse {
    info!("POST /api/invitations/{}/accept - request: {:?}", invitation_id, request);

    match state.family_service.accept_invitation(&invitation_id, &request.user_id).await {
        Ok(joined) => (StatusCode::OK, Json(UserMapper::to_user_with_family_dto(joined))).into_response(),
        Err(e) => {
            warn!("Failed to accept invitation {}: {}", invitation_id, e);
            error_response(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::io::rest::test_support::{register_founder, send, test_app};
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    async fn register_plain(app: &axum::Router, username: &str) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/register",
            Some(json!({"username": username, "password": "password123"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["family"], Value::Null);
        body["user"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_generate_code_and_join() {
        let (_state, app) = test_app();
        let (admin_id, family_id) = register_founder(&app, "anna").await;
        let boris_id = register_plain(&app, "boris").await;

        let (status, invitation) = send(
            &app,
            Method::POST,
            &format!("/api/families/{}/generate-invitation", family_id),
            Some(json!({"invitedBy": admin_id})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(invitation["status"], "pending");
        let code = invitation["invitationCode"].as_str().unwrap().to_lowercase();

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/families/join",
            Some(json!({"userId": boris_id, "invitationCode": code})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["familyId"], family_id.as_str());
        assert_eq!(body["user"]["role"], "member");
        assert!(body["user"].get("passwordHash").is_none());

        let (status, members) = send(&app, Method::GET, &format!("/api/families/{}/members", family_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(members["members"].as_array().unwrap().len(), 2);
        assert_eq!(members["family"]["id"], family_id.as_str());

        // A used code cannot be reused
        let carol_id = register_plain(&app, "carol").await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/families/join",
            Some(json!({"userId": carol_id, "invitationCode": code})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invitation is no longer valid");
    }

    #[tokio::test]
    async fn test_named_invitation_accept() {
        let (_state, app) = test_app();
        let (admin_id, family_id) = register_founder(&app, "anna").await;
        let boris_id = register_plain(&app, "boris").await;
        let carol_id = register_plain(&app, "carol").await;

        let (status, invitation) = send(
            &app,
            Method::POST,
            &format!("/api/families/{}/invitations", family_id),
            Some(json!({"username": "boris", "invitedBy": admin_id})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let invitation_id = invitation["id"].as_str().unwrap().to_string();

        let (status, pending) = send(&app, Method::GET, &format!("/api/users/{}/invitations", boris_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(pending[0]["id"], invitation_id.as_str());

        let accept_uri = format!("/api/invitations/{}/accept", invitation_id);
        let (status, _) = send(&app, Method::POST, &accept_uri, Some(json!({"userId": carol_id}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(&app, Method::POST, &accept_uri, Some(json!({"userId": boris_id}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["family"]["id"], family_id.as_str());

        let (status, listed) = send(&app, Method::GET, &format!("/api/families/{}/invitations", family_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed[0]["status"], "accepted");
    }

    #[tokio::test]
    async fn test_outsider_cannot_invite() {
        let (_state, app) = test_app();
        let (_, family_id) = register_founder(&app, "anna").await;
        let outsider_id = register_plain(&app, "outsider").await;

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/families/{}/generate-invitation", family_id),
            Some(json!({"invitedBy": outsider_id})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Not authorized to invite");

        let (status, _) = send(&app, Method::GET, "/api/families/missing/members", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_register_with_invitation_code() {
        let (_state, app) = test_app();
        let (admin_id, family_id) = register_founder(&app, "anna").await;

        let (_, invitation) = send(
            &app,
            Method::POST,
            &format!("/api/families/{}/generate-invitation", family_id),
            Some(json!({"invitedBy": admin_id})),
        )
        .await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/register",
            Some(json!({
                "username": "boris",
                "password": "password123",
                "invitationCode": invitation["invitationCode"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["family"]["id"], family_id.as_str());
        assert_eq!(body["user"]["role"], "member");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/register",
            Some(json!({"username": "carol", "password": "password123", "invitationCode": "ZZZZZZ"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid invitation code");
    }
}
