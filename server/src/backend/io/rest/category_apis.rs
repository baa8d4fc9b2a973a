//! Category endpoints.
//!
//! `GET /categories/:id` takes a family id, `PUT` and `DELETE` on the same
//! path take a category id.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use log::{error, info};
use shared::{CreateCategoryRequest, SuccessResponse, UpdateCategoryRequest};

use crate::backend::io::rest::{error_response, ApiJson};
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", post(create_category))
        .route(
            "/categories/:id",
            get(list_categories).put(update_category).delete(delete_category),
        )
}

pub async fn create_category(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateCategoryRequest>,
) -> impl IntoResponse {
    info!("POST /api/categories - request: {:?}", request);

    match state.category_service.create_category(request).await {
        Ok(category) => (StatusCode::CREATED, Json(category)).into_response(),
        Err(e) => {
            error!("Failed to create category: {}", e);
            error_response(e)
        }
    }
}

pub async fn list_categories(State(state): State<AppState>, Path(family_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/categories/{}", family_id);

    match state.category_service.list_categories(&family_id).await {
        Ok(categories) => (StatusCode::OK, Json(categories)).into_response(),
        Err(e) => {
            error!("Failed to list categories: {}", e);
            error_response(e)
        }
    }
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
    ApiJson(request): ApiJson<UpdateCategoryRequest>,
) -> impl IntoResponse {
    info!("PUT /api/categories/{} - request: {:?}", category_id, request);

    match state.category_service.update_category(&category_id, request).await {
        Ok(category) => (StatusCode::OK, Json(category)).into_response(),
        Err(e) => {
            error!("Failed to update category {}: {}", category_id, e);
            error_response(e)
        }
    }
}

pub async fn delete_category(State(state): State<AppState>, Path(category_id): Path<String>) -> impl IntoResponse {
    info!("DELETE /api/categories/{}", category_id);

    match state.category_service.delete_category(&category_id).await {
        Ok(()) => (StatusCode::OK, Json(SuccessResponse::new("Category deleted successfully"))).into_response(),
        Err(e) => {
            error!("Failed to delete category {}: {}", category_id, e);
            error_response(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::io::rest::test_support::{register_founder, send, test_app};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_new_family_gets_default_categories() {
        let (_state, app) = test_app();
        let (_, family_id) = register_founder(&app, "anna").await;

        let (status, body) = send(&app, Method::GET, &format!("/api/categories/{}", family_id), None).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names.len(), 8);
        assert!(names.contains(&"Продукты"));
        assert!(names.contains(&"Зарплата"));
    }

    #[tokio::test]
    async fn test_category_lifecycle() {
        let (_state, app) = test_app();
        let (_, family_id) = register_founder(&app, "anna").await;

        let (status, created) = send(
            &app,
            Method::POST,
            "/api/categories",
            Some(json!({
                "name": "Подарки",
                "type": "expense",
                "color": "#f97316",
                "icon": "gift",
                "budgetLimit": 3000.0,
                "familyId": family_id
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let uri = format!("/api/categories/{}", created["id"].as_str().unwrap());

        let (status, updated) = send(&app, Method::PUT, &uri, Some(json!({"budgetLimit": 4500.0}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["budgetLimit"], 4500.0);
        assert_eq!(updated["name"], "Подарки");

        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_category_validation() {
        let (_state, app) = test_app();
        let (_, family_id) = register_founder(&app, "anna").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/categories",
            Some(json!({"name": " ", "type": "expense", "color": "#000", "icon": "x", "familyId": family_id})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}
