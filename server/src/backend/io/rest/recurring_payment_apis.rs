//! Recurring payment endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use log::{error, info};
use shared::{CreateRecurringPaymentRequest, SuccessResponse, UpdateRecurringPaymentRequest};

use crate::backend::io::rest::{error_response, ApiJson};
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recurring-payments", post(create_payment))
        // GET takes a family id, PUT and DELETE a payment id
        .route(
            "/recurring-payments/:id",
            get(list_payments).put(update_payment).delete(delete_payment),
        )
}

pub async fn create_payment(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateRecurringPaymentRequest>,
) -> impl IntoResponse {
    info!("POST /api/recurring-payments - request: {:?}", request);

    match state.recurring_payment_service.create_payment(request).await {
        Ok(payment) => (StatusCode::CREATED, Json(payment)).into_response(),
        Err(e) => {
            error!("Failed to create recurring payment: {}", e);
            error_response(e)
        }
    }
}

pub async fn list_payments(State(state): State<AppState>, Path(family_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/recurring-payments/{}", family_id);

    match state.recurring_payment_service.list_payment_views(&family_id).await {
        Ok(payments) => (StatusCode::OK, Json(payments)).into_response(),
        Err(e) => {
            error!("Failed to list recurring payments: {}", e);
            error_response(e)
        }
    }
}

pub async fn update_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
    ApiJson(request): ApiJson<UpdateRecurringPaymentRequest>,
) -> impl IntoResponse {
    info!("PUT /api/recurring-payments/{} - request: {:?}", payment_id, request);

    match state.recurring_payment_service.update_payment(&payment_id, request).await {
        Ok(payment) => (StatusCode::OK, Json(payment)).into_response(),
        Err(e) => {
            error!("Failed to update recurring payment {}: {}", payment_id, e);
            error_response(e)
        }
    }
}

pub async fn delete_payment(State(state): State<AppState>, Path(payment_id): Path<String>) -> impl IntoResponse {
    info!("DELETE /api/recurring-payments/{}", payment_id);

    match state.recurring_payment_service.delete_payment(&payment_id).await {
        Ok(()) => (StatusCode::OK, Json(SuccessResponse::new("Recurring payment deleted successfully"))).into_response(),
        Err(e) => {
            error!("Failed to delete recurring payment {}: {}", payment_id, e);
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
    async fn test_recurring_payment_lifecycle() {
        let (_state, app) = test_app();
        let (user_id, family_id) = register_founder(&app, "anna").await;

        let (status, created) = send(
            &app,
            Method::POST,
            "/api/recurring-payments",
            Some(json!({
                "name": "Ипотека",
                "amount": 35000.0,
                "frequency": "monthly",
                "startDate": "2025-01-15T00:00:00.000Z",
                "type": "loan",
                "familyId": family_id,
                "createdById": user_id
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["startDate"], "2025-01-15");
        let uri = format!("/api/recurring-payments/{}", created["id"].as_str().unwrap());

        let (status, listed) = send(&app, Method::GET, &format!("/api/recurring-payments/{}", family_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed[0]["createdByName"], "Анна Иванова");

        let (status, updated) = send(&app, Method::PUT, &uri, Some(json!({"frequency": "semi_annual"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["frequency"], "semi_annual");

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::PUT, &uri, Some(json!({"amount": 1.0}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
