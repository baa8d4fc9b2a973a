//! Dashboard, budget, statistics and health endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{Datelike, Local};
use log::{debug, error, info};
use serde::Deserialize;
use serde_json::json;

use crate::backend::io::rest::error_response;
use crate::backend::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct BudgetQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/dashboard/:familyId", get(get_dashboard))
        .route("/budget/:familyId", get(get_budget))
        .route("/db-stats/:familyId", get(get_db_stats))
}

/// Liveness check, also reports which storage backend is active
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    debug!("GET /api/health");
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "storage": state.storage_kind.to_string() })),
    )
}

pub async fn get_dashboard(State(state): State<AppState>, Path(family_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/dashboard/{}", family_id);

    let today = Local::now().date_naive();
    match state.summary_service.dashboard(&family_id, today).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            error!("Failed to build dashboard: {}", e);
            error_response(e)
        }
    }
}

pub async fn get_budget(
    State(state): State<AppState>,
    Path(family_id): Path<String>,
    Query(query): Query<BudgetQuery>,
) -> impl IntoResponse {
    info!("GET /api/budget/{} - query: {:?}", family_id, query);

    let today = Local::now().date_naive();
    let year = query.year.unwrap_or(today.year());
    let month = query.month.unwrap_or(today.month());

    match state.summary_service.budget(&family_id, year, month).await {
        Ok(budget) => (StatusCode::OK, Json(budget)).into_response(),
        Err(e) => {
            error!("Failed to build budget overview: {}", e);
            error_response(e)
        }
    }
}

pub async fn get_db_stats(State(state): State<AppState>, Path(family_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/db-stats/{}", family_id);

    match state.summary_service.db_stats(&family_id).await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => {
            error!("Failed to collect statistics: {}", e);
            error_response(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::io::rest::test_support::{register_founder, send, test_app};
    use axum::http::{Method, StatusCode};
    use chrono::Local;
    use serde_json::json;

    #[tokio::test]
    async fn test_health() {
        let (_state, app) = test_app();
        let (status, body) = send(&app, Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["storage"], "In-memory");
    }

    #[tokio::test]
    async fn test_dashboard_budget_and_stats() {
        let (_state, app) = test_app();
        let (user_id, family_id) = register_founder(&app, "anna").await;
        let (_, account) = send(
            &app,
            Method::POST,
            "/api/accounts",
            Some(json!({"name": "Сбербанк", "type": "checking", "balance": 10000.0, "familyId": family_id})),
        )
        .await;
        let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
        for (kind, amount, description) in [("income", 50000.0, "Зарплата за месяц"), ("expense", 2000.0, "Продукты")] {
            let (status, _) = send(
                &app,
                Method::POST,
                "/api/transactions",
                Some(json!({
                    "amount": amount,
                    "date": today,
                    "description": description,
                    "type": kind,
                    "accountId": account["id"],
                    "createdById": user_id,
                    "familyId": family_id
                })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, dashboard) = send(&app, Method::GET, &format!("/api/dashboard/{}", family_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(dashboard["totalBalance"], 58000.0);
        assert_eq!(dashboard["monthlyIncome"], 50000.0);
        assert_eq!(dashboard["monthlyExpenses"], 2000.0);
        assert_eq!(dashboard["currencySymbol"], "₽");
        assert_eq!(dashboard["dailyFlow"].as_array().unwrap().len(), 7);
        assert_eq!(dashboard["recentTransactions"].as_array().unwrap().len(), 2);

        let (status, budget) = send(&app, Method::GET, &format!("/api/budget/{}", family_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(budget["totalSpent"], 2000.0);

        let (status, stats) = send(&app, Method::GET, &format!("/api/db-stats/{}", family_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["counts"]["transactions"], 2);
        assert_eq!(stats["counts"]["accounts"], 1);
        assert_eq!(stats["storage"]["isDatabase"], false);
    }

    #[tokio::test]
    async fn test_budget_rejects_bad_month() {
        let (_state, app) = test_app();
        let (_, family_id) = register_founder(&app, "anna").await;
        let (status, _) = send(&app, Method::GET, &format!("/api/budget/{}?month=0", family_id), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
