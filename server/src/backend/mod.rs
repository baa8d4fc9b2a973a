//! # Backend Module
//!
//! Contains all server-side logic of the family budget application.
//!
//! This module serves as the orchestration layer that brings together:
//! - **Domain**: Business rules for families, the ledger and budgets
//! - **Storage**: PostgreSQL or in-memory persistence behind one trait
//! - **IO**: REST API and static file serving
//!
//! ## Architecture
//!
//! ```text
//! Browser client
//!     ↓
//! IO Layer (REST API, handlers)
//!     ↓
//! Domain Layer (Business logic, services)
//!     ↓
//! Storage Layer (PostgreSQL / in-memory)
//! ```

pub mod domain;
pub mod io;
pub mod storage;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use log::{info, warn};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::backend::domain::{
    AccountService, CalendarService, CategoryService, FamilyService, RecurringPaymentService,
    SummaryService, TransactionService, UserService,
};
use crate::backend::io::rest::{
    account_apis, calendar_apis, category_apis, family_apis, recurring_payment_apis, static_files,
    summary_apis, transaction_apis, user_apis,
};
use crate::backend::storage::{DbConnection, MemStorage, PgStorage, Storage, StorageKind};
use crate::config::Config;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub storage_kind: StorageKind,
    pub user_service: UserService,
    pub family_service: FamilyService,
    pub category_service: CategoryService,
    pub account_service: AccountService,
    pub transaction_service: TransactionService,
    pub recurring_payment_service: RecurringPaymentService,
    pub calendar_service: CalendarService,
    pub summary_service: SummaryService,
}

impl AppState {
    /// Wire every service to the same storage backend
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let category_service = CategoryService::new(storage.clone());
        Self {
            storage_kind: storage.kind(),
            user_service: UserService::new(storage.clone(), category_service.clone()),
            family_service: FamilyService::new(storage.clone()),
            account_service: AccountService::new(storage.clone()),
            transaction_service: TransactionService::new(storage.clone()),
            recurring_payment_service: RecurringPaymentService::new(storage.clone()),
            calendar_service: CalendarService::new(storage.clone()),
            summary_service: SummaryService::new(storage),
            category_service,
        }
    }
}

/// Pick the storage backend from the configuration
pub async fn initialize_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    match config.database_url.as_deref() {
        Some(url) => {
            info!("Setting up PostgreSQL storage");
            let db = if config.run_migrations {
                DbConnection::bootstrap(url, config.connect_policy).await?
            } else {
                DbConnection::connect(url, config.connect_policy).await?
            };
            Ok(Arc::new(PgStorage::new(db)))
        }
        None => {
            warn!("⚠️ DATABASE_URL is not set, using in-memory storage; data is lost on restart");
            Ok(Arc::new(MemStorage::new()))
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &Config) -> Result<AppState> {
    let storage = initialize_storage(config).await?;

    info!("Setting up application state on {} storage", storage.kind());
    Ok(AppState::new(storage))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, static_dir: Option<&Path>) -> Router {
    let api_routes = Router::new()
        .merge(user_apis::router())
        .merge(family_apis::router())
        .merge(category_apis::router())
        .merge(account_apis::router())
        .merge(transaction_apis::router())
        .merge(recurring_payment_apis::router())
        .merge(calendar_apis::router())
        .merge(summary_apis::router())
        .fallback(static_files::api_not_found);

    let mut router = Router::new().nest("/api", api_routes);
    if let Some(service) = static_dir.and_then(static_files::spa_service) {
        router = router.fallback_service(service);
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(app_state)
}
