//! Serving the prebuilt client bundle.
//!
//! Files under the static directory are served as-is. Any other non-API path
//! gets `index.html` so the client-side router can take over.

use std::path::Path;

use axum::{
    extract::OriginalUri,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{info, warn};
use shared::ErrorResponse;
use tower_http::services::{ServeDir, ServeFile};

/// File service for `static_dir`, or None when the directory is missing
pub fn spa_service(static_dir: &Path) -> Option<ServeDir<ServeFile>> {
    if !static_dir.is_dir() {
        warn!(
            "⚠️ Static directory {} not found, serving the API only",
            static_dir.display()
        );
        return None;
    }

    info!("📁 Serving client bundle from {}", static_dir.display());
    let index = static_dir.join("index.html");
    Some(ServeDir::new(static_dir).fallback(ServeFile::new(index)))
}

/// Fallback for unknown `/api` paths so they never fall through to `index.html`.
///
/// Reports the full request path; the nested router only sees the part after `/api`.
pub async fn api_not_found(OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    warn!("No API route for {}", uri);
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("No route for {}", uri.path()),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::MemStorage;
    use crate::backend::{create_router, AppState};
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn get_text(app: &axum::Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    #[test]
    fn test_missing_directory_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        assert!(spa_service(&dir.path().join("dist")).is_none());
        assert!(spa_service(dir.path()).is_some());
    }

    #[tokio::test]
    async fn test_serves_files_and_index_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>budget</html>").unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();
        std::fs::write(dir.path().join("assets").join("app.js"), "console.log('hi')").unwrap();

        let state = AppState::new(Arc::new(MemStorage::new()));
        let app = create_router(state, Some(dir.path()));

        let (status, body) = get_text(&app, "/assets/app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "console.log('hi')");

        let (status, body) = get_text(&app, "/transactions").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<html>budget</html>");

        let (status, body) = get_text(&app, "/api/does-not-exist").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("error"));
        assert!(body.contains("No route for /api/does-not-exist"));

        let (status, _) = get_text(&app, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
    }
}
