//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use folio_site::ContentResolver;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::{cache, security};
use crate::state::AppState;

/// Create the router serving `resolver`'s site.
///
/// Responses carry `Cache-Control: max-age=<max_age>`.
pub fn create_router(resolver: Arc<ContentResolver>, max_age: u32) -> Router {
    let state = Arc::new(AppState { resolver });

    Router::new()
        .route("/", get(handlers::get_root))
        .route("/{*path}", get(handlers::get_path))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer())
                .layer(cache::cache_control_layer(max_age)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use folio_site::SiteOptions;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const TEMPLATE: &str = "<html><head><title>$title$ | $name$</title></head><body>$content$</body></html>";

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn site() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(root, "template.html", TEMPLATE);
        write(root, "index.md", "[metadata:title]: . \"Home\"\n\nWelcome");
        write(root, "guide/index.md", "[metadata:title]: . \"Guide\"\n\nRead me");
        write(root, "guide/style.css", "body {}");
        tmp
    }

    fn with_status_pages(tmp: &TempDir) {
        write(tmp.path(), "status/404/index.md", "[metadata:title]: . \"Missing\"\n");
        write(tmp.path(), "status/500/index.md", "[metadata:title]: . \"Broken\"\n");
    }

    fn router(tmp: &TempDir) -> Router {
        let resolver = ContentResolver::new(SiteOptions::new(tmp.path(), "Example")).unwrap();
        create_router(Arc::new(resolver), 60)
    }

    async fn get(router: Router, uri: &str) -> Response {
        router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_root_renders_document() {
        let tmp = site();

        let response = get(router(&tmp), "/").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
        assert_eq!(response.headers()[header::CACHE_CONTROL], "max-age=60");
        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "SAMEORIGIN");
        let body = body_text(response).await;
        assert!(body.contains("<title>Home | Example</title>"));
        assert!(body.contains("Welcome"));
    }

    #[tokio::test]
    async fn test_trailing_slash_is_ignored() {
        let tmp = site();

        let with_slash = body_text(get(router(&tmp), "/guide/").await).await;
        let without_slash = body_text(get(router(&tmp), "/guide").await).await;

        assert!(with_slash.contains("Read me"));
        assert_eq!(with_slash, without_slash);
    }

    #[tokio::test]
    async fn test_static_file_content_type() {
        let tmp = site();

        let response = get(router(&tmp), "/guide/style.css").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");
        assert_eq!(body_text(response).await, "body {}");
    }

    #[tokio::test]
    async fn test_not_found_serves_status_page() {
        let tmp = site();
        with_status_pages(&tmp);

        let response = get(router(&tmp), "/missing").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("Missing | Example"));
    }

    #[tokio::test]
    async fn test_reserved_file_is_not_found() {
        let tmp = site();
        with_status_pages(&tmp);

        for uri in ["/guide/index.md", "/template.html", "/status/404/"] {
            let response = get(router(&tmp), uri).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_traversal_serves_error_page() {
        let tmp = site();
        with_status_pages(&tmp);

        let response = get(router(&tmp), "/a/../../secret").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(response).await.contains("Broken | Example"));
    }

    #[tokio::test]
    async fn test_missing_status_pages_fall_back_to_empty_500() {
        let tmp = site();

        let response = get(router(&tmp), "/missing").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "");
    }
}
