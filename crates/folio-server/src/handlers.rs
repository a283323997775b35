//! Request handlers.
//!
//! Every GET resolves its path through the [`ContentResolver`] on the blocking
//! pool. Resolved files are streamed with `ServeFile`; errors are answered
//! with the site's status pages.
//!
//! [`ContentResolver`]: folio_site::ContentResolver

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::error::ServerError;
use crate::state::AppState;

/// Handle GET /.
pub(crate) async fn get_root(State(state): State<Arc<AppState>>, request: Request) -> Response {
    serve(&state, String::new(), request).await
}

/// Handle GET /{*path}.
pub(crate) async fn get_path(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    request: Request,
) -> Response {
    serve(&state, path, request).await
}

async fn serve(state: &AppState, path: String, request: Request) -> Response {
    match resolve(state, path).await {
        Ok(file) => match ServeFile::new(file).oneshot(request).await {
            Ok(response) => response.map(Body::new),
            Err(never) => match never {},
        },
        Err(e) => error_response(state, &e).await,
    }
}

async fn resolve(state: &AppState, path: String) -> Result<PathBuf, ServerError> {
    let resolver = Arc::clone(&state.resolver);
    Ok(tokio::task::spawn_blocking(move || resolver.from_path(&path)).await??)
}

/// Answer `error` with its status page.
///
/// Falls back to the 500 page, then to an empty 500.
async fn error_response(state: &AppState, error: &ServerError) -> Response {
    let status = error.status_code();
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %error, "Request failed");
    } else {
        tracing::debug!(error = %error, "Not found");
    }

    if let Some(page) = status_page(state, status).await {
        return page;
    }
    if status != StatusCode::INTERNAL_SERVER_ERROR
        && let Some(page) = status_page(state, StatusCode::INTERNAL_SERVER_ERROR).await
    {
        return page;
    }
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

async fn status_page(state: &AppState, status: StatusCode) -> Option<Response> {
    let resolver = Arc::clone(&state.resolver);
    let code = status.as_u16();
    let file = match tokio::task::spawn_blocking(move || resolver.from_status(code)).await {
        Ok(Ok(file)) => file,
        Ok(Err(e)) => {
            tracing::warn!(status = code, error = %e, "Status page unavailable");
            return None;
        }
        Err(e) => {
            tracing::warn!(status = code, error = %e, "Status page task failed");
            return None;
        }
    };

    match tokio::fs::read(&file).await {
        Ok(body) => Some(
            (
                status,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
        ),
        Err(e) => {
            tracing::warn!(path = %file.display(), error = %e, "Failed to read status page");
            None
        }
    }
}
