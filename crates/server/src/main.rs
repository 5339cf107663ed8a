use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use shared::error::{ApiError, ErrorCode};
use tokio::fs;
use tracing::{info, warn};

mod config;

use config::load_settings;

struct AppState {
    site_root: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let site_root = settings.site_root.canonicalize().with_context(|| {
        format!(
            "site root '{}' does not exist or is not readable",
            settings.site_root.display()
        )
    })?;

    let app = build_router(Arc::new(AppState { site_root }));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "site server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .fallback(get(serve_site_file))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

/// Resolves a request path against the site root: `/` maps to
/// `/index.html`, a path naming a directory falls back to the
/// `index.html` inside it, and the first candidate that exists wins.
/// Anything that resolves outside the site root is treated as absent.
async fn serve_site_file(
    State(state): State<Arc<AppState>>,
    uri: Uri,
) -> Result<Response, (StatusCode, Json<ApiError>)> {
    let path = uri.path();
    let path = if path == "/" { "/index.html" } else { path };
    let base = state.site_root.join(path.trim_start_matches('/'));

    let candidates = [base.clone(), base.join("index.html")];
    for candidate in candidates {
        let Ok(resolved) = fs::canonicalize(&candidate).await else {
            continue;
        };
        if !resolved.starts_with(&state.site_root) {
            warn!(path = %candidate.display(), "request escapes the site root");
            continue;
        }
        let Ok(metadata) = fs::metadata(&resolved).await else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }

        let body = fs::read(&resolved).await.map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new(ErrorCode::Internal, e.to_string())),
            )
        })?;
        return Ok((
            [(header::CONTENT_TYPE, content_type_for(&resolved))],
            body,
        )
            .into_response());
    }

    Err((
        StatusCode::NOT_FOUND,
        Json(ApiError::new(ErrorCode::NotFound, "no such file")),
    ))
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    match ext {
        "html" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "json" => "application/json",
        "webmanifest" => "application/manifest+json",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn site_fixture() -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("site");
        std::fs::create_dir_all(root.join("sections/why")).expect("site tree");
        std::fs::write(root.join("index.html"), "<h1>Shell</h1>").expect("index");
        std::fs::write(root.join("styles.css"), "body { margin: 0 }").expect("css");
        std::fs::write(root.join("sections/why/index.html"), "<h2>Why</h2>").expect("fragment");
        std::fs::write(dir.path().join("secret.txt"), "keep out").expect("secret");

        let app = build_router(Arc::new(AppState {
            site_root: root.canonicalize().expect("canonical root"),
        }));
        (dir, app)
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        String::from_utf8(bytes.to_vec()).expect("utf8 body")
    }

    #[tokio::test]
    async fn healthz_reports_ok() {
        let (_dir, app) = site_fixture();
        let response = app
            .oneshot(Request::get("/healthz").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn root_serves_the_index_document() {
        let (_dir, app) = site_fixture();
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).expect("header"),
            "text/html"
        );
        assert_eq!(body_text(response).await, "<h1>Shell</h1>");
    }

    #[tokio::test]
    async fn section_fragments_resolve_by_exact_path() {
        let (_dir, app) = site_fixture();
        let response = app
            .oneshot(
                Request::get("/sections/why/index.html")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "<h2>Why</h2>");
    }

    #[tokio::test]
    async fn directory_requests_fall_back_to_their_index() {
        let (_dir, app) = site_fixture();
        let response = app
            .oneshot(
                Request::get("/sections/why")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "<h2>Why</h2>");
    }

    #[tokio::test]
    async fn stylesheets_carry_a_css_content_type() {
        let (_dir, app) = site_fixture();
        let response = app
            .oneshot(Request::get("/styles.css").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).expect("header"),
            "text/css"
        );
    }

    #[tokio::test]
    async fn missing_files_yield_the_not_found_error_body() {
        let (_dir, app) = site_fixture();
        let response = app
            .oneshot(
                Request::get("/sections/zzz/index.html")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let error: ApiError =
            serde_json::from_str(&body_text(response).await).expect("error body");
        assert!(matches!(error.code, ErrorCode::NotFound));
    }

    #[tokio::test]
    async fn traversal_outside_the_site_root_is_rejected() {
        let (_dir, app) = site_fixture();
        let response = app
            .oneshot(
                Request::get("/../secret.txt")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_extensions_fall_back_to_octet_stream() {
        assert_eq!(content_type_for(Path::new("video.mp4")), "video/mp4");
        assert_eq!(
            content_type_for(Path::new("download.bin")),
            "application/octet-stream"
        );
        assert_eq!(content_type_for(Path::new("no_extension")), "application/octet-stream");
    }
}
