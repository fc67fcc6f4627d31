use crate::infra::AppState;
use audition_portal::workflows::auditions::{
    audition_router, BlobStore, ConfirmationSender, AuditionService, ReviewerGate,
    SubmissionRepository,
};
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

pub(crate) fn with_portal_routes<R, B, N>(
    service: Arc<AuditionService<R, B, N>>,
    gate: Arc<ReviewerGate>,
) -> axum::Router
where
    R: SubmissionRepository + 'static,
    B: BlobStore + 'static,
    N: ConfirmationSender + 'static,
{
    audition_router(service, gate)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/uploads/*path", axum::routing::get(upload_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Serves stored uploads. Paths that would leave the upload root read as missing.
pub(crate) async fn upload_endpoint(
    Extension(state): Extension<AppState>,
    Path(path): Path<String>,
) -> Response {
    let resolved = match state.uploads.resolve(&path) {
        Ok(resolved) => resolved,
        Err(_) => return not_found(),
    };

    match tokio::fs::read(&resolved).await {
        Ok(bytes) => {
            let content_type = mime_guess::from_path(&resolved).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, content_type.essence_str().to_string())],
                bytes,
            )
                .into_response()
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => not_found(),
        Err(err) => {
            warn!(error = %err, path = %path, "failed to read upload");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "File not found" }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use audition_portal::workflows::auditions::{
        DisabledSender, IntakePolicy, JsonFileSubmissionRepository, LocalBlobStore,
    };
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app(root: &std::path::Path, ready: bool) -> axum::Router {
        let uploads = Arc::new(LocalBlobStore::new(
            root.join("uploads"),
            "http://localhost:3000",
        ));
        let service = Arc::new(AuditionService::new(
            Arc::new(JsonFileSubmissionRepository::new(root.join("submissions.json"))),
            uploads.clone(),
            Arc::new(DisabledSender),
            IntakePolicy::default(),
        ));
        let gate = Arc::new(ReviewerGate::new("secret", chrono::Duration::minutes(5)));
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            uploads,
        };

        with_portal_routes(service, gate).layer(Extension(state))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).expect("request")
    }

    #[tokio::test]
    async fn health_and_readiness_report_state() {
        let dir = tempfile::tempdir().expect("tempdir");

        let response = app(dir.path(), false)
            .oneshot(get("/health"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app(dir.path(), false)
            .oneshot(get("/ready"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app(dir.path(), true)
            .oneshot(get("/ready"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn uploads_are_served_with_guessed_content_type() {
        let dir = tempfile::tempdir().expect("tempdir");
        let folder = dir.path().join("uploads").join("auditions").join("s-1");
        std::fs::create_dir_all(&folder).expect("create folder");
        std::fs::write(folder.join("payment.pdf"), b"%PDF-1.4").expect("write file");

        let response = app(dir.path(), true)
            .oneshot(get("/uploads/auditions/s-1/payment.pdf"))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/pdf"
        );
        let body = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .expect("read body");
        assert_eq!(&body[..], b"%PDF-1.4");
    }

    #[tokio::test]
    async fn missing_or_escaping_uploads_are_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("submissions.json"), b"{}").expect("write file");

        let response = app(dir.path(), true)
            .oneshot(get("/uploads/auditions/none/video.mp4"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app(dir.path(), true)
            .oneshot(get("/uploads/..%2Fsubmissions.json"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
