use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use super::access::{bearer_token, ReviewerGate};
use super::domain::{IntakeForm, ReviewPatch, SubmissionId, SubmissionStatus, UploadedFile};
use super::filter::{ReviewFilter, StatusFilter};
use super::repository::{BlobStore, ConfirmationSender, RepositoryError, SubmissionRepository};
use super::service::{AuditionService, AuditionServiceError};

const SUBMISSION_FAILED: &str = "An error occurred during submission. Please try again.";

/// Shared handler state: the service facade and the reviewer gate.
pub struct PortalState<R, B, N> {
    pub service: Arc<AuditionService<R, B, N>>,
    pub gate: Arc<ReviewerGate>,
}

impl<R, B, N> Clone for PortalState<R, B, N> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            gate: Arc::clone(&self.gate),
        }
    }
}

/// Router builder exposing the public intake endpoint and the gated review endpoints.
pub fn audition_router<R, B, N>(
    service: Arc<AuditionService<R, B, N>>,
    gate: Arc<ReviewerGate>,
) -> Router
where
    R: SubmissionRepository + 'static,
    B: BlobStore + 'static,
    N: ConfirmationSender + 'static,
{
    let upload_limit = usize::try_from(service.policy().max_request_bytes()).unwrap_or(usize::MAX);
    let state = PortalState {
        service,
        gate: Arc::clone(&gate),
    };

    let reviewer_routes = Router::new()
        .route("/api/admin/logout", post(logout_handler::<R, B, N>))
        .route("/api/admin/submissions", get(list_handler::<R, B, N>))
        .route(
            "/api/admin/submissions/:submission_id",
            get(detail_handler::<R, B, N>),
        )
        .route(
            "/api/admin/update-status",
            post(update_status_handler::<R, B, N>),
        )
        .route_layer(middleware::from_fn_with_state(gate, require_reviewer));

    Router::new()
        .route(
            "/api/submit",
            post(submit_handler::<R, B, N>).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/admin/login", post(login_handler::<R, B, N>))
        .merge(reviewer_routes)
        .with_state(state)
}

pub(crate) async fn require_reviewer(
    State(gate): State<Arc<ReviewerGate>>,
    request: Request,
    next: Next,
) -> Response {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match gate.verify(bearer_token(header_value)) {
        Ok(()) => next.run(request).await,
        Err(err) => error_response(StatusCode::UNAUTHORIZED, err.to_string()),
    }
}

pub(crate) async fn submit_handler<R, B, N>(
    State(state): State<PortalState<R, B, N>>,
    multipart: Multipart,
) -> Response
where
    R: SubmissionRepository + 'static,
    B: BlobStore + 'static,
    N: ConfirmationSender + 'static,
{
    let form = match read_intake_form(multipart).await {
        Ok(form) => form,
        Err(err) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("malformed form payload: {err}"),
            )
        }
    };

    match state.service.submit(form).await {
        Ok(record) => {
            let payload = json!({
                "success": true,
                "id": record.id,
                "message": "Submission successful",
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(AuditionServiceError::Validation(err)) => {
            error_response(StatusCode::BAD_REQUEST, err.to_string())
        }
        Err(AuditionServiceError::Repository(RepositoryError::Conflict)) => {
            error_response(StatusCode::CONFLICT, "submission already exists")
        }
        Err(other) => {
            error!(error = %other, "audition submission failed");
            let payload = json!({
                "error": SUBMISSION_FAILED,
                "details": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) password: String,
}

pub(crate) async fn login_handler<R, B, N>(
    State(state): State<PortalState<R, B, N>>,
    Json(request): Json<LoginRequest>,
) -> Response {
    match state.gate.open_session(&request.password) {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(err) => {
            warn!("rejected reviewer login");
            error_response(StatusCode::UNAUTHORIZED, err.to_string())
        }
    }
}

pub(crate) async fn logout_handler<R, B, N>(
    State(state): State<PortalState<R, B, N>>,
    headers: HeaderMap,
) -> StatusCode {
    let header_value = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if let Some(token) = bearer_token(header_value) {
        state.gate.close_session(token);
    }
    StatusCode::NO_CONTENT
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReviewQuery {
    #[serde(default)]
    pub(crate) status: Option<String>,
    #[serde(default)]
    pub(crate) search: Option<String>,
}

pub(crate) async fn list_handler<R, B, N>(
    State(state): State<PortalState<R, B, N>>,
    Query(query): Query<ReviewQuery>,
) -> Response
where
    R: SubmissionRepository + 'static,
    B: BlobStore + 'static,
    N: ConfirmationSender + 'static,
{
    let status = match query.status.as_deref().filter(|raw| !raw.is_empty()) {
        None => StatusFilter::All,
        Some(raw) => match raw.parse::<StatusFilter>() {
            Ok(status) => status,
            Err(err) => return error_response(StatusCode::BAD_REQUEST, err.to_string()),
        },
    };
    let filter = ReviewFilter::new(status, query.search.unwrap_or_default());

    match state.service.review_queue(&filter).await {
        Ok(queue) => (StatusCode::OK, Json(queue)).into_response(),
        Err(other) => {
            error!(error = %other, "failed to fetch submissions");
            failure_response("Failed to fetch submissions", &other)
        }
    }
}

pub(crate) async fn detail_handler<R, B, N>(
    State(state): State<PortalState<R, B, N>>,
    Path(submission_id): Path<String>,
) -> Response
where
    R: SubmissionRepository + 'static,
    B: BlobStore + 'static,
    N: ConfirmationSender + 'static,
{
    match state.service.get(&SubmissionId(submission_id)).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(AuditionServiceError::Repository(RepositoryError::NotFound)) => {
            error_response(StatusCode::NOT_FOUND, "Submission not found")
        }
        Err(other) => {
            error!(error = %other, "failed to fetch submission");
            failure_response("Failed to fetch submission", &other)
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UpdateStatusRequest {
    #[serde(default)]
    pub(crate) id: Option<String>,
    #[serde(default)]
    pub(crate) status: Option<String>,
    #[serde(default)]
    pub(crate) notes: Option<String>,
}

pub(crate) async fn update_status_handler<R, B, N>(
    State(state): State<PortalState<R, B, N>>,
    Json(request): Json<UpdateStatusRequest>,
) -> Response
where
    R: SubmissionRepository + 'static,
    B: BlobStore + 'static,
    N: ConfirmationSender + 'static,
{
    let UpdateStatusRequest { id, status, notes } = request;
    let (id, status) = match (
        id.filter(|value| !value.is_empty()),
        status.filter(|value| !value.is_empty()),
    ) {
        (Some(id), Some(status)) => (id, status),
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Submission ID and status are required",
            )
        }
    };

    let status = match status.parse::<SubmissionStatus>() {
        Ok(status) => status,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, err.to_string()),
    };

    let patch = ReviewPatch::new(status, notes);
    match state.service.update_status(&SubmissionId(id), patch).await {
        Ok(record) => {
            let payload = json!({
                "success": true,
                "message": "Status updated successfully",
                "submission": record,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(AuditionServiceError::Repository(RepositoryError::NotFound)) => {
            error_response(StatusCode::NOT_FOUND, "Submission not found")
        }
        Err(other) => {
            error!(error = %other, "failed to update status");
            failure_response("Failed to update status", &other)
        }
    }
}

async fn read_intake_form(mut multipart: Multipart) -> Result<IntakeForm, MultipartError> {
    let mut form = IntakeForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "auditionVideo" | "paymentProof" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                // Browsers send an empty, unnamed part for an untouched file input.
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                let upload = UploadedFile::new(file_name, content_type, bytes.to_vec());
                if name == "auditionVideo" {
                    form.audition_video = Some(upload);
                } else {
                    form.payment_proof = Some(upload);
                }
            }
            other => {
                if let Some(slot) = text_slot(&mut form, other) {
                    *slot = Some(field.text().await?);
                }
            }
        }
    }

    Ok(form)
}

fn text_slot<'a>(form: &'a mut IntakeForm, name: &str) -> Option<&'a mut Option<String>> {
    match name {
        "firstName" => Some(&mut form.first_name),
        "lastName" => Some(&mut form.last_name),
        "email" => Some(&mut form.email),
        "phoneNumber" => Some(&mut form.phone_number),
        "region" => Some(&mut form.region),
        "province" => Some(&mut form.province),
        "parishName" => Some(&mut form.parish_name),
        "parishPastorName" => Some(&mut form.parish_pastor_name),
        "description" => Some(&mut form.description),
        _ => None,
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let payload = json!({ "error": message.into() });
    (status, Json(payload)).into_response()
}

fn failure_response(message: &str, err: &AuditionServiceError) -> Response {
    let payload = json!({
        "error": message,
        "details": err.to_string(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}
