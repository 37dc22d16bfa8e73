use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{DeclarationId, RequestId, RequestStatus, UserId};
use super::generation::BatchGenerationOrchestrator;
use super::repository::{
    BlobPublisher, DirectoryStore, RepositoryError, RequestRepository, TemplateStore,
};
use super::service::{RequestLifecycleService, RequestServiceError};

/// Header carrying the caller identity resolved by the upstream gateway.
pub const CALLER_HEADER: &str = "x-caller-id";

/// Shared handler state: lifecycle facade plus the generation pipeline.
pub struct DeclarationState<R, D, T, B> {
    pub lifecycle: Arc<RequestLifecycleService<R, D, T>>,
    pub generation: Arc<BatchGenerationOrchestrator<R, D, T, B>>,
}

impl<R, D, T, B> Clone for DeclarationState<R, D, T, B> {
    fn clone(&self) -> Self {
        Self {
            lifecycle: Arc::clone(&self.lifecycle),
            generation: Arc::clone(&self.generation),
        }
    }
}

/// Router builder exposing the declaration request operations.
pub fn declaration_router<R, D, T, B>(state: DeclarationState<R, D, T, B>) -> Router
where
    R: RequestRepository + 'static,
    D: DirectoryStore + 'static,
    T: TemplateStore + 'static,
    B: BlobPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/declarations/requests",
            get(list_requests_handler::<R, D, T, B>).post(create_request_handler::<R, D, T, B>),
        )
        .route(
            "/api/v1/declarations/requests/recent",
            get(recent_generated_handler::<R, D, T, B>),
        )
        .route(
            "/api/v1/declarations/requests/mine",
            get(own_requests_handler::<R, D, T, B>),
        )
        .route(
            "/api/v1/declarations/requests/status",
            post(update_status_handler::<R, D, T, B>),
        )
        .route(
            "/api/v1/declarations/requests/generate",
            post(generate_handler::<R, D, T, B>),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    pub declaration_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusBody {
    pub request_ids: Vec<String>,
    pub status: RequestStatus,
}

#[derive(Debug, Deserialize)]
pub struct GenerateBody {
    pub request_ids: Vec<String>,
}

fn caller_from_headers(headers: &HeaderMap) -> Result<UserId, Response> {
    match headers
        .get(CALLER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
    {
        Some(value) if !value.is_empty() => Ok(UserId(value.to_string())),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            axum::Json(json!({ "error": "caller identity missing" })),
        )
            .into_response()),
    }
}

fn error_response(error: RequestServiceError) -> Response {
    let status = match &error {
        RequestServiceError::Policy(_) => StatusCode::FORBIDDEN,
        RequestServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        RequestServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        RequestServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, axum::Json(json!({ "error": error.to_string() }))).into_response()
}

fn request_ids(raw: Vec<String>) -> Vec<RequestId> {
    raw.into_iter().map(RequestId).collect()
}

pub(crate) async fn list_requests_handler<R, D, T, B>(
    State(state): State<DeclarationState<R, D, T, B>>,
    headers: HeaderMap,
) -> Response
where
    R: RequestRepository + 'static,
    D: DirectoryStore + 'static,
    T: TemplateStore + 'static,
    B: BlobPublisher + 'static,
{
    let caller = match caller_from_headers(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    match state.lifecycle.list_all_requests(&caller) {
        Ok(views) => (StatusCode::OK, axum::Json(views)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn recent_generated_handler<R, D, T, B>(
    State(state): State<DeclarationState<R, D, T, B>>,
    headers: HeaderMap,
) -> Response
where
    R: RequestRepository + 'static,
    D: DirectoryStore + 'static,
    T: TemplateStore + 'static,
    B: BlobPublisher + 'static,
{
    let caller = match caller_from_headers(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    match state.lifecycle.list_recent_generated(&caller) {
        Ok(views) => (StatusCode::OK, axum::Json(views)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_request_handler<R, D, T, B>(
    State(state): State<DeclarationState<R, D, T, B>>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<CreateRequestBody>,
) -> Response
where
    R: RequestRepository + 'static,
    D: DirectoryStore + 'static,
    T: TemplateStore + 'static,
    B: BlobPublisher + 'static,
{
    let caller = match caller_from_headers(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    let declaration = DeclarationId(body.declaration_id);
    match state.lifecycle.create_request(&caller, &declaration) {
        Ok(view) => (StatusCode::CREATED, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn own_requests_handler<R, D, T, B>(
    State(state): State<DeclarationState<R, D, T, B>>,
    headers: HeaderMap,
) -> Response
where
    R: RequestRepository + 'static,
    D: DirectoryStore + 'static,
    T: TemplateStore + 'static,
    B: BlobPublisher + 'static,
{
    let caller = match caller_from_headers(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    match state.lifecycle.list_own_requests(&caller) {
        Ok(views) => (StatusCode::OK, axum::Json(views)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_status_handler<R, D, T, B>(
    State(state): State<DeclarationState<R, D, T, B>>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<UpdateStatusBody>,
) -> Response
where
    R: RequestRepository + 'static,
    D: DirectoryStore + 'static,
    T: TemplateStore + 'static,
    B: BlobPublisher + 'static,
{
    let caller = match caller_from_headers(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    let ids = request_ids(body.request_ids);
    match state.lifecycle.update_status(&caller, &ids, body.status) {
        Ok(views) => (StatusCode::OK, axum::Json(views)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn generate_handler<R, D, T, B>(
    State(state): State<DeclarationState<R, D, T, B>>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<GenerateBody>,
) -> Response
where
    R: RequestRepository + 'static,
    D: DirectoryStore + 'static,
    T: TemplateStore + 'static,
    B: BlobPublisher + 'static,
{
    let caller = match caller_from_headers(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    let ids = request_ids(body.request_ids);
    match state.generation.generate_documents(&caller, &ids) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}
