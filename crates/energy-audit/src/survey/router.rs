use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{SurveyId, SurveyRecord};
use super::edits::SurveyEdit;
use super::export::ExportError;
use super::repository::{RepositoryError, SurveyRepository};
use super::service::{SurveyService, SurveyServiceError};
use crate::assistant::{AssistantBackend, AssistantError, DocumentUpload};
use crate::auth::{AuthError, AuthProvider, Session};

/// Shared state for the survey endpoints.
pub struct SurveyState<R, B> {
    pub service: Arc<SurveyService<R, B>>,
    pub auth: Arc<dyn AuthProvider>,
}

impl<R, B> Clone for SurveyState<R, B> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            auth: Arc::clone(&self.auth),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub record: SurveyRecord,
    pub edit: SurveyEdit,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Router builder exposing the survey, bill extraction and admin endpoints.
pub fn survey_router<R, B>(
    service: Arc<SurveyService<R, B>>,
    auth: Arc<dyn AuthProvider>,
) -> Router
where
    R: SurveyRepository + 'static,
    B: AssistantBackend + 'static,
{
    Router::new()
        .route("/api/v1/surveys", post(submit_handler::<R, B>))
        .route("/api/v1/surveys/edit", post(edit_handler::<R, B>))
        .route("/api/v1/surveys/summary", post(summary_handler::<R, B>))
        .route(
            "/api/v1/surveys/suggestions",
            post(suggestions_handler::<R, B>),
        )
        .route("/api/v1/bills/extract", post(extract_handler::<R, B>))
        .route("/api/v1/auth/login", post(login_handler::<R, B>))
        .route("/api/v1/auth/logout", post(logout_handler::<R, B>))
        .route("/api/v1/admin/surveys", get(admin_list_handler::<R, B>))
        .route(
            "/api/v1/admin/surveys/export",
            get(admin_export_handler::<R, B>),
        )
        .route(
            "/api/v1/admin/surveys/:survey_id",
            put(admin_update_handler::<R, B>),
        )
        .with_state(SurveyState { service, auth })
}

pub(crate) async fn edit_handler<R, B>(
    State(state): State<SurveyState<R, B>>,
    axum::Json(request): axum::Json<EditRequest>,
) -> Response
where
    R: SurveyRepository + 'static,
    B: AssistantBackend + 'static,
{
    match state.service.edit(&request.record, request.edit) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn summary_handler<R, B>(
    State(state): State<SurveyState<R, B>>,
    axum::Json(record): axum::Json<SurveyRecord>,
) -> Response
where
    R: SurveyRepository + 'static,
    B: AssistantBackend + 'static,
{
    let summary = state.service.summarize(&record);
    (StatusCode::OK, axum::Json(summary)).into_response()
}

pub(crate) async fn submit_handler<R, B>(
    State(state): State<SurveyState<R, B>>,
    axum::Json(record): axum::Json<SurveyRecord>,
) -> Response
where
    R: SurveyRepository + 'static,
    B: AssistantBackend + 'static,
{
    match state.service.submit(record) {
        Ok(record) => {
            let payload = json!({
                "id": record.id,
                "submissionDate": record.submission_date,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn suggestions_handler<R, B>(
    State(state): State<SurveyState<R, B>>,
    axum::Json(record): axum::Json<SurveyRecord>,
) -> Response
where
    R: SurveyRepository + 'static,
    B: AssistantBackend + 'static,
{
    match state.service.suggest_savings(&record) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn extract_handler<R, B>(
    State(state): State<SurveyState<R, B>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    R: SurveyRepository + 'static,
    B: AssistantBackend + 'static,
{
    let mime_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    match state
        .service
        .read_bill(DocumentUpload::new(body.to_vec(), mime_type))
    {
        Ok(details) => (StatusCode::OK, axum::Json(details)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn login_handler<R, B>(
    State(state): State<SurveyState<R, B>>,
    axum::Json(request): axum::Json<LoginRequest>,
) -> Response
where
    R: SurveyRepository + 'static,
    B: AssistantBackend + 'static,
{
    match state.auth.login(&request.email, &request.password) {
        Ok(session) => (StatusCode::OK, axum::Json(session)).into_response(),
        Err(error) => auth_error_response(error),
    }
}

pub(crate) async fn logout_handler<R, B>(
    State(state): State<SurveyState<R, B>>,
    headers: HeaderMap,
) -> Response
where
    R: SurveyRepository + 'static,
    B: AssistantBackend + 'static,
{
    let Some(token) = bearer_token(&headers) else {
        return auth_error_response(AuthError::NoSession);
    };

    match state.auth.logout(token) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => auth_error_response(error),
    }
}

pub(crate) async fn admin_list_handler<R, B>(
    State(state): State<SurveyState<R, B>>,
    headers: HeaderMap,
) -> Response
where
    R: SurveyRepository + 'static,
    B: AssistantBackend + 'static,
{
    if let Err(response) = require_session(state.auth.as_ref(), &headers) {
        return response;
    }

    match state.service.list() {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn admin_update_handler<R, B>(
    State(state): State<SurveyState<R, B>>,
    Path(survey_id): Path<String>,
    headers: HeaderMap,
    axum::Json(record): axum::Json<SurveyRecord>,
) -> Response
where
    R: SurveyRepository + 'static,
    B: AssistantBackend + 'static,
{
    if let Err(response) = require_session(state.auth.as_ref(), &headers) {
        return response;
    }

    match state.service.amend(&SurveyId(survey_id), record) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn admin_export_handler<R, B>(
    State(state): State<SurveyState<R, B>>,
    headers: HeaderMap,
) -> Response
where
    R: SurveyRepository + 'static,
    B: AssistantBackend + 'static,
{
    if let Err(response) = require_session(state.auth.as_ref(), &headers) {
        return response;
    }

    let mut buffer = Vec::new();
    match state.service.export_csv(&mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"energy_surveys.csv\"",
                ),
            ],
            buffer,
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn require_session(auth: &dyn AuthProvider, headers: &HeaderMap) -> Result<Session, Response> {
    bearer_token(headers)
        .and_then(|token| auth.session(token))
        .ok_or_else(|| auth_error_response(AuthError::NoSession))
}

fn auth_error_response(error: AuthError) -> Response {
    let status = match error {
        AuthError::InvalidCredentials | AuthError::NoSession => StatusCode::UNAUTHORIZED,
        AuthError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) fn error_status(error: &SurveyServiceError) -> StatusCode {
    match error {
        SurveyServiceError::AlreadySubmitted => StatusCode::CONFLICT,
        SurveyServiceError::NotSubmitted | SurveyServiceError::Edit(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        SurveyServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        SurveyServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        SurveyServiceError::Assistant(assistant) => match assistant {
            AssistantError::UnsupportedDocument { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AssistantError::ManualEntryRequired => StatusCode::UNPROCESSABLE_ENTITY,
            AssistantError::Busy(_) => StatusCode::CONFLICT,
            AssistantError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            AssistantError::Backend(_) | AssistantError::MalformedResponse(_) => {
                StatusCode::BAD_GATEWAY
            }
        },
        SurveyServiceError::Export(ExportError::Empty) => StatusCode::NOT_FOUND,
        SurveyServiceError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: SurveyServiceError) -> Response {
    let payload = json!({ "error": error.to_string() });
    (error_status(&error), axum::Json(payload)).into_response()
}
