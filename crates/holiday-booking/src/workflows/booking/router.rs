use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::FieldValue;
use super::flow::FlowError;
use super::repository::{RepositoryError, SessionId, SessionRepository};
use super::service::{BookingService, BookingServiceError, SessionResponse};

type SharedService<R> = Arc<BookingService<R>>;

/// Router exposing the booking funnel as a session resource.
pub fn booking_router<R>(service: SharedService<R>) -> Router
where
    R: SessionRepository + 'static,
{
    Router::new()
        .route("/api/v1/booking/sessions", post(start_handler::<R>))
        .route("/api/v1/booking/sessions/:session_id", get(view_handler::<R>))
        .route(
            "/api/v1/booking/sessions/:session_id/fields",
            post(field_handler::<R>),
        )
        .route(
            "/api/v1/booking/sessions/:session_id/light-option",
            post(light_option_handler::<R>),
        )
        .route(
            "/api/v1/booking/sessions/:session_id/advance",
            post(advance_handler::<R>),
        )
        .route(
            "/api/v1/booking/sessions/:session_id/retreat",
            post(retreat_handler::<R>),
        )
        .route(
            "/api/v1/booking/sessions/:session_id/submit",
            post(submit_handler::<R>),
        )
        .route(
            "/api/v1/booking/sessions/:session_id/restart",
            post(restart_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct FieldUpdate {
    pub field: String,
    pub value: FieldValue,
}

#[derive(Debug, Deserialize)]
pub struct LightOptionRequest {
    pub option: String,
}

pub(crate) async fn start_handler<R>(State(service): State<SharedService<R>>) -> Response
where
    R: SessionRepository + 'static,
{
    match service.start_session().await {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn view_handler<R>(
    State(service): State<SharedService<R>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    respond(session_id.parse().map(|id| service.view(&id)))
}

pub(crate) async fn field_handler<R>(
    State(service): State<SharedService<R>>,
    Path(session_id): Path<String>,
    Json(update): Json<FieldUpdate>,
) -> Response
where
    R: SessionRepository + 'static,
{
    respond(
        session_id
            .parse()
            .map(|id| service.set_field(&id, &update.field, update.value)),
    )
}

pub(crate) async fn light_option_handler<R>(
    State(service): State<SharedService<R>>,
    Path(session_id): Path<String>,
    Json(request): Json<LightOptionRequest>,
) -> Response
where
    R: SessionRepository + 'static,
{
    respond(
        session_id
            .parse()
            .map(|id| service.select_light_option(&id, &request.option)),
    )
}

pub(crate) async fn advance_handler<R>(
    State(service): State<SharedService<R>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    let id: SessionId = match session_id.parse() {
        Ok(id) => id,
        Err(error) => return error_response(BookingServiceError::Repository(error)),
    };
    respond(Ok(service.advance(&id).await))
}

pub(crate) async fn retreat_handler<R>(
    State(service): State<SharedService<R>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    respond(session_id.parse().map(|id| service.retreat(&id)))
}

pub(crate) async fn submit_handler<R>(
    State(service): State<SharedService<R>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    let id: SessionId = match session_id.parse() {
        Ok(id) => id,
        Err(error) => return error_response(BookingServiceError::Repository(error)),
    };
    respond(Ok(service.submit(&id).await))
}

pub(crate) async fn restart_handler<R>(
    State(service): State<SharedService<R>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    respond(session_id.parse().map(|id| service.restart(&id)))
}

/// An unparseable id is reported the same way as an unknown one.
fn respond(
    result: Result<Result<SessionResponse, BookingServiceError>, RepositoryError>,
) -> Response {
    match result {
        Ok(Ok(response)) => (StatusCode::OK, Json(response)).into_response(),
        Ok(Err(error)) => error_response(error),
        Err(error) => error_response(BookingServiceError::Repository(error)),
    }
}

fn error_response(error: BookingServiceError) -> Response {
    let status = match &error {
        BookingServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        BookingServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        BookingServiceError::Repository(RepositoryError::AtCapacity) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        BookingServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        BookingServiceError::Flow(
            FlowError::SubmissionInFlight
            | FlowError::NotReadyToSubmit
            | FlowError::AlreadyCompleted,
        ) => StatusCode::CONFLICT,
        BookingServiceError::Flow(FlowError::Unknown(_) | FlowError::WrongValueKind { .. }) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}
