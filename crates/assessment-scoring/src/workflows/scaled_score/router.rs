use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};

use super::domain::Profile;
use super::editor::{EditAction, UnitKey};
use super::service::{ScaledScoreService, ScaledScoreServiceError};
use super::session::{SessionError, SessionId, SessionStore};

/// Router builder exposing the catalog, validation, mapping and session endpoints.
pub fn scaled_score_router<S>(service: Arc<ScaledScoreService<S>>) -> Router
where
    S: SessionStore + 'static,
{
    Router::new()
        .route("/api/v1/scaled-score/catalog", get(catalog_handler::<S>))
        .route(
            "/api/v1/scaled-score/profiles/:profile/defaults",
            get(defaults_handler::<S>),
        )
        .route("/api/v1/scaled-score/validate", post(validate_handler::<S>))
        .route(
            "/api/v1/scaled-score/mappings/parse",
            post(parse_mapping_handler::<S>),
        )
        .route("/api/v1/scaled-score/sessions", post(open_session_handler::<S>))
        .route(
            "/api/v1/scaled-score/sessions/:session_id",
            get(session_handler::<S>).delete(close_session_handler::<S>),
        )
        .route(
            "/api/v1/scaled-score/sessions/:session_id/actions",
            post(action_handler::<S>),
        )
        .route(
            "/api/v1/scaled-score/sessions/:session_id/units/:unit_key/mapping",
            post(upload_mapping_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn catalog_handler<S>(State(service): State<Arc<ScaledScoreService<S>>>) -> Response
where
    S: SessionStore + 'static,
{
    (StatusCode::OK, axum::Json(service.catalog().sections().to_vec())).into_response()
}

pub(crate) async fn defaults_handler<S>(
    State(service): State<Arc<ScaledScoreService<S>>>,
    Path(profile): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
{
    match Profile::from_label(&profile) {
        Some(profile) => (StatusCode::OK, axum::Json(service.defaults(profile))).into_response(),
        None => {
            let payload = json!({
                "error": format!("unknown profile '{profile}'"),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn validate_handler<S>(
    State(service): State<Arc<ScaledScoreService<S>>>,
    axum::Json(document): axum::Json<Value>,
) -> Response
where
    S: SessionStore + 'static,
{
    let errors = service.validate_document(&document);
    let status = if errors.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    let payload = json!({
        "valid": errors.is_empty(),
        "errors": errors,
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn parse_mapping_handler<S>(
    State(service): State<Arc<ScaledScoreService<S>>>,
    body: String,
) -> Response
where
    S: SessionStore + 'static,
{
    let mapping = service.parse_mapping(&body);
    let payload = json!({
        "rows": mapping.len(),
        "mapping": mapping,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn open_session_handler<S>(
    State(service): State<Arc<ScaledScoreService<S>>>,
) -> Response
where
    S: SessionStore + 'static,
{
    match service.open_session().await {
        Ok(ticket) => (StatusCode::CREATED, axum::Json(ticket)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn session_handler<S>(
    State(service): State<Arc<ScaledScoreService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
{
    let id = SessionId(session_id);
    let snapshot = match service.snapshot(&id).await {
        Ok(snapshot) => snapshot,
        Err(error) => return error_response(error),
    };
    let errors = match service.session_errors(&id).await {
        Ok(errors) => errors,
        Err(error) => return error_response(error),
    };

    let payload = json!({
        "session_id": id,
        "snapshot": snapshot,
        "errors": errors,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn action_handler<S>(
    State(service): State<Arc<ScaledScoreService<S>>>,
    Path(session_id): Path<String>,
    axum::Json(action): axum::Json<EditAction>,
) -> Response
where
    S: SessionStore + 'static,
{
    match service.apply(&SessionId(session_id), action).await {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn upload_mapping_handler<S>(
    State(service): State<Arc<ScaledScoreService<S>>>,
    Path((session_id, unit_key)): Path<(String, u64)>,
    body: Bytes,
) -> Response
where
    S: SessionStore + 'static,
{
    let id = SessionId(session_id);
    match service
        .upload_mapping(&id, UnitKey(unit_key), body.as_ref())
        .await
    {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn close_session_handler<S>(
    State(service): State<Arc<ScaledScoreService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
{
    match service.close_session(&SessionId(session_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ScaledScoreServiceError) -> Response {
    let status = match &error {
        ScaledScoreServiceError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        ScaledScoreServiceError::Session(SessionError::Edit(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ScaledScoreServiceError::Session(SessionError::Import(_)) => StatusCode::BAD_REQUEST,
        ScaledScoreServiceError::Session(SessionError::Closed) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
