//! HTTP handlers for session endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::session::{
    CreateSessionCommand, CreateSessionHandler, DeleteSessionCommand, DeleteSessionHandler,
    GetSessionHandler, ListSessionsHandler, ListSessionsQuery, UpdateSessionCommand,
    UpdateSessionHandler,
};
use crate::domain::foundation::{CommandMetadata, SessionId, Timestamp, UserId};

use super::dto::{
    CreateSessionRequest, ListSessionsParams, SessionListResponse, SessionResponse,
    UpdateSessionRequest,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct SessionHandlers {
    create_handler: Arc<CreateSessionHandler>,
    update_handler: Arc<UpdateSessionHandler>,
    delete_handler: Arc<DeleteSessionHandler>,
    get_handler: Arc<GetSessionHandler>,
    list_handler: Arc<ListSessionsHandler>,
}

impl SessionHandlers {
    pub fn new(
        create_handler: Arc<CreateSessionHandler>,
        update_handler: Arc<UpdateSessionHandler>,
        delete_handler: Arc<DeleteSessionHandler>,
        get_handler: Arc<GetSessionHandler>,
        list_handler: Arc<ListSessionsHandler>,
    ) -> Self {
        Self {
            create_handler,
            update_handler,
            delete_handler,
            get_handler,
            list_handler,
        }
    }
}

fn parse_session_id(raw: &str) -> Result<SessionId, ApiError> {
    raw.parse::<SessionId>()
        .map_err(|_| ApiError::bad_request("Invalid session ID"))
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /sessions - Schedule a session (status starts as PENDING)
pub async fn create_session(
    State(handlers): State<SessionHandlers>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<CreateSessionRequest>,
) -> Response {
    let cmd = CreateSessionCommand {
        details: req.details(),
        latitude: req.latitude,
        longitude: req.longitude,
        address: req.address,
        governorate: req.governorate,
    };

    match handlers
        .create_handler
        .handle(cmd, CommandMetadata::new(user.id))
        .await
    {
        Ok(session) => (StatusCode::CREATED, Json(SessionResponse::from(&session))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// GET /sessions/:id - Public session details
pub async fn get_session(
    State(handlers): State<SessionHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    match handlers.get_handler.handle(session_id).await {
        Ok(session) => (StatusCode::OK, Json(SessionResponse::from(&session))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// GET /sessions - Public listing with filters
pub async fn list_sessions(
    State(handlers): State<SessionHandlers>,
    Query(params): Query<ListSessionsParams>,
) -> Response {
    let trainer_id = match params.trainer_id.as_deref().map(str::parse::<UserId>) {
        None => None,
        Some(Ok(id)) => Some(id),
        Some(Err(_)) => return ApiError::bad_request("Invalid trainer ID").into_response(),
    };

    let query = ListSessionsQuery {
        trainer_id,
        min_price: params.min_price,
        max_price: params.max_price,
        starts_after: params.start_after.map(Timestamp::from_datetime),
        starts_before: params.start_before.map(Timestamp::from_datetime),
        page: params.page,
        limit: params.limit,
    };

    match handlers.list_handler.handle(query).await {
        Ok(page) => (StatusCode::OK, Json(SessionListResponse::from(page))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// PATCH /sessions/:id - Update a session; venue changes reset it to PENDING
pub async fn update_session(
    State(handlers): State<SessionHandlers>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
    Json(req): Json<UpdateSessionRequest>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    let cmd = UpdateSessionCommand {
        session_id,
        changes: req.into(),
    };

    match handlers
        .update_handler
        .handle(cmd, CommandMetadata::new(user.id))
        .await
    {
        Ok(session) => (StatusCode::OK, Json(SessionResponse::from(&session))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// DELETE /sessions/:id - Delete a session
pub async fn delete_session(
    State(handlers): State<SessionHandlers>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    match handlers
        .delete_handler
        .handle(DeleteSessionCommand { session_id }, CommandMetadata::new(user.id))
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
