//! HTTP handlers for location endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::location::{
    CreateUserLocationCommand, CreateUserLocationHandler, DeleteUserLocationHandler,
    FindNearestSessionsHandler, FindNearestSessionsQuery, GetLocationHandler,
    UpdateUserLocationHandler,
};
use crate::domain::foundation::{OwnerRef, SessionId};
use crate::domain::location::{DEFAULT_LIMIT, DEFAULT_PAGE};

use super::dto::{
    CreateLocationRequest, LocationResponse, NearbySessionResponse, NearestParams,
    NearestSessionsResponse, UpdateLocationRequest,
};

#[derive(Clone)]
pub struct LocationHandlers {
    create_handler: Arc<CreateUserLocationHandler>,
    update_handler: Arc<UpdateUserLocationHandler>,
    delete_handler: Arc<DeleteUserLocationHandler>,
    get_handler: Arc<GetLocationHandler>,
    nearest_handler: Arc<FindNearestSessionsHandler>,
}

impl LocationHandlers {
    pub fn new(
        create_handler: Arc<CreateUserLocationHandler>,
        update_handler: Arc<UpdateUserLocationHandler>,
        delete_handler: Arc<DeleteUserLocationHandler>,
        get_handler: Arc<GetLocationHandler>,
        nearest_handler: Arc<FindNearestSessionsHandler>,
    ) -> Self {
        Self {
            create_handler,
            update_handler,
            delete_handler,
            get_handler,
            nearest_handler,
        }
    }
}

/// GET /location/user - The caller's location
pub async fn get_user_location(
    State(handlers): State<LocationHandlers>,
    RequireAuth(user): RequireAuth,
) -> Response {
    match handlers.get_handler.handle(OwnerRef::user(user.id)).await {
        Ok(location) => (StatusCode::OK, Json(LocationResponse::from(&location))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// POST /location/user - Record the caller's location
pub async fn create_user_location(
    State(handlers): State<LocationHandlers>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<CreateLocationRequest>,
) -> Response {
    let cmd = CreateUserLocationCommand {
        latitude: req.latitude,
        longitude: req.longitude,
        address: req.address,
        governorate: req.governorate,
    };

    match handlers.create_handler.handle(user.id, cmd).await {
        Ok(location) => {
            (StatusCode::CREATED, Json(LocationResponse::from(&location))).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// PATCH /location/user - Change part of the caller's location
pub async fn update_user_location(
    State(handlers): State<LocationHandlers>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<UpdateLocationRequest>,
) -> Response {
    match handlers.update_handler.handle(user.id, req.into()).await {
        Ok(location) => (StatusCode::OK, Json(LocationResponse::from(&location))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// DELETE /location/user - Remove the caller's location
pub async fn delete_user_location(
    State(handlers): State<LocationHandlers>,
    RequireAuth(user): RequireAuth,
) -> Response {
    match handlers.delete_handler.handle(user.id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// GET /location/sessions/:session_id - A session's venue record
pub async fn get_session_location(
    State(handlers): State<LocationHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let Ok(session_id) = session_id.parse::<SessionId>() else {
        return ApiError::bad_request("Invalid session ID").into_response();
    };

    match handlers.get_handler.handle(OwnerRef::session(session_id)).await {
        Ok(location) => (StatusCode::OK, Json(LocationResponse::from(&location))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// GET /sessions/nearest - Sessions within a radius, nearest first
pub async fn find_nearest_sessions(
    State(handlers): State<LocationHandlers>,
    Query(params): Query<NearestParams>,
) -> Response {
    let page = params.page.unwrap_or(DEFAULT_PAGE);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let query = FindNearestSessionsQuery {
        latitude: params.latitude,
        longitude: params.longitude,
        radius_km: params.radius_km,
        page: Some(page),
        limit: Some(limit),
    };

    match handlers.nearest_handler.handle(query).await {
        Ok(found) => {
            let response = NearestSessionsResponse {
                items: found.iter().map(NearbySessionResponse::from).collect(),
                page,
                limit,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}
