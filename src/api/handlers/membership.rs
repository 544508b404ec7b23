use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::{ConfirmQuery, TargetUserRequest};
use crate::error::AppError;
use std::sync::Arc;

pub async fn join_event(
    State(state): State<Arc<AppState>>,
    AuthUser(session): AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.membership.join(&session, &event_id).await?))
}

pub async fn leave_event(
    State(state): State<Arc<AppState>>,
    AuthUser(session): AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.membership.leave(&session, &event_id).await?))
}

pub async fn complete_event(
    State(state): State<Arc<AppState>>,
    AuthUser(session): AuthUser,
    Path(event_id): Path<String>,
    Query(query): Query<ConfirmQuery>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.membership.mark_completed(&session, &event_id, query.confirm).await?))
}

pub async fn invite_user(
    State(state): State<Arc<AppState>>,
    AuthUser(session): AuthUser,
    Path(event_id): Path<String>,
    Json(payload): Json<TargetUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.membership.invite_user(&session, &event_id, &payload.user_id).await?))
}

pub async fn accept_invitation(
    State(state): State<Arc<AppState>>,
    AuthUser(session): AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.membership.accept_invitation(&session, &event_id).await?))
}

pub async fn add_cohost(
    State(state): State<Arc<AppState>>,
    AuthUser(session): AuthUser,
    Path(event_id): Path<String>,
    Json(payload): Json<TargetUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.membership.invite_cohost(&session, &event_id, &payload.user_id).await?))
}

pub async fn remove_cohost(
    State(state): State<Arc<AppState>>,
    AuthUser(session): AuthUser,
    Path((event_id, user_id)): Path<(String, String)>,
    Query(query): Query<ConfirmQuery>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.membership.remove_cohost(&session, &event_id, &user_id, query.confirm).await?))
}

pub async fn remove_attendee(
    State(state): State<Arc<AppState>>,
    AuthUser(session): AuthUser,
    Path((event_id, user_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.membership.remove_attendee(&session, &event_id, &user_id).await?))
}

pub async fn toggle_attendance(
    State(state): State<Arc<AppState>>,
    AuthUser(session): AuthUser,
    Path((event_id, user_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.membership.toggle_attendance(&session, &event_id, &user_id).await?))
}
