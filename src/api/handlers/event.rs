use axum::{extract::{State, Path, Query}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::api::extractors::{auth::AuthUser, maybe_auth::MaybeAuthUser};
use crate::api::dtos::requests::{ConfirmQuery, EventRequest};
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    AuthUser(session): AuthUser,
    Json(payload): Json<EventRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("Creating event '{}' for {}", payload.title, session.user_id);

    let (details, image) = payload.into_parts()?;
    let event = state.membership.create_event(&session, details, image).await?;

    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(session): MaybeAuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let view = state.views.detail(session.as_ref(), &event_id).await?;
    Ok(Json(view))
}

pub async fn update_event(
    State(state): State<Arc<AppState>>,
    AuthUser(session): AuthUser,
    Path(event_id): Path<String>,
    Json(payload): Json<EventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (details, image) = payload.into_parts()?;
    let event = state.membership.edit_event(&session, &event_id, details, image).await?;
    Ok(Json(event))
}

pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    AuthUser(session): AuthUser,
    Path(event_id): Path<String>,
    Query(query): Query<ConfirmQuery>,
) -> Result<impl IntoResponse, AppError> {
    state.membership.delete_event(&session, &event_id, query.confirm).await?;
    Ok(StatusCode::NO_CONTENT)
}
