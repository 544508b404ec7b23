use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::{CandidatesQuery, MineQuery};
use crate::domain::services::membership::can_manage;
use crate::error::AppError;
use std::sync::Arc;

pub async fn discover(
    State(state): State<Arc<AppState>>,
    AuthUser(session): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.views.discover(&session).await?))
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    AuthUser(session): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.views.dashboard(&session).await?))
}

pub async fn my_events(
    State(state): State<Arc<AppState>>,
    AuthUser(session): AuthUser,
    Query(query): Query<MineQuery>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.views.your_events(&session, query.filter).await?))
}

/// People the caller could invite or promote on this event. Managers only.
pub async fn candidates(
    State(state): State<Arc<AppState>>,
    AuthUser(session): AuthUser,
    Path(event_id): Path<String>,
    Query(query): Query<CandidatesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.event_repo.find_by_id(&event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    if !can_manage(&session.user_id, &event) {
        return Err(AppError::Forbidden("Only the host or a co-host can do this".into()));
    }

    let found = state.directory.candidates(&session, &event, query.kind, &query.search).await?;
    Ok(Json(found))
}
