use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::{requests::SearchQuery, responses::DisplayNameResponse};
use crate::error::AppError;
use std::sync::Arc;

pub async fn search_users(
    State(state): State<Arc<AppState>>,
    AuthUser(session): AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let users = state.directory.search(&session, &query.search).await?;
    Ok(Json(users))
}

pub async fn display_name(
    State(state): State<Arc<AppState>>,
    AuthUser(_session): AuthUser,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let display_name = state.directory.display_name(&user_id, None).await;
    Json(DisplayNameResponse { user_id, display_name })
}
