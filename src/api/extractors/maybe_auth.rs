use axum::{
    extract::{FromRequestParts, FromRef},
    http::request::Parts,
};
use crate::state::AppState;
use crate::domain::models::session::Session;
use crate::api::extractors::auth::{decode_claims, session_from_claims};
use crate::error::AppError;
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::debug;

/// Like `AuthUser`, but an absent or invalid token means a guest.
pub struct MaybeAuthUser(pub Option<Session>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(cookies) = parts.extensions.get::<Cookies>() else {
            return Ok(MaybeAuthUser(None));
        };

        let access_token = match cookies.get("access_token") {
            Some(cookie) => cookie.value().to_string(),
            None => return Ok(MaybeAuthUser(None)),
        };

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        match decode_claims(&app_state, &access_token) {
            Ok(claims) => Ok(MaybeAuthUser(Some(session_from_claims(&claims)))),
            Err(e) => {
                debug!("Treating request as guest: {}", e);
                Ok(MaybeAuthUser(None))
            }
        }
    }
}
