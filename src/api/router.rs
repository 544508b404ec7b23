use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Request},
    routing::{get, post, delete},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, auth, users, event, membership, views};
use tower_http::{
    services::ServeDir,
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

/// Room for a 10 MiB image once base64-encoded, plus the event fields.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    let files = ServeDir::new(&state.config.storage_dir);

    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/api/v1/auth/signup", post(auth::signup))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/me", get(auth::me))

        // Directory
        .route("/api/v1/users", get(users::search_users))
        .route("/api/v1/users/{user_id}/display-name", get(users::display_name))

        // Views
        .route("/api/v1/dashboard", get(views::dashboard))
        .route("/api/v1/events/discover", get(views::discover))
        .route("/api/v1/events/mine", get(views::my_events))
        .route("/api/v1/events/{event_id}/candidates", get(views::candidates))

        // Events
        .route("/api/v1/events", post(event::create_event))
        .route("/api/v1/events/{event_id}", get(event::get_event).put(event::update_event).delete(event::delete_event))

        // Membership
        .route("/api/v1/events/{event_id}/join", post(membership::join_event))
        .route("/api/v1/events/{event_id}/leave", post(membership::leave_event))
        .route("/api/v1/events/{event_id}/complete", post(membership::complete_event))
        .route("/api/v1/events/{event_id}/invitations", post(membership::invite_user))
        .route("/api/v1/events/{event_id}/invitations/accept", post(membership::accept_invitation))
        .route("/api/v1/events/{event_id}/cohosts", post(membership::add_cohost))
        .route("/api/v1/events/{event_id}/cohosts/{user_id}", delete(membership::remove_cohost))
        .route("/api/v1/events/{event_id}/attendees/{user_id}", delete(membership::remove_attendee))
        .route("/api/v1/events/{event_id}/attendees/{user_id}/attendance", post(membership::toggle_attendance))

        // Uploaded images (local blob store)
        .nest_service("/files", files)

        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
