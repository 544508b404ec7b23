mod common;

use axum::http::StatusCode;
use common::{member_ids, event_payload, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_join_respects_capacity_and_duplicates() {
    let app = TestApp::new().await;
    let host = app.signup("host@example.com", Some("Host")).await;
    let bob = app.signup("bob@example.com", None).await;
    let carol = app.signup("carol@example.com", None).await;

    let id = app.create_event(&host, "Tiny dinner", "2030-05-01", 1).await;

    let (status, event) = app.send("POST", &format!("/api/v1/events/{}/join", id), Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(member_ids(&event, "attendees"), vec![bob.user_id.clone()]);
    assert_eq!(event["attendees"][0]["username"], "bob");
    assert_eq!(event["attendees"][0]["attended"], false);

    let (status, body) = app.send("POST", &format!("/api/v1/events/{}/join", id), Some(&carol), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "This event is full");

    // A full event reports fullness even to someone already attending.
    let (status, body) = app.send("POST", &format!("/api/v1/events/{}/join", id), Some(&bob), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "This event is full");

    let (_, detail) = app.send("GET", &format!("/api/v1/events/{}", id), None, None).await;
    assert_eq!(member_ids(&detail, "attendees").len(), 1);
    assert_eq!(detail["remaining_slots"], 0);

    let roomy = app.create_event(&host, "Long table", "2030-05-01", 10).await;
    app.send("POST", &format!("/api/v1/events/{}/join", roomy), Some(&bob), None).await;
    let (status, body) = app.send("POST", &format!("/api/v1/events/{}/join", roomy), Some(&bob), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "You already joined this event");
}

#[tokio::test]
async fn test_join_requires_session() {
    let app = TestApp::new().await;
    let host = app.signup("host@example.com", None).await;
    let id = app.create_event(&host, "Open mic", "2030-05-02", 5).await;

    let (status, body) = app.send("POST", &format!("/api/v1/events/{}/join", id), None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = app.send("POST", "/api/v1/events/does-not-exist/join", Some(&host), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_leave_is_silent_when_not_attending() {
    let app = TestApp::new().await;
    let host = app.signup("host@example.com", None).await;
    let bob = app.signup("bob@example.com", None).await;
    let id = app.create_event(&host, "Hike", "2030-06-01", 4).await;

    let (status, event) = app.send("POST", &format!("/api/v1/events/{}/leave", id), Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(member_ids(&event, "attendees").is_empty());

    app.send("POST", &format!("/api/v1/events/{}/join", id), Some(&bob), None).await;
    let (status, event) = app.send("POST", &format!("/api/v1/events/{}/leave", id), Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(member_ids(&event, "attendees").is_empty());
}

#[tokio::test]
async fn test_invite_and_accept_moves_user_to_attendees() {
    let app = TestApp::new().await;
    let host = app.signup("host@example.com", None).await;
    let carol = app.signup("carol@example.com", Some("Carol")).await;
    let id = app.create_event(&host, "Book club", "2030-07-01", 3).await;

    let invite = json!({ "user_id": carol.user_id });
    let (status, event) = app.send("POST", &format!("/api/v1/events/{}/invitations", id), Some(&host), Some(invite.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(member_ids(&event, "invited"), vec![carol.user_id.clone()]);
    assert_eq!(event["invited"][0]["username"], "Carol");

    let (status, body) = app.send("POST", &format!("/api/v1/events/{}/invitations", id), Some(&host), Some(invite)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "User already invited");

    let (status, _) = app.send(
        "POST", &format!("/api/v1/events/{}/invitations", id), Some(&host),
        Some(json!({ "user_id": "no-such-user" })),
    ).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, event) = app.send("POST", &format!("/api/v1/events/{}/invitations/accept", id), Some(&carol), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(member_ids(&event, "invited").is_empty());
    assert_eq!(member_ids(&event, "attendees"), vec![carol.user_id.clone()]);
    assert_eq!(event["attendees"][0]["attended"], false);

    let (status, body) = app.send("POST", &format!("/api/v1/events/{}/invitations/accept", id), Some(&carol), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No pending invitation");
}

#[tokio::test]
async fn test_accepting_invitation_ignores_capacity() {
    let app = TestApp::new().await;
    let host = app.signup("host@example.com", None).await;
    let bob = app.signup("bob@example.com", None).await;
    let carol = app.signup("carol@example.com", None).await;
    let id = app.create_event(&host, "Chef's table", "2030-07-02", 1).await;

    app.send("POST", &format!("/api/v1/events/{}/invitations", id), Some(&host), Some(json!({ "user_id": carol.user_id }))).await;
    app.send("POST", &format!("/api/v1/events/{}/join", id), Some(&bob), None).await;

    let (status, event) = app.send("POST", &format!("/api/v1/events/{}/invitations/accept", id), Some(&carol), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(member_ids(&event, "attendees").len(), 2);

    let (_, detail) = app.send("GET", &format!("/api/v1/events/{}", id), None, None).await;
    assert_eq!(detail["remaining_slots"], -1);
}

#[tokio::test]
async fn test_only_managers_invite() {
    let app = TestApp::new().await;
    let host = app.signup("host@example.com", None).await;
    let bob = app.signup("bob@example.com", None).await;
    let carol = app.signup("carol@example.com", None).await;
    let id = app.create_event(&host, "Quiz night", "2030-07-03", 10).await;

    // Attending does not grant management rights.
    app.send("POST", &format!("/api/v1/events/{}/join", id), Some(&bob), None).await;
    let (status, _) = app.send(
        "POST", &format!("/api/v1/events/{}/invitations", id), Some(&bob),
        Some(json!({ "user_id": carol.user_id })),
    ).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, event) = app.send("GET", &format!("/api/v1/events/{}", id), None, None).await;
    assert!(member_ids(&event, "invited").is_empty());
}

#[tokio::test]
async fn test_cohost_lifecycle() {
    let app = TestApp::new().await;
    let host = app.signup("host@example.com", None).await;
    let bob = app.signup("bob@example.com", Some("Bobby")).await;
    let dave = app.signup("dave@example.com", None).await;
    let id = app.create_event(&host, "Hackathon", "2030-08-01", 20).await;

    let add_bob = json!({ "user_id": bob.user_id });
    let (status, event) = app.send("POST", &format!("/api/v1/events/{}/cohosts", id), Some(&host), Some(add_bob.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(member_ids(&event, "cohosts"), vec![bob.user_id.clone()]);

    let (status, body) = app.send("POST", &format!("/api/v1/events/{}/cohosts", id), Some(&host), Some(add_bob.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "User is already a co-host");

    let (status, _) = app.send(
        "POST", &format!("/api/v1/events/{}/cohosts", id), Some(&host),
        Some(json!({ "user_id": host.user_id })),
    ).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Co-hosts manage attendees but cannot appoint co-hosts.
    let (status, _) = app.send(
        "POST", &format!("/api/v1/events/{}/cohosts", id), Some(&bob),
        Some(json!({ "user_id": dave.user_id })),
    ).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send(
        "POST", &format!("/api/v1/events/{}/invitations", id), Some(&bob),
        Some(json!({ "user_id": dave.user_id })),
    ).await;
    assert_eq!(status, StatusCode::OK);

    let remove_uri = format!("/api/v1/events/{}/cohosts/{}", id, bob.user_id);
    let (status, _) = app.send("DELETE", &remove_uri, Some(&host), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, event) = app.send("DELETE", &format!("{}?confirm=true", remove_uri), Some(&host), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(member_ids(&event, "cohosts").is_empty());

    let (status, _) = app.send("DELETE", &format!("{}?confirm=true", remove_uri), Some(&host), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, event) = app.send("POST", &format!("/api/v1/events/{}/cohosts", id), Some(&host), Some(add_bob)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(member_ids(&event, "cohosts"), vec![bob.user_id.clone()]);
}

#[tokio::test]
async fn test_authorization_is_checked_before_confirmation() {
    let app = TestApp::new().await;
    let host = app.signup("host@example.com", None).await;
    let bob = app.signup("bob@example.com", None).await;
    let id = app.create_event(&host, "Gala", "2030-08-02", 50).await;

    app.send("POST", &format!("/api/v1/events/{}/cohosts", id), Some(&host), Some(json!({ "user_id": bob.user_id }))).await;

    let (status, _) = app.send(
        "DELETE", &format!("/api/v1/events/{}/cohosts/{}", id, bob.user_id), Some(&bob), None,
    ).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send("DELETE", &format!("/api/v1/events/{}", id), Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_mark_completed_once() {
    let app = TestApp::new().await;
    let host = app.signup("host@example.com", None).await;
    let bob = app.signup("bob@example.com", None).await;
    let id = app.create_event(&host, "Run club", "2030-09-01", 8).await;
    let uri = format!("/api/v1/events/{}/complete", id);

    let (status, _) = app.send("POST", &format!("{}?confirm=true", uri), Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send("POST", &uri, Some(&host), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, event) = app.send("POST", &format!("{}?confirm=true", uri), Some(&host), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(event["status"], "completed");

    let (status, _) = app.send("POST", &format!("{}?confirm=true", uri), Some(&host), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_cohost_can_complete() {
    let app = TestApp::new().await;
    let host = app.signup("host@example.com", None).await;
    let bob = app.signup("bob@example.com", None).await;
    let id = app.create_event(&host, "Workshop", "2030-09-02", 8).await;
    app.send("POST", &format!("/api/v1/events/{}/cohosts", id), Some(&host), Some(json!({ "user_id": bob.user_id }))).await;

    let (status, event) = app.send("POST", &format!("/api/v1/events/{}/complete?confirm=true", id), Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(event["status"], "completed");
}

#[tokio::test]
async fn test_delete_requires_creator_and_confirmation() {
    let app = TestApp::new().await;
    let host = app.signup("host@example.com", None).await;
    let bob = app.signup("bob@example.com", None).await;
    let id = app.create_event(&host, "Farewell", "2030-10-01", 30).await;
    app.send("POST", &format!("/api/v1/events/{}/cohosts", id), Some(&host), Some(json!({ "user_id": bob.user_id }))).await;
    app.send("POST", &format!("/api/v1/events/{}/join", id), Some(&bob), None).await;

    let (status, _) = app.send("DELETE", &format!("/api/v1/events/{}?confirm=true", id), Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send("DELETE", &format!("/api/v1/events/{}", id), Some(&host), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send("DELETE", &format!("/api/v1/events/{}?confirm=true", id), Some(&host), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.send("GET", &format!("/api/v1/events/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Event not found");

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM event_attendees WHERE event_id = ?")
        .bind(&id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn test_attendance_toggle_and_removal() {
    let app = TestApp::new().await;
    let host = app.signup("host@example.com", None).await;
    let bob = app.signup("bob@example.com", None).await;
    let carol = app.signup("carol@example.com", None).await;
    let id = app.create_event(&host, "Yoga", "2030-11-01", 10).await;
    app.send("POST", &format!("/api/v1/events/{}/join", id), Some(&bob), None).await;
    app.send("POST", &format!("/api/v1/events/{}/join", id), Some(&carol), None).await;

    let toggle = format!("/api/v1/events/{}/attendees/{}/attendance", id, bob.user_id);
    let (status, event) = app.send("POST", &toggle, Some(&host), None).await;
    assert_eq!(status, StatusCode::OK);
    let bob_entry = event["attendees"].as_array().unwrap().iter()
        .find(|a| a["user_id"] == bob.user_id.as_str()).unwrap().clone();
    assert_eq!(bob_entry["attended"], true);

    let (_, event) = app.send("POST", &toggle, Some(&host), None).await;
    let bob_entry = event["attendees"].as_array().unwrap().iter()
        .find(|a| a["user_id"] == bob.user_id.as_str()).unwrap().clone();
    assert_eq!(bob_entry["attended"], false);

    let (status, _) = app.send("POST", &toggle, Some(&carol), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send(
        "POST", &format!("/api/v1/events/{}/attendees/{}/attendance", id, host.user_id), Some(&host), None,
    ).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let remove = format!("/api/v1/events/{}/attendees/{}", id, carol.user_id);
    let (status, _) = app.send("DELETE", &remove, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, event) = app.send("DELETE", &remove, Some(&host), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(member_ids(&event, "attendees"), vec![bob.user_id.clone()]);

    let (status, _) = app.send("DELETE", &remove, Some(&host), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_edit_is_a_validated_full_replace() {
    let app = TestApp::new().await;
    let host = app.signup("host@example.com", None).await;
    let bob = app.signup("bob@example.com", None).await;
    let carol = app.signup("carol@example.com", None).await;
    let id = app.create_event(&host, "Draft title", "2030-12-01", 10).await;
    app.send("POST", &format!("/api/v1/events/{}/cohosts", id), Some(&host), Some(json!({ "user_id": bob.user_id }))).await;

    let mut payload = event_payload("Final title", "2030-12-02", 15);
    payload["description"] = json!("");

    let (status, event) = app.send("PUT", &format!("/api/v1/events/{}", id), Some(&bob), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(event["title"], "Final title");
    assert_eq!(event["date"], "2030-12-02");
    assert_eq!(event["capacity"], 15);
    assert_eq!(event["description"], "");
    assert_eq!(member_ids(&event, "cohosts"), vec![bob.user_id.clone()]);

    let (status, _) = app.send("PUT", &format!("/api/v1/events/{}", id), Some(&carol), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    payload["capacity"] = json!(0);
    let (status, _) = app.send("PUT", &format!("/api/v1/events/{}", id), Some(&host), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_validates_fields() {
    let app = TestApp::new().await;
    let host = app.signup("host@example.com", None).await;

    let mut payload = event_payload("  ", "2030-01-01", 5);
    let (status, _) = app.send("POST", "/api/v1/events", Some(&host), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    payload["title"] = json!("Valid");
    payload["start_time"] = json!("25:99");
    let (status, _) = app.send("POST", "/api/v1/events", Some(&host), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    payload["start_time"] = json!("09:00");
    payload["capacity"] = json!(-3);
    let (status, _) = app.send("POST", "/api/v1/events", Some(&host), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, event) = app.send("POST", "/api/v1/events", Some(&host), Some(event_payload("Fine", "2030-01-01", 5))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(event["status"], "upcoming");
    assert_eq!(event["creator_id"], host.user_id.as_str());
    assert_eq!(event["creator_email"], "host@example.com");
    assert!(member_ids(&event, "attendees").is_empty());
}
