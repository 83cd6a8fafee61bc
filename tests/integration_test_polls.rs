mod common;

use axum::http::StatusCode;
use chrono::{Duration, TimeZone, Utc};
use common::{AuthHeaders, TestApp};
use meet_mesh_backend::domain::models::{
    interval::Interval,
    poll::{Poll, PollOption},
    slot::SlotType,
    user::Organizer,
};
use meet_mesh_backend::domain::ports::{PollRepository, UserRepository};
use meet_mesh_backend::infra::repositories::{sqlite_poll_repo::SqlitePollRepo, sqlite_user_repo::SqliteUserRepo};
use serde_json::{json, Value};

async fn create_poll(app: &TestApp, auth: &AuthHeaders, show_results: bool, require_email: bool) -> Value {
    let (status, body) = app.call("POST", "/api/v1/polls", Some(json!({
        "name": "Team offsite",
        "show_results": show_results,
        "require_email": require_email,
        "options": [
            { "start_time": "2031-03-03T09:00:00Z", "end_time": "2031-03-03T10:00:00Z" },
            { "option_type": "full_day", "start_time": "2031-03-04T00:00:00Z", "end_time": "2031-03-05T00:00:00Z" }
        ]
    })), Some(auth)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

fn option_ids(poll: &Value) -> (String, String) {
    let options = poll["options"].as_array().unwrap();
    (options[0]["id"].as_str().unwrap().to_string(), options[1]["id"].as_str().unwrap().to_string())
}

async fn vote(app: &TestApp, slug: &str, email: Option<&str>, responses: Value) -> (StatusCode, Value) {
    app.call("POST", &format!("/api/v1/public/poll/{}/vote", slug), Some(json!({
        "guest_email": email,
        "guest_name": email.map(|e| e.split('@').next().unwrap_or_default().to_string()),
        "responses": responses
    })), None).await
}

#[tokio::test]
async fn test_votes_are_tallied_per_option() {
    let app = TestApp::new().await;
    let auth = app.login("org-1", "org1@example.com");
    let poll = create_poll(&app, &auth, true, false).await;
    let slug = poll["slug"].as_str().unwrap();
    let (a, b) = option_ids(&poll);

    let (status, body) = vote(&app, slug, Some("ann@example.com"), json!({ a.clone(): "yes", b.clone(): "no" })).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["message"], "Vote submitted successfully");
    vote(&app, slug, Some("bob@example.com"), json!({ a.clone(): "no", b.clone(): "yes" })).await;
    vote(&app, slug, None, json!({ a.clone(): "yes", "not-an-option": "yes" })).await;

    let (status, results) = app.call("GET", &format!("/api/v1/public/poll/{}/results", slug), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results["tallies"], json!([
        { "option_id": a, "yes_count": 2, "no_count": 1, "maybe_count": 0 },
        { "option_id": b, "yes_count": 1, "no_count": 1, "maybe_count": 0 },
    ]));

    let votes = results["votes"].as_array().unwrap();
    assert_eq!(votes.len(), 3);
    assert!(votes.iter().all(|v| v["guest_email"].is_null()), "public results must not leak emails");

    let (_, owner_view) = app.call("GET", &format!("/api/v1/polls/{}/votes", poll["id"].as_str().unwrap()), None, Some(&auth)).await;
    assert!(owner_view["votes"].as_array().unwrap().iter().any(|v| v["guest_email"] == "ann@example.com"));
}

#[tokio::test]
async fn test_hidden_results_are_forbidden() {
    let app = TestApp::new().await;
    let auth = app.login("org-1", "org1@example.com");
    let poll = create_poll(&app, &auth, false, false).await;

    let (status, body) = app.call("GET", &format!("/api/v1/public/poll/{}/results", poll["slug"].as_str().unwrap()), None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Results not public");
}

#[tokio::test]
async fn test_required_email_is_enforced() {
    let app = TestApp::new().await;
    let auth = app.login("org-1", "org1@example.com");
    let poll = create_poll(&app, &auth, true, true).await;
    let slug = poll["slug"].as_str().unwrap();
    let (a, _) = option_ids(&poll);

    let (status, _) = vote(&app, slug, None, json!({ a.clone(): "maybe" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = vote(&app, slug, Some("nope"), json!({ a.clone(): "maybe" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = vote(&app, slug, Some("cy@example.com"), json!({ a: "maybe" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(app.count("votes").await, 1);
}

#[tokio::test]
async fn test_public_poll_lists_sorted_options() {
    let app = TestApp::new().await;
    let auth = app.login("org-1", "org1@example.com");
    let poll = create_poll(&app, &auth, false, false).await;

    let (status, public) = app.call("GET", &format!("/api/v1/public/poll/{}", poll["slug"].as_str().unwrap()), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(public["status"], "active");
    let options = public["options"].as_array().unwrap();
    assert_eq!(options.len(), 2);
    assert_eq!(options[1]["option_type"], "full_day");
    assert!(public.get("owner_id").is_none());

    let (status, _) = app.call("GET", "/api/v1/public/poll/missing", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_picking_a_winner_closes_the_poll() {
    let app = TestApp::new().await;
    let auth = app.login("org-1", "org1@example.com");
    let poll = create_poll(&app, &auth, true, false).await;
    let id = poll["id"].as_str().unwrap();
    let slug = poll["slug"].as_str().unwrap();
    let (a, b) = option_ids(&poll);

    vote(&app, slug, Some("ann@example.com"), json!({ a.clone(): "yes" })).await;
    vote(&app, slug, Some("bob@example.com"), json!({ b.clone(): "yes" })).await;
    vote(&app, slug, None, json!({ a.clone(): "yes" })).await;

    let stranger = app.login("org-2", "org2@example.com");
    let (status, _) = app.call("POST", &format!("/api/v1/polls/{}/winner", id), Some(json!({ "option_id": a })), Some(&stranger)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.call("POST", &format!("/api/v1/polls/{}/winner", id), Some(json!({ "option_id": "missing" })), Some(&auth)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, closed) = app.call("POST", &format!("/api/v1/polls/{}/winner", id), Some(json!({ "option_id": a })), Some(&auth)).await;
    assert_eq!(status, StatusCode::OK, "{}", closed);
    assert_eq!(closed["status"], "closed");
    assert_eq!(closed["winning_option_id"], a.as_str());

    let mut recipients: Vec<String> = app.emails.with_subject_prefix("Date Selected: Team offsite")
        .into_iter()
        .map(|m| m.recipient)
        .collect();
    recipients.sort();
    assert_eq!(recipients, vec!["ann@example.com", "bob@example.com"]);

    let (status, body) = vote(&app, slug, Some("late@example.com"), json!({ a.clone(): "yes" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Poll is closed");

    let (status, body) = app.call("POST", &format!("/api/v1/polls/{}/winner", id), Some(json!({ "option_id": b })), Some(&auth)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Poll is already closed");
    assert_eq!(app.emails.with_subject_prefix("Date Selected").len(), 2);
}

#[tokio::test]
async fn test_poll_management() {
    let app = TestApp::new().await;
    let auth = app.login("org-1", "org1@example.com");
    let poll = create_poll(&app, &auth, false, false).await;
    let id = poll["id"].as_str().unwrap();

    let (status, updated) = app.call("PUT", &format!("/api/v1/polls/{}", id), Some(json!({ "show_results": true })), Some(&auth)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["show_results"], true);

    let (status, option) = app.call("POST", &format!("/api/v1/polls/{}/options", id), Some(json!({
        "start_time": "2031-03-06T09:00:00Z", "end_time": "2031-03-06T10:00:00Z"
    })), Some(&auth)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, options) = app.call("GET", &format!("/api/v1/polls/{}/options", id), None, Some(&auth)).await;
    assert_eq!(options.as_array().unwrap().len(), 3);

    let (status, _) = app.call("DELETE", &format!("/api/v1/polls/{}/options/{}", id, option["id"].as_str().unwrap()), None, Some(&auth)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, polls) = app.call("GET", "/api/v1/polls", None, Some(&auth)).await;
    assert_eq!(polls.as_array().unwrap().len(), 1);

    let (status, _) = app.call("DELETE", &format!("/api/v1/polls/{}", id), None, Some(&auth)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(app.count("polls").await, 0);
}

#[tokio::test]
async fn test_failed_option_insert_leaves_no_poll_behind() {
    let app = TestApp::new().await;
    let organizer = Organizer::new("org-1".into(), "org1@example.com".into(), "Org".into());
    SqliteUserRepo::new(app.pool.clone()).upsert(&organizer).await.unwrap();

    let repo = SqlitePollRepo::new(app.pool.clone());
    let poll = Poll::new(organizer.id.clone(), "Offsite".into(), String::new(), false, false, Vec::new());
    let start = Utc.with_ymd_and_hms(2031, 3, 3, 9, 0, 0).unwrap();
    let first = PollOption::new(poll.id.clone(), SlotType::Time, Interval::new(start, start + Duration::hours(1)));
    let duplicate = first.clone();

    let result = repo.create_with_options(&poll, &[first, duplicate]).await;

    assert!(result.is_err());
    assert_eq!(app.count("polls").await, 0);
    assert_eq!(app.count("poll_options").await, 0);
}
