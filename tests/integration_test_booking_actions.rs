mod common;

use axum::http::StatusCode;
use chrono::{Duration, Weekday};
use common::{create_monday_link, extract_token, next_weekday_at, AuthHeaders, TestApp};
use serde_json::{json, Value};

/// Books Monday 09:00 on a fresh approval-required link and returns (booking id, approve token, decline token).
async fn pending_booking(app: &TestApp, auth: &AuthHeaders) -> (String, String, String) {
    let link = create_monday_link(app, auth, false).await;
    let monday = next_weekday_at(Weekday::Mon, 9, 0);

    let (status, body) = app.call("POST", &format!("/api/v1/public/booking/{}/book", link["slug"].as_str().unwrap()), Some(json!({
        "start_time": monday.to_rfc3339(),
        "end_time": (monday + Duration::minutes(30)).to_rfc3339(),
        "guest_email": "guest@example.com",
        "guest_name": "Grace Guest"
    })), None).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let request = app.emails.with_subject_prefix("New Booking Request").pop().expect("approval email");
    (
        body["booking_id"].as_str().unwrap().to_string(),
        extract_token(&request.html, "approve"),
        extract_token(&request.html, "decline"),
    )
}

async fn booking_status(app: &TestApp, id: &str) -> String {
    sqlx::query_scalar("SELECT status FROM bookings WHERE id = ?")
        .bind(id)
        .fetch_one(&app.pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_approve_via_emailed_link() {
    let app = TestApp::new().await;
    let auth = app.login("org-1", "org1@example.com");
    let (booking_id, approve, decline) = pending_booking(&app, &auth).await;
    assert_eq!(approve, decline, "both links carry the same action token");

    let (status, body) = app.call("GET", &format!("/api/v1/actions/approve?token={}", approve), None, None).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["status"], "confirmed");
    assert_eq!(body["message"], "Booking approved successfully");
    assert_eq!(booking_status(&app, &booking_id).await, "confirmed");

    let approved = app.emails.with_subject_prefix("Booking Approved: Intro Call");
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0].recipient, "guest@example.com");
    assert_eq!(approved[0].attachment_name.as_deref(), Some("invite.ics"));

    // The token is consumed by the first use.
    let (status, _) = app.call("GET", &format!("/api/v1/actions/approve?token={}", approve), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.call("POST", &format!("/api/v1/actions/decline?token={}", decline), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(booking_status(&app, &booking_id).await, "confirmed");
}

#[tokio::test]
async fn test_decline_via_emailed_link() {
    let app = TestApp::new().await;
    let auth = app.login("org-1", "org1@example.com");
    let (booking_id, _, decline) = pending_booking(&app, &auth).await;

    let (status, body) = app.call("POST", &format!("/api/v1/actions/decline?token={}", decline), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "declined");
    assert_eq!(booking_status(&app, &booking_id).await, "declined");
    assert_eq!(app.emails.with_subject_prefix("Booking Declined").len(), 1);
    assert!(app.emails.with_subject_prefix("Booking Approved").is_empty());
}

#[tokio::test]
async fn test_declined_slot_is_offered_again() {
    let app = TestApp::new().await;
    let auth = app.login("org-1", "org1@example.com");
    let (_, _, decline) = pending_booking(&app, &auth).await;
    app.call("POST", &format!("/api/v1/actions/decline?token={}", decline), None, None).await;

    let (_, links) = app.call("GET", "/api/v1/booking-links", None, Some(&auth)).await;
    let slug = links[0]["slug"].as_str().unwrap();
    let monday = next_weekday_at(Weekday::Mon, 9, 0);

    let (status, body) = app.call("POST", &format!("/api/v1/public/booking/{}/book", slug), Some(json!({
        "start_time": monday.to_rfc3339(),
        "end_time": (monday + Duration::minutes(30)).to_rfc3339(),
        "guest_email": "second@example.com"
    })), None).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
}

#[tokio::test]
async fn test_unknown_token_is_not_found() {
    let app = TestApp::new().await;
    let (status, _) = app.call("GET", &format!("/api/v1/actions/approve?token={}", "ab".repeat(32)), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_organizer_approval_is_idempotent() {
    let app = TestApp::new().await;
    let auth = app.login("org-1", "org1@example.com");
    let (booking_id, _, _) = pending_booking(&app, &auth).await;
    let path = format!("/api/v1/bookings/{}/approve", booking_id);

    let (status, body) = app.call("POST", &path, None, Some(&auth)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Booking approved successfully");

    let (status, body) = app.call("POST", &path, None, Some(&auth)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Booking already processed");
    assert_eq!(body["status"], "confirmed");

    let (_, body) = app.call("POST", &format!("/api/v1/bookings/{}/decline", booking_id), None, Some(&auth)).await;
    assert_eq!(body["message"], "Booking already processed");
    assert_eq!(booking_status(&app, &booking_id).await, "confirmed");

    assert_eq!(app.emails.with_subject_prefix("Booking Approved").len(), 1);
    assert!(app.emails.with_subject_prefix("Booking Declined").is_empty());
}

#[tokio::test]
async fn test_other_organizer_cannot_decide() {
    let app = TestApp::new().await;
    let owner = app.login("org-1", "org1@example.com");
    let stranger = app.login("org-2", "org2@example.com");
    let (booking_id, _, _) = pending_booking(&app, &owner).await;

    let (status, _) = app.call("POST", &format!("/api/v1/bookings/{}/approve", booking_id), None, Some(&stranger)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.call("POST", &format!("/api/v1/bookings/{}/approve", booking_id), None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(booking_status(&app, &booking_id).await, "pending");
}

#[tokio::test]
async fn test_concurrent_approve_and_decline_resolve_once() {
    let app = TestApp::new().await;
    let auth = app.login("org-1", "org1@example.com");
    let (booking_id, token, _) = pending_booking(&app, &auth).await;

    let approve_path = format!("/api/v1/bookings/{}/approve", booking_id);
    let decline_path = format!("/api/v1/actions/decline?token={}", token);
    let ((approve_status, approve_body), (decline_status, decline_body)) = tokio::join!(
        app.call("POST", &approve_path, None, Some(&auth)),
        app.call("POST", &decline_path, None, None),
    );

    let resolved: Vec<&Value> = [(&approve_status, &approve_body), (&decline_status, &decline_body)]
        .into_iter()
        .filter(|(status, body)| **status == StatusCode::OK && body["message"] != "Booking already processed")
        .map(|(_, body)| body)
        .collect();
    assert_eq!(resolved.len(), 1, "approve: {} decline: {}", approve_body, decline_body);

    let final_status = booking_status(&app, &booking_id).await;
    assert_eq!(resolved[0]["status"], final_status.as_str());

    let outcome_mails = app.emails.with_subject_prefix("Booking Approved").len()
        + app.emails.with_subject_prefix("Booking Declined").len();
    assert_eq!(outcome_mails, 1);
}
