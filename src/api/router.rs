use axum::{
    body::Body,
    extract::Request,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{action, booking, booking_link, health, poll, public_booking, public_poll};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Public Booking Flow
        .route("/api/v1/public/booking/{slug}", get(public_booking::get_link))
        .route("/api/v1/public/booking/{slug}/availability", get(public_booking::get_availability))
        .route("/api/v1/public/booking/{slug}/book", post(public_booking::create_booking))

        // Emailed approve / decline links
        .route("/api/v1/actions/approve", get(action::approve_via_token).post(action::approve_via_token))
        .route("/api/v1/actions/decline", get(action::decline_via_token).post(action::decline_via_token))

        // Public Polls
        .route("/api/v1/public/poll/{slug}", get(public_poll::get_poll))
        .route("/api/v1/public/poll/{slug}/vote", post(public_poll::submit_vote))
        .route("/api/v1/public/poll/{slug}/results", get(public_poll::get_results))

        // Booking Links
        .route("/api/v1/booking-links", get(booking_link::list_links).post(booking_link::create_link))
        .route("/api/v1/booking-links/{id}", get(booking_link::get_link).put(booking_link::update_link).delete(booking_link::delete_link))
        .route("/api/v1/booking-links/{id}/slots", get(booking_link::list_slots).post(booking_link::create_slot))
        .route("/api/v1/booking-links/{id}/slots/{slot_id}", delete(booking_link::delete_slot))
        .route("/api/v1/booking-links/{id}/bookings", get(booking::list_bookings))

        // Booking Management
        .route("/api/v1/bookings/{id}/approve", post(booking::approve_booking))
        .route("/api/v1/bookings/{id}/decline", post(booking::decline_booking))

        // Polls
        .route("/api/v1/polls", get(poll::list_polls).post(poll::create_poll))
        .route("/api/v1/polls/{id}", get(poll::get_poll).put(poll::update_poll).delete(poll::delete_poll))
        .route("/api/v1/polls/{id}/options", get(poll::list_options).post(poll::create_option))
        .route("/api/v1/polls/{id}/options/{option_id}", delete(poll::delete_option))
        .route("/api/v1/polls/{id}/votes", get(poll::list_votes))
        .route("/api/v1/polls/{id}/winner", post(poll::pick_winner))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = %request.uri().path(),
                        version = ?request.version(),
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
