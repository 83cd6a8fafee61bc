use axum::{extract::{Path, Query, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::{AvailabilityQuery, CreateBookingRequest};
use crate::api::dtos::responses::{BookingStatusResponse, PublicBookingLinkResponse};
use crate::domain::models::interval::Interval;
use crate::domain::services::booking_service::{BookingRequest, SlotChoice};
use crate::error::AppError;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::info;

const DEFAULT_RANGE_DAYS: i64 = 7;

pub async fn get_link(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let link = state.booking_service.find_active_link(&slug).await?;
    Ok(Json(PublicBookingLinkResponse::from(link)))
}

pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let start = query.start.unwrap_or(now);
    let end = query.end.unwrap_or(start + Duration::days(DEFAULT_RANGE_DAYS));

    let availability = state.booking_service.available_slots(&slug, start, end, query.duration, now).await?;
    Ok(Json(availability))
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let slot = match (payload.slot_id, payload.start_time, payload.end_time) {
        (Some(slot_id), _, _) => SlotChoice::Manual(slot_id),
        (None, Some(start), Some(end)) => SlotChoice::Interval(Interval::new(start, end)),
        _ => return Err(AppError::Validation("Either slot_id or start_time and end_time are required".into())),
    };

    info!("create_booking: request for link {}", slug);

    let outcome = state.booking_service.submit(&slug, BookingRequest {
        slot,
        guest_email: payload.guest_email,
        guest_name: payload.guest_name,
        custom_fields: payload.custom_fields,
    }, Utc::now()).await?;

    Ok((StatusCode::CREATED, Json(BookingStatusResponse {
        booking_id: outcome.booking.id,
        status: outcome.booking.status,
        message: outcome.message,
    })))
}
