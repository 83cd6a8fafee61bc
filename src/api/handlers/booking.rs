use axum::{extract::{Path, State}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::responses::BookingStatusResponse;
use crate::domain::services::booking_service::Resolution;
use crate::error::AppError;
use std::sync::Arc;

pub(crate) fn resolution_response(resolution: Resolution, done_message: &'static str) -> BookingStatusResponse {
    match resolution {
        Resolution::Resolved(booking) => BookingStatusResponse {
            booking_id: booking.id,
            status: booking.status,
            message: done_message,
        },
        Resolution::AlreadyProcessed(booking) => BookingStatusResponse {
            booking_id: booking.id,
            status: booking.status,
            message: "Booking already processed",
        },
    }
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    AuthUser(organizer): AuthUser,
    Path(link_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_service.list_for_link(&link_id, &organizer).await?;
    Ok(Json(bookings))
}

pub async fn approve_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(organizer): AuthUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let resolution = state.booking_service.approve(&booking_id, &organizer).await?;
    Ok(Json(resolution_response(resolution, "Booking approved successfully")))
}

pub async fn decline_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(organizer): AuthUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let resolution = state.booking_service.decline(&booking_id, &organizer).await?;
    Ok(Json(resolution_response(resolution, "Booking declined")))
}
