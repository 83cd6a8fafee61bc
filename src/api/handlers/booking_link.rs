use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::{CreateBookingLinkRequest, CreateSlotRequest, UpdateBookingLinkRequest};
use crate::domain::models::booking_link::{BookingLink, NewBookingLinkParams};
use crate::domain::models::interval::Interval;
use crate::domain::models::slot::{Slot, SlotType};
use crate::domain::models::user::Organizer;
use crate::error::AppError;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

async fn owned_link(state: &AppState, organizer: &Organizer, link_id: &str) -> Result<BookingLink, AppError> {
    let link = state.link_repo.find_by_id(link_id).await?
        .ok_or(AppError::NotFound("Booking link not found".into()))?;
    if link.owner_id != organizer.id {
        return Err(AppError::Forbidden("Not your booking link".into()));
    }
    Ok(link)
}

pub async fn create_link(
    State(state): State<Arc<AppState>>,
    AuthUser(organizer): AuthUser,
    Json(payload): Json<CreateBookingLinkRequest>,
) -> Result<impl IntoResponse, AppError> {
    let organizer = state.user_repo.upsert(&organizer).await?;

    let link = BookingLink::new(NewBookingLinkParams {
        owner_id: organizer.id.clone(),
        name: payload.name.trim().to_string(),
        description: payload.description,
        auto_confirm: payload.auto_confirm,
        slot_durations_minutes: payload.slot_durations_minutes,
        buffer_minutes: payload.buffer_minutes,
        timezone: payload.timezone.unwrap_or_else(|| "UTC".to_string()),
        availability_rules: payload.availability_rules,
        custom_fields: payload.custom_fields,
        event_template: payload.event_template,
        meeting_link: payload.meeting_link.filter(|m| !m.trim().is_empty()),
    });
    link.validate()?;

    let created = state.link_repo.create(&link).await?;
    info!("Booking link {} created by {}", created.slug, organizer.id);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_links(
    State(state): State<Arc<AppState>>,
    AuthUser(organizer): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let links = state.link_repo.list_by_owner(&organizer.id).await?;
    Ok(Json(links))
}

pub async fn get_link(
    State(state): State<Arc<AppState>>,
    AuthUser(organizer): AuthUser,
    Path(link_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let link = owned_link(&state, &organizer, &link_id).await?;
    Ok(Json(link))
}

pub async fn update_link(
    State(state): State<Arc<AppState>>,
    AuthUser(organizer): AuthUser,
    Path(link_id): Path<String>,
    Json(payload): Json<UpdateBookingLinkRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut link = owned_link(&state, &organizer, &link_id).await?;

    if let Some(name) = payload.name { link.name = name.trim().to_string(); }
    if let Some(description) = payload.description { link.description = description; }
    if let Some(status) = payload.status { link.status = status; }
    if let Some(auto_confirm) = payload.auto_confirm { link.auto_confirm = auto_confirm; }
    if let Some(durations) = payload.slot_durations_minutes { link.slot_durations_minutes = durations; }
    if let Some(buffer) = payload.buffer_minutes { link.buffer_minutes = buffer; }
    if let Some(timezone) = payload.timezone { link.timezone = timezone; }
    if let Some(rules) = payload.availability_rules { link.availability_rules = rules; }
    if let Some(fields) = payload.custom_fields { link.custom_fields = fields; }
    if let Some(template) = payload.event_template { link.event_template = Some(template); }
    if let Some(meeting_link) = payload.meeting_link {
        link.meeting_link = Some(meeting_link).filter(|m| !m.trim().is_empty());
    }
    link.updated_at = Utc::now();
    link.validate()?;

    let updated = state.link_repo.update(&link).await?;
    info!("Booking link {} updated", updated.id);
    Ok(Json(updated))
}

pub async fn delete_link(
    State(state): State<Arc<AppState>>,
    AuthUser(organizer): AuthUser,
    Path(link_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.link_repo.delete(&organizer.id, &link_id).await?;
    info!("Booking link {} deleted", link_id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_slots(
    State(state): State<Arc<AppState>>,
    AuthUser(organizer): AuthUser,
    Path(link_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let link = owned_link(&state, &organizer, &link_id).await?;
    let slots = state.link_repo.list_manual_slots(&link.id).await?;
    Ok(Json(slots))
}

pub async fn create_slot(
    State(state): State<Arc<AppState>>,
    AuthUser(organizer): AuthUser,
    Path(link_id): Path<String>,
    Json(payload): Json<CreateSlotRequest>,
) -> Result<impl IntoResponse, AppError> {
    let link = owned_link(&state, &organizer, &link_id).await?;

    let interval = Interval::new(payload.start_time, payload.end_time);
    if interval.is_empty() {
        return Err(AppError::Validation("Slot end must be after its start".into()));
    }

    let slot = Slot::new(link.id, payload.slot_type.unwrap_or(SlotType::Time), interval, true);
    let created = state.link_repo.create_slot(&slot).await?;
    info!("Manual slot {} added to link {}", created.id, created.booking_link_id);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete_slot(
    State(state): State<Arc<AppState>>,
    AuthUser(organizer): AuthUser,
    Path((link_id, slot_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let link = owned_link(&state, &organizer, &link_id).await?;
    state.link_repo.delete_slot(&link.id, &slot_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
