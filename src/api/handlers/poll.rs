use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::{CreatePollOptionRequest, CreatePollRequest, PickWinnerRequest, UpdatePollRequest};
use crate::api::dtos::responses::PollWithOptionsResponse;
use crate::domain::models::form::validate_schema;
use crate::domain::models::interval::Interval;
use crate::domain::models::poll::{Poll, PollOption};
use crate::domain::models::slot::SlotType;
use crate::error::AppError;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

fn build_option(poll_id: &str, request: CreatePollOptionRequest) -> Result<PollOption, AppError> {
    let interval = Interval::new(request.start_time, request.end_time);
    if interval.is_empty() {
        return Err(AppError::Validation("Option end must be after its start".into()));
    }
    Ok(PollOption::new(poll_id.to_string(), request.option_type.unwrap_or(SlotType::Time), interval))
}

pub async fn create_poll(
    State(state): State<Arc<AppState>>,
    AuthUser(organizer): AuthUser,
    Json(payload): Json<CreatePollRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".into()));
    }
    validate_schema(&payload.custom_fields)?;

    let organizer = state.user_repo.upsert(&organizer).await?;
    let poll = Poll::new(
        organizer.id.clone(),
        payload.name.trim().to_string(),
        payload.description,
        payload.show_results,
        payload.require_email,
        payload.custom_fields,
    );

    let options = payload.options.into_iter()
        .map(|o| build_option(&poll.id, o))
        .collect::<Result<Vec<_>, _>>()?;

    let (created, stored) = state.poll_repo.create_with_options(&poll, &options).await?;

    info!("Poll {} created by {} with {} options", created.slug, organizer.id, stored.len());
    Ok((StatusCode::CREATED, Json(PollWithOptionsResponse { poll: created, options: stored })))
}

pub async fn list_polls(
    State(state): State<Arc<AppState>>,
    AuthUser(organizer): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let polls = state.poll_repo.list_by_owner(&organizer.id).await?;
    Ok(Json(polls))
}

pub async fn get_poll(
    State(state): State<Arc<AppState>>,
    AuthUser(organizer): AuthUser,
    Path(poll_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let poll = state.poll_service.find_owned(&poll_id, &organizer).await?;
    let options = state.poll_repo.list_options(&poll.id).await?;
    Ok(Json(PollWithOptionsResponse { poll, options }))
}

pub async fn update_poll(
    State(state): State<Arc<AppState>>,
    AuthUser(organizer): AuthUser,
    Path(poll_id): Path<String>,
    Json(payload): Json<UpdatePollRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut poll = state.poll_service.find_owned(&poll_id, &organizer).await?;

    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("Name is required".into()));
        }
        poll.name = name.trim().to_string();
    }
    if let Some(description) = payload.description { poll.description = description; }
    if let Some(show_results) = payload.show_results { poll.show_results = show_results; }
    if let Some(require_email) = payload.require_email { poll.require_email = require_email; }
    if let Some(fields) = payload.custom_fields {
        validate_schema(&fields)?;
        poll.custom_fields = fields;
    }
    poll.updated_at = Utc::now();

    let updated = state.poll_repo.update(&poll).await?;
    Ok(Json(updated))
}

pub async fn delete_poll(
    State(state): State<Arc<AppState>>,
    AuthUser(organizer): AuthUser,
    Path(poll_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.poll_repo.delete(&organizer.id, &poll_id).await?;
    info!("Poll {} deleted", poll_id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_options(
    State(state): State<Arc<AppState>>,
    AuthUser(organizer): AuthUser,
    Path(poll_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let poll = state.poll_service.find_owned(&poll_id, &organizer).await?;
    let options = state.poll_repo.list_options(&poll.id).await?;
    Ok(Json(options))
}

pub async fn create_option(
    State(state): State<Arc<AppState>>,
    AuthUser(organizer): AuthUser,
    Path(poll_id): Path<String>,
    Json(payload): Json<CreatePollOptionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let poll = state.poll_service.find_owned(&poll_id, &organizer).await?;
    if poll.is_closed() {
        return Err(AppError::Conflict("Poll is closed".into()));
    }

    let option = build_option(&poll.id, payload)?;
    let created = state.poll_repo.create_option(&option).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete_option(
    State(state): State<Arc<AppState>>,
    AuthUser(organizer): AuthUser,
    Path((poll_id, option_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let poll = state.poll_service.find_owned(&poll_id, &organizer).await?;
    state.poll_repo.delete_option(&poll.id, &option_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_votes(
    State(state): State<Arc<AppState>>,
    AuthUser(organizer): AuthUser,
    Path(poll_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let results = state.poll_service.owner_results(&poll_id, &organizer).await?;
    Ok(Json(results))
}

pub async fn pick_winner(
    State(state): State<Arc<AppState>>,
    AuthUser(organizer): AuthUser,
    Path(poll_id): Path<String>,
    Json(payload): Json<PickWinnerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let poll = state.poll_service.pick_winner(&poll_id, &payload.option_id, &organizer).await?;
    Ok(Json(poll))
}
