use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::SubmitVoteRequest;
use crate::api::dtos::responses::{PublicPollResponse, VoteCreatedResponse};
use crate::domain::services::poll_service::VoteRequest;
use crate::error::AppError;
use std::sync::Arc;

pub async fn get_poll(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (poll, options) = state.poll_service.find_by_slug(&slug).await?;
    Ok(Json(PublicPollResponse::new(poll, options)))
}

pub async fn submit_vote(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Json(payload): Json<SubmitVoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let vote = state.poll_service.submit_vote(&slug, VoteRequest {
        guest_email: payload.guest_email,
        guest_name: payload.guest_name,
        responses: payload.responses,
        custom_fields: payload.custom_fields,
    }).await?;

    Ok((StatusCode::CREATED, Json(VoteCreatedResponse {
        vote_id: vote.id,
        message: "Vote submitted successfully",
    })))
}

pub async fn get_results(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let results = state.poll_service.results(&slug).await?;
    Ok(Json(results))
}
