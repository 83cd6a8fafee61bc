use axum::{extract::{Query, State}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::ActionQuery;
use crate::api::handlers::booking::resolution_response;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn approve_via_token(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ActionQuery>,
) -> Result<impl IntoResponse, AppError> {
    let resolution = state.booking_service.approve_with_token(&query.token).await?;
    info!("Approve action link used");
    Ok(Json(resolution_response(resolution, "Booking approved successfully")))
}

pub async fn decline_via_token(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ActionQuery>,
) -> Result<impl IntoResponse, AppError> {
    let resolution = state.booking_service.decline_with_token(&query.token).await?;
    info!("Decline action link used");
    Ok(Json(resolution_response(resolution, "Booking declined")))
}
