use super::common::{created_response, success_response, JsonBody};
use crate::{
    errors::ServiceError,
    handlers::AppState,
    services::{
        bookings::CreatedBooking,
        drafts::{DraftPatch, DraftView},
    },
};
use axum::{
    extract::{Path, State},
    response::Response,
};

#[utoipa::path(
    post,
    path = "/api/v1/booking-drafts",
    request_body = DraftPatch,
    responses(
        (status = 201, description = "Draft started", body = DraftView),
        (status = 400, description = "Invalid step", body = crate::errors::ErrorResponse),
        (status = 404, description = "Table or bottle not found", body = crate::errors::ErrorResponse)
    ),
    tag = "booking-drafts"
)]
pub async fn create_draft(
    State(state): State<AppState>,
    JsonBody(patch): JsonBody<DraftPatch>,
) -> Result<Response, ServiceError> {
    let view = state.services.drafts.create(patch).await?;
    Ok(created_response(view))
}

#[utoipa::path(
    get,
    path = "/api/v1/booking-drafts/{token}",
    params(("token" = String, Path, description = "Draft token")),
    responses(
        (status = 200, description = "Draft with running totals", body = DraftView),
        (status = 404, description = "Unknown or expired token", body = crate::errors::ErrorResponse)
    ),
    tag = "booking-drafts"
)]
pub async fn get_draft(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, ServiceError> {
    Ok(success_response(state.services.drafts.get(&token).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/booking-drafts/{token}",
    request_body = DraftPatch,
    params(("token" = String, Path, description = "Draft token")),
    responses(
        (status = 200, description = "Draft updated", body = DraftView),
        (status = 400, description = "Invalid step", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown or expired token", body = crate::errors::ErrorResponse)
    ),
    tag = "booking-drafts"
)]
pub async fn update_draft(
    State(state): State<AppState>,
    Path(token): Path<String>,
    JsonBody(patch): JsonBody<DraftPatch>,
) -> Result<Response, ServiceError> {
    Ok(success_response(
        state.services.drafts.update(&token, patch).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/booking-drafts/{token}/checkout",
    params(("token" = String, Path, description = "Draft token")),
    responses(
        (status = 201, description = "Booking created from the draft", body = CreatedBooking),
        (status = 400, description = "Draft incomplete or table not available", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown or expired token", body = crate::errors::ErrorResponse)
    ),
    tag = "booking-drafts"
)]
pub async fn checkout_draft(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response, ServiceError> {
    let created = state.services.drafts.checkout(&token).await?;
    Ok(created_response(created))
}
