//! Customer-facing booking endpoints.

use super::common::{created_response, require_db_id, success_response, JsonBody};
use crate::{
    errors::ServiceError,
    handlers::AppState,
    services::{
        bookings::{BookingDetail, CreateBookingRequest, CreatedBooking},
        notifications::{self, BookingEmail},
    },
};
use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookingListQuery {
    /// Only bookings made with this email
    pub email: Option<String>,
    /// Defaults to 10
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusUpdateRequest {
    /// PENDING, CONFIRMED, COMPLETED, CANCELLED or NO_SHOW
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedResponse {
    pub success: bool,
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    request_body = CreateBookingRequest,
    params(
        ("Idempotency-Key" = Option<String>, Header, description = "Replays the first successful response for a repeated key")
    ),
    responses(
        (status = 201, description = "Booking created", body = CreatedBooking),
        (status = 400, description = "Missing fields or table not available", body = crate::errors::ErrorResponse),
        (status = 500, description = "Failed to create booking", body = crate::errors::ErrorResponse)
    ),
    tag = "bookings"
)]
pub async fn create_booking(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateBookingRequest>,
) -> Result<Response, ServiceError> {
    let created = state.services.bookings.create_booking(payload).await?;
    info!(confirmation_code = %created.confirmation_code, "Booking created");
    Ok(created_response(created))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    params(BookingListQuery),
    responses(
        (status = 200, description = "Most recent bookings first", body = [BookingDetail])
    ),
    tag = "bookings"
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<BookingListQuery>,
) -> Result<Response, ServiceError> {
    let bookings = state
        .services
        .bookings
        .list_bookings(query.email.as_deref(), query.limit)
        .await?;
    Ok(success_response(bookings))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/{code}",
    params(
        ("code" = String, Path, description = "Confirmation code or database id")
    ),
    responses(
        (status = 200, description = "Booking found", body = BookingDetail),
        (status = 404, description = "Booking not found", body = crate::errors::ErrorResponse)
    ),
    tag = "bookings"
)]
pub async fn get_booking(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Response, ServiceError> {
    let booking = state.services.bookings.get_booking(&code).await?;
    Ok(success_response(booking))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/{code}/email",
    params(
        ("code" = String, Path, description = "Confirmation code or database id")
    ),
    responses(
        (status = 200, description = "Rendered confirmation email", body = BookingEmail),
        (status = 404, description = "Booking not found", body = crate::errors::ErrorResponse)
    ),
    tag = "bookings"
)]
pub async fn booking_email(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Response, ServiceError> {
    let booking = state.services.bookings.get_booking(&code).await?;
    let email = notifications::render_booking_confirmation(&booking, &state.config.public_base_url);
    Ok(success_response(email))
}

#[utoipa::path(
    patch,
    path = "/api/v1/bookings/{code}",
    request_body = StatusUpdateRequest,
    params(
        ("code" = Uuid, Path, description = "Booking database id")
    ),
    responses(
        (status = 200, description = "Status updated", body = BookingDetail),
        (status = 400, description = "Invalid status or not a database id", body = crate::errors::ErrorResponse),
        (status = 404, description = "Booking not found", body = crate::errors::ErrorResponse)
    ),
    tag = "bookings"
)]
pub async fn update_booking_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<StatusUpdateRequest>,
) -> Result<Response, ServiceError> {
    let id = require_db_id(&id, "PATCH")?;
    let status = payload.status.unwrap_or_default();
    let booking = state.services.bookings.update_status(id, &status).await?;
    Ok(success_response(booking))
}

#[utoipa::path(
    delete,
    path = "/api/v1/bookings/{code}",
    params(
        ("code" = Uuid, Path, description = "Booking database id")
    ),
    responses(
        (status = 200, description = "Booking deleted", body = DeletedResponse),
        (status = 400, description = "Not a database id", body = crate::errors::ErrorResponse),
        (status = 404, description = "Booking not found", body = crate::errors::ErrorResponse)
    ),
    tag = "bookings"
)]
pub async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ServiceError> {
    let id = require_db_id(&id, "DELETE")?;
    state.services.bookings.delete_booking(id).await?;
    Ok(success_response(DeletedResponse { success: true }))
}
