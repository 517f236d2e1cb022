use crate::{
    errors::ServiceError,
    handlers::{common::JsonBody, AppState},
    services::bookings::{AdminBookingFilter, AdminBookingList, BookingDetail},
    ApiResponse, ApiResult,
};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminBookingQuery {
    /// A status value, or `ALL`
    pub status: Option<String>,
    /// Matches name, email, phone or confirmation code
    pub search: Option<String>,
    /// `YYYY-MM-DD`
    pub date: Option<String>,
    /// Defaults to 50
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatusUpdate {
    pub booking_id: Option<Uuid>,
    pub status: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/bookings",
    params(AdminBookingQuery),
    responses(
        (status = 200, description = "Bookings with status counts and revenue", body = ApiResponse<AdminBookingList>),
        (status = 400, description = "Invalid filter", body = crate::errors::ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<AdminBookingQuery>,
) -> ApiResult<AdminBookingList> {
    let list = state
        .services
        .bookings
        .admin_list(AdminBookingFilter {
            status: query.status,
            search: query.search,
            date: query.date,
            limit: query.limit,
        })
        .await?;
    Ok(Json(ApiResponse::success(list)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/bookings",
    request_body = AdminStatusUpdate,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<BookingDetail>),
        (status = 400, description = "Missing fields or invalid status", body = crate::errors::ErrorResponse),
        (status = 404, description = "Booking not found", body = crate::errors::ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn update_booking_status(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<AdminStatusUpdate>,
) -> ApiResult<BookingDetail> {
    let (Some(id), Some(status)) = (payload.booking_id, payload.status) else {
        return Err(ServiceError::BadRequest(
            "Missing bookingId or status".to_string(),
        ));
    };
    let booking = state.services.bookings.update_status(id, &status).await?;
    Ok(Json(ApiResponse::success(booking)))
}
