use super::common::success_response;
use crate::{
    errors::ServiceError,
    handlers::AppState,
    services::availability::{AvailabilityQuery, DayAvailability},
};
use axum::{
    extract::{Query, State},
    response::Response,
};

#[utoipa::path(
    get,
    path = "/api/v1/availability",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "One entry per bookable day in range", body = [DayAvailability]),
        (status = 400, description = "Missing or malformed parameters", body = crate::errors::ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn get_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Response, ServiceError> {
    let days = state.services.availability.availability(query).await?;
    Ok(success_response(days))
}
