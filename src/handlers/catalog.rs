//! Public catalog: table types, bottles and price lookups.

use super::common::success_response;
use crate::{
    entities::{bottle, table_type},
    errors::ServiceError,
    handlers::AppState,
    services::{calendar, pricing::PricingResolution},
};
use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ResolvePriceQuery {
    pub table_type_id: Option<String>,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp
    pub date: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/tables",
    responses(
        (status = 200, description = "Active table types, cheapest first", body = [table_type::Model])
    ),
    tag = "catalog"
)]
pub async fn list_tables(State(state): State<AppState>) -> Result<Response, ServiceError> {
    Ok(success_response(state.services.tables.list_public().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/tables/{slug}",
    params(
        ("slug" = String, Path, description = "Table type slug")
    ),
    responses(
        (status = 200, description = "Table type", body = table_type::Model),
        (status = 404, description = "Table not found", body = crate::errors::ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn get_table(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, ServiceError> {
    let table = state.services.tables.get(&slug).await?;
    if !table.active {
        return Err(ServiceError::NotFound("Table not found".to_string()));
    }
    Ok(success_response(table))
}

#[utoipa::path(
    get,
    path = "/api/v1/bottles",
    responses(
        (status = 200, description = "Orderable bottles by category", body = [bottle::Model])
    ),
    tag = "catalog"
)]
pub async fn list_bottles(State(state): State<AppState>) -> Result<Response, ServiceError> {
    Ok(success_response(state.services.bottles.list_public().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/pricing/resolve",
    params(ResolvePriceQuery),
    responses(
        (status = 200, description = "Minimum spend and deposit rate for the day", body = PricingResolution),
        (status = 400, description = "Missing or malformed parameters", body = crate::errors::ErrorResponse),
        (status = 404, description = "Table not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Rules tie at the highest priority", body = crate::errors::ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn resolve_price(
    State(state): State<AppState>,
    Query(query): Query<ResolvePriceQuery>,
) -> Result<Response, ServiceError> {
    let (Some(raw_table), Some(raw_date)) = (
        crate::services::non_blank(query.table_type_id.as_deref()),
        crate::services::non_blank(query.date.as_deref()),
    ) else {
        return Err(ServiceError::BadRequest(
            "Missing required parameters".to_string(),
        ));
    };
    let table_type_id = Uuid::parse_str(raw_table)
        .map_err(|_| ServiceError::BadRequest(format!("Invalid tableTypeId: {}", raw_table)))?;
    let date = calendar::inventory_day(calendar::parse_booking_timestamp(raw_date)?);

    let resolution = state.services.pricing.resolve(table_type_id, date).await?;
    Ok(success_response(resolution))
}
