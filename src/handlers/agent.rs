//! Manager tool endpoints. Mounted behind the shared manager key.

use super::common::{created_response, success_response, JsonBody};
use crate::{
    errors::ServiceError,
    handlers::AppState,
    services::assistant::{
        AdjustInventoryInput, AdjustResult, BookingsTonightInput, Disambiguation, DoorList,
        FindReservationInput, FoundReservations, GetInventoryInput, PurchaseOrderInput,
        PurchaseOrderResult, SetMinimumSpendInput, SetMinimumSpendResult, StockList, ToolOutcome,
    },
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

fn outcome_response<T: Serialize>(outcome: ToolOutcome<T>) -> Response {
    match outcome {
        ToolOutcome::Done(body) => success_response(body),
        ToolOutcome::Ambiguous(candidates) => {
            (StatusCode::CONFLICT, Json(candidates)).into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/agent/get_inventory",
    request_body = GetInventoryInput,
    responses(
        (status = 200, description = "Matching active bottles", body = StockList),
        (status = 400, description = "Invalid limit", body = crate::errors::ErrorResponse),
        (status = 403, description = "Manager key missing or wrong", body = crate::errors::ErrorResponse)
    ),
    security(("manager_key" = [])),
    tag = "agent"
)]
pub async fn get_inventory(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<GetInventoryInput>,
) -> Result<Response, ServiceError> {
    Ok(success_response(
        state.services.assistant.get_inventory(input).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/agent/adjust_inventory",
    request_body = AdjustInventoryInput,
    responses(
        (status = 200, description = "Stock updated", body = AdjustResult),
        (status = 400, description = "Nothing to change", body = crate::errors::ErrorResponse),
        (status = 404, description = "No bottle matches", body = crate::errors::ErrorResponse),
        (status = 409, description = "Several bottles match", body = Disambiguation)
    ),
    security(("manager_key" = [])),
    tag = "agent"
)]
pub async fn adjust_inventory(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<AdjustInventoryInput>,
) -> Result<Response, ServiceError> {
    let outcome = state.services.assistant.adjust_inventory(input).await?;
    Ok(outcome_response(outcome))
}

#[utoipa::path(
    post,
    path = "/api/v1/agent/set_minimum_spend",
    request_body = SetMinimumSpendInput,
    responses(
        (status = 201, description = "Override rule created", body = SetMinimumSpendResult),
        (status = 400, description = "Invalid amount, rate or dates", body = crate::errors::ErrorResponse),
        (status = 404, description = "Table type not found", body = crate::errors::ErrorResponse)
    ),
    security(("manager_key" = [])),
    tag = "agent"
)]
pub async fn set_minimum_spend(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<SetMinimumSpendInput>,
) -> Result<Response, ServiceError> {
    Ok(created_response(
        state.services.assistant.set_minimum_spend(input).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/agent/bookings_tonight",
    request_body = BookingsTonightInput,
    responses(
        (status = 200, description = "Door list for the night", body = DoorList),
        (status = 400, description = "Invalid date or shift", body = crate::errors::ErrorResponse)
    ),
    security(("manager_key" = [])),
    tag = "agent"
)]
pub async fn bookings_tonight(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<BookingsTonightInput>,
) -> Result<Response, ServiceError> {
    Ok(success_response(
        state.services.assistant.bookings_tonight(input).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/agent/find_reservation",
    request_body = FindReservationInput,
    responses(
        (status = 200, description = "Up to 100 matches, earliest first", body = FoundReservations)
    ),
    security(("manager_key" = [])),
    tag = "agent"
)]
pub async fn find_reservation(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<FindReservationInput>,
) -> Result<Response, ServiceError> {
    Ok(success_response(
        state.services.assistant.find_reservation(input).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/agent/create_purchase_order",
    request_body = PurchaseOrderInput,
    responses(
        (status = 200, description = "Order saved and email drafted", body = PurchaseOrderResult),
        (status = 400, description = "Invalid items or supplier email", body = crate::errors::ErrorResponse),
        (status = 409, description = "An item matches several bottles", body = Disambiguation)
    ),
    security(("manager_key" = [])),
    tag = "agent"
)]
pub async fn create_purchase_order(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<PurchaseOrderInput>,
) -> Result<Response, ServiceError> {
    let outcome = state.services.assistant.create_purchase_order(input).await?;
    Ok(outcome_response(outcome))
}
