use crate::{
    errors::ServiceError,
    handlers::{
        common::{created_envelope, JsonBody},
        AppState,
    },
    services::inventory::{
        InventoryQuery, InventoryUpsertResult, InventoryView, UpsertInventoryRequest,
    },
    ApiResponse, ApiResult,
};
use axum::{
    extract::{Query, State},
    response::Response,
    Json,
};

#[utoipa::path(
    get,
    path = "/api/v1/admin/inventory",
    params(InventoryQuery),
    responses(
        (status = 200, description = "Inventory rows by date", body = ApiResponse<Vec<InventoryView>>),
        (status = 400, description = "Malformed filter", body = crate::errors::ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    Query(query): Query<InventoryQuery>,
) -> ApiResult<Vec<InventoryView>> {
    Ok(Json(ApiResponse::success(
        state.services.inventory.list(query).await?,
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/inventory",
    request_body = UpsertInventoryRequest,
    responses(
        (status = 201, description = "Every day in range set to the given count", body = ApiResponse<InventoryUpsertResult>),
        (status = 400, description = "Missing fields or bad range", body = crate::errors::ErrorResponse),
        (status = 404, description = "Table type not found", body = crate::errors::ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn upsert_inventory(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<UpsertInventoryRequest>,
) -> Result<Response, ServiceError> {
    let result = state.services.inventory.upsert_range(payload).await?;
    Ok(created_envelope(result))
}
