use super::DeleteMessage;
use crate::{
    entities::bottle,
    errors::ServiceError,
    handlers::{
        common::{created_envelope, JsonBody},
        AppState,
    },
    services::bottles::{CreateBottleRequest, UpdateBottleRequest},
    ApiResponse, ApiResult,
};
use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v1/admin/bottles",
    responses(
        (status = 200, description = "Every bottle including inactive ones", body = ApiResponse<Vec<bottle::Model>>)
    ),
    tag = "admin"
)]
pub async fn list_bottles(State(state): State<AppState>) -> ApiResult<Vec<bottle::Model>> {
    Ok(Json(ApiResponse::success(
        state.services.bottles.list_admin().await?,
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/bottles",
    request_body = CreateBottleRequest,
    responses(
        (status = 201, description = "Bottle created", body = ApiResponse<bottle::Model>),
        (status = 400, description = "Missing fields", body = crate::errors::ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn create_bottle(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateBottleRequest>,
) -> Result<Response, ServiceError> {
    let bottle = state.services.bottles.create(payload).await?;
    Ok(created_envelope(bottle))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/bottles/{id}",
    params(("id" = Uuid, Path, description = "Bottle id")),
    responses(
        (status = 200, description = "Bottle", body = ApiResponse<bottle::Model>),
        (status = 404, description = "Bottle not found", body = crate::errors::ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn get_bottle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<bottle::Model> {
    Ok(Json(ApiResponse::success(
        state.services.bottles.get(id).await?,
    )))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/bottles/{id}",
    request_body = UpdateBottleRequest,
    params(("id" = Uuid, Path, description = "Bottle id")),
    responses(
        (status = 200, description = "Bottle updated", body = ApiResponse<bottle::Model>),
        (status = 404, description = "Bottle not found", body = crate::errors::ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn update_bottle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<UpdateBottleRequest>,
) -> ApiResult<bottle::Model> {
    Ok(Json(ApiResponse::success(
        state.services.bottles.update(id, payload).await?,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/bottles/{id}",
    params(("id" = Uuid, Path, description = "Bottle id")),
    responses(
        (status = 200, description = "Bottle deleted", body = ApiResponse<DeleteMessage>),
        (status = 400, description = "On active reservations", body = crate::errors::ErrorResponse),
        (status = 404, description = "Bottle not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "On past reservations", body = crate::errors::ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn delete_bottle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<DeleteMessage> {
    state.services.bottles.delete(id).await?;
    Ok(Json(ApiResponse::success(DeleteMessage::new("Bottle"))))
}
