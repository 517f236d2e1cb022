use super::DeleteMessage;
use crate::{
    entities::table_type,
    handlers::{
        common::{created_envelope, JsonBody},
        AppState,
    },
    errors::ServiceError,
    services::table_types::{CreateTableTypeRequest, UpdateTableTypeRequest},
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
    path = "/api/v1/admin/tables",
    responses(
        (status = 200, description = "All table types, active or not", body = ApiResponse<Vec<table_type::Model>>)
    ),
    tag = "admin"
)]
pub async fn list_tables(State(state): State<AppState>) -> ApiResult<Vec<table_type::Model>> {
    Ok(Json(ApiResponse::success(
        state.services.tables.list_admin().await?,
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/tables",
    request_body = CreateTableTypeRequest,
    responses(
        (status = 201, description = "Table type created", body = ApiResponse<table_type::Model>),
        (status = 400, description = "Missing fields or slug taken", body = crate::errors::ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn create_table(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateTableTypeRequest>,
) -> Result<Response, ServiceError> {
    let table = state.services.tables.create(payload).await?;
    Ok(created_envelope(table))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/tables/{id}",
    params(("id" = Uuid, Path, description = "Table type id")),
    responses(
        (status = 200, description = "Table type", body = ApiResponse<table_type::Model>),
        (status = 404, description = "Table not found", body = crate::errors::ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn get_table(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<table_type::Model> {
    Ok(Json(ApiResponse::success(
        state.services.tables.get(&id.to_string()).await?,
    )))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/tables/{id}",
    request_body = UpdateTableTypeRequest,
    params(("id" = Uuid, Path, description = "Table type id")),
    responses(
        (status = 200, description = "Table type updated", body = ApiResponse<table_type::Model>),
        (status = 400, description = "Slug taken or invalid values", body = crate::errors::ErrorResponse),
        (status = 404, description = "Table not found", body = crate::errors::ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn update_table(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<UpdateTableTypeRequest>,
) -> ApiResult<table_type::Model> {
    Ok(Json(ApiResponse::success(
        state.services.tables.update(id, payload).await?,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/tables/{id}",
    params(("id" = Uuid, Path, description = "Table type id")),
    responses(
        (status = 200, description = "Table type deleted", body = ApiResponse<DeleteMessage>),
        (status = 400, description = "Active reservations reference it", body = crate::errors::ErrorResponse),
        (status = 404, description = "Table not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Past reservations reference it", body = crate::errors::ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn delete_table(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<DeleteMessage> {
    state.services.tables.delete(id).await?;
    Ok(Json(ApiResponse::success(DeleteMessage::new("Table"))))
}
