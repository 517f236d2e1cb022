use super::DeleteMessage;
use crate::{
    errors::ServiceError,
    handlers::{
        common::{created_envelope, JsonBody},
        AppState,
    },
    services::pricing::{CreatePricingRuleRequest, PricingRuleView, UpdatePricingRuleRequest},
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
    path = "/api/v1/admin/pricing",
    responses(
        (status = 200, description = "Rules by table type, highest priority first", body = ApiResponse<Vec<PricingRuleView>>)
    ),
    tag = "admin"
)]
pub async fn list_rules(State(state): State<AppState>) -> ApiResult<Vec<PricingRuleView>> {
    Ok(Json(ApiResponse::success(
        state.services.pricing.list_rules().await?,
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/pricing",
    request_body = CreatePricingRuleRequest,
    responses(
        (status = 201, description = "Rule created", body = ApiResponse<PricingRuleView>),
        (status = 400, description = "Missing fields or invalid rule shape", body = crate::errors::ErrorResponse),
        (status = 404, description = "Table type not found", body = crate::errors::ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn create_rule(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreatePricingRuleRequest>,
) -> Result<Response, ServiceError> {
    let rule = state.services.pricing.create_rule(payload).await?;
    Ok(created_envelope(rule))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/pricing/{id}",
    params(("id" = Uuid, Path, description = "Pricing rule id")),
    responses(
        (status = 200, description = "Rule", body = ApiResponse<PricingRuleView>),
        (status = 404, description = "Pricing rule not found", body = crate::errors::ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn get_rule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<PricingRuleView> {
    Ok(Json(ApiResponse::success(
        state.services.pricing.get_rule(id).await?,
    )))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/pricing/{id}",
    request_body = UpdatePricingRuleRequest,
    params(("id" = Uuid, Path, description = "Pricing rule id")),
    responses(
        (status = 200, description = "Rule updated", body = ApiResponse<PricingRuleView>),
        (status = 400, description = "Invalid rule shape", body = crate::errors::ErrorResponse),
        (status = 404, description = "Pricing rule not found", body = crate::errors::ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn update_rule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<UpdatePricingRuleRequest>,
) -> ApiResult<PricingRuleView> {
    Ok(Json(ApiResponse::success(
        state.services.pricing.update_rule(id, payload).await?,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/pricing/{id}",
    params(("id" = Uuid, Path, description = "Pricing rule id")),
    responses(
        (status = 200, description = "Rule deleted", body = ApiResponse<DeleteMessage>),
        (status = 404, description = "Pricing rule not found", body = crate::errors::ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<DeleteMessage> {
    state.services.pricing.delete_rule(id).await?;
    Ok(Json(ApiResponse::success(DeleteMessage::new("Pricing rule"))))
}
