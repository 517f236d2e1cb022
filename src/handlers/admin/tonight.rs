use crate::{
    handlers::AppState,
    services::tonight::TonightReport,
    ApiResponse, ApiResult,
};
use axum::{extract::State, Json};
use chrono::Utc;

#[utoipa::path(
    get,
    path = "/api/v1/admin/tonights-bookings",
    responses(
        (status = 200, description = "Tonight's bookings with door stats", body = ApiResponse<TonightReport>)
    ),
    tag = "admin"
)]
pub async fn tonights_bookings(State(state): State<AppState>) -> ApiResult<TonightReport> {
    Ok(Json(ApiResponse::success(
        state.services.tonight.report(Utc::now()).await?,
    )))
}
