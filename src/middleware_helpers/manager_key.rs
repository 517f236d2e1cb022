use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{errors::ServiceError, AppState};

pub const MANAGER_KEY_HEADER: &str = "x-manager-key";

/// Shared-key guard for the manager tool endpoints.
///
/// When no `manager_api_key` is configured every request passes.
pub async fn manager_key_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let Some(required) = state.config.manager_api_key.as_deref() else {
        return next.run(req).await;
    };

    let supplied = req
        .headers()
        .get(MANAGER_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if supplied != Some(required) {
        tracing::warn!(path = %req.uri().path(), "manager key rejected");
        return ServiceError::Forbidden("FORBIDDEN".to_string()).into_response();
    }

    next.run(req).await
}
