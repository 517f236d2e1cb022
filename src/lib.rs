//! Table Booking API Library
//!
//! Reservation backend for nightlife venues: table types, bottle service,
//! date-scoped table inventory, pricing rules and transactional bookings.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod middleware_helpers;
pub mod migrator;
pub mod money;
pub mod openapi;
pub mod seed;
pub mod services;
pub mod tracing;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};
use utoipa::ToSchema;

use crate::{
    config::AppConfig,
    db::DbPool,
    errors::ServiceError,
    handlers::{admin, AppServices},
    middleware_helpers::{idempotency_middleware, manager_key_middleware, IdempotencyStore},
};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: AppConfig,
    pub services: AppServices,
    pub idempotency: IdempotencyStore,
}

impl AppState {
    pub fn new(db: Arc<DbPool>, config: AppConfig) -> Self {
        let services = AppServices::new(db.clone(), &config);
        let idempotency =
            IdempotencyStore::new(Duration::from_secs(config.idempotency_ttl_secs));
        Self {
            db,
            config,
            services,
            idempotency,
        }
    }
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Routes mounted under `/api/v1`.
pub fn api_v1_routes(state: &AppState) -> Router<AppState> {
    let idempotent = from_fn_with_state(state.idempotency.clone(), idempotency_middleware);

    let bookings = Router::new()
        .route(
            "/bookings",
            post(handlers::bookings::create_booking)
                .layer(idempotent.clone())
                .get(handlers::bookings::list_bookings),
        )
        .route(
            "/bookings/:code",
            get(handlers::bookings::get_booking)
                .patch(handlers::bookings::update_booking_status)
                .delete(handlers::bookings::delete_booking),
        )
        .route("/bookings/:code/email", get(handlers::bookings::booking_email));

    let catalog = Router::new()
        .route("/availability", get(handlers::availability::get_availability))
        .route("/tables", get(handlers::catalog::list_tables))
        .route("/tables/:slug", get(handlers::catalog::get_table))
        .route("/bottles", get(handlers::catalog::list_bottles))
        .route("/pricing/resolve", get(handlers::catalog::resolve_price));

    let drafts = Router::new()
        .route("/booking-drafts", post(handlers::drafts::create_draft))
        .route(
            "/booking-drafts/:token",
            get(handlers::drafts::get_draft).put(handlers::drafts::update_draft),
        )
        .route(
            "/booking-drafts/:token/checkout",
            post(handlers::drafts::checkout_draft).layer(idempotent),
        );

    let admin = Router::new()
        .route(
            "/bookings",
            get(admin::bookings::list_bookings).patch(admin::bookings::update_booking_status),
        )
        .route(
            "/tables",
            get(admin::tables::list_tables).post(admin::tables::create_table),
        )
        .route(
            "/tables/:id",
            get(admin::tables::get_table)
                .patch(admin::tables::update_table)
                .delete(admin::tables::delete_table),
        )
        .route(
            "/bottles",
            get(admin::bottles::list_bottles).post(admin::bottles::create_bottle),
        )
        .route(
            "/bottles/:id",
            get(admin::bottles::get_bottle)
                .patch(admin::bottles::update_bottle)
                .delete(admin::bottles::delete_bottle),
        )
        .route(
            "/pricing",
            get(admin::pricing::list_rules).post(admin::pricing::create_rule),
        )
        .route(
            "/pricing/:id",
            get(admin::pricing::get_rule)
                .patch(admin::pricing::update_rule)
                .delete(admin::pricing::delete_rule),
        )
        .route(
            "/inventory",
            get(admin::inventory::list_inventory).post(admin::inventory::upsert_inventory),
        )
        .route("/tonights-bookings", get(admin::tonight::tonights_bookings));

    // Manager tools sit behind the shared key
    let agent = Router::new()
        .route("/get_inventory", post(handlers::agent::get_inventory))
        .route("/adjust_inventory", post(handlers::agent::adjust_inventory))
        .route("/set_minimum_spend", post(handlers::agent::set_minimum_spend))
        .route("/bookings_tonight", post(handlers::agent::bookings_tonight))
        .route("/find_reservation", post(handlers::agent::find_reservation))
        .route(
            "/create_purchase_order",
            post(handlers::agent::create_purchase_order),
        )
        .route_layer(from_fn_with_state(state.clone(), manager_key_middleware));

    Router::new()
        .route("/status", get(api_status))
        .merge(bookings)
        .merge(catalog)
        .merge(drafts)
        .nest("/admin", admin)
        .nest("/agent", agent)
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let status_data = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "table-booking-api",
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

/// CORS from config: explicit origins, permissive in development or when
/// `cors_allow_any_origin` is set, otherwise an error.
pub fn cors_layer(cfg: &AppConfig) -> Result<CorsLayer, ServiceError> {
    let configured_origins: Option<Vec<HeaderValue>> = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .filter_map(|origin| {
                    let trimmed = origin.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        HeaderValue::from_str(trimmed).ok()
                    }
                })
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    if let Some(origins) = configured_origins {
        let layer = CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any);
        // credentials cannot be combined with wildcard methods or headers
        return Ok(if cfg.cors_allow_credentials {
            layer
                .allow_credentials(true)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    header::CONTENT_TYPE,
                    HeaderName::from_static(middleware_helpers::idempotency::IDEMPOTENCY_HEADER),
                    HeaderName::from_static(middleware_helpers::MANAGER_KEY_HEADER),
                ])
        } else {
            layer
        });
    }

    if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            environment = %cfg.environment,
            "Using permissive CORS because explicit origins were not configured"
        );
        return Ok(CorsLayer::permissive());
    }

    Err(ServiceError::InternalError(
        "Missing CORS configuration: set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true"
            .to_string(),
    ))
}

/// Full application: health probes, `/api/v1`, Swagger UI and the HTTP
/// middleware stack.
pub fn build_router(state: AppState) -> Result<Router, ServiceError> {
    let cors = cors_layer(&state.config)?;
    let timeout = Duration::from_secs(state.config.request_timeout_secs.max(1));

    let router = Router::new()
        .nest("/api/v1", api_v1_routes(&state))
        .with_state(state.clone())
        .nest("/health", health::health_routes(state.db.clone()))
        .merge(openapi::swagger_ui())
        .layer(crate::tracing::configure_http_tracing())
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(cors)
        // Outermost so every span and error body carries the id
        .layer(from_fn(middleware_helpers::request_id_middleware));

    Ok(router)
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[tokio::test]
    async fn error_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-err"), async {
                ApiResponse::<()>::error("oops".into())
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-err"));
        assert!(!meta.timestamp.is_empty());
    }

    #[test]
    fn cors_requires_origins_outside_development() {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            8080,
            "production".into(),
        );
        assert!(cors_layer(&cfg).is_err());

        cfg.cors_allowed_origins = Some("https://club.example, ".into());
        assert!(cors_layer(&cfg).is_ok());

        cfg.cors_allowed_origins = None;
        cfg.environment = "development".into();
        assert!(cors_layer(&cfg).is_ok());
    }
}
