#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use table_booking_api::{
    build_router,
    config::AppConfig,
    db,
    entities::{bottle, table_type},
    services::{
        bottles::CreateBottleRequest, inventory::UpsertInventoryRequest,
        table_types::CreateTableTypeRequest,
    },
    AppState,
};
use tempfile::TempDir;
use tower::ServiceExt;

/// Application under test backed by a throwaway SQLite file.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Builds the app after letting the caller adjust the test config.
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let db_path = dir.path().join("table_booking_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1".to_string(),
            18_080,
            "development".to_string(),
        );
        cfg.db_max_connections = 4;
        cfg.db_min_connections = 1;
        cfg.venue_timezone = "UTC".to_string();
        adjust(&mut cfg);

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = build_router(state.clone()).expect("router should build");

        Self {
            router,
            state,
            _dir: dir,
        }
    }

    /// Send a request with optional JSON body and extra headers.
    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request_with_headers(method, uri, body, &[]).await
    }

    /// Request and decode the JSON body in one go.
    pub async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.request(method, uri, body).await;
        read_json(response).await
    }

    pub async fn create_table(&self, slug: &str, minimum_spend: Decimal) -> table_type::Model {
        self.state
            .services
            .tables
            .create(CreateTableTypeRequest {
                name: Some(slug.replace('-', " ")),
                slug: Some(slug.to_string()),
                description: Some("Test table".to_string()),
                short_description: Some("Test".to_string()),
                capacity: Some(8),
                base_minimum_spend: Some(minimum_spend),
                section: Some("Main Floor".to_string()),
                ..Default::default()
            })
            .await
            .expect("seed table type")
    }

    pub async fn create_bottle(
        &self,
        name: &str,
        brand: &str,
        sku: &str,
        price: Decimal,
    ) -> bottle::Model {
        self.state
            .services
            .bottles
            .create(CreateBottleRequest {
                name: Some(name.to_string()),
                brand: Some(brand.to_string()),
                category: Some("VODKA".to_string()),
                size: Some("750ml".to_string()),
                price: Some(price),
                sku: Some(sku.to_string()),
                on_hand: Some(10),
                par: Some(6),
                ..Default::default()
            })
            .await
            .expect("seed bottle")
    }

    /// Sets `count` tables for every day from `start` to `end` inclusive.
    pub async fn stock(&self, table_type_id: uuid::Uuid, start: &str, end: &str, count: i32) {
        self.state
            .services
            .inventory
            .upsert_range(UpsertInventoryRequest {
                table_type_id: Some(table_type_id),
                start_date: Some(start.to_string()),
                end_date: Some(end.to_string()),
                total_count: Some(count),
                blocked: Some(false),
            })
            .await
            .expect("seed inventory");
    }
}

pub async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body should be JSON")
    };
    (status, value)
}

pub fn booking_body(table_type_id: uuid::Uuid, date: &str, email: &str) -> Value {
    serde_json::json!({
        "tableTypeId": table_type_id,
        "date": date,
        "customerName": "Dana Ortiz",
        "customerEmail": email,
        "customerPhone": "555-0100",
        "partySize": 6,
        "minimumSpend": "1500.00"
    })
}
