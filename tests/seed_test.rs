mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use table_booking_api::seed::{seed_demo_data, SeedSummary};

#[tokio::test]
async fn demo_seed_fills_an_empty_catalog_once() {
    let app = TestApp::new().await;

    let summary = seed_demo_data(app.state.db.clone(), &app.state.config)
        .await
        .expect("seed should succeed");
    assert_eq!(
        summary,
        Some(SeedSummary {
            table_types: 4,
            pricing_rules: 12,
            bottles: 9,
            inventory_rows: 120,
        })
    );

    let again = seed_demo_data(app.state.db.clone(), &app.state.config)
        .await
        .expect("second seed should succeed");
    assert_eq!(again, None);

    let (status, tables) = app.call(Method::GET, "/api/v1/tables", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tables.as_array().map(Vec::len), Some(4));

    let (_, bottles) = app.call(Method::GET, "/api/v1/bottles", None).await;
    assert_eq!(bottles.as_array().map(Vec::len), Some(9));
}
