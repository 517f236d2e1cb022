mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

async fn add_rule(app: &TestApp, rule: Value) -> Value {
    let (status, body) = app
        .call(Method::POST, "/api/v1/admin/pricing", Some(rule))
        .await;
    assert_eq!(status, StatusCode::CREATED, "rule rejected: {body}");
    body["data"].clone()
}

async fn resolve(app: &TestApp, table_id: uuid::Uuid, date: &str) -> (StatusCode, Value) {
    app.call(
        Method::GET,
        &format!("/api/v1/pricing/resolve?tableTypeId={}&date={}", table_id, date),
        None,
    )
    .await
}

#[tokio::test]
async fn day_type_rules_price_weekdays_and_weekends() {
    let app = TestApp::new().await;
    let table = app.create_table("vip-booth", dec!(1000)).await;
    add_rule(
        &app,
        json!({ "tableTypeId": table.id, "dayType": "WEEKDAY", "minimumSpend": "1000", "depositRate": "0.1" }),
    )
    .await;
    add_rule(
        &app,
        json!({ "tableTypeId": table.id, "dayType": "WEEKEND", "minimumSpend": 1500 }),
    )
    .await;

    let (status, thursday) = resolve(&app, table.id, "2031-06-05").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(thursday["minimumSpend"], "1000.00");
    assert_eq!(thursday["depositRate"], "0.1");
    assert_eq!(thursday["dayType"], "WEEKDAY");

    let (status, friday) = resolve(&app, table.id, "2031-06-06T22:00:00Z").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(friday["date"], "2031-06-06");
    assert_eq!(friday["minimumSpend"], "1500.00");
    assert_eq!(friday["depositRate"], "0.15");
    assert_eq!(friday["dayType"], "WEEKEND");
    assert!(friday["ruleId"].is_string());
}

#[tokio::test]
async fn special_event_outranks_the_day_rule() {
    let app = TestApp::new().await;
    let table = app.create_table("dance-floor-table", dec!(2000)).await;
    add_rule(
        &app,
        json!({ "tableTypeId": table.id, "dayType": "WEEKDAY", "minimumSpend": "2000" }),
    )
    .await;
    let event = add_rule(
        &app,
        json!({
            "tableTypeId": table.id,
            "dayType": "SPECIAL_EVENT",
            "minimumSpend": "4000",
            "depositRate": "0.25",
            "priority": 10,
            "eventName": "New Year's Eve",
            "startDate": "2031-12-31",
            "endDate": "2031-12-31"
        }),
    )
    .await;

    let (status, nye) = resolve(&app, table.id, "2031-12-31").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(nye["minimumSpend"], "4000.00");
    assert_eq!(nye["depositRate"], "0.25");
    assert_eq!(nye["dayType"], "SPECIAL_EVENT");
    assert_eq!(nye["eventName"], "New Year's Eve");
    assert_eq!(nye["ruleId"], event["id"]);

    // the day before is an ordinary Tuesday
    let (_, tuesday) = resolve(&app, table.id, "2031-12-30").await;
    assert_eq!(tuesday["minimumSpend"], "2000.00");
}

#[tokio::test]
async fn equal_priority_rules_are_a_conflict() {
    let app = TestApp::new().await;
    let table = app.create_table("balcony-table", dec!(1000)).await;
    for name in ["Launch Party", "Launch Party Late"] {
        add_rule(
            &app,
            json!({
                "tableTypeId": table.id,
                "dayType": "SPECIAL_EVENT",
                "minimumSpend": "3000",
                "priority": 5,
                "eventName": name,
                "startDate": "2031-06-10",
                "endDate": "2031-06-10"
            }),
        )
        .await;
    }

    let (status, err) = resolve(&app, table.id, "2031-06-10").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["error"], "Conflict");
    assert!(err["message"]
        .as_str()
        .unwrap()
        .starts_with("Pricing configuration error"));
    assert!(err["details"].as_str().unwrap().contains("priority 5"));
}

#[tokio::test]
async fn without_rules_the_table_base_applies() {
    let app = TestApp::new().await;
    let table = app.create_table("regular-table", dec!(500)).await;

    let (status, body) = resolve(&app, table.id, "2031-06-07").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["minimumSpend"], "500.00");
    assert_eq!(body["depositRate"], "0.15");
    assert_eq!(body["dayType"], "WEEKEND");
    assert!(body["ruleId"].is_null());
}

#[tokio::test]
async fn inactive_rules_are_ignored() {
    let app = TestApp::new().await;
    let table = app.create_table("vip-booth", dec!(1200)).await;
    add_rule(
        &app,
        json!({ "tableTypeId": table.id, "dayType": "WEEKDAY", "minimumSpend": "9999", "active": false }),
    )
    .await;

    let (_, body) = resolve(&app, table.id, "2031-06-09").await;
    assert_eq!(body["minimumSpend"], "1200.00");
}

#[tokio::test]
async fn resolve_rejects_missing_and_unknown_inputs() {
    let app = TestApp::new().await;

    let (status, err) = app
        .call(Method::GET, "/api/v1/pricing/resolve?date=2031-06-06", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Missing required parameters");

    let (status, err) = resolve(&app, uuid::Uuid::new_v4(), "2031-06-06").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["message"], "Table not found");

    let table = app.create_table("vip-booth", dec!(1200)).await;
    let (status, _) = resolve(&app, table.id, "June-6th").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn special_event_rules_need_a_window_and_name() {
    let app = TestApp::new().await;
    let table = app.create_table("vip-booth", dec!(1200)).await;

    let (status, err) = app
        .call(
            Method::POST,
            "/api/v1/admin/pricing",
            Some(json!({
                "tableTypeId": table.id,
                "dayType": "SPECIAL_EVENT",
                "minimumSpend": "3000",
                "eventName": "Halloween"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Special events require startDate and endDate");

    let (status, err) = app
        .call(
            Method::POST,
            "/api/v1/admin/pricing",
            Some(json!({
                "tableTypeId": table.id,
                "dayType": "SPECIAL_EVENT",
                "minimumSpend": "3000",
                "eventName": "Halloween",
                "startDate": "2031-11-01",
                "endDate": "2031-10-31"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Start date must be before or equal to end date");
}
