mod common;

use axum::http::{Method, StatusCode};
use common::{booking_body, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn availability_subtracts_active_bookings_and_hides_blocked_days() {
    let app = TestApp::new().await;
    let table = app.create_table("vip-booth", dec!(1500)).await;
    // Thursday through Saturday
    app.stock(table.id, "2031-06-05", "2031-06-07", 3).await;

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/admin/inventory",
            Some(json!({
                "tableTypeId": table.id,
                "startDate": "2031-06-07",
                "endDate": "2031-06-07",
                "totalCount": 3,
                "blocked": true
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/bookings",
            Some(booking_body(table.id, "2031-06-06T22:00:00Z", "dana@example.com")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, days) = app
        .call(
            Method::GET,
            &format!(
                "/api/v1/availability?tableId={}&startDate=2031-06-05&endDate=2031-06-07",
                table.id
            ),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let days = days.as_array().expect("array of days");
    assert_eq!(days.len(), 2, "blocked Saturday is not listed");

    assert_eq!(days[0]["date"], "2031-06-05");
    assert_eq!(days[0]["available"], 3);
    assert_eq!(days[0]["total"], 3);
    assert_eq!(days[0]["priceMultiplier"], 1.0);
    assert_eq!(days[0]["isSpecialEvent"], false);

    // the row itself already dropped to 2; the active booking is subtracted again
    assert_eq!(days[1]["date"], "2031-06-06");
    assert_eq!(days[1]["available"], 1);
    assert_eq!(days[1]["priceMultiplier"], 1.5);
}

#[tokio::test]
async fn cancelled_bookings_do_not_count_against_availability() {
    let app = TestApp::new().await;
    let table = app.create_table("balcony-table", dec!(1000)).await;
    app.stock(table.id, "2031-06-06", "2031-06-06", 2).await;

    let (_, created) = app
        .call(
            Method::POST,
            "/api/v1/bookings",
            Some(booking_body(table.id, "2031-06-06T22:00:00Z", "dana@example.com")),
        )
        .await;
    let id = created["reservation"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .call(
            Method::PATCH,
            &format!("/api/v1/bookings/{}", id),
            Some(json!({ "status": "CANCELLED" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, days) = app
        .call(
            Method::GET,
            &format!(
                "/api/v1/availability?tableId={}&startDate=2031-06-06&endDate=2031-06-06",
                table.id
            ),
            None,
        )
        .await;
    assert_eq!(days[0]["available"], 1);
    assert_eq!(days[0]["total"], 2);
}

#[tokio::test]
async fn special_event_days_are_flagged() {
    let app = TestApp::new().await;
    let table = app.create_table("dance-floor-table", dec!(2000)).await;
    app.stock(table.id, "2031-12-30", "2031-12-31", 2).await;

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/admin/pricing",
            Some(json!({
                "tableTypeId": table.id,
                "dayType": "SPECIAL_EVENT",
                "minimumSpend": "4000",
                "priority": 10,
                "eventName": "New Year's Eve",
                "startDate": "2031-12-31",
                "endDate": "2031-12-31"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, days) = app
        .call(
            Method::GET,
            &format!(
                "/api/v1/availability?tableId={}&startDate=2031-12-30&endDate=2031-12-31",
                table.id
            ),
            None,
        )
        .await;
    assert_eq!(days[0]["isSpecialEvent"], false);
    assert_eq!(days[1]["isSpecialEvent"], true);
}

#[tokio::test]
async fn availability_requires_all_parameters() {
    let app = TestApp::new().await;
    let table = app.create_table("regular-table", dec!(500)).await;

    let (status, err) = app
        .call(
            Method::GET,
            &format!("/api/v1/availability?tableId={}&startDate=2031-06-05", table.id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Missing required parameters");
    assert_eq!(err["error"], "Bad Request");

    let (status, days) = app
        .call(
            Method::GET,
            &format!(
                "/api/v1/availability?tableId={}&startDate=2031-06-05&endDate=2031-06-07",
                table.id
            ),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(days, json!([]));
}
