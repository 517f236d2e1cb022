mod common;

use axum::http::{Method, StatusCode};
use common::{booking_body, read_json, TestApp};
use rust_decimal_macros::dec;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::{json, Value};
use table_booking_api::{
    entities::{
        notification::{self, NotificationType},
        reservation, reservation_bottle,
    },
    services::inventory::UpsertInventoryRequest,
};

const FRIDAY: &str = "2031-06-06";

async fn available_on(app: &TestApp, table_id: uuid::Uuid, day: &str) -> i64 {
    let (status, body) = app
        .call(
            Method::GET,
            &format!("/api/v1/admin/inventory?tableTypeId={}&date={}", table_id, day),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    body["data"][0]["available"].as_i64().expect("inventory row")
}

/// (reservations, bottle lines, notifications) currently stored.
async fn stored_rows(app: &TestApp) -> (u64, u64, u64) {
    let db = &*app.state.db;
    (
        reservation::Entity::find().count(db).await.unwrap(),
        reservation_bottle::Entity::find().count(db).await.unwrap(),
        notification::Entity::find().count(db).await.unwrap(),
    )
}

#[tokio::test]
async fn booking_takes_one_slot_and_prices_bottles_server_side() {
    let app = TestApp::new().await;
    let table = app.create_table("vip-booth", dec!(1500)).await;
    let bottle = app.create_bottle("Grey Goose", "Grey Goose", "GG-750", dec!(450)).await;
    app.stock(table.id, FRIDAY, FRIDAY, 2).await;

    let mut body = booking_body(table.id, "2031-06-06T22:00:00Z", "dana@example.com");
    body["bottles"] = json!([{ "bottleId": bottle.id, "quantity": 2, "pricePerUnit": 450 }]);
    body["bottleSubtotal"] = json!("1.00");

    let (status, created) = app.call(Method::POST, "/api/v1/bookings", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["success"], true);

    let code = created["confirmationCode"].as_str().unwrap();
    assert_eq!(code.len(), 8);
    let reservation = &created["reservation"];
    assert_eq!(reservation["confirmationCode"], code);
    assert_eq!(reservation["status"], "PENDING");
    assert_eq!(reservation["bottleSubtotal"], "900.00");
    assert_eq!(reservation["depositAmount"], "135.00");
    assert_eq!(reservation["tableType"]["slug"], "vip-booth");
    assert_eq!(reservation["bottles"][0]["quantity"], 2);
    assert_eq!(reservation["bottles"][0]["totalPrice"], "900.00");
    assert_eq!(reservation["bottles"][0]["bottle"]["sku"], "GG-750");

    assert_eq!(available_on(&app, table.id, FRIDAY).await, 1);
}

#[tokio::test]
async fn booking_is_found_by_code_or_id_and_by_email() {
    let app = TestApp::new().await;
    let table = app.create_table("balcony-table", dec!(1000)).await;
    app.stock(table.id, FRIDAY, FRIDAY, 3).await;

    let (_, created) = app
        .call(
            Method::POST,
            "/api/v1/bookings",
            Some(booking_body(table.id, "2031-06-06T23:00:00Z", "sam@example.com")),
        )
        .await;
    let code = created["confirmationCode"].as_str().unwrap().to_string();
    let id = created["reservation"]["id"].as_str().unwrap().to_string();

    let (status, by_code) = app
        .call(Method::GET, &format!("/api/v1/bookings/{}", code.to_lowercase()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_code["id"], id.as_str());

    let (status, by_id) = app
        .call(Method::GET, &format!("/api/v1/bookings/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_id["confirmationCode"], code.as_str());

    let (status, list) = app
        .call(Method::GET, "/api/v1/bookings?email=sam@example.com", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(Vec::len), Some(1));

    let (status, none) = app
        .call(Method::GET, "/api/v1/bookings?email=nobody@example.com", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(none, json!([]));

    let (status, email) = app
        .call(Method::GET, &format!("/api/v1/bookings/{}/email", code), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(email["subject"].as_str().unwrap().contains(&code));
    assert!(email["text"].as_str().unwrap().contains("Dana Ortiz"));

    let (status, missing) = app
        .call(Method::GET, "/api/v1/bookings/ZZZZZZZZ", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["message"], "Booking not found for: ZZZZZZZZ");
}

#[tokio::test]
async fn intake_rejects_missing_fields_and_missing_inventory() {
    let app = TestApp::new().await;
    let table = app.create_table("regular-table", dec!(500)).await;

    let (status, err) = app
        .call(
            Method::POST,
            "/api/v1/bookings",
            Some(json!({ "tableTypeId": table.id, "date": "2031-06-06T22:00:00Z" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Missing required fields");

    let (status, err) = app
        .call(
            Method::POST,
            "/api/v1/bookings",
            Some(booking_body(table.id, "2031-06-06T22:00:00Z", "dana@example.com")),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Table not available for selected date");

    let (status, err) = app
        .call(
            Method::POST,
            "/api/v1/bookings",
            Some(booking_body(table.id, "not-a-date", "dana@example.com")),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Invalid date: not-a-date");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::new().await;
    let response = app
        .request_with_headers(
            Method::POST,
            "/api/v1/bookings",
            None,
            &[("content-type", "application/json")],
        )
        .await;
    let (status, err) = read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["message"].as_str().unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn last_slot_goes_to_the_first_booking() {
    let app = TestApp::new().await;
    let table = app.create_table("dance-floor-table", dec!(2000)).await;
    app.stock(table.id, FRIDAY, FRIDAY, 1).await;

    let (first, _) = app
        .call(
            Method::POST,
            "/api/v1/bookings",
            Some(booking_body(table.id, "2031-06-06T22:00:00Z", "a@example.com")),
        )
        .await;
    let (second, err) = app
        .call(
            Method::POST,
            "/api/v1/bookings",
            Some(booking_body(table.id, "2031-06-06T23:30:00Z", "b@example.com")),
        )
        .await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Table not available for selected date");
    assert_eq!(available_on(&app, table.id, FRIDAY).await, 0);
}

#[tokio::test]
async fn status_changes_and_deletes_require_database_ids() {
    let app = TestApp::new().await;
    let table = app.create_table("vip-booth", dec!(1500)).await;
    app.stock(table.id, FRIDAY, FRIDAY, 2).await;

    let (_, created) = app
        .call(
            Method::POST,
            "/api/v1/bookings",
            Some(booking_body(table.id, "2031-06-06T22:00:00Z", "dana@example.com")),
        )
        .await;
    let code = created["confirmationCode"].as_str().unwrap().to_string();
    let id = created["reservation"]["id"].as_str().unwrap().to_string();

    let (status, err) = app
        .call(
            Method::PATCH,
            &format!("/api/v1/bookings/{}", code),
            Some(json!({ "status": "CONFIRMED" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "PATCH requires database ID, not confirmation code");

    let (status, err) = app
        .call(
            Method::PATCH,
            &format!("/api/v1/bookings/{}", id),
            Some(json!({ "status": "SEATED" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Invalid status: SEATED");

    let (status, updated) = app
        .call(
            Method::PATCH,
            &format!("/api/v1/bookings/{}", id),
            Some(json!({ "status": "CONFIRMED" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "CONFIRMED");

    let (status, err) = app
        .call(Method::DELETE, &format!("/api/v1/bookings/{}", code), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "DELETE requires database ID, not confirmation code");

    let (status, deleted) = app
        .call(Method::DELETE, &format!("/api/v1/bookings/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({ "success": true }));

    let (status, _) = app
        .call(Method::GET, &format!("/api/v1/bookings/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // deleting does not hand the slot back
    assert_eq!(available_on(&app, table.id, FRIDAY).await, 1);
}

#[tokio::test]
async fn repeated_idempotency_key_replays_the_first_booking() {
    let app = TestApp::new().await;
    let table = app.create_table("vip-booth", dec!(1500)).await;
    app.stock(table.id, FRIDAY, FRIDAY, 3).await;
    let body = booking_body(table.id, "2031-06-06T22:00:00Z", "dana@example.com");

    let first = app
        .request_with_headers(
            Method::POST,
            "/api/v1/bookings",
            Some(body.clone()),
            &[("idempotency-key", "booking-123")],
        )
        .await;
    assert!(first.headers().get("idempotent-replayed").is_none());
    let (status, first_body) = read_json(first).await;
    assert_eq!(status, StatusCode::CREATED);

    let second = app
        .request_with_headers(
            Method::POST,
            "/api/v1/bookings",
            Some(body),
            &[("idempotency-key", "booking-123")],
        )
        .await;
    assert_eq!(
        second
            .headers()
            .get("idempotent-replayed")
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );
    let (status, second_body): (StatusCode, Value) = read_json(second).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second_body["confirmationCode"], first_body["confirmationCode"]);

    assert_eq!(available_on(&app, table.id, FRIDAY).await, 2);
}

#[tokio::test]
async fn blocked_day_refuses_bookings_and_stores_nothing() {
    let app = TestApp::new().await;
    let table = app.create_table("vip-booth", dec!(1500)).await;
    app.state
        .services
        .inventory
        .upsert_range(UpsertInventoryRequest {
            table_type_id: Some(table.id),
            start_date: Some(FRIDAY.to_string()),
            end_date: Some(FRIDAY.to_string()),
            total_count: Some(2),
            blocked: Some(true),
        })
        .await
        .expect("block the day");

    let (status, err) = app
        .call(
            Method::POST,
            "/api/v1/bookings",
            Some(booking_body(table.id, "2031-06-06T22:00:00Z", "dana@example.com")),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Table not available for selected date");
    assert_eq!(stored_rows(&app).await, (0, 0, 0));
    assert_eq!(available_on(&app, table.id, FRIDAY).await, 2);
}

#[tokio::test]
async fn failure_inside_the_transaction_rolls_everything_back() {
    let app = TestApp::new().await;
    let table = app.create_table("vip-booth", dec!(1500)).await;
    app.stock(table.id, FRIDAY, FRIDAY, 1).await;

    // the bottle line violates its foreign key after the slot was taken
    let mut body = booking_body(table.id, "2031-06-06T22:00:00Z", "dana@example.com");
    body["bottles"] = json!([{
        "bottleId": uuid::Uuid::new_v4(),
        "quantity": 1,
        "pricePerUnit": "450.00"
    }]);
    let (status, err) = app.call(Method::POST, "/api/v1/bookings", Some(body)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err["message"], "Failed to create booking");

    assert_eq!(stored_rows(&app).await, (0, 0, 0));
    assert_eq!(available_on(&app, table.id, FRIDAY).await, 1);
}

#[tokio::test]
async fn oversized_prices_are_refused() {
    let app = TestApp::new().await;
    let table = app.create_table("vip-booth", dec!(1500)).await;
    let bottle = app.create_bottle("Grey Goose", "Grey Goose", "GG-750", dec!(450)).await;
    app.stock(table.id, FRIDAY, FRIDAY, 1).await;

    let mut body = booking_body(table.id, "2031-06-06T22:00:00Z", "dana@example.com");
    body["bottles"] = json!([{
        "bottleId": bottle.id,
        "quantity": 2,
        "pricePerUnit": "79228162514264337593543950335"
    }]);
    let (status, err) = app.call(Method::POST, "/api/v1/bookings", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "pricePerUnit must not exceed 999999999999.99");

    let mut body = booking_body(table.id, "2031-06-06T22:00:00Z", "dana@example.com");
    body["bottles"] = json!([{
        "bottleId": bottle.id,
        "quantity": 3,
        "pricePerUnit": "500000000000"
    }]);
    let (status, err) = app.call(Method::POST, "/api/v1/bookings", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Bottle subtotal must not exceed 999999999999.99");

    assert_eq!(stored_rows(&app).await, (0, 0, 0));
    assert_eq!(available_on(&app, table.id, FRIDAY).await, 1);
}

#[tokio::test]
async fn booking_writes_one_confirmation_notice() {
    let app = TestApp::new().await;
    let table = app.create_table("vip-booth", dec!(1500)).await;
    let bottle = app.create_bottle("Grey Goose", "Grey Goose", "GG-750", dec!(450)).await;
    app.stock(table.id, FRIDAY, FRIDAY, 2).await;

    let mut body = booking_body(table.id, "2031-06-06T22:00:00Z", "dana@example.com");
    body["bottles"] = json!([{ "bottleId": bottle.id, "quantity": 1, "pricePerUnit": 450 }]);
    let (status, created) = app.call(Method::POST, "/api/v1/bookings", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    let code = created["confirmationCode"].as_str().unwrap();
    let id = created["reservation"]["id"].as_str().unwrap();

    assert_eq!(stored_rows(&app).await, (1, 1, 1));
    let notices = notification::Entity::find()
        .all(&*app.state.db)
        .await
        .unwrap();
    let notice = &notices[0];
    assert_eq!(notice.notification_type, NotificationType::Confirmation);
    assert_eq!(notice.recipient, "dana@example.com");
    assert_eq!(notice.subject, format!("Booking Confirmation - {}", code));
    assert_eq!(notice.reservation_id.to_string(), id);
}

#[tokio::test]
async fn booking_touches_only_its_own_inventory_row() {
    let app = TestApp::new().await;
    let booth = app.create_table("vip-booth", dec!(1500)).await;
    let balcony = app.create_table("balcony-table", dec!(1000)).await;
    app.stock(booth.id, FRIDAY, "2031-06-07", 2).await;
    app.stock(balcony.id, FRIDAY, FRIDAY, 2).await;

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/bookings",
            Some(booking_body(booth.id, "2031-06-06T22:00:00Z", "dana@example.com")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    assert_eq!(available_on(&app, booth.id, FRIDAY).await, 1);
    assert_eq!(available_on(&app, booth.id, "2031-06-07").await, 2);
    assert_eq!(available_on(&app, balcony.id, FRIDAY).await, 2);

    let (_, saturday) = app
        .call(
            Method::GET,
            &format!("/api/v1/admin/inventory?tableTypeId={}&date=2031-06-07", booth.id),
            None,
        )
        .await;
    assert_eq!(saturday["data"][0]["totalCount"], 2);
}
