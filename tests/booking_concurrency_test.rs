mod common;

use common::TestApp;
use rust_decimal_macros::dec;
use table_booking_api::{errors::ServiceError, services::bookings::CreateBookingRequest};

const CONTENDERS: usize = 20;
const POOL_SIZE: u32 = 8;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn only_one_of_many_concurrent_bookings_gets_the_last_table() {
    // a real pool, so the contenders race on separate SQLite connections
    let app = TestApp::with_config(|cfg| {
        cfg.db_max_connections = POOL_SIZE;
        cfg.db_min_connections = POOL_SIZE;
    })
    .await;
    let table = app.create_table("vip-booth", dec!(1500)).await;
    app.stock(table.id, "2031-06-06", "2031-06-06", 1).await;

    let bookings = app.state.services.bookings.clone();
    let mut tasks = Vec::with_capacity(CONTENDERS);
    for n in 0..CONTENDERS {
        let bookings = bookings.clone();
        let request = CreateBookingRequest {
            table_type_id: Some(table.id.to_string()),
            date: Some("2031-06-06T22:00:00Z".to_string()),
            customer_name: Some(format!("Guest {}", n)),
            customer_email: Some(format!("guest{}@example.com", n)),
            customer_phone: Some("555-0100".to_string()),
            party_size: Some(4),
            ..Default::default()
        };
        tasks.push(tokio::spawn(async move { bookings.create_booking(request).await }));
    }

    let mut won = 0;
    let mut unavailable = 0;
    for task in tasks {
        match task.await.expect("task panicked") {
            Ok(_) => won += 1,
            Err(ServiceError::TableUnavailable) => unavailable += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(won, 1, "exactly one booking should succeed");
    assert_eq!(unavailable, CONTENDERS - 1);

    let rows = app
        .state
        .services
        .inventory
        .list(table_booking_api::services::inventory::InventoryQuery {
            table_type_id: Some(table.id.to_string()),
            date: Some("2031-06-06".to_string()),
        })
        .await
        .expect("inventory list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].row.available, 0);
}
