pub mod admin;
pub mod agent;
pub mod availability;
pub mod bookings;
pub mod catalog;
pub mod common;
pub mod drafts;

use crate::{
    config::AppConfig,
    db::DbPool,
    services::{
        assistant::AssistantService,
        availability::AvailabilityService,
        bookings::BookingService,
        bottles::BottleService,
        drafts::{DraftService, DraftStore},
        inventory::InventoryService,
        pricing::PricingService,
        table_types::TableTypeService,
        tonight::TonightService,
    },
};
use std::sync::Arc;
use std::time::Duration;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub bookings: Arc<BookingService>,
    pub availability: Arc<AvailabilityService>,
    pub tables: Arc<TableTypeService>,
    pub bottles: Arc<BottleService>,
    pub pricing: Arc<PricingService>,
    pub inventory: Arc<InventoryService>,
    pub tonight: Arc<TonightService>,
    pub assistant: Arc<AssistantService>,
    pub drafts: Arc<DraftService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, config: &AppConfig) -> Self {
        let bookings = Arc::new(BookingService::new(db_pool.clone()));
        let tables = Arc::new(TableTypeService::new(db_pool.clone()));
        let bottles = Arc::new(BottleService::new(db_pool.clone()));
        let pricing = Arc::new(PricingService::new(db_pool.clone()));
        let tonight = Arc::new(TonightService::new(
            db_pool.clone(),
            bookings.clone(),
            config.venue_tz(),
        ));
        let assistant = Arc::new(AssistantService::new(
            db_pool.clone(),
            tables.clone(),
            pricing.clone(),
            bookings.clone(),
            tonight.clone(),
        ));
        let drafts = Arc::new(DraftService::new(
            Arc::new(DraftStore::new(Duration::from_secs(config.draft_ttl_secs))),
            tables.clone(),
            bottles.clone(),
            bookings.clone(),
        ));

        Self {
            availability: Arc::new(AvailabilityService::new(db_pool.clone())),
            inventory: Arc::new(InventoryService::new(db_pool)),
            bookings,
            tables,
            bottles,
            pricing,
            tonight,
            assistant,
            drafts,
        }
    }
}
