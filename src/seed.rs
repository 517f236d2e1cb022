//! Demo data for local development.
//!
//! Creates four table types with weekday, weekend and New Year's Eve pricing,
//! a bottle menu and sixty days of inventory. Runs through the regular
//! services so the same validation applies. Does nothing when table types
//! already exist.

use chrono::{Datelike, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{EntityTrait, PaginatorTrait};
use std::sync::Arc;
use tracing::info;

use crate::{
    config::AppConfig,
    db::DbPool,
    entities::table_type::Entity as TableTypeEntity,
    errors::ServiceError,
    services::{
        bottles::{BottleService, CreateBottleRequest},
        calendar,
        inventory::{InventoryService, UpsertInventoryRequest},
        pricing::{CreatePricingRuleRequest, PricingService},
        table_types::{CreateTableTypeRequest, TableTypeService},
    },
};

const INVENTORY_DAYS: i64 = 30;

struct DemoTable {
    name: &'static str,
    slug: &'static str,
    short_description: &'static str,
    description: &'static str,
    capacity: i32,
    section: &'static str,
    amenities: &'static [&'static str],
    base_minimum_spend: Decimal,
    nightly_count: i32,
}

const TABLES: &[DemoTable] = &[
    DemoTable {
        name: "Regular Table",
        slug: "regular-table",
        short_description: "Intimate seating for small groups",
        description: "Small-group seating on the main floor with bottle service.",
        capacity: 6,
        section: "Main Floor",
        amenities: &["Dedicated Server", "Premium Mixers"],
        base_minimum_spend: dec!(500),
        nightly_count: 8,
    },
    DemoTable {
        name: "VIP Booth",
        slug: "vip-booth",
        short_description: "Exclusive VIP experience with premium service",
        description: "Private booth overlooking the main floor with a cocktail server.",
        capacity: 10,
        section: "VIP Section",
        amenities: &["Private Server", "Champagne Presentation", "VIP Entry"],
        base_minimum_spend: dec!(1500),
        nightly_count: 4,
    },
    DemoTable {
        name: "Balcony Table",
        slug: "balcony-table",
        short_description: "Elevated seating with panoramic views",
        description: "Balcony seating with a view over the whole room.",
        capacity: 8,
        section: "Balcony Level",
        amenities: &["Dedicated Server", "Coat Check"],
        base_minimum_spend: dec!(1000),
        nightly_count: 8,
    },
    DemoTable {
        name: "Dance Floor Table",
        slug: "dance-floor-table",
        short_description: "High-energy seating by the dance floor",
        description: "Tables right next to the dance floor.",
        capacity: 12,
        section: "Dance Floor",
        amenities: &["Bottle Parade", "Sparklers", "DJ Shout-out"],
        base_minimum_spend: dec!(2000),
        nightly_count: 8,
    },
];

// (name, brand, category, price, sku)
const BOTTLES: &[(&str, &str, &str, Decimal, &str)] = &[
    ("Grey Goose", "Grey Goose", "VODKA", dec!(350), "GG-750"),
    ("Belvedere", "Belvedere", "VODKA", dec!(325), "BV-750"),
    ("Tito's", "Tito's", "VODKA", dec!(250), "TT-750"),
    ("Hennessy VS", "Hennessy", "COGNAC", dec!(400), "HV-750"),
    ("Jameson", "Jameson", "WHISKEY", dec!(280), "JM-750"),
    ("Don Julio 1942", "Don Julio", "TEQUILA", dec!(650), "DJ42-750"),
    ("Casamigos Blanco", "Casamigos", "TEQUILA", dec!(375), "CB-750"),
    ("Moet Imperial", "Moet & Chandon", "CHAMPAGNE", dec!(300), "MI-750"),
    ("Dom Perignon", "Dom Perignon", "CHAMPAGNE", dec!(850), "DP-750"),
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub table_types: usize,
    pub pricing_rules: usize,
    pub bottles: usize,
    pub inventory_rows: usize,
}

/// Seeds demo data unless the catalog already has table types.
pub async fn seed_demo_data(
    db_pool: Arc<DbPool>,
    config: &AppConfig,
) -> Result<Option<SeedSummary>, ServiceError> {
    let existing = TableTypeEntity::find()
        .count(&*db_pool)
        .await
        .map_err(ServiceError::db_error)?;
    if existing > 0 {
        info!(existing, "catalog already populated; skipping demo seed");
        return Ok(None);
    }

    let tables = TableTypeService::new(db_pool.clone());
    let pricing = PricingService::new(db_pool.clone());
    let inventory = InventoryService::new(db_pool.clone());
    let bottles = BottleService::new(db_pool);

    let today = calendar::venue_today(config.venue_tz(), Utc::now());
    let last_day = today + Duration::days(INVENTORY_DAYS - 1);
    let new_years_eve = format!("{}-12-31", today.year());

    let mut summary = SeedSummary::default();

    for (position, demo) in TABLES.iter().enumerate() {
        let table = tables
            .create(CreateTableTypeRequest {
                name: Some(demo.name.to_string()),
                slug: Some(demo.slug.to_string()),
                description: Some(demo.description.to_string()),
                short_description: Some(demo.short_description.to_string()),
                capacity: Some(demo.capacity),
                base_minimum_spend: Some(demo.base_minimum_spend),
                amenities: Some(demo.amenities.iter().map(|a| a.to_string()).collect()),
                section: Some(demo.section.to_string()),
                sort_order: Some(position as i32 + 1),
                active: Some(true),
                ..Default::default()
            })
            .await?;
        summary.table_types += 1;

        let rules = [
            CreatePricingRuleRequest {
                table_type_id: Some(table.id),
                day_type: Some("WEEKDAY".to_string()),
                minimum_spend: Some(demo.base_minimum_spend),
                deposit_rate: Some(dec!(0.15)),
                priority: Some(0),
                ..Default::default()
            },
            CreatePricingRuleRequest {
                table_type_id: Some(table.id),
                day_type: Some("WEEKEND".to_string()),
                minimum_spend: Some(demo.base_minimum_spend * dec!(1.5)),
                deposit_rate: Some(dec!(0.15)),
                priority: Some(0),
                ..Default::default()
            },
            CreatePricingRuleRequest {
                table_type_id: Some(table.id),
                day_type: Some("SPECIAL_EVENT".to_string()),
                minimum_spend: Some(demo.base_minimum_spend * dec!(2)),
                deposit_rate: Some(dec!(0.25)),
                priority: Some(10),
                event_name: Some("New Year's Eve Celebration".to_string()),
                start_date: Some(new_years_eve.clone()),
                end_date: Some(new_years_eve.clone()),
                active: Some(true),
            },
        ];
        for rule in rules {
            pricing.create_rule(rule).await?;
            summary.pricing_rules += 1;
        }

        let result = inventory
            .upsert_range(UpsertInventoryRequest {
                table_type_id: Some(table.id),
                start_date: Some(today.to_string()),
                end_date: Some(last_day.to_string()),
                total_count: Some(demo.nightly_count),
                blocked: Some(false),
            })
            .await?;
        summary.inventory_rows += result.records.len();
    }

    for (position, (name, brand, category, price, sku)) in BOTTLES.iter().enumerate() {
        bottles
            .create(CreateBottleRequest {
                name: Some(name.to_string()),
                brand: Some(brand.to_string()),
                category: Some(category.to_string()),
                size: Some("750ml".to_string()),
                price: Some(*price),
                sku: Some(sku.to_string()),
                on_hand: Some(24),
                par: Some(12),
                sort_order: Some(position as i32 + 1),
                ..Default::default()
            })
            .await?;
        summary.bottles += 1;
    }

    info!(
        table_types = summary.table_types,
        pricing_rules = summary.pricing_rules,
        bottles = summary.bottles,
        inventory_rows = summary.inventory_rows,
        "demo data seeded"
    );
    Ok(Some(summary))
}
