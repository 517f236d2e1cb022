use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::middleware_helpers::MANAGER_KEY_HEADER;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Table Booking API",
        version = "1.0.0",
        description = r#"
# Table Booking API

Reservation backend for a nightlife venue: VIP table types, bottle service,
per-date table inventory and date-aware minimum-spend pricing.

## Surfaces

- **Public**: availability, catalog, price resolution and bookings
- **Booking drafts**: server-held multi-step booking state with checkout
- **Admin**: table, bottle, pricing and inventory management plus the door report
- **Agent**: manager tools guarded by the `x-manager-key` header

## Idempotency

`POST /bookings` and draft checkout accept an `Idempotency-Key` header. A
repeated key within the replay window returns the first response with
`Idempotent-Replayed: true`.

## Error Handling

Errors share one JSON shape:

```json
{
  "error": "Bad Request",
  "message": "Table not available for selected date",
  "timestamp": "2025-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "bookings", description = "Create and look up reservations"),
        (name = "catalog", description = "Availability, tables, bottles and price resolution"),
        (name = "booking-drafts", description = "Multi-step booking drafts"),
        (name = "admin", description = "Back-office management"),
        (name = "agent", description = "Manager assistant tools")
    ),
    paths(
        // Public
        crate::handlers::bookings::create_booking,
        crate::handlers::bookings::list_bookings,
        crate::handlers::bookings::get_booking,
        crate::handlers::bookings::booking_email,
        crate::handlers::bookings::update_booking_status,
        crate::handlers::bookings::delete_booking,
        crate::handlers::availability::get_availability,
        crate::handlers::catalog::list_tables,
        crate::handlers::catalog::get_table,
        crate::handlers::catalog::list_bottles,
        crate::handlers::catalog::resolve_price,

        // Drafts
        crate::handlers::drafts::create_draft,
        crate::handlers::drafts::get_draft,
        crate::handlers::drafts::update_draft,
        crate::handlers::drafts::checkout_draft,

        // Admin
        crate::handlers::admin::bookings::list_bookings,
        crate::handlers::admin::bookings::update_booking_status,
        crate::handlers::admin::tables::list_tables,
        crate::handlers::admin::tables::create_table,
        crate::handlers::admin::tables::get_table,
        crate::handlers::admin::tables::update_table,
        crate::handlers::admin::tables::delete_table,
        crate::handlers::admin::bottles::list_bottles,
        crate::handlers::admin::bottles::create_bottle,
        crate::handlers::admin::bottles::get_bottle,
        crate::handlers::admin::bottles::update_bottle,
        crate::handlers::admin::bottles::delete_bottle,
        crate::handlers::admin::pricing::list_rules,
        crate::handlers::admin::pricing::create_rule,
        crate::handlers::admin::pricing::get_rule,
        crate::handlers::admin::pricing::update_rule,
        crate::handlers::admin::pricing::delete_rule,
        crate::handlers::admin::inventory::list_inventory,
        crate::handlers::admin::inventory::upsert_inventory,
        crate::handlers::admin::tonight::tonights_bookings,

        // Agent
        crate::handlers::agent::get_inventory,
        crate::handlers::agent::adjust_inventory,
        crate::handlers::agent::set_minimum_spend,
        crate::handlers::agent::bookings_tonight,
        crate::handlers::agent::find_reservation,
        crate::handlers::agent::create_purchase_order,
    ),
    components(
        schemas(
            // Entities
            crate::entities::table_type::Model,
            crate::entities::bottle::Model,
            crate::entities::table_inventory::Model,
            crate::entities::pricing_rule::Model,
            crate::entities::pricing_rule::DayType,
            crate::entities::reservation::Model,
            crate::entities::reservation::ReservationStatus,
            crate::entities::reservation_bottle::Model,

            // Bookings
            crate::services::bookings::CreateBookingRequest,
            crate::services::bookings::BookingBottleInput,
            crate::services::bookings::CreatedBooking,
            crate::services::bookings::BookingDetail,
            crate::services::bookings::BookingLineView,
            crate::services::bookings::AdminBookingList,
            crate::services::bookings::StatusCount,
            crate::services::bookings::RevenueTotals,
            crate::services::notifications::BookingEmail,
            crate::handlers::bookings::StatusUpdateRequest,
            crate::handlers::bookings::DeletedResponse,
            crate::handlers::admin::bookings::AdminStatusUpdate,

            // Catalog
            crate::services::TableTypeSummary,
            crate::services::availability::DayAvailability,
            crate::services::pricing::PricingResolution,
            crate::services::pricing::PricingRuleView,
            crate::services::pricing::CreatePricingRuleRequest,
            crate::services::pricing::UpdatePricingRuleRequest,
            crate::services::table_types::CreateTableTypeRequest,
            crate::services::table_types::UpdateTableTypeRequest,
            crate::services::bottles::CreateBottleRequest,
            crate::services::inventory::UpsertInventoryRequest,
            crate::services::inventory::InventoryView,
            crate::services::inventory::InventoryUpsertResult,
            crate::services::tonight::TonightReport,
            crate::services::tonight::TonightStats,
            crate::handlers::admin::DeleteMessage,

            // Drafts
            crate::services::drafts::BookingDraft,
            crate::services::drafts::DraftTable,
            crate::services::drafts::DraftBottle,
            crate::services::drafts::DraftCustomer,
            crate::services::drafts::DraftPatch,
            crate::services::drafts::DraftBottleInput,
            crate::services::drafts::DraftQuantityInput,
            crate::services::drafts::DraftView,

            // Agent
            crate::services::assistant::Disambiguation,
            crate::services::assistant::BottleCandidate,
            crate::services::assistant::GetInventoryInput,
            crate::services::assistant::StockList,
            crate::services::assistant::StockItem,
            crate::services::assistant::AdjustInventoryInput,
            crate::services::assistant::AdjustResult,
            crate::services::assistant::AdjustedBottle,
            crate::services::assistant::SetMinimumSpendInput,
            crate::services::assistant::SetMinimumSpendResult,
            crate::services::assistant::CreatedOverride,
            crate::services::assistant::BookingsTonightInput,
            crate::services::assistant::DoorList,
            crate::services::assistant::DoorListEntry,
            crate::services::assistant::FindReservationInput,
            crate::services::assistant::FoundReservations,
            crate::services::assistant::FoundReservation,
            crate::services::assistant::FoundBottle,
            crate::services::assistant::TableTypeBrief,
            crate::services::assistant::PurchaseOrderInput,
            crate::services::assistant::PurchaseOrderItemInput,
            crate::services::assistant::PurchaseOrderResult,

            // Error types
            crate::errors::ErrorResponse
        )
    ),
    modifiers(&ManagerKeyAddon)
)]
pub struct ApiDocV1;

struct ManagerKeyAddon;

impl Modify for ManagerKeyAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "manager_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(MANAGER_KEY_HEADER))),
        );
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
