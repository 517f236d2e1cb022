//! Manager tools: stock lookups and adjustments, minimum-spend overrides,
//! the door list and purchase-order drafts.

use crate::{
    db::DbPool,
    entities::{
        bottle::{self, Entity as BottleEntity},
        reservation::{self, Entity as ReservationEntity},
        setting::{self, Entity as SettingEntity},
        ReservationStatus,
    },
    errors::ServiceError,
    services::{
        bookings::BookingService,
        calendar, like_pattern, non_blank,
        pricing::{CreatePricingRuleRequest, PricingService, DEFAULT_DEPOSIT_RATE},
        table_types::TableTypeService,
        tonight::TonightService,
        TableTypeSummary,
    },
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub const PURCHASE_ORDER_SETTING_KEY: &str = "lastPurchaseOrder";
const DEFAULT_INVENTORY_LIMIT: u64 = 100;
const MAX_INVENTORY_LIMIT: u64 = 500;
const FUZZY_MATCH_LIMIT: u64 = 5;
const FIND_RESERVATION_LIMIT: u64 = 100;
/// Priority given to overrides so they beat the standing weekday/weekend rules.
const OVERRIDE_PRIORITY: i32 = 10;
const DEFAULT_OVERRIDE_NAME: &str = "Minimum spend override";

/// Result of a tool that may need the caller to pick between bottles.
#[derive(Debug, Clone)]
pub enum ToolOutcome<T> {
    Done(T),
    Ambiguous(Disambiguation),
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BottleCandidate {
    pub id: Uuid,
    pub sku: Option<String>,
    pub brand: String,
    pub name: String,
    pub size: String,
}

impl From<&bottle::Model> for BottleCandidate {
    fn from(b: &bottle::Model) -> Self {
        Self {
            id: b.id,
            sku: b.sku.clone(),
            brand: b.brand.clone(),
            name: b.name.clone(),
            size: b.size.clone(),
        }
    }
}

/// 409 body when a name matches several bottles.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Disambiguation {
    pub disambiguation_required: bool,
    #[serde(rename = "for", skip_serializing_if = "Option::is_none")]
    pub for_item: Option<String>,
    pub candidates: Vec<BottleCandidate>,
}

enum BottleMatch {
    One(bottle::Model),
    Many(Vec<bottle::Model>),
}

// get_inventory

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetInventoryInput {
    pub sku_or_name: Option<String>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub id: Uuid,
    pub sku: Option<String>,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub size: String,
    #[serde(with = "crate::money")]
    #[schema(value_type = String)]
    pub price: Decimal,
    pub on_hand: i32,
    pub par: i32,
    pub active: bool,
    pub in_stock: bool,
}

impl From<bottle::Model> for StockItem {
    fn from(b: bottle::Model) -> Self {
        Self {
            id: b.id,
            sku: b.sku,
            name: b.name,
            brand: b.brand,
            category: b.category,
            size: b.size,
            price: b.price,
            on_hand: b.on_hand,
            par: b.par,
            active: b.active,
            in_stock: b.in_stock,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StockList {
    pub count: usize,
    pub items: Vec<StockItem>,
}

// adjust_inventory

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({"skuOrName": "GG-750", "deltaOnHand": -2}))]
pub struct AdjustInventoryInput {
    pub sku_or_name: Option<String>,
    pub set_on_hand: Option<i32>,
    pub delta_on_hand: Option<i32>,
    pub set_par: Option<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustedBottle {
    pub id: Uuid,
    pub sku: Option<String>,
    pub brand: String,
    pub name: String,
    pub on_hand: i32,
    pub par: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdjustResult {
    pub updated: AdjustedBottle,
    pub message: String,
}

/// Applies the three optional edits: an absolute on-hand wins over a delta.
fn next_stock(
    current_on_hand: i32,
    current_par: i32,
    input: &AdjustInventoryInput,
) -> Result<(i32, i32), ServiceError> {
    if input.set_on_hand.is_none() && input.delta_on_hand.is_none() && input.set_par.is_none() {
        return Err(ServiceError::BadRequest(
            "Provide setOnHand, deltaOnHand, or setPar.".to_string(),
        ));
    }
    let on_hand = match (input.set_on_hand, input.delta_on_hand) {
        (Some(set), _) => set,
        (None, Some(delta)) => current_on_hand.saturating_add(delta),
        (None, None) => current_on_hand,
    };
    let par = input.set_par.unwrap_or(current_par);
    if on_hand < 0 {
        return Err(ServiceError::BadRequest(format!(
            "onHand cannot go below zero (would be {})",
            on_hand
        )));
    }
    if par < 0 {
        return Err(ServiceError::BadRequest("par cannot be negative".to_string()));
    }
    Ok((on_hand, par))
}

// set_minimum_spend

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({"tableType": "vip-booth", "amount": 2500, "date": "2025-10-31", "eventName": "Halloween"}))]
pub struct SetMinimumSpendInput {
    pub table_type: Option<String>,
    #[serde(default, with = "crate::money::option")]
    #[schema(value_type = Option<String>)]
    pub amount: Option<Decimal>,
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default, with = "crate::money::option")]
    #[schema(value_type = Option<String>)]
    pub deposit_rate: Option<Decimal>,
    pub event_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOverride {
    pub id: Uuid,
    pub table_type: TableTypeSummary,
    #[serde(with = "crate::money")]
    #[schema(value_type = String)]
    pub minimum_spend: Decimal,
    #[serde(with = "crate::money::rate")]
    #[schema(value_type = String)]
    pub deposit_rate: Decimal,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SetMinimumSpendResult {
    pub created: CreatedOverride,
}

fn override_window(input: &SetMinimumSpendInput) -> Result<(NaiveDate, NaiveDate), ServiceError> {
    if let Some(date) = non_blank(input.date.as_deref()) {
        let day = calendar::parse_day(date)?;
        return Ok((day, day));
    }
    match (
        non_blank(input.start_date.as_deref()),
        non_blank(input.end_date.as_deref()),
    ) {
        (Some(start), Some(end)) => Ok((calendar::parse_day(start)?, calendar::parse_day(end)?)),
        _ => Err(ServiceError::BadRequest(
            "Provide either `date` or both `startDate` and `endDate`.".to_string(),
        )),
    }
}

// bookings_tonight

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingsTonightInput {
    pub date: Option<String>,
    /// `all` (default) or `evening`
    pub shift: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoorListEntry {
    pub booking_id: Uuid,
    pub guest: String,
    pub size: i32,
    pub time_utc: String,
    pub time_local: String,
    pub status: ReservationStatus,
    pub table_type_id: Option<Uuid>,
    pub table_type_name: String,
    pub section: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DoorList {
    pub date: NaiveDate,
    pub shift: String,
    pub count: usize,
    pub bookings: Vec<DoorListEntry>,
}

// find_reservation

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FindReservationInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub confirmation_code: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TableTypeBrief {
    pub id: Uuid,
    pub name: String,
    pub section: Option<String>,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FoundBottle {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub quantity: i32,
    #[serde(with = "crate::money")]
    #[schema(value_type = String)]
    pub total_price: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FoundReservation {
    pub id: Uuid,
    pub confirmation_code: String,
    pub status: ReservationStatus,
    pub guest: String,
    pub email: String,
    pub phone: String,
    pub party_size: i32,
    pub time_utc: String,
    pub table_type: Option<TableTypeBrief>,
    pub bottles: Vec<FoundBottle>,
    #[serde(with = "crate::money")]
    #[schema(value_type = String)]
    pub minimum_spend: Decimal,
    #[serde(with = "crate::money")]
    #[schema(value_type = String)]
    pub bottle_subtotal: Decimal,
    #[serde(with = "crate::money")]
    #[schema(value_type = String)]
    pub deposit_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FoundReservations {
    pub count: usize,
    pub results: Vec<FoundReservation>,
}

// create_purchase_order

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderItemInput {
    #[validate(length(min = 1, message = "skuOrName is required"))]
    pub sku_or_name: String,
    #[validate(range(min = 1, message = "quantity must be greater than 0"))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "items": [{"skuOrName": "GG-750", "quantity": 12}, {"skuOrName": "Don Julio 1942", "quantity": 6}],
    "supplierEmail": "orders@supplier.example",
    "notes": "Deliver before Friday"
}))]
pub struct PurchaseOrderInput {
    #[serde(default)]
    #[validate(length(min = 1, message = "items must not be empty"))]
    pub items: Vec<PurchaseOrderItemInput>,
    #[serde(default)]
    #[validate(email(message = "supplierEmail must be a valid email"))]
    pub supplier_email: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderLine {
    pub bottle_id: Uuid,
    pub label: String,
    pub quantity: i32,
    pub sku: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderResult {
    pub saved_key: String,
    pub item_count: usize,
    pub email_draft: String,
}

/// Plain-text email to the supplier. Empty lines are omitted.
pub fn purchase_order_email(
    supplier_email: &str,
    lines: &[PurchaseOrderLine],
    notes: Option<&str>,
) -> String {
    let mut out = vec![
        format!("To: {}", supplier_email),
        "Subject: Purchase Order".to_string(),
        "Hello,".to_string(),
        "Please confirm the following order:".to_string(),
    ];
    for line in lines {
        let sku = line
            .sku
            .as_deref()
            .map(|sku| format!(" (SKU {})", sku))
            .unwrap_or_default();
        out.push(format!("- {}{}: {}", line.label, sku, line.quantity));
    }
    if let Some(notes) = non_blank(notes) {
        out.push(format!("Notes: {}", notes));
    }
    out.push("Thank you.".to_string());
    out.join("\n")
}

fn lower_like(col: bottle::Column, pattern: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col(col))).like(pattern)
}

#[derive(Clone)]
pub struct AssistantService {
    db_pool: Arc<DbPool>,
    tables: Arc<TableTypeService>,
    pricing: Arc<PricingService>,
    bookings: Arc<BookingService>,
    tonight: Arc<TonightService>,
}

impl AssistantService {
    pub fn new(
        db_pool: Arc<DbPool>,
        tables: Arc<TableTypeService>,
        pricing: Arc<PricingService>,
        bookings: Arc<BookingService>,
        tonight: Arc<TonightService>,
    ) -> Self {
        Self {
            db_pool,
            tables,
            pricing,
            bookings,
            tonight,
        }
    }

    /// Exact SKU first (any bottle), then up to five active bottles whose name
    /// or brand contains the text.
    async fn resolve_bottle(&self, key: &str) -> Result<BottleMatch, ServiceError> {
        let db = &*self.db_pool;
        let needle = key.trim().to_lowercase();

        let by_sku = BottleEntity::find()
            .filter(Expr::expr(Func::lower(Expr::col(bottle::Column::Sku))).eq(needle.as_str()))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;
        if let Some(found) = by_sku {
            return Ok(BottleMatch::One(found));
        }

        let pattern = like_pattern(&needle);
        let mut fuzzy = BottleEntity::find()
            .filter(bottle::Column::Active.eq(true))
            .filter(
                Condition::any()
                    .add(lower_like(bottle::Column::Name, &pattern))
                    .add(lower_like(bottle::Column::Brand, &pattern)),
            )
            .order_by_asc(bottle::Column::Brand)
            .order_by_asc(bottle::Column::Name)
            .limit(FUZZY_MATCH_LIMIT)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        match fuzzy.len() {
            0 => Err(ServiceError::NotFound(format!("No bottle matches '{}'", key.trim()))),
            1 => Ok(BottleMatch::One(fuzzy.remove(0))),
            _ => Ok(BottleMatch::Many(fuzzy)),
        }
    }

    #[instrument(skip(self))]
    pub async fn get_inventory(&self, input: GetInventoryInput) -> Result<StockList, ServiceError> {
        let limit = input.limit.unwrap_or(DEFAULT_INVENTORY_LIMIT);
        if !(1..=MAX_INVENTORY_LIMIT).contains(&limit) {
            return Err(ServiceError::BadRequest(format!(
                "limit must be between 1 and {}",
                MAX_INVENTORY_LIMIT
            )));
        }

        let mut query = BottleEntity::find().filter(bottle::Column::Active.eq(true));
        if let Some(key) = non_blank(input.sku_or_name.as_deref()) {
            let needle = key.to_lowercase();
            let pattern = like_pattern(&needle);
            query = query.filter(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(bottle::Column::Sku))).eq(needle.as_str()))
                    .add(lower_like(bottle::Column::Name, &pattern))
                    .add(lower_like(bottle::Column::Brand, &pattern)),
            );
        }

        let items: Vec<StockItem> = query
            .order_by_asc(bottle::Column::Brand)
            .order_by_asc(bottle::Column::Name)
            .limit(limit)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?
            .into_iter()
            .map(StockItem::from)
            .collect();

        Ok(StockList {
            count: items.len(),
            items,
        })
    }

    #[instrument(skip(self))]
    pub async fn adjust_inventory(
        &self,
        input: AdjustInventoryInput,
    ) -> Result<ToolOutcome<AdjustResult>, ServiceError> {
        let key = non_blank(input.sku_or_name.as_deref())
            .ok_or_else(|| ServiceError::BadRequest("skuOrName is required".to_string()))?
            .to_string();
        if input.set_on_hand.is_none() && input.delta_on_hand.is_none() && input.set_par.is_none() {
            return Err(ServiceError::BadRequest(
                "Provide setOnHand, deltaOnHand, or setPar.".to_string(),
            ));
        }

        let current = match self.resolve_bottle(&key).await? {
            BottleMatch::One(found) => found,
            BottleMatch::Many(candidates) => {
                return Ok(ToolOutcome::Ambiguous(Disambiguation {
                    disambiguation_required: true,
                    for_item: None,
                    candidates: candidates.iter().map(BottleCandidate::from).collect(),
                }))
            }
        };

        let (on_hand, par) = next_stock(current.on_hand, current.par, &input)?;
        let mut model: bottle::ActiveModel = current.into();
        model.on_hand = Set(on_hand);
        model.par = Set(par);
        model.in_stock = Set(on_hand > 0);
        model.updated_at = Set(Utc::now());
        let saved = model
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        info!(bottle_id = %saved.id, on_hand, par, "stock adjusted");
        Ok(ToolOutcome::Done(AdjustResult {
            message: format!("Inventory updated for {} {}.", saved.brand, saved.name),
            updated: AdjustedBottle {
                id: saved.id,
                sku: saved.sku,
                brand: saved.brand,
                name: saved.name,
                on_hand: saved.on_hand,
                par: saved.par,
            },
        }))
    }

    #[instrument(skip(self))]
    pub async fn set_minimum_spend(
        &self,
        input: SetMinimumSpendInput,
    ) -> Result<SetMinimumSpendResult, ServiceError> {
        let table_key = non_blank(input.table_type.as_deref())
            .ok_or_else(|| ServiceError::BadRequest("tableType is required".to_string()))?;
        let amount = input
            .amount
            .filter(|a| *a > Decimal::ZERO)
            .ok_or_else(|| ServiceError::BadRequest("amount must be > 0".to_string()))?;
        let deposit_rate = input.deposit_rate.unwrap_or(DEFAULT_DEPOSIT_RATE);
        if deposit_rate < Decimal::ZERO || deposit_rate > Decimal::ONE {
            return Err(ServiceError::BadRequest(
                "depositRate must be between 0 and 1".to_string(),
            ));
        }
        let (start, end) = override_window(&input)?;

        let table = self
            .tables
            .find_by_slug_or_name(table_key)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("TableType not found for '{}'", table_key)))?;

        let view = self
            .pricing
            .create_rule(CreatePricingRuleRequest {
                table_type_id: Some(table.id),
                day_type: Some("SPECIAL_EVENT".to_string()),
                minimum_spend: Some(crate::money::to_cents(amount)),
                deposit_rate: Some(deposit_rate),
                priority: Some(OVERRIDE_PRIORITY),
                event_name: Some(
                    non_blank(input.event_name.as_deref())
                        .unwrap_or(DEFAULT_OVERRIDE_NAME)
                        .to_string(),
                ),
                start_date: Some(start.to_string()),
                end_date: Some(end.to_string()),
                active: Some(true),
            })
            .await?;

        Ok(SetMinimumSpendResult {
            created: CreatedOverride {
                id: view.rule.id,
                table_type: TableTypeSummary::from(&table),
                minimum_spend: view.rule.minimum_spend,
                deposit_rate: view.rule.deposit_rate,
                start_date: view.rule.start_date,
                end_date: view.rule.end_date,
            },
        })
    }

    #[instrument(skip(self))]
    pub async fn bookings_tonight(
        &self,
        input: BookingsTonightInput,
    ) -> Result<DoorList, ServiceError> {
        let shift = non_blank(input.shift.as_deref()).unwrap_or("all").to_string();
        let evening_only = match shift.as_str() {
            "all" => false,
            "evening" => true,
            _ => {
                return Err(ServiceError::BadRequest(
                    "shift must be 'all' or 'evening'".to_string(),
                ))
            }
        };

        let date = match non_blank(input.date.as_deref()) {
            Some(raw) => calendar::parse_day(raw)?,
            None => self.tonight.today(Utc::now()),
        };
        let tz = self.tonight.venue_tz();

        let rows: Vec<reservation::Model> = self
            .tonight
            .reservations_on(date)
            .await?
            .into_iter()
            .filter(|r| !evening_only || calendar::is_evening(tz, r.date))
            .collect();
        let details = self.bookings.hydrate(rows).await?;

        let bookings: Vec<DoorListEntry> = details
            .into_iter()
            .map(|d| {
                let r = d.reservation;
                DoorListEntry {
                    booking_id: r.id,
                    guest: r.customer_name,
                    size: r.party_size,
                    time_utc: r.date.to_rfc3339(),
                    time_local: r.date.with_timezone(&tz).to_rfc3339(),
                    status: r.status,
                    table_type_id: d.table_type.as_ref().map(|t| t.id),
                    table_type_name: d
                        .table_type
                        .as_ref()
                        .map(|t| t.name.clone())
                        .unwrap_or_default(),
                    section: d.table_type.as_ref().and_then(|t| t.section.clone()),
                    slug: d.table_type.as_ref().map(|t| t.slug.clone()),
                }
            })
            .collect();

        Ok(DoorList {
            date,
            shift,
            count: bookings.len(),
            bookings,
        })
    }

    #[instrument(skip(self))]
    pub async fn find_reservation(
        &self,
        input: FindReservationInput,
    ) -> Result<FoundReservations, ServiceError> {
        let mut query = ReservationEntity::find();
        if let Some(name) = non_blank(input.name.as_deref()) {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(reservation::Column::CustomerName)))
                    .like(like_pattern(name).as_str()),
            );
        }
        if let Some(email) = non_blank(input.email.as_deref()) {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(reservation::Column::CustomerEmail)))
                    .eq(email.to_lowercase()),
            );
        }
        if let Some(code) = non_blank(input.confirmation_code.as_deref()) {
            query = query.filter(reservation::Column::ConfirmationCode.eq(code.to_uppercase()));
        }
        if let Some(raw) = non_blank(input.date.as_deref()) {
            let (start, end) = calendar::utc_day_bounds(calendar::parse_day(raw)?);
            query = query
                .filter(reservation::Column::Date.gte(start))
                .filter(reservation::Column::Date.lt(end));
        }

        let rows = query
            .order_by_asc(reservation::Column::Date)
            .limit(FIND_RESERVATION_LIMIT)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;
        let details = self.bookings.hydrate(rows).await?;

        let results: Vec<FoundReservation> = details
            .into_iter()
            .map(|d| FoundReservation {
                id: d.reservation.id,
                confirmation_code: d.reservation.confirmation_code.clone(),
                status: d.reservation.status,
                guest: d.reservation.customer_name.clone(),
                email: d.reservation.customer_email.clone(),
                phone: d.reservation.customer_phone.clone(),
                party_size: d.reservation.party_size,
                time_utc: d.reservation.date.to_rfc3339(),
                table_type: d.table_type.as_ref().map(|t| TableTypeBrief {
                    id: t.id,
                    name: t.name.clone(),
                    section: t.section.clone(),
                    slug: t.slug.clone(),
                }),
                bottles: d
                    .bottles
                    .iter()
                    .filter_map(|line| {
                        line.bottle.as_ref().map(|b| FoundBottle {
                            id: b.id,
                            name: b.name.clone(),
                            brand: b.brand.clone(),
                            quantity: line.line.quantity,
                            total_price: line.line.total_price,
                        })
                    })
                    .collect(),
                minimum_spend: d.reservation.minimum_spend,
                bottle_subtotal: d.reservation.bottle_subtotal,
                deposit_amount: d.reservation.deposit_amount,
            })
            .collect();

        Ok(FoundReservations {
            count: results.len(),
            results,
        })
    }

    #[instrument(skip(self, input), fields(items = input.items.len()))]
    pub async fn create_purchase_order(
        &self,
        input: PurchaseOrderInput,
    ) -> Result<ToolOutcome<PurchaseOrderResult>, ServiceError> {
        input.validate()?;
        for item in &input.items {
            item.validate()?;
        }

        let mut lines = Vec::with_capacity(input.items.len());
        for item in &input.items {
            match self.resolve_bottle(&item.sku_or_name).await? {
                BottleMatch::One(b) => lines.push(PurchaseOrderLine {
                    bottle_id: b.id,
                    label: format!("{} {} {}", b.brand, b.name, b.size),
                    quantity: item.quantity,
                    sku: b.sku,
                }),
                BottleMatch::Many(candidates) => {
                    return Ok(ToolOutcome::Ambiguous(Disambiguation {
                        disambiguation_required: true,
                        for_item: Some(item.sku_or_name.clone()),
                        candidates: candidates.iter().map(BottleCandidate::from).collect(),
                    }))
                }
            }
        }

        let notes = non_blank(input.notes.as_deref()).map(str::to_string);
        let payload = json!({
            "createdAt": Utc::now().to_rfc3339(),
            "supplierEmail": input.supplier_email,
            "notes": notes,
            "items": lines,
        });
        self.save_setting(
            PURCHASE_ORDER_SETTING_KEY,
            payload,
            "Latest generated purchase order",
        )
        .await?;

        info!(items = lines.len(), supplier = %input.supplier_email, "purchase order drafted");
        Ok(ToolOutcome::Done(PurchaseOrderResult {
            saved_key: PURCHASE_ORDER_SETTING_KEY.to_string(),
            item_count: lines.len(),
            email_draft: purchase_order_email(&input.supplier_email, &lines, notes.as_deref()),
        }))
    }

    async fn save_setting(
        &self,
        key: &str,
        value: serde_json::Value,
        description: &str,
    ) -> Result<setting::Model, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();
        let existing = SettingEntity::find_by_id(key.to_string())
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;

        let saved = match existing {
            Some(row) => {
                let mut row: setting::ActiveModel = row.into();
                row.value = Set(value);
                row.description = Set(Some(description.to_string()));
                row.updated_at = Set(now);
                row.update(db).await
            }
            None => {
                setting::ActiveModel {
                    key: Set(key.to_string()),
                    value: Set(value),
                    description: Set(Some(description.to_string())),
                    updated_at: Set(now),
                }
                .insert(db)
                .await
            }
        }
        .map_err(ServiceError::db_error)?;
        Ok(saved)
    }

    /// Reads back a stored setting value.
    pub async fn setting(&self, key: &str) -> Result<Option<serde_json::Value>, ServiceError> {
        Ok(SettingEntity::find_by_id(key.to_string())
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?
            .map(|row| row.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn adjust(set: Option<i32>, delta: Option<i32>, par: Option<i32>) -> AdjustInventoryInput {
        AdjustInventoryInput {
            sku_or_name: Some("GG-750".into()),
            set_on_hand: set,
            delta_on_hand: delta,
            set_par: par,
        }
    }

    #[test]
    fn stock_edits() {
        assert_eq!(next_stock(10, 4, &adjust(None, Some(-3), None)).unwrap(), (7, 4));
        assert_eq!(next_stock(10, 4, &adjust(Some(2), Some(5), None)).unwrap(), (2, 4));
        assert_eq!(next_stock(10, 4, &adjust(None, None, Some(12))).unwrap(), (10, 12));
        assert_matches!(
            next_stock(1, 4, &adjust(None, Some(-2), None)),
            Err(ServiceError::BadRequest(_))
        );
        assert_matches!(
            next_stock(1, 4, &adjust(None, None, None)),
            Err(ServiceError::BadRequest(msg)) if msg == "Provide setOnHand, deltaOnHand, or setPar."
        );
    }

    #[test]
    fn override_window_needs_a_date_or_a_range() {
        let mut input = SetMinimumSpendInput {
            date: Some("2025-10-31".into()),
            ..Default::default()
        };
        let (s, e) = override_window(&input).unwrap();
        assert_eq!(s, e);

        input.date = None;
        input.start_date = Some("2025-12-30".into());
        assert!(override_window(&input).is_err());

        input.end_date = Some("2025-12-31".into());
        let (s, e) = override_window(&input).unwrap();
        assert!(s < e);
    }

    #[test]
    fn email_draft_skips_blank_lines() {
        let lines = vec![
            PurchaseOrderLine {
                bottle_id: Uuid::nil(),
                label: "Grey Goose Vodka 750ml".into(),
                quantity: 12,
                sku: Some("GG-750".into()),
            },
            PurchaseOrderLine {
                bottle_id: Uuid::nil(),
                label: "Don Julio 1942 750ml".into(),
                quantity: 6,
                sku: None,
            },
        ];
        let draft = purchase_order_email("orders@supplier.example", &lines, Some("Before Friday"));
        assert_eq!(
            draft,
            "To: orders@supplier.example\nSubject: Purchase Order\nHello,\n\
             Please confirm the following order:\n\
             - Grey Goose Vodka 750ml (SKU GG-750): 12\n\
             - Don Julio 1942 750ml: 6\n\
             Notes: Before Friday\nThank you."
        );
        assert!(!purchase_order_email("a@b.co", &lines, None).contains("Notes"));
    }

    #[test]
    fn purchase_order_validation() {
        let empty = PurchaseOrderInput {
            items: vec![],
            supplier_email: "orders@supplier.example".into(),
            notes: None,
        };
        assert!(empty.validate().is_err());

        let bad_email = PurchaseOrderInput {
            items: vec![PurchaseOrderItemInput {
                sku_or_name: "GG".into(),
                quantity: 1,
            }],
            supplier_email: "not-an-email".into(),
            notes: None,
        };
        assert!(bad_email.validate().is_err());

        let zero = PurchaseOrderItemInput {
            sku_or_name: "GG".into(),
            quantity: 0,
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn disambiguation_serializes_for_key() {
        let body = Disambiguation {
            disambiguation_required: true,
            for_item: Some("goose".into()),
            candidates: vec![],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["disambiguationRequired"], true);
        assert_eq!(json["for"], "goose");
    }
}
