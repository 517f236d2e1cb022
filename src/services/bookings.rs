use crate::{
    db::DbPool,
    entities::{
        bottle::{self, Entity as BottleEntity},
        notification::{self, Entity as NotificationEntity},
        reservation::{self, Entity as ReservationEntity},
        reservation_bottle::{self, Entity as ReservationBottleEntity},
        table_inventory::{self, Entity as TableInventoryEntity},
        table_type::{self, Entity as TableTypeEntity},
        ReservationStatus,
    },
    errors::ServiceError,
    money,
    services::{calendar, like_pattern, non_blank, notifications},
};
use chrono::{DateTime, NaiveDate, Utc};
use metrics::{counter, histogram};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Deposit taken at booking time, as a fraction of the bottle subtotal.
///
/// Fixed at intake; a pricing rule's `depositRate` is informational only.
pub const BOOKING_DEPOSIT_RATE: Decimal = dec!(0.15);

/// Upper-case alphabet without 0/O or 1/I.
pub const CONFIRMATION_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const CONFIRMATION_CODE_LEN: usize = 8;
const CONFIRMATION_CODE_ATTEMPTS: usize = 5;

const DEFAULT_LIST_LIMIT: u64 = 10;
const DEFAULT_ADMIN_LIMIT: u64 = 50;
const MAX_LIST_LIMIT: u64 = 500;

/// One bottle selection on a booking request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingBottleInput {
    pub bottle_id: Uuid,
    pub quantity: i32,
    #[serde(alias = "price", with = "crate::money")]
    #[schema(value_type = String, example = "450.00")]
    pub price_per_unit: Decimal,
}

/// Body of `POST /bookings`. Required fields are optional here so that a
/// missing one yields the documented message rather than a parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "tableTypeId": "7d4c2a1e-9b8f-4a51-8d23-1f0c6e9a4b77",
    "date": "2025-06-07T22:00:00Z",
    "customerName": "Dana Ortiz",
    "customerEmail": "dana@example.com",
    "customerPhone": "555-0100",
    "partySize": 6,
    "occasion": "Birthday",
    "bottles": [{"bottleId": "0b7e9d52-3c1a-4f8e-9a6d-2e5b8c7f1a90", "quantity": 2, "pricePerUnit": "450.00"}],
    "minimumSpend": "1500.00"
}))]
pub struct CreateBookingRequest {
    pub table_type_id: Option<String>,
    pub date: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub party_size: Option<i32>,
    pub occasion: Option<String>,
    pub special_requests: Option<String>,
    #[serde(default)]
    pub bottles: Vec<BookingBottleInput>,
    #[serde(default, with = "crate::money::option")]
    #[schema(value_type = Option<String>)]
    pub minimum_spend: Option<Decimal>,
    /// Ignored; recomputed from `bottles`.
    #[serde(default, with = "crate::money::option")]
    #[schema(value_type = Option<String>)]
    pub bottle_subtotal: Option<Decimal>,
    /// Ignored; recomputed from `bottles`.
    #[serde(default, with = "crate::money::option")]
    #[schema(value_type = Option<String>)]
    pub deposit_amount: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingTotals {
    pub bottle_subtotal: Decimal,
    pub deposit_amount: Decimal,
}

fn subtotal_too_large() -> ServiceError {
    ServiceError::BadRequest(format!(
        "Bottle subtotal must not exceed {}",
        money::format(&money::MAX_AMOUNT)
    ))
}

/// `quantity * price_per_unit`, refused once it leaves the storable range.
pub fn line_total(quantity: i32, price_per_unit: Decimal) -> Result<Decimal, ServiceError> {
    Decimal::from(quantity)
        .checked_mul(price_per_unit)
        .filter(|total| *total <= money::MAX_AMOUNT)
        .ok_or_else(subtotal_too_large)
}

/// Server-side money computation for a set of bottle lines.
pub fn compute_totals(lines: &[BookingBottleInput]) -> Result<BookingTotals, ServiceError> {
    let mut subtotal = Decimal::ZERO;
    for line in lines {
        subtotal = subtotal
            .checked_add(line_total(line.quantity, line.price_per_unit)?)
            .filter(|sum| *sum <= money::MAX_AMOUNT)
            .ok_or_else(subtotal_too_large)?;
    }
    let deposit = subtotal
        .checked_mul(BOOKING_DEPOSIT_RATE)
        .ok_or_else(subtotal_too_large)?;
    Ok(BookingTotals {
        bottle_subtotal: money::to_cents(subtotal),
        deposit_amount: money::to_cents(deposit),
    })
}

/// Random confirmation code. The uniqueness check happens in the transaction.
pub fn new_confirmation_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CONFIRMATION_CODE_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..CONFIRMATION_CODE_ALPHABET.len());
            CONFIRMATION_CODE_ALPHABET[idx] as char
        })
        .collect()
}

/// A request that passed intake checks.
#[derive(Debug, Clone)]
struct ValidatedBooking {
    table_type_id: Uuid,
    at: DateTime<Utc>,
    day: NaiveDate,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    party_size: i32,
    occasion: Option<String>,
    special_requests: Option<String>,
    minimum_spend: Decimal,
    lines: Vec<BookingBottleInput>,
    totals: BookingTotals,
}

fn validate_intake(request: &CreateBookingRequest) -> Result<ValidatedBooking, ServiceError> {
    let (Some(raw_table), Some(raw_date), Some(name), Some(email), Some(phone)) = (
        non_blank(request.table_type_id.as_deref()),
        non_blank(request.date.as_deref()),
        non_blank(request.customer_name.as_deref()),
        non_blank(request.customer_email.as_deref()),
        non_blank(request.customer_phone.as_deref()),
    ) else {
        return Err(ServiceError::BadRequest("Missing required fields".to_string()));
    };

    // an id that cannot exist has no inventory either
    let table_type_id = Uuid::parse_str(raw_table).map_err(|_| ServiceError::TableUnavailable)?;
    let at = calendar::parse_booking_timestamp(raw_date)?;

    if !validator::validate_email(email) {
        return Err(ServiceError::BadRequest(
            "customerEmail is not a valid email address".to_string(),
        ));
    }

    let party_size = request.party_size.unwrap_or(1);
    if party_size < 1 {
        return Err(ServiceError::BadRequest(
            "partySize must be at least 1".to_string(),
        ));
    }

    for line in &request.bottles {
        if line.quantity <= 0 {
            return Err(ServiceError::BadRequest(format!(
                "Quantity for bottle {} must be positive",
                line.bottle_id
            )));
        }
        if line.price_per_unit < Decimal::ZERO {
            return Err(ServiceError::BadRequest(format!(
                "Price for bottle {} must not be negative",
                line.bottle_id
            )));
        }
        money::ensure_storable("pricePerUnit", line.price_per_unit)?;
    }

    let minimum_spend = request.minimum_spend.unwrap_or(Decimal::ZERO);
    if minimum_spend < Decimal::ZERO {
        return Err(ServiceError::BadRequest(
            "minimumSpend must not be negative".to_string(),
        ));
    }
    money::ensure_storable("minimumSpend", minimum_spend)?;

    let totals = compute_totals(&request.bottles)?;
    if let Some(claimed) = request.bottle_subtotal {
        if money::to_cents(claimed) != totals.bottle_subtotal {
            warn!(
                claimed = %claimed,
                computed = %totals.bottle_subtotal,
                "client bottle subtotal disagrees with line items"
            );
        }
    }

    Ok(ValidatedBooking {
        table_type_id,
        at,
        day: calendar::inventory_day(at),
        customer_name: name.to_string(),
        customer_email: email.to_string(),
        customer_phone: phone.to_string(),
        party_size,
        occasion: non_blank(request.occasion.as_deref()).map(str::to_string),
        special_requests: non_blank(request.special_requests.as_deref()).map(str::to_string),
        minimum_spend,
        lines: request.bottles.clone(),
        totals,
    })
}

/// A bottle line with the bottle it refers to.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingLineView {
    #[serde(flatten)]
    pub line: reservation_bottle::Model,
    pub bottle: Option<bottle::Model>,
}

/// A reservation with its table type and bottle lines.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetail {
    #[serde(flatten)]
    pub reservation: reservation::Model,
    pub table_type: Option<table_type::Model>,
    pub bottles: Vec<BookingLineView>,
}

/// Response body of a successful booking.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBooking {
    pub success: bool,
    pub confirmation_code: String,
    pub reservation: BookingDetail,
}

/// Filters for the staff booking list.
#[derive(Debug, Clone, Default)]
pub struct AdminBookingFilter {
    pub status: Option<String>,
    pub search: Option<String>,
    pub date: Option<String>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusCount {
    pub status: ReservationStatus,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RevenueTotals {
    /// Bottle subtotals of CONFIRMED and COMPLETED bookings
    #[serde(with = "crate::money")]
    #[schema(value_type = String)]
    pub total: Decimal,
    #[serde(with = "crate::money")]
    #[schema(value_type = String)]
    pub deposits: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminBookingList {
    pub bookings: Vec<BookingDetail>,
    pub stats: Vec<StatusCount>,
    pub total_revenue: RevenueTotals,
}

/// Booking intake, lookup and staff mutations.
#[derive(Clone)]
pub struct BookingService {
    db_pool: Arc<DbPool>,
}

impl BookingService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Creates a PENDING reservation and takes one slot from the day's inventory.
    ///
    /// The reservation, its lines, the decrement and the outbox row commit
    /// together or not at all.
    #[instrument(skip(self, request), fields(table_type_id = ?request.table_type_id, date = ?request.date))]
    pub async fn create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> Result<CreatedBooking, ServiceError> {
        let started = Instant::now();
        let booking = validate_intake(&request)?;
        let db = &*self.db_pool;

        let inventory = TableInventoryEntity::find()
            .filter(table_inventory::Column::TableTypeId.eq(booking.table_type_id))
            .filter(table_inventory::Column::Date.eq(booking.day))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;

        if !inventory.as_ref().map(|inv| inv.is_bookable()).unwrap_or(false) {
            counter!("table_booking.bookings.rejected", 1, "reason" => "unavailable");
            info!(day = %booking.day, "no inventory for requested table and day");
            return Err(ServiceError::TableUnavailable);
        }

        let table = TableTypeEntity::find_by_id(booking.table_type_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or(ServiceError::TableUnavailable)?;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start booking transaction");
            ServiceError::booking_failed(e)
        })?;

        // first statement in the transaction: SQLite takes the write lock here
        let now = Utc::now();
        let decremented = TableInventoryEntity::update_many()
            .col_expr(
                table_inventory::Column::Available,
                Expr::col(table_inventory::Column::Available).sub(1),
            )
            .col_expr(table_inventory::Column::UpdatedAt, Expr::value(now))
            .filter(table_inventory::Column::TableTypeId.eq(booking.table_type_id))
            .filter(table_inventory::Column::Date.eq(booking.day))
            .filter(table_inventory::Column::Available.gt(0))
            .filter(table_inventory::Column::Blocked.eq(false))
            .exec(&txn)
            .await
            .map_err(ServiceError::booking_failed)?;

        if decremented.rows_affected == 0 {
            txn.rollback().await.map_err(ServiceError::booking_failed)?;
            counter!("table_booking.bookings.rejected", 1, "reason" => "sold_out");
            info!(day = %booking.day, "last slot taken by a concurrent booking");
            return Err(ServiceError::TableUnavailable);
        }

        let mut code = new_confirmation_code();
        for attempt in 1..=CONFIRMATION_CODE_ATTEMPTS {
            let taken = ReservationEntity::find()
                .filter(reservation::Column::ConfirmationCode.eq(code.as_str()))
                .count(&txn)
                .await
                .map_err(ServiceError::booking_failed)?;
            if taken == 0 {
                break;
            }
            warn!(attempt, "confirmation code collision, regenerating");
            code = new_confirmation_code();
        }

        let reservation_id = Uuid::new_v4();
        let saved = reservation::ActiveModel {
            id: Set(reservation_id),
            confirmation_code: Set(code.clone()),
            table_type_id: Set(booking.table_type_id),
            date: Set(booking.at),
            customer_name: Set(booking.customer_name.clone()),
            customer_email: Set(booking.customer_email.clone()),
            customer_phone: Set(booking.customer_phone.clone()),
            party_size: Set(booking.party_size),
            occasion: Set(booking.occasion.clone()),
            special_requests: Set(booking.special_requests.clone()),
            status: Set(ReservationStatus::Pending),
            minimum_spend: Set(booking.minimum_spend),
            bottle_subtotal: Set(booking.totals.bottle_subtotal),
            deposit_amount: Set(booking.totals.deposit_amount),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!(error = %e, reservation_id = %reservation_id, "Failed to insert reservation");
            ServiceError::booking_failed(e)
        })?;

        for line in &booking.lines {
            reservation_bottle::ActiveModel {
                id: Set(Uuid::new_v4()),
                reservation_id: Set(reservation_id),
                bottle_id: Set(line.bottle_id),
                quantity: Set(line.quantity),
                price_per_unit: Set(line.price_per_unit),
                total_price: Set(money::to_cents(line_total(
                    line.quantity,
                    line.price_per_unit,
                )?)),
            }
            .insert(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, bottle_id = %line.bottle_id, "Failed to insert bottle line");
                ServiceError::booking_failed(e)
            })?;
        }

        notifications::confirmation_notice(&saved, &table.name)
            .insert(&txn)
            .await
            .map_err(ServiceError::booking_failed)?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, reservation_id = %reservation_id, "Failed to commit booking transaction");
            ServiceError::booking_failed(e)
        })?;

        counter!("table_booking.bookings.created", 1);
        histogram!(
            "table_booking.bookings.create_seconds",
            started.elapsed().as_secs_f64()
        );
        info!(
            reservation_id = %reservation_id,
            confirmation_code = %code,
            day = %booking.day,
            subtotal = %booking.totals.bottle_subtotal,
            "Booking created"
        );

        let detail = self.hydrate_one(saved).await?;
        Ok(CreatedBooking {
            success: true,
            confirmation_code: code,
            reservation: detail,
        })
    }

    /// Looks a booking up by internal id (UUID) or by confirmation code.
    #[instrument(skip(self))]
    pub async fn get_booking(&self, code_or_id: &str) -> Result<BookingDetail, ServiceError> {
        let key = code_or_id.trim();
        let query = match Uuid::parse_str(key) {
            Ok(id) => ReservationEntity::find_by_id(id),
            Err(_) => ReservationEntity::find()
                .filter(reservation::Column::ConfirmationCode.eq(key.to_uppercase())),
        };

        let found = query
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Booking not found for: {}", key)))?;

        self.hydrate_one(found).await
    }

    /// Recent bookings, optionally for one customer email.
    #[instrument(skip(self))]
    pub async fn list_bookings(
        &self,
        email: Option<&str>,
        limit: Option<u64>,
    ) -> Result<Vec<BookingDetail>, ServiceError> {
        let mut query = ReservationEntity::find();
        if let Some(email) = non_blank(email) {
            query = query.filter(reservation::Column::CustomerEmail.eq(email));
        }

        let rows = query
            .order_by_desc(reservation::Column::Date)
            .limit(clamp_limit(limit, DEFAULT_LIST_LIMIT))
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        self.hydrate(rows).await
    }

    /// Staff status change. Any of the five values is accepted from any state.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: Uuid,
        raw_status: &str,
    ) -> Result<BookingDetail, ServiceError> {
        let next = ReservationStatus::parse(raw_status)?;
        let db = &*self.db_pool;
        let existing = ReservationEntity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Booking not found for: {}", id)))?;

        let previous = existing.status;
        if previous != next && !previous.can_transition_to(next) {
            warn!(reservation_id = %id, from = %previous, to = %next, "status change outside documented lifecycle");
        }

        let mut active: reservation::ActiveModel = existing.into();
        active.status = Set(next);
        active.updated_at = Set(Utc::now());
        let updated = active.update(db).await.map_err(ServiceError::db_error)?;

        counter!("table_booking.bookings.status_changes", 1, "status" => next.to_string());
        info!(reservation_id = %id, from = %previous, to = %next, "Booking status updated");
        self.hydrate_one(updated).await
    }

    /// Removes a booking with its lines and notifications. Inventory is not
    /// given back, even for a booking that was cancelled first.
    #[instrument(skip(self))]
    pub async fn delete_booking(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        let existing = ReservationEntity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        if existing.is_none() {
            return Err(ServiceError::NotFound(format!("Booking not found for: {}", id)));
        }

        ReservationBottleEntity::delete_many()
            .filter(reservation_bottle::Column::ReservationId.eq(id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        NotificationEntity::delete_many()
            .filter(notification::Column::ReservationId.eq(id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        ReservationEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, reservation_id = %id, "Failed to commit booking delete");
            ServiceError::db_error(e)
        })?;

        info!(reservation_id = %id, "Booking deleted");
        Ok(())
    }

    /// Staff list with per-status counts and booked revenue.
    #[instrument(skip(self))]
    pub async fn admin_list(
        &self,
        filter: AdminBookingFilter,
    ) -> Result<AdminBookingList, ServiceError> {
        let db = &*self.db_pool;
        let mut query = ReservationEntity::find();

        match non_blank(filter.status.as_deref()) {
            None | Some("ALL") => {}
            Some(raw) => {
                let status = ReservationStatus::parse(raw)?;
                query = query.filter(reservation::Column::Status.eq(status));
            }
        }

        if let Some(term) = non_blank(filter.search.as_deref()) {
            let pattern = like_pattern(term);
            query = query.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(
                            reservation::Column::ConfirmationCode,
                        )))
                        .like(pattern.as_str()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(reservation::Column::CustomerName)))
                            .like(pattern.as_str()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(reservation::Column::CustomerEmail)))
                            .like(pattern.as_str()),
                    )
                    .add(reservation::Column::CustomerPhone.contains(term)),
            );
        }

        if let Some(raw) = non_blank(filter.date.as_deref()) {
            let (start, end) = calendar::utc_day_bounds(calendar::parse_day(raw)?);
            query = query
                .filter(reservation::Column::Date.gte(start))
                .filter(reservation::Column::Date.lt(end));
        }

        let rows = query
            .order_by_desc(reservation::Column::Date)
            .limit(clamp_limit(filter.limit, DEFAULT_ADMIN_LIMIT))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;
        let bookings = self.hydrate(rows).await?;

        let all = ReservationEntity::find()
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;
        let (stats, total_revenue) = summarize(&all);

        Ok(AdminBookingList {
            bookings,
            stats,
            total_revenue,
        })
    }

    pub(crate) async fn hydrate_one(
        &self,
        reservation: reservation::Model,
    ) -> Result<BookingDetail, ServiceError> {
        self.hydrate(vec![reservation])
            .await?
            .pop()
            .ok_or_else(|| ServiceError::InternalError("hydration dropped a booking".to_string()))
    }

    /// Attaches table types and bottle lines with three batched queries.
    pub(crate) async fn hydrate(
        &self,
        reservations: Vec<reservation::Model>,
    ) -> Result<Vec<BookingDetail>, ServiceError> {
        if reservations.is_empty() {
            return Ok(Vec::new());
        }
        let db = &*self.db_pool;

        let table_ids: HashSet<Uuid> = reservations.iter().map(|r| r.table_type_id).collect();
        let reservation_ids: Vec<Uuid> = reservations.iter().map(|r| r.id).collect();

        let tables: HashMap<Uuid, table_type::Model> = TableTypeEntity::find()
            .filter(table_type::Column::Id.is_in(table_ids))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        let lines = ReservationBottleEntity::find()
            .filter(reservation_bottle::Column::ReservationId.is_in(reservation_ids))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let bottle_ids: HashSet<Uuid> = lines.iter().map(|l| l.bottle_id).collect();
        let bottles: HashMap<Uuid, bottle::Model> = if bottle_ids.is_empty() {
            HashMap::new()
        } else {
            BottleEntity::find()
                .filter(bottle::Column::Id.is_in(bottle_ids))
                .all(db)
                .await
                .map_err(ServiceError::db_error)?
                .into_iter()
                .map(|b| (b.id, b))
                .collect()
        };

        let mut lines_by_reservation: HashMap<Uuid, Vec<BookingLineView>> = HashMap::new();
        for line in lines {
            lines_by_reservation
                .entry(line.reservation_id)
                .or_default()
                .push(BookingLineView {
                    bottle: bottles.get(&line.bottle_id).cloned(),
                    line,
                });
        }

        Ok(reservations
            .into_iter()
            .map(|reservation| BookingDetail {
                table_type: tables.get(&reservation.table_type_id).cloned(),
                bottles: lines_by_reservation
                    .remove(&reservation.id)
                    .unwrap_or_default(),
                reservation,
            })
            .collect())
    }
}

fn clamp_limit(limit: Option<u64>, default: u64) -> u64 {
    limit.unwrap_or(default).clamp(1, MAX_LIST_LIMIT)
}

/// Per-status counts (all five statuses) and revenue over CONFIRMED + COMPLETED.
pub(crate) fn summarize(reservations: &[reservation::Model]) -> (Vec<StatusCount>, RevenueTotals) {
    use sea_orm::Iterable;

    let stats = ReservationStatus::iter()
        .map(|status| StatusCount {
            status,
            count: reservations.iter().filter(|r| r.status == status).count() as u64,
        })
        .collect();

    let booked = reservations.iter().filter(|r| {
        matches!(
            r.status,
            ReservationStatus::Confirmed | ReservationStatus::Completed
        )
    });
    let (total, deposits) = booked.fold((Decimal::ZERO, Decimal::ZERO), |(t, d), r| {
        (t + r.bottle_subtotal, d + r.deposit_amount)
    });

    (
        stats,
        RevenueTotals {
            total: money::to_cents(total),
            deposits: money::to_cents(deposits),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    fn request() -> CreateBookingRequest {
        CreateBookingRequest {
            table_type_id: Some(Uuid::new_v4().to_string()),
            date: Some("2025-06-07T22:00:00Z".into()),
            customer_name: Some("Dana Ortiz".into()),
            customer_email: Some("dana@example.com".into()),
            customer_phone: Some("555-0100".into()),
            party_size: Some(4),
            bottles: vec![BookingBottleInput {
                bottle_id: Uuid::new_v4(),
                quantity: 2,
                price_per_unit: dec!(450),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn deposit_is_fifteen_percent_of_lines() {
        let totals = compute_totals(&request().bottles).unwrap();
        assert_eq!(totals.bottle_subtotal, dec!(900));
        assert_eq!(totals.deposit_amount, dec!(135));
    }

    #[test]
    fn no_bottles_means_zero_totals() {
        let totals = compute_totals(&[]).unwrap();
        assert_eq!(totals.bottle_subtotal, Decimal::ZERO);
        assert_eq!(totals.deposit_amount, Decimal::ZERO);
    }

    #[test]
    fn oversized_lines_are_refused_instead_of_overflowing() {
        let line = |quantity, price_per_unit| BookingBottleInput {
            bottle_id: Uuid::nil(),
            quantity,
            price_per_unit,
        };
        assert_matches!(
            compute_totals(&[line(2, Decimal::MAX)]),
            Err(ServiceError::BadRequest(msg))
                if msg == "Bottle subtotal must not exceed 999999999999.99"
        );
        assert_matches!(
            compute_totals(&[line(1, money::MAX_AMOUNT), line(1, dec!(1))]),
            Err(ServiceError::BadRequest(_))
        );
        assert!(compute_totals(&[line(1, money::MAX_AMOUNT)]).is_ok());

        let mut req = request();
        req.bottles = vec![line(2, Decimal::MAX)];
        assert_matches!(
            validate_intake(&req),
            Err(ServiceError::BadRequest(msg))
                if msg == "pricePerUnit must not exceed 999999999999.99"
        );
    }

    #[test]
    fn missing_or_blank_fields_are_rejected() {
        let mut req = request();
        req.customer_phone = Some("   ".into());
        assert_matches!(
            validate_intake(&req),
            Err(ServiceError::BadRequest(msg)) if msg == "Missing required fields"
        );

        let mut req = request();
        req.date = None;
        assert_matches!(validate_intake(&req), Err(ServiceError::BadRequest(_)));
    }

    #[test]
    fn unparseable_table_id_is_unavailable() {
        let mut req = request();
        req.table_type_id = Some("vip-booth".into());
        assert_matches!(validate_intake(&req), Err(ServiceError::TableUnavailable));
    }

    #[test]
    fn line_checks() {
        let mut req = request();
        req.bottles[0].quantity = 0;
        assert_matches!(validate_intake(&req), Err(ServiceError::BadRequest(_)));

        let mut req = request();
        req.bottles[0].price_per_unit = dec!(-1);
        assert_matches!(validate_intake(&req), Err(ServiceError::BadRequest(_)));
    }

    #[test]
    fn defaults_and_day_key() {
        let mut req = request();
        req.party_size = None;
        req.date = Some("2025-06-07T23:30:00-04:00".into());
        let ok = validate_intake(&req).unwrap();
        assert_eq!(ok.party_size, 1);
        assert_eq!(ok.minimum_spend, Decimal::ZERO);
        assert_eq!(ok.day, NaiveDate::from_ymd_opt(2025, 6, 8).unwrap());
    }

    #[test]
    fn client_totals_are_ignored() {
        let mut req = request();
        req.bottle_subtotal = Some(dec!(1));
        req.deposit_amount = Some(dec!(0.15));
        let ok = validate_intake(&req).unwrap();
        assert_eq!(ok.totals.bottle_subtotal, dec!(900));
    }

    #[test]
    fn codes_use_unambiguous_alphabet() {
        for _ in 0..200 {
            let code = new_confirmation_code();
            assert_eq!(code.len(), CONFIRMATION_CODE_LEN);
            assert!(code.bytes().all(|b| CONFIRMATION_CODE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn summary_counts_every_status() {
        let now = Utc::now();
        let make = |status, subtotal: Decimal, deposit: Decimal| reservation::Model {
            id: Uuid::new_v4(),
            confirmation_code: new_confirmation_code(),
            table_type_id: Uuid::nil(),
            date: now,
            customer_name: "x".into(),
            customer_email: "x@example.com".into(),
            customer_phone: "1".into(),
            party_size: 1,
            occasion: None,
            special_requests: None,
            status,
            minimum_spend: Decimal::ZERO,
            bottle_subtotal: subtotal,
            deposit_amount: deposit,
            created_at: now,
            updated_at: now,
        };
        let rows = vec![
            make(ReservationStatus::Confirmed, dec!(900), dec!(135)),
            make(ReservationStatus::Completed, dec!(100), dec!(15)),
            make(ReservationStatus::Pending, dec!(5000), dec!(750)),
        ];
        let (stats, revenue) = summarize(&rows);
        assert_eq!(stats.len(), 5);
        assert_eq!(
            stats
                .iter()
                .find(|s| s.status == ReservationStatus::NoShow)
                .unwrap()
                .count,
            0
        );
        assert_eq!(revenue.total, dec!(1000));
        assert_eq!(revenue.deposits, dec!(150));
    }

    fn line_strategy() -> impl Strategy<Value = BookingBottleInput> {
        (1i32..20, 0i64..500_000).prop_map(|(quantity, cents)| BookingBottleInput {
            bottle_id: Uuid::nil(),
            quantity,
            price_per_unit: Decimal::new(cents, 2),
        })
    }

    proptest! {
        #[test]
        fn subtotal_is_sum_of_lines(lines in prop::collection::vec(line_strategy(), 0..8)) {
            let totals = compute_totals(&lines).unwrap();
            let expected: Decimal = lines
                .iter()
                .map(|l| Decimal::from(l.quantity) * l.price_per_unit)
                .sum();
            prop_assert_eq!(totals.bottle_subtotal, expected);
        }

        #[test]
        fn deposit_is_rounded_fraction(lines in prop::collection::vec(line_strategy(), 0..8)) {
            let totals = compute_totals(&lines).unwrap();
            let exact = totals.bottle_subtotal * BOOKING_DEPOSIT_RATE;
            prop_assert!((totals.deposit_amount - exact).abs() <= dec!(0.005));
            prop_assert!(totals.deposit_amount >= Decimal::ZERO);
            prop_assert!(totals.deposit_amount <= totals.bottle_subtotal);
        }
    }
}
