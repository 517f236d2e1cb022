use crate::{
    db::DbPool,
    entities::{
        pricing_rule::{self, Entity as PricingRuleEntity},
        reservation::{self, Entity as ReservationEntity},
        table_inventory::{self, Entity as TableInventoryEntity},
        DayType, ReservationStatus,
    },
    errors::ServiceError,
    services::{calendar, non_blank},
};
use chrono::NaiveDate;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AvailabilityQuery {
    /// Table type id
    pub table_id: Option<String>,
    /// First day, `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// Last day (inclusive), `YYYY-MM-DD`
    pub end_date: Option<String>,
}

/// Availability of one table type on one day.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub available: i32,
    pub total: i32,
    pub price_multiplier: f64,
    pub is_special_event: bool,
}

/// Folds inventory rows, active reservation days and special-event rules into
/// the per-day view. Blocked rows are dropped.
pub fn fold_availability(
    inventory: &[table_inventory::Model],
    active_reservation_days: &[NaiveDate],
    rules: &[pricing_rule::Model],
) -> Vec<DayAvailability> {
    let mut booked: HashMap<NaiveDate, i32> = HashMap::new();
    for day in active_reservation_days {
        *booked.entry(*day).or_insert(0) += 1;
    }

    inventory
        .iter()
        .filter(|row| !row.blocked)
        .map(|row| {
            let taken = booked.get(&row.date).copied().unwrap_or(0);
            DayAvailability {
                date: row.date,
                available: (row.available - taken).max(0),
                total: row.total_count,
                price_multiplier: calendar::price_multiplier(row.date),
                is_special_event: rules.iter().any(|rule| {
                    rule.active && rule.day_type == DayType::SpecialEvent && rule.covers(row.date)
                }),
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct AvailabilityService {
    db_pool: Arc<DbPool>,
}

impl AvailabilityService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Per-day availability for a table type over an inclusive date range.
    #[instrument(skip(self))]
    pub async fn availability(
        &self,
        query: AvailabilityQuery,
    ) -> Result<Vec<DayAvailability>, ServiceError> {
        let (Some(raw_table), Some(raw_start), Some(raw_end)) = (
            non_blank(query.table_id.as_deref()),
            non_blank(query.start_date.as_deref()),
            non_blank(query.end_date.as_deref()),
        ) else {
            return Err(ServiceError::BadRequest(
                "Missing required parameters".to_string(),
            ));
        };

        let table_type_id = Uuid::parse_str(raw_table)
            .map_err(|_| ServiceError::BadRequest(format!("Invalid tableId: {}", raw_table)))?;
        let start = calendar::parse_day(raw_start)?;
        let end = calendar::parse_day(raw_end)?;
        if start > end {
            return Ok(Vec::new());
        }

        let db = &*self.db_pool;
        let inventory = TableInventoryEntity::find()
            .filter(table_inventory::Column::TableTypeId.eq(table_type_id))
            .filter(table_inventory::Column::Date.gte(start))
            .filter(table_inventory::Column::Date.lte(end))
            .filter(table_inventory::Column::Blocked.eq(false))
            .order_by_asc(table_inventory::Column::Date)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let (from, _) = calendar::utc_day_bounds(start);
        let (_, until) = calendar::utc_day_bounds(end);
        let reservation_days: Vec<NaiveDate> = ReservationEntity::find()
            .filter(reservation::Column::TableTypeId.eq(table_type_id))
            .filter(reservation::Column::Status.is_in(ReservationStatus::ACTIVE))
            .filter(reservation::Column::Date.gte(from))
            .filter(reservation::Column::Date.lt(until))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?
            .into_iter()
            .map(|r| calendar::inventory_day(r.date))
            .collect();

        let rules = PricingRuleEntity::find()
            .filter(pricing_rule::Column::TableTypeId.eq(table_type_id))
            .filter(pricing_rule::Column::DayType.eq(DayType::SpecialEvent))
            .filter(pricing_rule::Column::Active.eq(true))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let days = fold_availability(&inventory, &reservation_days, &rules);
        debug!(days = days.len(), reservations = reservation_days.len(), "availability computed");
        Ok(days)
    }
}
