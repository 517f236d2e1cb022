use crate::{
    db::DbPool,
    entities::{
        reservation::{self, Entity as ReservationEntity},
        ReservationStatus,
    },
    errors::ServiceError,
    money,
    services::{bookings::BookingDetail, bookings::BookingService, calendar},
};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TonightStats {
    pub total_bookings: u64,
    pub pending: u64,
    pub confirmed: u64,
    pub completed: u64,
    pub no_shows: u64,
    pub cancelled: u64,
    /// Minimum spend still expected from PENDING and CONFIRMED tables
    #[serde(with = "crate::money")]
    #[schema(value_type = String)]
    pub expected_revenue: Decimal,
    /// Minimum spend of COMPLETED tables
    #[serde(with = "crate::money")]
    #[schema(value_type = String)]
    pub actual_revenue: Decimal,
}

impl TonightStats {
    pub fn from_reservations(rows: &[reservation::Model]) -> Self {
        let mut stats = TonightStats {
            total_bookings: rows.len() as u64,
            ..Default::default()
        };
        for r in rows {
            match r.status {
                ReservationStatus::Pending => stats.pending += 1,
                ReservationStatus::Confirmed => stats.confirmed += 1,
                ReservationStatus::Completed => stats.completed += 1,
                ReservationStatus::NoShow => stats.no_shows += 1,
                ReservationStatus::Cancelled => stats.cancelled += 1,
            }
            if r.status.is_active() {
                stats.expected_revenue += r.minimum_spend;
            } else if r.status == ReservationStatus::Completed {
                stats.actual_revenue += r.minimum_spend;
            }
        }
        stats.expected_revenue = money::to_cents(stats.expected_revenue);
        stats.actual_revenue = money::to_cents(stats.actual_revenue);
        stats
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TonightReport {
    pub bookings: Vec<BookingDetail>,
    pub stats: TonightStats,
    pub date: NaiveDate,
}

/// The door view: everything booked for the venue's current night.
#[derive(Clone)]
pub struct TonightService {
    db_pool: Arc<DbPool>,
    bookings: Arc<BookingService>,
    venue_tz: Tz,
}

impl TonightService {
    pub fn new(db_pool: Arc<DbPool>, bookings: Arc<BookingService>, venue_tz: Tz) -> Self {
        Self {
            db_pool,
            bookings,
            venue_tz,
        }
    }

    pub fn venue_tz(&self) -> Tz {
        self.venue_tz
    }

    /// The venue-local date at `now`.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        calendar::venue_today(self.venue_tz, now)
    }

    /// Reservations booked on `day`, earliest first.
    #[instrument(skip(self))]
    pub async fn reservations_on(
        &self,
        day: NaiveDate,
    ) -> Result<Vec<reservation::Model>, ServiceError> {
        let (start, end) = calendar::utc_day_bounds(day);
        ReservationEntity::find()
            .filter(reservation::Column::Date.gte(start))
            .filter(reservation::Column::Date.lt(end))
            .order_by_asc(reservation::Column::Date)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn report(&self, now: DateTime<Utc>) -> Result<TonightReport, ServiceError> {
        let date = self.today(now);
        let rows = self.reservations_on(date).await?;
        let stats = TonightStats::from_reservations(&rows);
        let bookings = self.bookings.hydrate(rows).await?;
        Ok(TonightReport {
            bookings,
            stats,
            date,
        })
    }
}
