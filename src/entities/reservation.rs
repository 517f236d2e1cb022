use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::ServiceError;

/// Lifecycle of a reservation.
///
/// ```text
/// PENDING   -> CONFIRMED | CANCELLED
/// CONFIRMED -> COMPLETED | CANCELLED | NO_SHOW
/// ```
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "CONFIRMED")]
    Confirmed,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
    #[sea_orm(string_value = "NO_SHOW")]
    NoShow,
}

impl ReservationStatus {
    /// Statuses that still hold a table for the night.
    pub const ACTIVE: [ReservationStatus; 2] =
        [ReservationStatus::Pending, ReservationStatus::Confirmed];

    /// The single parser for status values arriving over HTTP.
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        raw.parse()
            .map_err(|_| ServiceError::InvalidStatus(raw.to_string()))
    }

    pub fn is_active(self) -> bool {
        Self::ACTIVE.contains(&self)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::NoShow)
    }

    /// Whether staff moving a booking from `self` to `next` follows the
    /// documented lifecycle. Updates are not rejected on this basis.
    pub fn can_transition_to(self, next: ReservationStatus) -> bool {
        use ReservationStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Completed)
                | (Confirmed, Cancelled)
                | (Confirmed, NoShow)
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "reservations")]
#[serde(rename_all = "camelCase")]
#[schema(as = Reservation)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub confirmation_code: String,
    pub table_type_id: Uuid,
    /// Booking timestamp as submitted
    pub date: DateTime<Utc>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub party_size: i32,
    pub occasion: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub special_requests: Option<String>,
    pub status: ReservationStatus,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    #[serde(with = "crate::money")]
    #[schema(value_type = String, example = "1500.00")]
    pub minimum_spend: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    #[serde(with = "crate::money")]
    #[schema(value_type = String, example = "900.00")]
    pub bottle_subtotal: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    #[serde(with = "crate::money")]
    #[schema(value_type = String, example = "135.00")]
    pub deposit_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::table_type::Entity",
        from = "Column::TableTypeId",
        to = "super::table_type::Column::Id"
    )]
    TableType,
    #[sea_orm(has_many = "super::reservation_bottle::Entity")]
    ReservationBottle,
    #[sea_orm(has_many = "super::notification::Entity")]
    Notification,
}

impl Related<super::table_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TableType.def()
    }
}

impl Related<super::reservation_bottle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReservationBottle.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notification.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use sea_orm::Iterable;

    #[test]
    fn parse_accepts_only_the_five_values() {
        for status in ReservationStatus::iter() {
            assert_eq!(ReservationStatus::parse(&status.to_string()).unwrap(), status);
        }
        assert_matches!(
            ReservationStatus::parse("confirmed"),
            Err(ServiceError::InvalidStatus(_))
        );
        assert_matches!(
            ReservationStatus::parse("SEATED"),
            Err(ServiceError::InvalidStatus(_))
        );
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for from in ReservationStatus::iter().filter(|s| s.is_terminal()) {
            for to in ReservationStatus::iter() {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn documented_transitions() {
        use ReservationStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Completed));
        assert!(Confirmed.can_transition_to(NoShow));
        assert!(!Completed.can_transition_to(Pending));
    }

    #[test]
    fn serde_uses_screaming_snake_case() {
        assert_eq!(
            serde_json::to_value(ReservationStatus::NoShow).unwrap(),
            "NO_SHOW"
        );
        assert!(ReservationStatus::Pending.is_active());
        assert!(!ReservationStatus::Completed.is_active());
    }
}
