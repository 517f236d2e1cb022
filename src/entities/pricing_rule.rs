use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::ServiceError;

/// Day classification used to match pricing rules.
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
pub enum DayType {
    #[sea_orm(string_value = "WEEKDAY")]
    Weekday,
    #[sea_orm(string_value = "WEEKEND")]
    Weekend,
    #[sea_orm(string_value = "SPECIAL_EVENT")]
    SpecialEvent,
}

impl DayType {
    /// Parses a client-supplied day type; every handler goes through here.
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        raw.trim()
            .to_ascii_uppercase()
            .parse()
            .map_err(|_| {
                ServiceError::BadRequest(
                    "Invalid dayType. Must be WEEKDAY, WEEKEND, or SPECIAL_EVENT".to_string(),
                )
            })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "pricing_rules")]
#[serde(rename_all = "camelCase")]
#[schema(as = PricingRule)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub table_type_id: Uuid,
    pub day_type: DayType,
    pub event_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub priority: i32,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    #[serde(with = "crate::money")]
    #[schema(value_type = String, example = "3000.00")]
    pub minimum_spend: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    #[serde(with = "crate::money::rate")]
    #[schema(value_type = String, example = "0.15")]
    pub deposit_rate: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Inclusive date-window check for SPECIAL_EVENT rules.
    pub fn covers(&self, date: NaiveDate) -> bool {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => start <= date && date <= end,
            _ => false,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::table_type::Entity",
        from = "Column::TableTypeId",
        to = "super::table_type::Column::Id",
        on_delete = "Cascade"
    )]
    TableType,
}

impl Related<super::table_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TableType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_type_parses_case_insensitively() {
        assert_eq!(DayType::parse("weekend").unwrap(), DayType::Weekend);
        assert_eq!(
            DayType::parse(" SPECIAL_EVENT ").unwrap(),
            DayType::SpecialEvent
        );
        assert!(DayType::parse("HOLIDAY").is_err());
        assert_eq!(DayType::SpecialEvent.to_string(), "SPECIAL_EVENT");
    }
}
