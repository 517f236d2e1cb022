use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A bookable category of seating with its own capacity and base minimum spend.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "table_types")]
#[serde(rename_all = "camelCase")]
#[schema(as = TableType)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub short_description: String,
    pub capacity: i32,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    #[serde(with = "crate::money")]
    #[schema(value_type = String, example = "2000.00")]
    pub base_minimum_spend: Decimal,
    /// JSON array of strings
    #[sea_orm(column_type = "Json")]
    #[schema(value_type = Vec<String>)]
    pub amenities: Json,
    /// JSON array of image URLs
    #[sea_orm(column_type = "Json")]
    #[schema(value_type = Vec<String>)]
    pub images: Json,
    pub section: Option<String>,
    pub sort_order: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::table_inventory::Entity")]
    TableInventory,
    #[sea_orm(has_many = "super::pricing_rule::Entity")]
    PricingRule,
    #[sea_orm(has_many = "super::reservation::Entity")]
    Reservation,
}

impl Related<super::table_inventory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TableInventory.def()
    }
}

impl Related<super::pricing_rule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PricingRule.def()
    }
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
