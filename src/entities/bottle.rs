use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A purchasable bottle. `on_hand` and `par` drive the manager stock tools.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "bottles")]
#[serde(rename_all = "camelCase")]
#[schema(as = Bottle)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub sku: Option<String>,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub size: String,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    #[serde(with = "crate::money")]
    #[schema(value_type = String, example = "350.00")]
    pub price: Decimal,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub image: Option<String>,
    pub in_stock: bool,
    pub active: bool,
    pub sort_order: i32,
    pub on_hand: i32,
    pub par: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reservation_bottle::Entity")]
    ReservationBottle,
}

impl Related<super::reservation_bottle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReservationBottle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
