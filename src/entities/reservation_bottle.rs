use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A bottle line on a reservation, priced at booking time.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "reservation_bottles")]
#[serde(rename_all = "camelCase")]
#[schema(as = ReservationBottle)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub bottle_id: Uuid,
    pub quantity: i32,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    #[serde(with = "crate::money")]
    #[schema(value_type = String, example = "450.00")]
    pub price_per_unit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    #[serde(with = "crate::money")]
    #[schema(value_type = String, example = "900.00")]
    pub total_price: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reservation::Entity",
        from = "Column::ReservationId",
        to = "super::reservation::Column::Id",
        on_delete = "Cascade"
    )]
    Reservation,
    #[sea_orm(
        belongs_to = "super::bottle::Entity",
        from = "Column::BottleId",
        to = "super::bottle::Column::Id"
    )]
    Bottle,
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservation.def()
    }
}

impl Related<super::bottle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bottle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
