use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Bookable slots of one table type on one calendar day.
///
/// `(table_type_id, date)` is unique and `0 <= available <= total_count`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "table_inventory")]
#[serde(rename_all = "camelCase")]
#[schema(as = TableInventory)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub table_type_id: Uuid,
    pub date: NaiveDate,
    pub total_count: i32,
    pub available: i32,
    pub blocked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// True when a booking may still take a slot from this row.
    pub fn is_bookable(&self) -> bool {
        !self.blocked && self.available > 0
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
