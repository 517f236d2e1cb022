//! Staff-managed table inventory: how many of each table type can be sold per day.

use crate::{
    db::DbPool,
    entities::{
        table_inventory::{self, Entity as TableInventoryEntity},
        table_type::{self, Entity as TableTypeEntity},
    },
    errors::ServiceError,
    services::{calendar, non_blank, TableTypeSummary},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Longest range a single upsert may touch.
pub const MAX_UPSERT_DAYS: i64 = 366;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct InventoryQuery {
    /// Table type id, or `all`
    pub table_type_id: Option<String>,
    /// Single day, `YYYY-MM-DD`
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "tableTypeId": "7d4c2a1e-9b8f-4a51-8d23-1f0c6e9a4b77",
    "startDate": "2025-06-01",
    "endDate": "2025-06-30",
    "totalCount": 4,
    "blocked": false
}))]
pub struct UpsertInventoryRequest {
    pub table_type_id: Option<Uuid>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub total_count: Option<i32>,
    pub blocked: Option<bool>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryView {
    #[serde(flatten)]
    pub row: table_inventory::Model,
    pub table_type: Option<TableTypeSummary>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InventoryUpsertResult {
    pub message: String,
    pub records: Vec<table_inventory::Model>,
}

#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
}

impl InventoryService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, query: InventoryQuery) -> Result<Vec<InventoryView>, ServiceError> {
        let mut select = TableInventoryEntity::find().find_also_related(TableTypeEntity);

        match non_blank(query.table_type_id.as_deref()) {
            None | Some("all") => {}
            Some(raw) => {
                let id = Uuid::parse_str(raw)
                    .map_err(|_| ServiceError::BadRequest(format!("Invalid tableTypeId: {}", raw)))?;
                select = select.filter(table_inventory::Column::TableTypeId.eq(id));
            }
        }
        if let Some(raw) = non_blank(query.date.as_deref()) {
            select = select.filter(table_inventory::Column::Date.eq(calendar::parse_day(raw)?));
        }

        let rows = select
            .order_by_asc(table_inventory::Column::Date)
            .order_by_asc(table_type::Column::Name)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(rows
            .into_iter()
            .map(|(row, table)| InventoryView {
                table_type: table.as_ref().map(TableTypeSummary::from),
                row,
            })
            .collect())
    }

    /// Sets the count for every day in an inclusive range. Each touched day
    /// is reset to `available = totalCount`.
    #[instrument(skip(self, request))]
    pub async fn upsert_range(
        &self,
        request: UpsertInventoryRequest,
    ) -> Result<InventoryUpsertResult, ServiceError> {
        let (Some(table_type_id), Some(raw_start), Some(raw_end), Some(total_count)) = (
            request.table_type_id,
            non_blank(request.start_date.as_deref()),
            non_blank(request.end_date.as_deref()),
            request.total_count,
        ) else {
            return Err(ServiceError::BadRequest("Missing required fields".to_string()));
        };

        let start = calendar::parse_day(raw_start)?;
        let end = calendar::parse_day(raw_end)?;
        if start > end {
            return Err(ServiceError::BadRequest(
                "Start date must be before or equal to end date".to_string(),
            ));
        }
        if (end - start).num_days() >= MAX_UPSERT_DAYS {
            return Err(ServiceError::BadRequest(format!(
                "Date range may span at most {} days",
                MAX_UPSERT_DAYS
            )));
        }
        if total_count < 0 {
            return Err(ServiceError::BadRequest(
                "totalCount must not be negative".to_string(),
            ));
        }
        let blocked = request.blocked.unwrap_or(false);

        let db = &*self.db_pool;
        TableTypeEntity::find_by_id(table_type_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound("Table type not found".to_string()))?;

        let txn = db.begin().await.map_err(ServiceError::db_error)?;
        let now = Utc::now();
        let mut records = Vec::new();

        for day in calendar::days_between(start, end) {
            let existing = TableInventoryEntity::find()
                .filter(table_inventory::Column::TableTypeId.eq(table_type_id))
                .filter(table_inventory::Column::Date.eq(day))
                .one(&txn)
                .await
                .map_err(ServiceError::db_error)?;

            let saved = match existing {
                Some(row) => {
                    let mut row: table_inventory::ActiveModel = row.into();
                    row.total_count = Set(total_count);
                    row.available = Set(total_count);
                    row.blocked = Set(blocked);
                    row.updated_at = Set(now);
                    row.update(&txn).await
                }
                None => {
                    table_inventory::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        table_type_id: Set(table_type_id),
                        date: Set(day),
                        total_count: Set(total_count),
                        available: Set(total_count),
                        blocked: Set(blocked),
                        created_at: Set(now),
                        updated_at: Set(now),
                    }
                    .insert(&txn)
                    .await
                }
            }
            .map_err(ServiceError::db_error)?;
            records.push(saved);
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, table_type_id = %table_type_id, "Failed to commit inventory upsert");
            ServiceError::db_error(e)
        })?;

        info!(
            table_type_id = %table_type_id,
            %start,
            %end,
            total_count,
            blocked,
            days = records.len(),
            "inventory range saved"
        );
        Ok(InventoryUpsertResult {
            message: format!("Created/updated {} inventory records", records.len()),
            records,
        })
    }
}
