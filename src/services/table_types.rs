use crate::{
    db::DbPool,
    entities::{
        pricing_rule::{self, Entity as PricingRuleEntity},
        reservation::{self, Entity as ReservationEntity},
        table_inventory::{self, Entity as TableInventoryEntity},
        table_type::{self, Entity as TableTypeEntity},
        ReservationStatus,
    },
    errors::ServiceError,
    money,
    services::non_blank,
};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug pattern compiles"));

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "name": "VIP Booth",
    "slug": "vip-booth",
    "description": "Private booth with dedicated host",
    "shortDescription": "Private booth",
    "capacity": 8,
    "baseMinimumSpend": "1500",
    "amenities": ["Dedicated host", "Premium mixers"],
    "section": "Mezzanine"
}))]
pub struct CreateTableTypeRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub capacity: Option<i32>,
    #[serde(default, with = "crate::money::option")]
    #[schema(value_type = Option<String>)]
    pub base_minimum_spend: Option<Decimal>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub section: Option<String>,
    pub sort_order: Option<i32>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTableTypeRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub capacity: Option<i32>,
    #[serde(default, with = "crate::money::option")]
    #[schema(value_type = Option<String>)]
    pub base_minimum_spend: Option<Decimal>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub section: Option<String>,
    pub sort_order: Option<i32>,
    pub active: Option<bool>,
}

fn check_slug(slug: &str) -> Result<(), ServiceError> {
    if SLUG_RE.is_match(slug) {
        Ok(())
    } else {
        Err(ServiceError::BadRequest(
            "slug must be lowercase letters, digits and single hyphens".to_string(),
        ))
    }
}

fn check_numbers(capacity: i32, base_minimum_spend: Decimal) -> Result<(), ServiceError> {
    if capacity < 1 {
        return Err(ServiceError::BadRequest(
            "capacity must be at least 1".to_string(),
        ));
    }
    if base_minimum_spend < Decimal::ZERO {
        return Err(ServiceError::BadRequest(
            "baseMinimumSpend must not be negative".to_string(),
        ));
    }
    money::ensure_storable("baseMinimumSpend", base_minimum_spend)?;
    Ok(())
}

fn image_list(images: Option<Vec<String>>, image_url: Option<&str>) -> Option<Vec<String>> {
    images.or_else(|| non_blank(image_url).map(|url| vec![url.to_string()]))
}

#[derive(Clone)]
pub struct TableTypeService {
    db_pool: Arc<DbPool>,
}

impl TableTypeService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Active table types in display order.
    #[instrument(skip(self))]
    pub async fn list_public(&self) -> Result<Vec<table_type::Model>, ServiceError> {
        TableTypeEntity::find()
            .filter(table_type::Column::Active.eq(true))
            .order_by_asc(table_type::Column::SortOrder)
            .order_by_asc(table_type::Column::Name)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Every table type, cheapest first.
    #[instrument(skip(self))]
    pub async fn list_admin(&self) -> Result<Vec<table_type::Model>, ServiceError> {
        TableTypeEntity::find()
            .order_by_asc(table_type::Column::BaseMinimumSpend)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)
    }

    /// By UUID or by slug.
    #[instrument(skip(self))]
    pub async fn get(&self, id_or_slug: &str) -> Result<table_type::Model, ServiceError> {
        let key = id_or_slug.trim();
        let query = match Uuid::parse_str(key) {
            Ok(id) => TableTypeEntity::find_by_id(id),
            Err(_) => TableTypeEntity::find().filter(table_type::Column::Slug.eq(key)),
        };
        query
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound("Table not found".to_string()))
    }

    /// Case-insensitive lookup by slug, then by name.
    #[instrument(skip(self))]
    pub async fn find_by_slug_or_name(
        &self,
        key: &str,
    ) -> Result<Option<table_type::Model>, ServiceError> {
        let needle = key.trim().to_lowercase();
        let all = TableTypeEntity::find()
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;
        Ok(all
            .iter()
            .find(|t| t.slug.to_lowercase() == needle)
            .or_else(|| all.iter().find(|t| t.name.to_lowercase() == needle))
            .cloned())
    }

    async fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> Result<bool, ServiceError> {
        let mut query = TableTypeEntity::find().filter(table_type::Column::Slug.eq(slug));
        if let Some(id) = except {
            query = query.filter(table_type::Column::Id.ne(id));
        }
        let count = query
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;
        Ok(count > 0)
    }

    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        request: CreateTableTypeRequest,
    ) -> Result<table_type::Model, ServiceError> {
        let (
            Some(name),
            Some(slug),
            Some(description),
            Some(short_description),
            Some(capacity),
            Some(base_minimum_spend),
        ) = (
            non_blank(request.name.as_deref()),
            non_blank(request.slug.as_deref()),
            non_blank(request.description.as_deref()),
            non_blank(request.short_description.as_deref()),
            request.capacity,
            request.base_minimum_spend,
        )
        else {
            return Err(ServiceError::BadRequest("Missing required fields".to_string()));
        };

        check_slug(slug)?;
        check_numbers(capacity, base_minimum_spend)?;
        if self.slug_taken(slug, None).await? {
            return Err(ServiceError::BadRequest(
                "Table with this slug already exists".to_string(),
            ));
        }

        let images = image_list(request.images.clone(), request.image_url.as_deref())
            .unwrap_or_default();
        let now = Utc::now();
        let created = table_type::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            description: Set(description.to_string()),
            short_description: Set(short_description.to_string()),
            capacity: Set(capacity),
            base_minimum_spend: Set(base_minimum_spend),
            amenities: Set(json!(request.amenities.clone().unwrap_or_default())),
            images: Set(json!(images)),
            section: Set(non_blank(request.section.as_deref()).map(str::to_string)),
            sort_order: Set(request.sort_order.unwrap_or(0)),
            active: Set(request.active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(ServiceError::db_error)?;

        info!(table_type_id = %created.id, slug = %created.slug, "table type created");
        Ok(created)
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateTableTypeRequest,
    ) -> Result<table_type::Model, ServiceError> {
        let db = &*self.db_pool;
        let existing = TableTypeEntity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound("Table not found".to_string()))?;

        if let Some(slug) = non_blank(request.slug.as_deref()) {
            check_slug(slug)?;
            if slug != existing.slug && self.slug_taken(slug, Some(id)).await? {
                return Err(ServiceError::BadRequest(
                    "A table with this slug already exists".to_string(),
                ));
            }
        }
        check_numbers(
            request.capacity.unwrap_or(existing.capacity),
            request
                .base_minimum_spend
                .unwrap_or(existing.base_minimum_spend),
        )?;

        let images = image_list(request.images.clone(), request.image_url.as_deref());
        let mut table: table_type::ActiveModel = existing.into();
        if let Some(name) = non_blank(request.name.as_deref()) {
            table.name = Set(name.to_string());
        }
        if let Some(slug) = non_blank(request.slug.as_deref()) {
            table.slug = Set(slug.to_string());
        }
        if let Some(description) = non_blank(request.description.as_deref()) {
            table.description = Set(description.to_string());
        }
        if let Some(short) = non_blank(request.short_description.as_deref()) {
            table.short_description = Set(short.to_string());
        }
        if let Some(capacity) = request.capacity {
            table.capacity = Set(capacity);
        }
        if let Some(spend) = request.base_minimum_spend {
            table.base_minimum_spend = Set(spend);
        }
        if let Some(amenities) = request.amenities {
            table.amenities = Set(json!(amenities));
        }
        if let Some(images) = images {
            table.images = Set(json!(images));
        }
        if let Some(section) = request.section {
            table.section = Set(non_blank(Some(section.as_str())).map(str::to_string));
        }
        if let Some(sort_order) = request.sort_order {
            table.sort_order = Set(sort_order);
        }
        if let Some(active) = request.active {
            table.active = Set(active);
        }
        table.updated_at = Set(Utc::now());

        let updated = table.update(db).await.map_err(ServiceError::db_error)?;
        info!(table_type_id = %id, "table type updated");
        Ok(updated)
    }

    /// Deletes a table type with its inventory and pricing rules.
    ///
    /// Refused while any reservation references it: active ones must be
    /// cancelled first, historical ones keep the type alive.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        TableTypeEntity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound("Table not found".to_string()))?;

        let active = ReservationEntity::find()
            .filter(reservation::Column::TableTypeId.eq(id))
            .filter(reservation::Column::Status.is_in(ReservationStatus::ACTIVE))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        if active > 0 {
            warn!(table_type_id = %id, active, "delete refused: active reservations");
            return Err(ServiceError::BadRequest(
                "Cannot delete table type with active reservations. Cancel reservations first."
                    .to_string(),
            ));
        }

        let history = ReservationEntity::find()
            .filter(reservation::Column::TableTypeId.eq(id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        if history > 0 {
            return Err(ServiceError::Conflict(
                "Cannot delete table type with past reservations. Mark it inactive instead."
                    .to_string(),
            ));
        }

        let txn = db.begin().await.map_err(ServiceError::db_error)?;
        TableInventoryEntity::delete_many()
            .filter(table_inventory::Column::TableTypeId.eq(id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        PricingRuleEntity::delete_many()
            .filter(pricing_rule::Column::TableTypeId.eq(id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        TableTypeEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;
        txn.commit().await.map_err(|e| {
            error!(error = %e, table_type_id = %id, "Failed to commit table type delete");
            ServiceError::db_error(e)
        })?;

        info!(table_type_id = %id, "table type deleted");
        Ok(())
    }
}
