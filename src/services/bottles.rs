use crate::{
    db::DbPool,
    entities::{
        bottle::{self, Entity as BottleEntity},
        reservation,
        reservation_bottle::{self, Entity as ReservationBottleEntity},
        ReservationStatus,
    },
    errors::ServiceError,
    money,
    services::non_blank,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "name": "Grey Goose",
    "brand": "Grey Goose",
    "category": "Vodka",
    "size": "750ml",
    "price": "350",
    "sku": "GG-750",
    "onHand": 24,
    "par": 12
}))]
pub struct CreateBottleRequest {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub size: Option<String>,
    #[serde(default, with = "crate::money::option")]
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub description: Option<String>,
    #[serde(alias = "image")]
    pub image_url: Option<String>,
    /// Stored as `inStock`
    pub available: Option<bool>,
    pub in_stock: Option<bool>,
    pub active: Option<bool>,
    pub sku: Option<String>,
    pub on_hand: Option<i32>,
    pub par: Option<i32>,
    pub sort_order: Option<i32>,
}

pub type UpdateBottleRequest = CreateBottleRequest;

fn check_bottle_numbers(
    price: Decimal,
    on_hand: i32,
    par: i32,
) -> Result<(), ServiceError> {
    if price < Decimal::ZERO {
        return Err(ServiceError::BadRequest(
            "price must not be negative".to_string(),
        ));
    }
    money::ensure_storable("price", price)?;
    if on_hand < 0 || par < 0 {
        return Err(ServiceError::BadRequest(
            "onHand and par must not be negative".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct BottleService {
    db_pool: Arc<DbPool>,
}

impl BottleService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Bottles a customer can order right now.
    #[instrument(skip(self))]
    pub async fn list_public(&self) -> Result<Vec<bottle::Model>, ServiceError> {
        BottleEntity::find()
            .filter(bottle::Column::InStock.eq(true))
            .filter(bottle::Column::Active.eq(true))
            .order_by_asc(bottle::Column::Category)
            .order_by_asc(bottle::Column::SortOrder)
            .order_by_asc(bottle::Column::Price)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn list_admin(&self) -> Result<Vec<bottle::Model>, ServiceError> {
        BottleEntity::find()
            .order_by_asc(bottle::Column::Category)
            .order_by_asc(bottle::Column::SortOrder)
            .order_by_asc(bottle::Column::Name)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<bottle::Model, ServiceError> {
        BottleEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound("Bottle not found".to_string()))
    }

    #[instrument(skip(self, request))]
    pub async fn create(&self, request: CreateBottleRequest) -> Result<bottle::Model, ServiceError> {
        let (Some(name), Some(brand), Some(category), Some(size), Some(price)) = (
            non_blank(request.name.as_deref()),
            non_blank(request.brand.as_deref()),
            non_blank(request.category.as_deref()),
            non_blank(request.size.as_deref()),
            request.price,
        ) else {
            return Err(ServiceError::BadRequest(
                "Missing required fields (name, brand, category, size, price)".to_string(),
            ));
        };

        let on_hand = request.on_hand.unwrap_or(0);
        let par = request.par.unwrap_or(0);
        check_bottle_numbers(price, on_hand, par)?;

        let now = Utc::now();
        let created = bottle::ActiveModel {
            id: Set(Uuid::new_v4()),
            sku: Set(non_blank(request.sku.as_deref()).map(str::to_string)),
            name: Set(name.to_string()),
            brand: Set(brand.to_string()),
            category: Set(category.to_string()),
            size: Set(size.to_string()),
            price: Set(price),
            description: Set(non_blank(request.description.as_deref()).map(str::to_string)),
            image: Set(non_blank(request.image_url.as_deref()).map(str::to_string)),
            in_stock: Set(request.in_stock.or(request.available).unwrap_or(true)),
            active: Set(request.active.unwrap_or(true)),
            sort_order: Set(request.sort_order.unwrap_or(0)),
            on_hand: Set(on_hand),
            par: Set(par),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(ServiceError::db_error)?;

        info!(bottle_id = %created.id, name = %created.name, "bottle created");
        Ok(created)
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateBottleRequest,
    ) -> Result<bottle::Model, ServiceError> {
        let existing = self.get(id).await?;
        check_bottle_numbers(
            request.price.unwrap_or(existing.price),
            request.on_hand.unwrap_or(existing.on_hand),
            request.par.unwrap_or(existing.par),
        )?;

        let mut model: bottle::ActiveModel = existing.into();
        if let Some(name) = non_blank(request.name.as_deref()) {
            model.name = Set(name.to_string());
        }
        if let Some(brand) = non_blank(request.brand.as_deref()) {
            model.brand = Set(brand.to_string());
        }
        if let Some(category) = non_blank(request.category.as_deref()) {
            model.category = Set(category.to_string());
        }
        if let Some(size) = non_blank(request.size.as_deref()) {
            model.size = Set(size.to_string());
        }
        if let Some(price) = request.price {
            model.price = Set(price);
        }
        if let Some(description) = request.description {
            model.description = Set(non_blank(Some(description.as_str())).map(str::to_string));
        }
        if let Some(image) = request.image_url {
            model.image = Set(non_blank(Some(image.as_str())).map(str::to_string));
        }
        if let Some(in_stock) = request.in_stock.or(request.available) {
            model.in_stock = Set(in_stock);
        }
        if let Some(active) = request.active {
            model.active = Set(active);
        }
        if let Some(sku) = request.sku {
            model.sku = Set(non_blank(Some(sku.as_str())).map(str::to_string));
        }
        if let Some(on_hand) = request.on_hand {
            model.on_hand = Set(on_hand);
        }
        if let Some(par) = request.par {
            model.par = Set(par);
        }
        if let Some(sort_order) = request.sort_order {
            model.sort_order = Set(sort_order);
        }
        model.updated_at = Set(Utc::now());

        let updated = model
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;
        info!(bottle_id = %id, "bottle updated");
        Ok(updated)
    }

    /// Hard delete, refused while any reservation line references the bottle.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        self.get(id).await?;

        let in_active = ReservationBottleEntity::find()
            .join(
                JoinType::InnerJoin,
                reservation_bottle::Relation::Reservation.def(),
            )
            .filter(reservation_bottle::Column::BottleId.eq(id))
            .filter(reservation::Column::Status.is_in(ReservationStatus::ACTIVE))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        if in_active > 0 {
            warn!(bottle_id = %id, in_active, "delete refused: bottle on active reservations");
            return Err(ServiceError::BadRequest(
                "Cannot delete bottle that is in active reservations. Mark as inactive instead."
                    .to_string(),
            ));
        }

        let referenced = ReservationBottleEntity::find()
            .filter(reservation_bottle::Column::BottleId.eq(id))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;
        if referenced > 0 {
            return Err(ServiceError::Conflict(
                "Cannot delete bottle that appears on past reservations. Mark as inactive instead."
                    .to_string(),
            ));
        }

        BottleEntity::delete_by_id(id)
            .exec(db)
            .await
            .map_err(ServiceError::db_error)?;
        info!(bottle_id = %id, "bottle deleted");
        Ok(())
    }
}
