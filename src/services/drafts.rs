//! Server-side booking drafts.
//!
//! A draft collects the checkout steps (table, date, bottles, guest details)
//! under a short-lived token and turns into a [`CreateBookingRequest`] at
//! checkout. Drafts live in memory only and expire after a fixed TTL.

use crate::{
    errors::ServiceError,
    money,
    services::{
        bookings::{
            compute_totals, BookingBottleInput, BookingService, BookingTotals,
            CreateBookingRequest, CreatedBooking,
        },
        bottles::BottleService,
        calendar, non_blank,
        table_types::TableTypeService,
    },
};
use dashmap::DashMap;
use rand::{distributions::Alphanumeric, Rng};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

pub const DRAFT_TOKEN_LEN: usize = 24;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftTable {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(with = "crate::money")]
    #[schema(value_type = String)]
    pub minimum_spend: Decimal,
    pub capacity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftBottle {
    pub id: Uuid,
    pub name: String,
    #[serde(with = "crate::money")]
    #[schema(value_type = String)]
    pub price: Decimal,
    pub quantity: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftCustomer {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub party_size: Option<i32>,
    pub occasion: Option<String>,
    pub special_requests: Option<String>,
}

/// Booking in progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub table: Option<DraftTable>,
    pub date: Option<String>,
    pub bottles: Vec<DraftBottle>,
    pub customer: DraftCustomer,
}

impl BookingDraft {
    pub fn select_table(&mut self, table: DraftTable) {
        self.table = Some(table);
    }

    pub fn set_date(&mut self, raw: &str) -> Result<(), ServiceError> {
        calendar::parse_booking_timestamp(raw)?;
        self.date = Some(raw.trim().to_string());
        Ok(())
    }

    /// Adds `quantity` of a bottle, merging with an existing line.
    pub fn add_bottle(&mut self, bottle: DraftBottle) -> Result<(), ServiceError> {
        if bottle.quantity <= 0 {
            return Err(ServiceError::BadRequest(
                "quantity must be greater than 0".to_string(),
            ));
        }
        match self.bottles.iter_mut().find(|b| b.id == bottle.id) {
            Some(line) => {
                line.quantity = line
                    .quantity
                    .checked_add(bottle.quantity)
                    .ok_or_else(|| ServiceError::BadRequest("quantity is too large".to_string()))?
            }
            None => self.bottles.push(bottle),
        }
        Ok(())
    }

    pub fn remove_bottle(&mut self, id: Uuid) {
        self.bottles.retain(|b| b.id != id);
    }

    /// Zero removes the line.
    pub fn set_bottle_quantity(&mut self, id: Uuid, quantity: i32) -> Result<(), ServiceError> {
        if quantity < 0 {
            return Err(ServiceError::BadRequest(
                "quantity must not be negative".to_string(),
            ));
        }
        if quantity == 0 {
            self.remove_bottle(id);
            return Ok(());
        }
        let line = self
            .bottles
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| ServiceError::NotFound("Bottle not in draft".to_string()))?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn set_customer(&mut self, customer: DraftCustomer) {
        self.customer = customer;
    }

    pub fn clear(&mut self) {
        *self = BookingDraft::default();
    }

    fn lines(&self) -> Vec<BookingBottleInput> {
        self.bottles
            .iter()
            .map(|b| BookingBottleInput {
                bottle_id: b.id,
                quantity: b.quantity,
                price_per_unit: b.price,
            })
            .collect()
    }

    pub fn totals(&self) -> Result<BookingTotals, ServiceError> {
        compute_totals(&self.lines())
    }

    /// Names of the steps still missing before checkout.
    pub fn missing_steps(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.table.is_none() {
            missing.push("table");
        }
        if self.date.is_none() {
            missing.push("date");
        }
        if non_blank(self.customer.name.as_deref()).is_none() {
            missing.push("customerName");
        }
        if non_blank(self.customer.email.as_deref()).is_none() {
            missing.push("customerEmail");
        }
        if non_blank(self.customer.phone.as_deref()).is_none() {
            missing.push("customerPhone");
        }
        missing
    }

    pub fn into_booking_request(self) -> Result<CreateBookingRequest, ServiceError> {
        let missing = self.missing_steps();
        if !missing.is_empty() {
            return Err(ServiceError::BadRequest(format!(
                "Draft is incomplete: missing {}",
                missing.join(", ")
            )));
        }
        let totals = self.totals()?;
        let bottles = self.lines();
        let table = self.table;
        Ok(CreateBookingRequest {
            table_type_id: table.as_ref().map(|t| t.id.to_string()),
            date: self.date,
            customer_name: self.customer.name,
            customer_email: self.customer.email,
            customer_phone: self.customer.phone,
            party_size: self.customer.party_size,
            occasion: self.customer.occasion,
            special_requests: self.customer.special_requests,
            bottles,
            minimum_spend: table.map(|t| t.minimum_spend),
            bottle_subtotal: Some(totals.bottle_subtotal),
            deposit_amount: Some(totals.deposit_amount),
        })
    }
}

struct StoredDraft {
    draft: BookingDraft,
    expires_at: Instant,
}

/// In-memory drafts keyed by token. Reads and writes refresh nothing; a draft
/// expires `ttl` after creation.
pub struct DraftStore {
    drafts: DashMap<String, StoredDraft>,
    ttl: Duration,
}

impl DraftStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            drafts: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn insert(&self, draft: BookingDraft) -> String {
        self.purge_expired();
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(DRAFT_TOKEN_LEN)
            .map(char::from)
            .collect();
        self.drafts.insert(
            token.clone(),
            StoredDraft {
                draft,
                expires_at: Instant::now() + self.ttl,
            },
        );
        token
    }

    /// The draft and its remaining lifetime, if it has not expired.
    pub fn get(&self, token: &str) -> Option<(BookingDraft, Duration)> {
        let now = Instant::now();
        let expired = match self.drafts.get(token) {
            Some(entry) if entry.expires_at > now => {
                return Some((entry.draft.clone(), entry.expires_at - now))
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.drafts.remove(token);
        }
        None
    }

    /// Replaces a live draft. Returns false when the token is unknown or expired.
    pub fn replace(&self, token: &str, draft: BookingDraft) -> bool {
        match self.drafts.get_mut(token) {
            Some(mut entry) if entry.expires_at > Instant::now() => {
                entry.draft = draft;
                true
            }
            _ => false,
        }
    }

    pub fn remove(&self, token: &str) -> Option<BookingDraft> {
        self.drafts.remove(token).map(|(_, stored)| stored.draft)
    }

    pub fn purge_expired(&self) {
        let now = Instant::now();
        let before = self.drafts.len();
        self.drafts.retain(|_, stored| stored.expires_at > now);
        let purged = before.saturating_sub(self.drafts.len());
        if purged > 0 {
            debug!(purged, "expired booking drafts removed");
        }
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftBottleInput {
    pub bottle_id: Uuid,
    #[serde(default = "one")]
    pub quantity: i32,
}

fn one() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftQuantityInput {
    pub bottle_id: Uuid,
    pub quantity: i32,
}

/// Body of `POST /booking-drafts` and `PUT /booking-drafts/{token}`. Every
/// field is optional; steps are applied in declaration order.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "tableTypeId": "7d4c2a1e-9b8f-4a51-8d23-1f0c6e9a4b77",
    "date": "2025-06-07T22:00:00Z",
    "addBottles": [{"bottleId": "0b7e9d52-3c1a-4f8e-9a6d-2e5b8c7f1a90", "quantity": 2}],
    "customer": {"name": "Dana Ortiz", "email": "dana@example.com", "phone": "555-0100", "partySize": 6}
}))]
pub struct DraftPatch {
    pub table_type_id: Option<Uuid>,
    pub date: Option<String>,
    #[serde(default)]
    pub add_bottles: Vec<DraftBottleInput>,
    #[serde(default)]
    pub set_quantities: Vec<DraftQuantityInput>,
    #[serde(default)]
    pub remove_bottles: Vec<Uuid>,
    pub customer: Option<DraftCustomer>,
    /// Start over before applying the rest of the patch.
    #[serde(default)]
    pub clear: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftView {
    pub token: String,
    pub draft: BookingDraft,
    #[serde(with = "crate::money")]
    #[schema(value_type = String)]
    pub bottle_subtotal: Decimal,
    #[serde(with = "crate::money")]
    #[schema(value_type = String)]
    pub deposit_amount: Decimal,
    pub missing: Vec<String>,
    pub expires_in_secs: u64,
}

impl DraftView {
    fn new(token: String, draft: BookingDraft, remaining: Duration) -> Result<Self, ServiceError> {
        let totals = draft.totals()?;
        Ok(Self {
            missing: draft.missing_steps().into_iter().map(String::from).collect(),
            token,
            bottle_subtotal: totals.bottle_subtotal,
            deposit_amount: totals.deposit_amount,
            draft,
            expires_in_secs: remaining.as_secs(),
        })
    }
}

fn draft_not_found() -> ServiceError {
    ServiceError::NotFound("Booking draft not found or expired".to_string())
}

#[derive(Clone)]
pub struct DraftService {
    store: Arc<DraftStore>,
    tables: Arc<TableTypeService>,
    bottles: Arc<BottleService>,
    bookings: Arc<BookingService>,
}

impl DraftService {
    pub fn new(
        store: Arc<DraftStore>,
        tables: Arc<TableTypeService>,
        bottles: Arc<BottleService>,
        bookings: Arc<BookingService>,
    ) -> Self {
        Self {
            store,
            tables,
            bottles,
            bookings,
        }
    }

    /// Drops expired drafts; called on an interval by the server.
    pub fn purge_expired(&self) {
        self.store.purge_expired();
    }

    async fn apply(&self, draft: &mut BookingDraft, patch: DraftPatch) -> Result<(), ServiceError> {
        if patch.clear {
            draft.clear();
        }
        if let Some(id) = patch.table_type_id {
            let table = self.tables.get(&id.to_string()).await?;
            if !table.active {
                return Err(ServiceError::BadRequest("Table is not available".to_string()));
            }
            draft.select_table(DraftTable {
                id: table.id,
                name: table.name,
                slug: table.slug,
                minimum_spend: money::to_cents(table.base_minimum_spend),
                capacity: table.capacity,
            });
        }
        if let Some(raw) = non_blank(patch.date.as_deref()) {
            draft.set_date(raw)?;
        }
        for item in patch.add_bottles {
            let bottle = self.bottles.get(item.bottle_id).await?;
            if !bottle.active || !bottle.in_stock {
                return Err(ServiceError::BadRequest(format!(
                    "{} is not available",
                    bottle.name
                )));
            }
            draft.add_bottle(DraftBottle {
                id: bottle.id,
                name: bottle.name,
                price: money::to_cents(bottle.price),
                quantity: item.quantity,
            })?;
        }
        for item in patch.set_quantities {
            draft.set_bottle_quantity(item.bottle_id, item.quantity)?;
        }
        for id in patch.remove_bottles {
            draft.remove_bottle(id);
        }
        if let Some(customer) = patch.customer {
            draft.set_customer(customer);
        }
        Ok(())
    }

    #[instrument(skip(self, patch))]
    pub async fn create(&self, patch: DraftPatch) -> Result<DraftView, ServiceError> {
        let mut draft = BookingDraft::default();
        self.apply(&mut draft, patch).await?;
        draft.totals()?;
        let token = self.store.insert(draft.clone());
        info!(drafts = self.store.len(), "booking draft started");
        DraftView::new(token, draft, self.store.ttl())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, token: &str) -> Result<DraftView, ServiceError> {
        let (draft, remaining) = self.store.get(token).ok_or_else(draft_not_found)?;
        DraftView::new(token.to_string(), draft, remaining)
    }

    /// Applies the patch to a copy and stores it only if every step succeeded.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, token: &str, patch: DraftPatch) -> Result<DraftView, ServiceError> {
        let (mut draft, remaining) = self.store.get(token).ok_or_else(draft_not_found)?;
        self.apply(&mut draft, patch).await?;
        draft.totals()?;
        if !self.store.replace(token, draft.clone()) {
            return Err(draft_not_found());
        }
        DraftView::new(token.to_string(), draft, remaining)
    }

    /// Books the draft. The draft is discarded only when the booking commits.
    #[instrument(skip(self))]
    pub async fn checkout(&self, token: &str) -> Result<CreatedBooking, ServiceError> {
        let (draft, _) = self.store.get(token).ok_or_else(draft_not_found)?;
        let request = draft.into_booking_request()?;
        let created = self.bookings.create_booking(request).await?;
        self.store.remove(token);
        info!(confirmation_code = %created.confirmation_code, "booking draft checked out");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn table() -> DraftTable {
        DraftTable {
            id: Uuid::new_v4(),
            name: "VIP Booth".into(),
            slug: "vip-booth".into(),
            minimum_spend: dec!(1500),
            capacity: 8,
        }
    }

    fn bottle(price: Decimal, quantity: i32) -> DraftBottle {
        DraftBottle {
            id: Uuid::new_v4(),
            name: "Grey Goose".into(),
            price,
            quantity,
        }
    }

    fn customer() -> DraftCustomer {
        DraftCustomer {
            name: Some("Dana Ortiz".into()),
            email: Some("dana@example.com".into()),
            phone: Some("555-0100".into()),
            party_size: Some(6),
            ..Default::default()
        }
    }

    #[test]
    fn adding_the_same_bottle_merges_lines() {
        let mut draft = BookingDraft::default();
        let b = bottle(dec!(350), 1);
        draft.add_bottle(b.clone()).unwrap();
        draft.add_bottle(DraftBottle { quantity: 2, ..b.clone() }).unwrap();
        assert_eq!(draft.bottles.len(), 1);
        assert_eq!(draft.bottles[0].quantity, 3);
        let totals = draft.totals().unwrap();
        assert_eq!(totals.bottle_subtotal, dec!(1050));
        assert_eq!(totals.deposit_amount, dec!(157.50));
    }

    #[test]
    fn zero_quantity_removes_line() {
        let mut draft = BookingDraft::default();
        let b = bottle(dec!(100), 2);
        draft.add_bottle(b.clone()).unwrap();
        draft.set_bottle_quantity(b.id, 5).unwrap();
        assert_eq!(draft.bottles[0].quantity, 5);
        draft.set_bottle_quantity(b.id, 0).unwrap();
        assert!(draft.bottles.is_empty());
        assert_matches!(
            draft.set_bottle_quantity(Uuid::new_v4(), 1),
            Err(ServiceError::NotFound(_))
        );
        assert_matches!(draft.add_bottle(bottle(dec!(1), 0)), Err(ServiceError::BadRequest(_)));
    }

    #[test]
    fn incomplete_draft_cannot_check_out() {
        let mut draft = BookingDraft::default();
        draft.select_table(table());
        assert_eq!(
            draft.missing_steps(),
            vec!["date", "customerName", "customerEmail", "customerPhone"]
        );
        assert_matches!(
            draft.into_booking_request(),
            Err(ServiceError::BadRequest(msg)) if msg.starts_with("Draft is incomplete")
        );
    }

    #[test]
    fn complete_draft_becomes_a_booking_request() {
        let mut draft = BookingDraft::default();
        let t = table();
        draft.select_table(t.clone());
        draft.set_date("2025-06-07T22:00:00Z").unwrap();
        draft.add_bottle(bottle(dec!(450), 2)).unwrap();
        draft.set_customer(customer());

        let request = draft.into_booking_request().unwrap();
        assert_eq!(request.table_type_id, Some(t.id.to_string()));
        assert_eq!(request.minimum_spend, Some(dec!(1500)));
        assert_eq!(request.bottles.len(), 1);
        assert_eq!(request.bottle_subtotal, Some(dec!(900)));
        assert_eq!(request.deposit_amount, Some(dec!(135)));
        assert_eq!(request.party_size, Some(6));
    }

    #[test]
    fn bad_date_is_rejected() {
        let mut draft = BookingDraft::default();
        assert!(draft.set_date("next friday").is_err());
        assert!(draft.date.is_none());
    }

    #[test]
    fn store_expires_drafts() {
        let store = DraftStore::new(Duration::from_millis(0));
        let token = store.insert(BookingDraft::default());
        assert_eq!(token.len(), DRAFT_TOKEN_LEN);
        assert!(store.get(&token).is_none());
        assert!(!store.replace(&token, BookingDraft::default()));

        let store = DraftStore::new(Duration::from_secs(60));
        let token = store.insert(BookingDraft::default());
        let mut draft = BookingDraft::default();
        draft.select_table(table());
        assert!(store.replace(&token, draft.clone()));
        let (stored, remaining) = store.get(&token).unwrap();
        assert_eq!(stored, draft);
        assert!(remaining <= Duration::from_secs(60));
        assert_eq!(store.remove(&token), Some(draft));
        assert!(store.is_empty());
    }
}
