use crate::{
    db::DbPool,
    entities::{
        pricing_rule::{self, DayType, Entity as PricingRuleEntity},
        table_type::{self, Entity as TableTypeEntity},
    },
    errors::ServiceError,
    money,
    services::{calendar, non_blank, TableTypeSummary},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Deposit rate used when no rule applies or a rule omits one.
pub const DEFAULT_DEPOSIT_RATE: Decimal = dec!(0.15);

/// The price a customer is shown for a table on a given night.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingResolution {
    pub table_type_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "crate::money")]
    #[schema(value_type = String, example = "1500.00")]
    pub minimum_spend: Decimal,
    #[serde(with = "crate::money::rate")]
    #[schema(value_type = String, example = "0.15")]
    pub deposit_rate: Decimal,
    pub day_type: DayType,
    pub rule_id: Option<Uuid>,
    pub event_name: Option<String>,
}

/// A pricing rule with the table type it belongs to.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingRuleView {
    #[serde(flatten)]
    pub rule: pricing_rule::Model,
    pub table_type: Option<TableTypeSummary>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "tableTypeId": "7d4c2a1e-9b8f-4a51-8d23-1f0c6e9a4b77",
    "dayType": "SPECIAL_EVENT",
    "minimumSpend": "3000",
    "depositRate": "0.25",
    "priority": 10,
    "eventName": "New Year's Eve",
    "startDate": "2025-12-31",
    "endDate": "2025-12-31"
}))]
pub struct CreatePricingRuleRequest {
    pub table_type_id: Option<Uuid>,
    pub day_type: Option<String>,
    #[serde(default, with = "crate::money::option")]
    #[schema(value_type = Option<String>)]
    pub minimum_spend: Option<Decimal>,
    #[serde(default, with = "crate::money::option")]
    #[schema(value_type = Option<String>)]
    pub deposit_rate: Option<Decimal>,
    pub priority: Option<i32>,
    pub event_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub active: Option<bool>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePricingRuleRequest {
    pub day_type: Option<String>,
    #[serde(default, with = "crate::money::option")]
    #[schema(value_type = Option<String>)]
    pub minimum_spend: Option<Decimal>,
    #[serde(default, with = "crate::money::option")]
    #[schema(value_type = Option<String>)]
    pub deposit_rate: Option<Decimal>,
    pub priority: Option<i32>,
    pub event_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub active: Option<bool>,
}

/// Picks the rule that prices `date`.
///
/// Candidates are active rules whose day type matches the date, plus active
/// special-event rules whose window covers it. The highest priority wins; a
/// tie at the top is reported instead of guessed.
pub fn select_rule(
    rules: &[pricing_rule::Model],
    date: NaiveDate,
) -> Result<Option<&pricing_rule::Model>, ServiceError> {
    let day_type = calendar::day_type_for(date);
    let candidates: Vec<&pricing_rule::Model> = rules
        .iter()
        .filter(|rule| rule.active)
        .filter(|rule| match rule.day_type {
            DayType::SpecialEvent => rule.covers(date),
            other => other == day_type,
        })
        .collect();

    let Some(top) = candidates.iter().map(|rule| rule.priority).max() else {
        return Ok(None);
    };

    let winners: Vec<&pricing_rule::Model> = candidates
        .into_iter()
        .filter(|rule| rule.priority == top)
        .collect();

    match winners.as_slice() {
        [only] => Ok(Some(*only)),
        tied => {
            let ids = tied
                .iter()
                .map(|rule| rule.id.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            Err(ServiceError::PricingConflict(format!(
                "rules {} share priority {} on {}",
                ids, top, date
            )))
        }
    }
}

fn check_rule_shape(
    day_type: DayType,
    event_name: Option<&str>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    minimum_spend: Decimal,
    deposit_rate: Decimal,
) -> Result<(), ServiceError> {
    if minimum_spend < Decimal::ZERO {
        return Err(ServiceError::BadRequest(
            "minimumSpend must not be negative".to_string(),
        ));
    }
    money::ensure_storable("minimumSpend", minimum_spend)?;
    if deposit_rate < Decimal::ZERO || deposit_rate > Decimal::ONE {
        return Err(ServiceError::BadRequest(
            "depositRate must be between 0 and 1".to_string(),
        ));
    }
    if day_type == DayType::SpecialEvent {
        let (Some(start), Some(end)) = (start_date, end_date) else {
            return Err(ServiceError::BadRequest(
                "Special events require startDate and endDate".to_string(),
            ));
        };
        if start > end {
            return Err(ServiceError::BadRequest(
                "Start date must be before or equal to end date".to_string(),
            ));
        }
        if non_blank(event_name).is_none() {
            return Err(ServiceError::BadRequest(
                "Special events require an eventName".to_string(),
            ));
        }
    }
    Ok(())
}

fn parse_optional_day(raw: Option<&str>) -> Result<Option<NaiveDate>, ServiceError> {
    non_blank(raw).map(calendar::parse_day).transpose()
}

#[derive(Clone)]
pub struct PricingService {
    db_pool: Arc<DbPool>,
}

impl PricingService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Resolves the minimum spend and deposit rate for a table on a date.
    #[instrument(skip(self))]
    pub async fn resolve(
        &self,
        table_type_id: Uuid,
        date: NaiveDate,
    ) -> Result<PricingResolution, ServiceError> {
        let db = &*self.db_pool;
        let table = TableTypeEntity::find_by_id(table_type_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound("Table not found".to_string()))?;

        let rules = table
            .find_related(PricingRuleEntity)
            .filter(pricing_rule::Column::Active.eq(true))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let resolution = match select_rule(&rules, date)? {
            Some(rule) => PricingResolution {
                table_type_id,
                date,
                minimum_spend: rule.minimum_spend,
                deposit_rate: rule.deposit_rate,
                day_type: rule.day_type,
                rule_id: Some(rule.id),
                event_name: rule.event_name.clone(),
            },
            None => PricingResolution {
                table_type_id,
                date,
                minimum_spend: table.base_minimum_spend,
                deposit_rate: DEFAULT_DEPOSIT_RATE,
                day_type: calendar::day_type_for(date),
                rule_id: None,
                event_name: None,
            },
        };

        Ok(resolution)
    }

    /// All rules, grouped by table type and strongest first.
    #[instrument(skip(self))]
    pub async fn list_rules(&self) -> Result<Vec<PricingRuleView>, ServiceError> {
        let rows = PricingRuleEntity::find()
            .find_also_related(TableTypeEntity)
            .order_by_asc(pricing_rule::Column::TableTypeId)
            .order_by_desc(pricing_rule::Column::Priority)
            .order_by_asc(pricing_rule::Column::DayType)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(rows.into_iter().map(Self::to_view).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_rule(&self, id: Uuid) -> Result<PricingRuleView, ServiceError> {
        PricingRuleEntity::find_by_id(id)
            .find_also_related(TableTypeEntity)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?
            .map(Self::to_view)
            .ok_or_else(|| ServiceError::NotFound("Pricing rule not found".to_string()))
    }

    #[instrument(skip(self, request))]
    pub async fn create_rule(
        &self,
        request: CreatePricingRuleRequest,
    ) -> Result<PricingRuleView, ServiceError> {
        let (Some(table_type_id), Some(raw_day_type), Some(minimum_spend)) = (
            request.table_type_id,
            non_blank(request.day_type.as_deref()),
            request.minimum_spend,
        ) else {
            return Err(ServiceError::BadRequest(
                "Missing required fields (tableTypeId, dayType, minimumSpend)".to_string(),
            ));
        };

        let day_type = DayType::parse(raw_day_type)?;
        let start_date = parse_optional_day(request.start_date.as_deref())?;
        let end_date = parse_optional_day(request.end_date.as_deref())?;
        let deposit_rate = request.deposit_rate.unwrap_or(DEFAULT_DEPOSIT_RATE);
        let event_name = non_blank(request.event_name.as_deref()).map(str::to_string);

        check_rule_shape(
            day_type,
            event_name.as_deref(),
            start_date,
            end_date,
            minimum_spend,
            deposit_rate,
        )?;

        let db = &*self.db_pool;
        let table = TableTypeEntity::find_by_id(table_type_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound("Table type not found".to_string()))?;

        let now = Utc::now();
        let rule = pricing_rule::ActiveModel {
            id: Set(Uuid::new_v4()),
            table_type_id: Set(table.id),
            day_type: Set(day_type),
            event_name: Set(event_name),
            start_date: Set(start_date),
            end_date: Set(end_date),
            priority: Set(request.priority.unwrap_or(0)),
            minimum_spend: Set(minimum_spend),
            deposit_rate: Set(deposit_rate),
            active: Set(request.active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(rule_id = %rule.id, table = %table.slug, day_type = %rule.day_type, "pricing rule created");
        Ok(PricingRuleView {
            table_type: Some(TableTypeSummary::from(&table)),
            rule,
        })
    }

    #[instrument(skip(self, request))]
    pub async fn update_rule(
        &self,
        id: Uuid,
        request: UpdatePricingRuleRequest,
    ) -> Result<PricingRuleView, ServiceError> {
        let db = &*self.db_pool;
        let existing = PricingRuleEntity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound("Pricing rule not found".to_string()))?;

        let day_type = match non_blank(request.day_type.as_deref()) {
            Some(raw) => DayType::parse(raw)?,
            None => existing.day_type,
        };
        let start_date = match parse_optional_day(request.start_date.as_deref())? {
            Some(date) => Some(date),
            None => existing.start_date,
        };
        let end_date = match parse_optional_day(request.end_date.as_deref())? {
            Some(date) => Some(date),
            None => existing.end_date,
        };
        let event_name = non_blank(request.event_name.as_deref())
            .map(str::to_string)
            .or_else(|| existing.event_name.clone());
        let minimum_spend = request.minimum_spend.unwrap_or(existing.minimum_spend);
        let deposit_rate = request.deposit_rate.unwrap_or(existing.deposit_rate);

        check_rule_shape(
            day_type,
            event_name.as_deref(),
            start_date,
            end_date,
            minimum_spend,
            deposit_rate,
        )?;

        let priority = request.priority.unwrap_or(existing.priority);
        let active = request.active.unwrap_or(existing.active);

        let mut rule: pricing_rule::ActiveModel = existing.into();
        rule.day_type = Set(day_type);
        rule.start_date = Set(start_date);
        rule.end_date = Set(end_date);
        rule.event_name = Set(event_name);
        rule.minimum_spend = Set(minimum_spend);
        rule.deposit_rate = Set(deposit_rate);
        rule.priority = Set(priority);
        rule.active = Set(active);
        rule.updated_at = Set(Utc::now());
        rule.update(db).await.map_err(ServiceError::db_error)?;

        info!(rule_id = %id, "pricing rule updated");
        self.get_rule(id).await
    }

    #[instrument(skip(self))]
    pub async fn delete_rule(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = PricingRuleEntity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        if result.rows_affected == 0 {
            warn!(rule_id = %id, "delete requested for unknown pricing rule");
            return Err(ServiceError::NotFound("Pricing rule not found".to_string()));
        }
        info!(rule_id = %id, "pricing rule deleted");
        Ok(())
    }

    fn to_view((rule, table): (pricing_rule::Model, Option<table_type::Model>)) -> PricingRuleView {
        PricingRuleView {
            table_type: table.as_ref().map(TableTypeSummary::from),
            rule,
        }
    }
}
