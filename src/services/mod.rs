//! Business logic. Each service owns a slice of the reservation domain and
//! holds a shared handle to the connection pool.

pub mod assistant;
pub mod availability;
pub mod bookings;
pub mod bottles;
pub mod calendar;
pub mod drafts;
pub mod inventory;
pub mod notifications;
pub mod pricing;
pub mod table_types;
pub mod tonight;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::table_type;

/// Compact table-type reference embedded in rule, inventory and booking views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TableTypeSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<&table_type::Model> for TableTypeSummary {
    fn from(model: &table_type::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            slug: model.slug.clone(),
        }
    }
}

/// Treats `None` and whitespace-only strings alike.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// `%pattern%` for case-insensitive `LIKE` against a lowercased column.
pub(crate) fn like_pattern(raw: &str) -> String {
    format!("%{}%", raw.trim().to_lowercase())
}
