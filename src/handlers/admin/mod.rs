//! Staff endpoints under `/api/v1/admin`. Responses use the `ApiResponse` envelope.

pub mod bookings;
pub mod bottles;
pub mod inventory;
pub mod pricing;
pub mod tables;
pub mod tonight;

use serde::Serialize;
use utoipa::ToSchema;

/// Body of a successful admin delete.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteMessage {
    pub message: String,
}

impl DeleteMessage {
    pub fn new(what: &str) -> Self {
        Self {
            message: format!("{} deleted successfully", what),
        }
    }
}
