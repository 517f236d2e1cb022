//! sea-orm entities for the reservation schema.

pub mod bottle;
pub mod notification;
pub mod pricing_rule;
pub mod reservation;
pub mod reservation_bottle;
pub mod setting;
pub mod table_inventory;
pub mod table_type;

pub use pricing_rule::DayType;
pub use reservation::ReservationStatus;
