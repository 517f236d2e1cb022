pub mod idempotency;
pub mod manager_key;
pub mod request_id;

pub use idempotency::{ensure_idempotency_key, idempotency_middleware, IdempotencyStore};
pub use manager_key::{manager_key_middleware, MANAGER_KEY_HEADER};
pub use request_id::request_id_middleware;
