//! Database pool, migrations, and the payment/roster tables

pub mod db;
pub mod employees;
pub mod migrations;
pub mod payments;
pub mod store;

// Re-exports for convenience
pub use db::{create_pool, get_connection, DbConnection, DbPool};
pub use employees::Employee;
pub use payments::{NewPaymentRequest, PaymentRequest, PaymentStats, PaymentStatus, RequesterStats};
pub use store::PaymentStore;
