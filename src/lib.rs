//! Telepay - Telegram bot for employee payment requests
//!
//! Employees submit a screenshot, a balance and an account through a guided
//! form; admins mark requests as contacted and pay them; paid requests are
//! announced in a group chat.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, logging, validation, rate limiting
//! - `storage`: SQLite pool, migrations, payment and employee tables
//! - `workflow`: Request form, request lifecycle, roster, notifications
//! - `telegram`: Telegram bot integration and handlers

pub mod cli;
pub mod core;
pub mod storage;
pub mod telegram;
pub mod workflow;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult};
pub use storage::{create_pool, get_connection, DbConnection, DbPool, PaymentStore};
pub use workflow::{FormCollector, Notifier, RequestLifecycle, Roster};
