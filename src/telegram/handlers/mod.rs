//! Telegram bot handler tree configuration
//!
//! Handlers translate updates into workflow calls; all outgoing messages go
//! through the injected notifier, so integration tests can run the same
//! workflow against a recording double.

mod admin;
mod employee;
mod schema;
mod types;

pub use admin::{parse_pay_args, parse_stats_args};
pub use employee::form_input;
pub use schema::schema;
pub use types::{actor_of, CallbackReply, HandlerDeps, HandlerError};
