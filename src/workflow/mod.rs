//! Transport-independent request handling: the form that collects a request,
//! the lifecycle that acknowledges, pays or deletes it, and roster changes.

pub mod captions;
pub mod form;
pub mod lifecycle;
pub mod notify;
pub mod roster;

pub use form::{Draft, FormCollector, FormInput, FormOutcome, FormState};
pub use lifecycle::{Approval, LifecycleError, RequestLifecycle};
pub use notify::{Keyboard, MessageRef, Notifier, NotifyError};
pub use roster::{import_employees, ImportReport, Roster, RosterError};

use crate::core::config::BotConfig;

/// The user behind an incoming event. Private chats share the user's id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub username: Option<String>,
}

impl Actor {
    pub fn new(id: i64, username: Option<String>) -> Self {
        Self { id, username }
    }
}

/// Static admin allow-list and the group chat that receives paid notices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipients {
    pub admin_ids: Vec<i64>,
    pub group_chat_id: i64,
}

impl Recipients {
    pub fn new(admin_ids: Vec<i64>, group_chat_id: i64) -> Self {
        Self { admin_ids, group_chat_id }
    }

    pub fn from_config(config: &BotConfig) -> Self {
        Self::new(config.admin_ids.clone(), config.group_chat_id)
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }
}
