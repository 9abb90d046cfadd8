//! Handler types and dependencies

use std::sync::Arc;

use teloxide::types::User;

use crate::core::rate_limiter::RateLimiter;
use crate::storage::PaymentStore;
use crate::workflow::{Actor, FormCollector, Notifier, Recipients, RequestLifecycle, Roster};

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub store: PaymentStore,
    pub notifier: Arc<dyn Notifier>,
    pub recipients: Arc<Recipients>,
    pub form: Arc<FormCollector>,
    pub lifecycle: RequestLifecycle,
    pub roster: Roster,
}

impl HandlerDeps {
    /// Wires the workflow components around one store and one notifier
    pub fn new(
        store: PaymentStore,
        notifier: Arc<dyn Notifier>,
        recipients: Arc<Recipients>,
        rate_limiter: RateLimiter,
    ) -> Self {
        let form = Arc::new(FormCollector::new(
            store.clone(),
            Arc::clone(&notifier),
            rate_limiter,
            Arc::clone(&recipients),
        ));
        let lifecycle = RequestLifecycle::new(store.clone(), Arc::clone(&notifier), Arc::clone(&recipients));
        let roster = Roster::new(store.clone(), Arc::clone(&notifier), Arc::clone(&recipients));

        Self {
            store,
            notifier,
            recipients,
            form,
            lifecycle,
            roster,
        }
    }
}

/// Workflow actor for a Telegram user
pub fn actor_of(user: &User) -> Actor {
    Actor::new(i64::try_from(user.id.0).unwrap_or(0), user.username.clone())
}

/// How to answer a button press
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallbackReply {
    pub text: Option<String>,
    pub alert: bool,
}

impl CallbackReply {
    /// Short toast at the top of the chat
    pub fn toast(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            alert: false,
        }
    }

    /// Modal alert the user has to dismiss
    pub fn alert(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            alert: true,
        }
    }
}
