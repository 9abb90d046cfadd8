//! Shared environment: temporary database, recording notifier, wired workflow

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use telepay::core::rate_limiter::RateLimiter;
use telepay::storage::PaymentStore;
use telepay::telegram::HandlerDeps;
use telepay::workflow::{Actor, FormInput, FormOutcome, Notifier, Recipients};

use super::recorder::RecordingNotifier;

pub const ADMIN_A: i64 = 1001;
pub const ADMIN_B: i64 = 1002;
pub const EMPLOYEE: i64 = 2001;
pub const OUTSIDER: i64 = 3001;
pub const GROUP_CHAT: i64 = -100_500;

pub struct TestEnvironment {
    // Keeps the database file alive for the duration of the test
    _dir: TempDir,
    pub store: PaymentStore,
    pub notifier: Arc<RecordingNotifier>,
    pub deps: HandlerDeps,
}

impl TestEnvironment {
    /// Two admins, one active employee, three requests per five minutes
    pub fn new() -> Self {
        Self::with_rate_limit(3, Duration::from_secs(300))
    }

    pub fn with_rate_limit(max_requests: usize, window: Duration) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telepay.sqlite");
        let store = PaymentStore::open(path.to_str().unwrap()).unwrap();
        store.upsert_employee(EMPLOYEE, Some("worker"), Some("Wanda"), ADMIN_A).unwrap();

        let notifier = Arc::new(RecordingNotifier::new());
        let dyn_notifier: Arc<dyn Notifier> = notifier.clone();
        let recipients = Arc::new(Recipients::new(vec![ADMIN_A, ADMIN_B], GROUP_CHAT));
        let deps = HandlerDeps::new(
            store.clone(),
            dyn_notifier,
            recipients,
            RateLimiter::with_limits(max_requests, window),
        );

        Self {
            _dir: dir,
            store,
            notifier,
            deps,
        }
    }

    pub fn employee(&self) -> Actor {
        Actor::new(EMPLOYEE, Some("worker".to_string()))
    }

    pub async fn feed(&self, actor: &Actor, input: FormInput) -> FormOutcome {
        self.deps.form.handle(actor, input).await
    }

    /// Runs the whole form for the employee and returns the new request id
    pub async fn submit(&self, balance: &str, account: &str) -> i64 {
        let actor = self.employee();
        assert_eq!(self.feed(&actor, FormInput::Start).await, FormOutcome::Advanced);
        assert_eq!(
            self.feed(&actor, FormInput::Image("photo-file-id".to_string())).await,
            FormOutcome::Advanced
        );
        assert_eq!(self.feed(&actor, FormInput::Text(balance.to_string())).await, FormOutcome::Advanced);
        assert_eq!(self.feed(&actor, FormInput::Text(account.to_string())).await, FormOutcome::Advanced);
        match self.feed(&actor, FormInput::Confirm).await {
            FormOutcome::Submitted { request_id, .. } => request_id,
            other => panic!("expected a submitted request, got {:?}", other),
        }
    }
}
