//! Admin-driven changes to the employee roster.

use std::sync::Arc;

use thiserror::Error;

use crate::core::error::AppError;
use crate::storage::{Employee, PaymentStore};
use crate::workflow::notify::{Keyboard, Notifier};
use crate::workflow::Recipients;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("You do not have permission for this action")]
    NotAdmin,

    #[error("User {0} is already an employee")]
    AlreadyEmployee(i64),

    #[error("User {0} is not an employee")]
    NotEmployee(i64),

    #[error("Storage failure: {0}")]
    Storage(String),
}

impl From<AppError> for RosterError {
    fn from(err: AppError) -> Self {
        RosterError::Storage(err.to_string())
    }
}

/// Counts from a bulk import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub added: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct Roster {
    store: PaymentStore,
    notifier: Arc<dyn Notifier>,
    recipients: Arc<Recipients>,
}

impl Roster {
    pub fn new(store: PaymentStore, notifier: Arc<dyn Notifier>, recipients: Arc<Recipients>) -> Self {
        Self {
            store,
            notifier,
            recipients,
        }
    }

    fn require_admin(&self, actor_id: i64) -> Result<(), RosterError> {
        if self.recipients.is_admin(actor_id) {
            Ok(())
        } else {
            Err(RosterError::NotAdmin)
        }
    }

    pub fn list(&self, actor_id: i64) -> Result<Vec<Employee>, RosterError> {
        self.require_admin(actor_id)?;
        Ok(self.store.list_active_employees())
    }

    /// Adds (or reactivates) an employee and tells them they now have access.
    pub async fn add(
        &self,
        actor_id: i64,
        user_id: i64,
        username: Option<&str>,
        first_name: Option<&str>,
    ) -> Result<(), RosterError> {
        self.require_admin(actor_id)?;
        if self.store.is_active_employee(user_id) {
            return Err(RosterError::AlreadyEmployee(user_id));
        }

        self.store.upsert_employee(user_id, username, first_name, actor_id)?;
        log::info!("Employee {} added by admin {}", user_id, actor_id);

        let text = "🎉 <b>Welcome aboard!</b>\n\nYou have been added as an employee and can now submit payment requests.\n\nSend /start to begin.";
        if let Err(e) = self.notifier.send_text(user_id, text, Keyboard::MainMenu).await {
            log::warn!("Could not notify new employee {}: {}", user_id, e);
        }
        Ok(())
    }

    /// Deactivates an employee and tells them their access was revoked.
    pub async fn remove(&self, actor_id: i64, user_id: i64) -> Result<(), RosterError> {
        self.require_admin(actor_id)?;
        if !self.store.deactivate_employee(user_id)? {
            return Err(RosterError::NotEmployee(user_id));
        }
        log::info!("Employee {} removed by admin {}", user_id, actor_id);

        let text = "ℹ️ <b>Notice</b>\n\nYour access to payment requests has been revoked.\nContact an admin if you have questions.";
        if let Err(e) = self.notifier.send_text(user_id, text, Keyboard::None).await {
            log::warn!("Could not notify removed employee {}: {}", user_id, e);
        }
        Ok(())
    }
}

/// Imports ids without notifying anyone, skipping those already active.
pub fn import_employees(store: &PaymentStore, user_ids: &[i64], added_by: i64) -> ImportReport {
    let mut report = ImportReport::default();
    for &user_id in user_ids {
        if store.is_active_employee(user_id) {
            log::info!("Employee {} already active, skipping", user_id);
            report.skipped += 1;
            continue;
        }
        match store.upsert_employee(user_id, None, None, added_by) {
            Ok(()) => {
                log::info!("Employee {} imported", user_id);
                report.added += 1;
            }
            Err(e) => {
                log::error!("Failed to import employee {}: {}", user_id, e);
                report.failed += 1;
            }
        }
    }
    report
}
