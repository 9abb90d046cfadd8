//! Admin and requester transitions on a stored payment request.
//!
//! `pending` is the only state that accepts changes. Approval moves it to the
//! terminal `paid` state; acknowledgement flips a flag once while pending;
//! deletion removes it, and only its requester may do that. Every guard is
//! re-checked by the conditional SQL write, so a stale read can never turn a
//! paid request back into something else.

use std::sync::Arc;

use futures_util::future::{join, join3};
use thiserror::Error;

use crate::core::config::payment::MAX_AMOUNT;
use crate::core::config::stats::{DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS};
use crate::core::error::AppError;
use crate::storage::{PaymentRequest, PaymentStats, PaymentStatus, PaymentStore};
use crate::workflow::captions;
use crate::workflow::notify::{Keyboard, MessageRef, Notifier, NotifyError};
use crate::workflow::Recipients;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("You do not have permission for this action")]
    NotAdmin,

    #[error("Request #{0} was not found")]
    NotFound(i64),

    #[error("Request #{0} is already paid")]
    AlreadyPaid(i64),

    #[error("Request #{0} is already marked as contacted")]
    AlreadyAcknowledged(i64),

    #[error("Amount {0} is invalid, it must be between 1 and {max}", max = MAX_AMOUNT)]
    InvalidAmount(i64),

    #[error("Request #{0} belongs to another employee")]
    NotOwner(i64),

    #[error("Request #{0} could not be deleted, please try again")]
    NotDeletable(i64),

    #[error("Storage failure: {0}")]
    Storage(String),
}

impl From<AppError> for LifecycleError {
    fn from(err: AppError) -> Self {
        LifecycleError::Storage(err.to_string())
    }
}

/// Result of a committed approval.
#[derive(Debug)]
pub struct Approval {
    /// The request as stored after the transition
    pub request: PaymentRequest,
    pub amount: i64,
    /// Set when the group chat could not be notified; the payment still stands
    pub group_warning: Option<NotifyError>,
}

#[derive(Clone)]
pub struct RequestLifecycle {
    store: PaymentStore,
    notifier: Arc<dyn Notifier>,
    recipients: Arc<Recipients>,
}

impl RequestLifecycle {
    pub fn new(store: PaymentStore, notifier: Arc<dyn Notifier>, recipients: Arc<Recipients>) -> Self {
        Self {
            store,
            notifier,
            recipients,
        }
    }

    /// Marks a pending request as contacted and re-captions both its admin and requester copies.
    ///
    /// `admin_view` is the admin message the action came from, if any.
    pub async fn acknowledge(
        &self,
        id: i64,
        actor_id: i64,
        admin_view: Option<MessageRef>,
    ) -> Result<PaymentRequest, LifecycleError> {
        if !self.recipients.is_admin(actor_id) {
            return Err(LifecycleError::NotAdmin);
        }

        let mut request = self.store.get_request(id).ok_or(LifecycleError::NotFound(id))?;
        if !request.is_pending() {
            return Err(LifecycleError::AlreadyPaid(id));
        }
        if request.acknowledged {
            return Err(LifecycleError::AlreadyAcknowledged(id));
        }

        if !self.store.mark_acknowledged(id)? {
            return Err(self.explain_unchanged(id, LifecycleError::AlreadyAcknowledged(id)));
        }
        request.acknowledged = true;
        log::info!("Request {} acknowledged by admin {}", id, actor_id);

        let admin_caption = captions::admin_request(&request);
        let admin_update = async {
            let Some(view) = admin_view else { return };
            let keyboard = Keyboard::AdminActions {
                request_id: id,
                acknowledged: true,
            };
            if let Err(e) = self.notifier.edit_caption(view, &admin_caption, keyboard).await {
                log::warn!("Failed to update admin view of request {}: {}", id, e);
            }
        };

        let requester_caption = captions::requester_request(&request);
        let requester_view = request.requester_message_id.map(|message_id| MessageRef {
            chat_id: request.requester_id,
            message_id,
        });
        let requester_update = async {
            let Some(view) = requester_view else { return };
            if let Err(e) = self.notifier.edit_caption(view, &requester_caption, Keyboard::None).await {
                log::warn!("Failed to update requester view of request {}: {}", id, e);
            }
        };

        join(admin_update, requester_update).await;

        Ok(request)
    }

    /// Pays a pending request.
    ///
    /// The transition commits before any notification is sent. A group chat
    /// failure is returned as a warning; a requester failure is only logged.
    pub async fn approve(
        &self,
        id: i64,
        actor_id: i64,
        amount: i64,
        admin_view: Option<MessageRef>,
    ) -> Result<Approval, LifecycleError> {
        if !self.recipients.is_admin(actor_id) {
            return Err(LifecycleError::NotAdmin);
        }
        if !(1..=MAX_AMOUNT).contains(&amount) {
            return Err(LifecycleError::InvalidAmount(amount));
        }

        let request = self.store.get_request(id).ok_or(LifecycleError::NotFound(id))?;
        if !request.is_pending() {
            return Err(LifecycleError::AlreadyPaid(id));
        }

        if !self.store.set_status(id, PaymentStatus::Paid, Some(amount))? {
            return Err(self.explain_unchanged(id, LifecycleError::AlreadyPaid(id)));
        }
        log::info!("Request {} paid ({}) by admin {}", id, amount, actor_id);

        let request = self.store.get_request(id).unwrap_or_else(|| PaymentRequest {
            status: PaymentStatus::Paid,
            payment_amount: Some(amount),
            paid_at: Some(chrono::Utc::now()),
            ..request
        });

        // The three notices are independent; none of them waits for another
        let admin_caption = captions::admin_paid(&request, amount);
        let admin_update = async {
            let Some(view) = admin_view else { return };
            if let Err(e) = self.notifier.edit_caption(view, &admin_caption, Keyboard::None).await {
                log::warn!("Failed to update admin view of request {}: {}", id, e);
            }
        };

        let group_caption = captions::group_paid(&request, amount);
        let group_notice = self.notifier.send_image(
            self.recipients.group_chat_id,
            &request.image_ref,
            &group_caption,
            Keyboard::None,
        );

        let requester_text = captions::requester_paid(&request, amount);
        let requester_notice = async {
            if let Err(e) = self
                .notifier
                .send_text(request.requester_id, &requester_text, Keyboard::None)
                .await
            {
                log::debug!("Could not notify requester {} about request {}: {}", request.requester_id, id, e);
            }
        };

        let ((), group_result, ()) = join3(admin_update, group_notice, requester_notice).await;
        let group_warning = match group_result {
            Ok(_) => None,
            Err(e) => {
                log::warn!("Request {} paid but group chat notification failed: {}", id, e);
                Some(e)
            }
        };

        Ok(Approval {
            request,
            amount,
            group_warning,
        })
    }

    /// Deletes a pending request on behalf of its requester.
    ///
    /// The delete itself is a single conditional statement; when it removes
    /// nothing, the row is re-read only to pick the denial.
    ///
    /// `view` is the requester's message showing the request; it is re-captioned on success.
    pub async fn delete(&self, id: i64, actor_id: i64, view: Option<MessageRef>) -> Result<(), LifecycleError> {
        if !self.store.delete_request(id, actor_id)? {
            return Err(match self.store.get_request(id) {
                None => LifecycleError::NotFound(id),
                Some(request) if request.requester_id != actor_id => LifecycleError::NotOwner(id),
                Some(request) if !request.is_pending() => LifecycleError::AlreadyPaid(id),
                Some(_) => LifecycleError::NotDeletable(id),
            });
        }
        log::info!("Request {} deleted by requester {}", id, actor_id);

        if let Some(view) = view {
            if let Err(e) = self
                .notifier
                .edit_caption(view, &captions::deleted(id), Keyboard::None)
                .await
            {
                log::warn!("Failed to update view of deleted request {}: {}", id, e);
            }
        }
        Ok(())
    }

    /// Paid totals over the last `days` (default 30, clamped to 1..=365).
    pub fn statistics(&self, actor_id: i64, days: Option<u32>) -> Result<PaymentStats, LifecycleError> {
        if !self.recipients.is_admin(actor_id) {
            return Err(LifecycleError::NotAdmin);
        }
        let days = days.unwrap_or(DEFAULT_WINDOW_DAYS).clamp(1, MAX_WINDOW_DAYS);
        Ok(self.store.statistics(days))
    }

    /// Picks the denial for a conditional write that matched no row.
    fn explain_unchanged(&self, id: i64, otherwise: LifecycleError) -> LifecycleError {
        match self.store.get_request(id) {
            None => LifecycleError::NotFound(id),
            Some(request) if !request.is_pending() => LifecycleError::AlreadyPaid(id),
            Some(_) => otherwise,
        }
    }
}
