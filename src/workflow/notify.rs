//! Outgoing messages, as seen by the workflow.
//!
//! The workflow has no teloxide dependency: it talks to a [`Notifier`] with
//! chat ids, opaque image references and a transport-neutral [`Keyboard`].
//! Every call may fail on its own; callers decide whether a failure matters.

use async_trait::async_trait;
use futures_util::future::join_all;
use thiserror::Error;

/// Address of a message that was sent earlier and may be edited later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i32,
}

/// Buttons attached to an outgoing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyboard {
    /// No markup; an existing inline keyboard is removed on edit
    None,
    /// Employee reply menu (new request / my requests)
    MainMenu,
    /// Admin reply menu
    AdminMenu,
    /// Reply keyboard with a single cancel button
    Cancel,
    /// Confirm / cancel under a draft preview
    ConfirmDraft,
    /// Contacted + quick-pay buttons under an admin's copy of a request
    AdminActions { request_id: i64, acknowledged: bool },
    /// Delete button under the requester's copy of a request
    RequesterActions { request_id: i64 },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_image(
        &self,
        chat_id: i64,
        image_ref: &str,
        caption: &str,
        keyboard: Keyboard,
    ) -> Result<MessageRef, NotifyError>;

    async fn send_text(&self, chat_id: i64, text: &str, keyboard: Keyboard) -> Result<MessageRef, NotifyError>;

    async fn edit_caption(&self, message: MessageRef, caption: &str, keyboard: Keyboard) -> Result<(), NotifyError>;

    async fn delete_message(&self, message: MessageRef) -> Result<(), NotifyError>;
}

/// Sends the same image to every recipient concurrently.
///
/// Failures are logged per recipient. Returns the messages that were delivered.
pub async fn broadcast_image(
    notifier: &dyn Notifier,
    recipients: &[i64],
    image_ref: &str,
    caption: &str,
    keyboard: Keyboard,
) -> Vec<MessageRef> {
    let sends = recipients
        .iter()
        .map(|&chat_id| async move { (chat_id, notifier.send_image(chat_id, image_ref, caption, keyboard).await) });

    join_all(sends)
        .await
        .into_iter()
        .filter_map(|(chat_id, result)| match result {
            Ok(message) => Some(message),
            Err(e) => {
                log::error!("Failed to notify chat {}: {}", chat_id, e);
                None
            }
        })
        .collect()
}

/// Sends a text to every recipient concurrently. Returns how many were delivered.
pub async fn broadcast_text(notifier: &dyn Notifier, recipients: &[i64], text: &str, keyboard: Keyboard) -> usize {
    let sends = recipients
        .iter()
        .map(|&chat_id| async move { (chat_id, notifier.send_text(chat_id, text, keyboard).await) });

    join_all(sends)
        .await
        .into_iter()
        .filter(|(chat_id, result)| match result {
            Ok(_) => true,
            Err(e) => {
                log::warn!("Failed to notify chat {}: {}", chat_id, e);
                false
            }
        })
        .count()
}
