//! Notifier that records outgoing messages instead of sending them

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;
use telepay::workflow::{Keyboard, MessageRef, Notifier, NotifyError};

/// One recorded call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    Image {
        chat_id: i64,
        image_ref: String,
        caption: String,
        keyboard: Keyboard,
    },
    Text {
        chat_id: i64,
        text: String,
        keyboard: Keyboard,
    },
    Edit {
        message: MessageRef,
        caption: String,
        keyboard: Keyboard,
    },
    Delete {
        message: MessageRef,
    },
}

impl Outgoing {
    pub fn chat_id(&self) -> i64 {
        match self {
            Outgoing::Image { chat_id, .. } | Outgoing::Text { chat_id, .. } => *chat_id,
            Outgoing::Edit { message, .. } | Outgoing::Delete { message } => message.chat_id,
        }
    }

    /// Caption or text body
    pub fn body(&self) -> &str {
        match self {
            Outgoing::Image { caption, .. } | Outgoing::Edit { caption, .. } => caption,
            Outgoing::Text { text, .. } => text,
            Outgoing::Delete { .. } => "",
        }
    }
}

/// Records every call; chats marked as unreachable fail every send
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Outgoing>>,
    unreachable: Mutex<HashSet<i64>>,
    next_message_id: AtomicI32,
    /// (chat whose images wait, chat whose text releases them)
    image_gate: Mutex<Option<(i64, i64)>>,
    released: Notify,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn make_unreachable(&self, chat_id: i64) {
        self.unreachable.lock().unwrap().insert(chat_id);
    }

    /// Images to `gated_chat` block until a text reaches `release_chat`
    pub fn hold_images_until_text(&self, gated_chat: i64, release_chat: i64) {
        *self.image_gate.lock().unwrap() = Some((gated_chat, release_chat));
    }

    pub fn sent(&self) -> Vec<Outgoing> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, chat_id: i64) -> Vec<Outgoing> {
        self.sent().into_iter().filter(|m| m.chat_id() == chat_id).collect()
    }

    pub fn images_to(&self, chat_id: i64) -> Vec<Outgoing> {
        self.sent_to(chat_id)
            .into_iter()
            .filter(|m| matches!(m, Outgoing::Image { .. }))
            .collect()
    }

    pub fn last_text_to(&self, chat_id: i64) -> Option<String> {
        self.sent_to(chat_id).into_iter().rev().find_map(|m| match m {
            Outgoing::Text { text, .. } => Some(text),
            _ => None,
        })
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    fn deliver(&self, chat_id: i64, outgoing: Outgoing) -> Result<MessageRef, NotifyError> {
        if self.unreachable.lock().unwrap().contains(&chat_id) {
            return Err(NotifyError(format!("chat {} is unreachable", chat_id)));
        }
        self.sent.lock().unwrap().push(outgoing);
        Ok(MessageRef {
            chat_id,
            message_id: self.next_message_id.fetch_add(1, Ordering::SeqCst) + 1,
        })
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_image(
        &self,
        chat_id: i64,
        image_ref: &str,
        caption: &str,
        keyboard: Keyboard,
    ) -> Result<MessageRef, NotifyError> {
        let gated = matches!(*self.image_gate.lock().unwrap(), Some((gated, _)) if gated == chat_id);
        if gated {
            self.released.notified().await;
        }
        self.deliver(
            chat_id,
            Outgoing::Image {
                chat_id,
                image_ref: image_ref.to_string(),
                caption: caption.to_string(),
                keyboard,
            },
        )
    }

    async fn send_text(&self, chat_id: i64, text: &str, keyboard: Keyboard) -> Result<MessageRef, NotifyError> {
        let releases = matches!(*self.image_gate.lock().unwrap(), Some((_, release)) if release == chat_id);
        if releases {
            self.released.notify_one();
        }
        self.deliver(
            chat_id,
            Outgoing::Text {
                chat_id,
                text: text.to_string(),
                keyboard,
            },
        )
    }

    async fn edit_caption(&self, message: MessageRef, caption: &str, keyboard: Keyboard) -> Result<(), NotifyError> {
        self.deliver(
            message.chat_id,
            Outgoing::Edit {
                message,
                caption: caption.to_string(),
                keyboard,
            },
        )
        .map(|_| ())
    }

    async fn delete_message(&self, message: MessageRef) -> Result<(), NotifyError> {
        self.deliver(message.chat_id, Outgoing::Delete { message }).map(|_| ())
    }
}
