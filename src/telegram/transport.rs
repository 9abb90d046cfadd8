//! [`Notifier`] over the Telegram Bot API.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{FileId, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MessageId, ParseMode};

use crate::telegram::keyboards::{inline_markup, reply_markup};
use crate::workflow::{Keyboard, MessageRef, Notifier, NotifyError};

#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn message_ref(msg: &Message) -> MessageRef {
    MessageRef {
        chat_id: msg.chat.id.0,
        message_id: msg.id.0,
    }
}

fn transport_error(e: teloxide::RequestError) -> NotifyError {
    NotifyError(e.to_string())
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_image(
        &self,
        chat_id: i64,
        image_ref: &str,
        caption: &str,
        keyboard: Keyboard,
    ) -> Result<MessageRef, NotifyError> {
        let mut request = self
            .bot
            .send_photo(ChatId(chat_id), InputFile::file_id(FileId(image_ref.to_string())))
            .caption(caption)
            .parse_mode(ParseMode::Html);
        if let Some(markup) = reply_markup(keyboard) {
            request = request.reply_markup(markup);
        }
        let sent = request.await.map_err(transport_error)?;
        Ok(message_ref(&sent))
    }

    async fn send_text(&self, chat_id: i64, text: &str, keyboard: Keyboard) -> Result<MessageRef, NotifyError> {
        let mut request = self.bot.send_message(ChatId(chat_id), text).parse_mode(ParseMode::Html);
        if let Some(markup) = reply_markup(keyboard) {
            request = request.reply_markup(markup);
        }
        let sent = request.await.map_err(transport_error)?;
        Ok(message_ref(&sent))
    }

    async fn edit_caption(&self, message: MessageRef, caption: &str, keyboard: Keyboard) -> Result<(), NotifyError> {
        // An empty inline keyboard removes the buttons of the edited message
        let markup = inline_markup(keyboard)
            .unwrap_or_else(|| InlineKeyboardMarkup::new(Vec::<Vec<InlineKeyboardButton>>::new()));
        self.bot
            .edit_message_caption(ChatId(message.chat_id), MessageId(message.message_id))
            .caption(caption)
            .parse_mode(ParseMode::Html)
            .reply_markup(markup)
            .await
            .map_err(transport_error)?;
        Ok(())
    }

    async fn delete_message(&self, message: MessageRef) -> Result<(), NotifyError> {
        self.bot
            .delete_message(ChatId(message.chat_id), MessageId(message.message_id))
            .await
            .map_err(transport_error)?;
        Ok(())
    }
}
