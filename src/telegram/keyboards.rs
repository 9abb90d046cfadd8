//! Reply/inline markup and the callback-data codec.
//!
//! Callback strings keep the format used by earlier releases of the bot, so
//! buttons on messages sent before an upgrade keep working.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, ReplyMarkup};

use crate::core::config::payment::QUICK_AMOUNTS;
use crate::workflow::Keyboard;

pub const NEW_REQUEST: &str = "📝 New request";
pub const MY_REQUESTS: &str = "📋 My requests";
pub const CANCEL: &str = "❌ Cancel";
pub const STATISTICS: &str = "📊 Statistics";
pub const EMPLOYEES: &str = "👥 Employees";

/// Decoded inline button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    Acknowledge(i64),
    Pay { amount: i64, request_id: i64 },
    Delete(i64),
    ConfirmDraft,
    CancelDraft,
}

impl CallbackAction {
    pub fn encode(&self) -> String {
        match self {
            CallbackAction::Acknowledge(id) => format!("replied_{}", id),
            CallbackAction::Pay { amount, request_id } => format!("pay_{}_{}", amount, request_id),
            CallbackAction::Delete(id) => format!("delete_{}", id),
            CallbackAction::ConfirmDraft => "confirm_payment".to_string(),
            CallbackAction::CancelDraft => "cancel_payment".to_string(),
        }
    }

    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "confirm_payment" => return Some(CallbackAction::ConfirmDraft),
            "cancel_payment" => return Some(CallbackAction::CancelDraft),
            _ => {}
        }

        if let Some(rest) = data.strip_prefix("replied_") {
            return rest.parse().ok().map(CallbackAction::Acknowledge);
        }
        if let Some(rest) = data.strip_prefix("delete_") {
            return rest.parse().ok().map(CallbackAction::Delete);
        }
        if let Some(rest) = data.strip_prefix("pay_") {
            let (amount, request_id) = rest.split_once('_')?;
            return Some(CallbackAction::Pay {
                amount: amount.parse().ok()?,
                request_id: request_id.parse().ok()?,
            });
        }
        None
    }
}

fn button(label: impl Into<String>, action: CallbackAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, action.encode())
}

fn reply_keyboard(rows: &[&[&str]]) -> KeyboardMarkup {
    let rows: Vec<Vec<KeyboardButton>> = rows
        .iter()
        .map(|row| row.iter().map(|label| KeyboardButton::new(*label)).collect())
        .collect();
    KeyboardMarkup::new(rows).resize_keyboard()
}

/// Inline markup for a keyboard, or `None` for reply keyboards and no keyboard.
pub fn inline_markup(keyboard: Keyboard) -> Option<InlineKeyboardMarkup> {
    let rows = match keyboard {
        Keyboard::ConfirmDraft => vec![vec![
            button("✅ Confirm", CallbackAction::ConfirmDraft),
            button("❌ Cancel", CallbackAction::CancelDraft),
        ]],
        Keyboard::AdminActions {
            request_id,
            acknowledged,
        } => {
            let pay_row = QUICK_AMOUNTS
                .iter()
                .map(|&amount| button(format!("💵 Pay {}", amount), CallbackAction::Pay { amount, request_id }))
                .collect();
            if acknowledged {
                vec![pay_row]
            } else {
                vec![vec![button("✍️ Contacted", CallbackAction::Acknowledge(request_id))], pay_row]
            }
        }
        Keyboard::RequesterActions { request_id } => {
            vec![vec![button("🗑 Delete request", CallbackAction::Delete(request_id))]]
        }
        Keyboard::None | Keyboard::MainMenu | Keyboard::AdminMenu | Keyboard::Cancel => return None,
    };
    Some(InlineKeyboardMarkup::new(rows))
}

/// Markup attached to a newly sent message.
pub fn reply_markup(keyboard: Keyboard) -> Option<ReplyMarkup> {
    match keyboard {
        Keyboard::None => None,
        Keyboard::MainMenu => Some(reply_keyboard(&[&[NEW_REQUEST], &[MY_REQUESTS]]).into()),
        Keyboard::AdminMenu => Some(reply_keyboard(&[&[STATISTICS, EMPLOYEES], &[NEW_REQUEST, MY_REQUESTS]]).into()),
        Keyboard::Cancel => Some(reply_keyboard(&[&[CANCEL]]).into()),
        inline => inline_markup(inline).map(ReplyMarkup::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_legacy_callback_strings() {
        assert_eq!(CallbackAction::parse("replied_12"), Some(CallbackAction::Acknowledge(12)));
        assert_eq!(
            CallbackAction::parse("pay_25_7"),
            Some(CallbackAction::Pay {
                amount: 25,
                request_id: 7
            })
        );
        assert_eq!(CallbackAction::parse("delete_3"), Some(CallbackAction::Delete(3)));
        assert_eq!(CallbackAction::parse("confirm_payment"), Some(CallbackAction::ConfirmDraft));
        assert_eq!(CallbackAction::parse("cancel_payment"), Some(CallbackAction::CancelDraft));
    }

    #[test]
    fn rejects_malformed_data() {
        for data in ["", "pay_", "pay_15", "pay_x_1", "delete_", "replied_abc", "back_to_menu"] {
            assert_eq!(CallbackAction::parse(data), None, "{}", data);
        }
    }

    #[test]
    fn encode_matches_parse() {
        let action = CallbackAction::Pay {
            amount: 15,
            request_id: 99,
        };
        assert_eq!(action.encode(), "pay_15_99");
        assert_eq!(CallbackAction::parse(&action.encode()), Some(action));
    }

    #[test]
    fn acknowledged_admin_keyboard_drops_contacted_button() {
        let open = inline_markup(Keyboard::AdminActions {
            request_id: 1,
            acknowledged: false,
        })
        .unwrap();
        assert_eq!(open.inline_keyboard.len(), 2);
        assert_eq!(open.inline_keyboard[1].len(), QUICK_AMOUNTS.len());

        let done = inline_markup(Keyboard::AdminActions {
            request_id: 1,
            acknowledged: true,
        })
        .unwrap();
        assert_eq!(done.inline_keyboard.len(), 1);
    }

    #[test]
    fn reply_keyboards_are_not_inline() {
        assert!(inline_markup(Keyboard::MainMenu).is_none());
        assert!(reply_markup(Keyboard::MainMenu).is_some());
        assert!(reply_markup(Keyboard::None).is_none());
    }
}
