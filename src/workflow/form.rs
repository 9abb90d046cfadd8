//! Guided, per-user collection of a new payment request.
//!
//! ```text
//! Idle -> AwaitingImage -> AwaitingBalance -> AwaitingAccount -> Confirming -> Idle
//! ```
//!
//! Cancel returns any non-idle state to `Idle`. Each transition is computed
//! while holding the user's map entry, and messages are sent only after the
//! entry is released, so duplicate deliveries of one event cannot both commit.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;

use crate::core::rate_limiter::RateLimiter;
use crate::core::validation::{validate_account, validate_balance, ValidationError};
use crate::storage::{NewPaymentRequest, PaymentRequest, PaymentStatus, PaymentStore};
use crate::workflow::captions;
use crate::workflow::notify::{broadcast_image, Keyboard, MessageRef, Notifier};
use crate::workflow::{Actor, Recipients};

/// Fields collected so far, complete once the account is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub image_ref: String,
    pub balance: String,
    pub account: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormState {
    #[default]
    Idle,
    AwaitingImage,
    AwaitingBalance {
        image_ref: String,
    },
    AwaitingAccount {
        image_ref: String,
        balance: String,
    },
    Confirming {
        draft: Draft,
        /// Preview message carrying the confirm/cancel buttons
        preview: Option<MessageRef>,
    },
}

impl FormState {
    pub fn is_idle(&self) -> bool {
        matches!(self, FormState::Idle)
    }
}

/// One user event, already stripped of transport details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormInput {
    /// "New request" pressed
    Start,
    /// A photo; carries the opaque file reference
    Image(String),
    /// Any other text
    Text(String),
    /// Anything else (stickers, documents, ...)
    Other,
    /// Confirm button under the preview
    Confirm,
    /// Cancel button or cancel text, from any state
    Cancel,
}

/// What handling an input did, mostly for callers that answer button presses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// Not meant for the form: the user is idle, or a stale button
    Ignored,
    NotEmployee,
    RateLimited,
    /// Moved to the next step
    Advanced,
    /// Input rejected, step repeated
    Reprompted,
    Submitted { request_id: i64, admins_notified: usize },
    Cancelled,
    /// Storage or transport failure; the form was reset
    Failed,
}

/// Side effect chosen by a transition, carried out after the state is stored.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Ignore,
    AskImage,
    AskBalance,
    AskAccount,
    ExpectImage,
    ExpectText,
    Invalid(ValidationError),
    Preview(Draft),
    UseButtons,
    Commit(Draft, Option<MessageRef>),
    Cancel(Option<MessageRef>),
}

/// Pure transition for everything except the start guards.
fn transition(state: FormState, input: FormInput) -> (FormState, Step) {
    use FormState::*;

    match (state, input) {
        (Idle, FormInput::Cancel) => (Idle, Step::Ignore),
        (Confirming { preview, .. }, FormInput::Cancel) => (Idle, Step::Cancel(preview)),
        (_, FormInput::Cancel) => (Idle, Step::Cancel(None)),

        (_, FormInput::Start) => (AwaitingImage, Step::AskImage),

        (AwaitingImage, FormInput::Image(image_ref)) => (AwaitingBalance { image_ref }, Step::AskBalance),
        (AwaitingImage, _) => (AwaitingImage, Step::ExpectImage),

        (AwaitingBalance { image_ref }, FormInput::Text(text)) => match validate_balance(&text) {
            Ok(balance) => (AwaitingAccount { image_ref, balance }, Step::AskAccount),
            Err(e) => (AwaitingBalance { image_ref }, Step::Invalid(e)),
        },
        (state @ AwaitingBalance { .. }, _) => (state, Step::ExpectText),

        (AwaitingAccount { image_ref, balance }, FormInput::Text(text)) => match validate_account(&text) {
            Ok(account) => {
                let draft = Draft {
                    image_ref,
                    balance,
                    account,
                };
                (
                    Confirming {
                        draft: draft.clone(),
                        preview: None,
                    },
                    Step::Preview(draft),
                )
            }
            Err(e) => (AwaitingAccount { image_ref, balance }, Step::Invalid(e)),
        },
        (state @ AwaitingAccount { .. }, _) => (state, Step::ExpectText),

        (Confirming { draft, preview }, FormInput::Confirm) => (Idle, Step::Commit(draft, preview)),
        (state @ Confirming { .. }, _) => (state, Step::UseButtons),

        (Idle, _) => (Idle, Step::Ignore),
    }
}

pub struct FormCollector {
    states: DashMap<i64, FormState>,
    store: PaymentStore,
    notifier: Arc<dyn Notifier>,
    limiter: RateLimiter,
    recipients: Arc<Recipients>,
}

impl FormCollector {
    pub fn new(
        store: PaymentStore,
        notifier: Arc<dyn Notifier>,
        limiter: RateLimiter,
        recipients: Arc<Recipients>,
    ) -> Self {
        Self {
            states: DashMap::new(),
            store,
            notifier,
            limiter,
            recipients,
        }
    }

    /// Current state of a user's form.
    pub fn state(&self, user_id: i64) -> FormState {
        self.states.get(&user_id).map(|s| s.clone()).unwrap_or_default()
    }

    /// Applies the transition under the user's entry lock and returns the side effect.
    fn apply(&self, user_id: i64, input: FormInput) -> Step {
        let mut entry = self.states.entry(user_id).or_default();
        let (next, step) = transition(std::mem::take(&mut *entry), input);
        *entry = next;
        drop(entry);
        self.states.remove_if(&user_id, |_, state| state.is_idle());
        step
    }

    fn reset(&self, user_id: i64) {
        self.states.remove(&user_id);
    }

    pub async fn handle(&self, actor: &Actor, input: FormInput) -> FormOutcome {
        if input == FormInput::Start {
            if !self.store.is_active_employee(actor.id) {
                self.say(actor.id, "❌ You do not have access to this function.", Keyboard::None)
                    .await;
                return FormOutcome::NotEmployee;
            }
            if !self.limiter.check(actor.id).await {
                let wait = self.limiter.remaining_time(actor.id).await.unwrap_or_default().as_secs().max(1);
                log::info!("Rate limit hit for user {}", actor.id);
                let text = format!("⏳ Too many requests. Please try again in {} seconds.", wait);
                self.say(actor.id, &text, Keyboard::None).await;
                return FormOutcome::RateLimited;
            }
        }

        match self.apply(actor.id, input) {
            Step::Ignore => FormOutcome::Ignored,
            Step::AskImage => {
                self.say(
                    actor.id,
                    "📸 <b>Step 1/3: Screenshot</b>\n\nSend a screenshot (photo).\n\nPress the button below to cancel.",
                    Keyboard::Cancel,
                )
                .await;
                FormOutcome::Advanced
            }
            Step::AskBalance => {
                self.say(
                    actor.id,
                    "💰 <b>Step 2/3: Balance</b>\n\nSend the balance.\n\nExample: 100$",
                    Keyboard::Cancel,
                )
                .await;
                FormOutcome::Advanced
            }
            Step::AskAccount => {
                self.say(
                    actor.id,
                    "🔑 <b>Step 3/3: Account</b>\n\nSend the account username.\n\nExample: @username or username",
                    Keyboard::Cancel,
                )
                .await;
                FormOutcome::Advanced
            }
            Step::ExpectImage => {
                self.say(actor.id, "❌ Please send a photo (screenshot).", Keyboard::Cancel)
                    .await;
                FormOutcome::Reprompted
            }
            Step::ExpectText => {
                self.say(actor.id, "❌ Please send a text message.", Keyboard::Cancel).await;
                FormOutcome::Reprompted
            }
            Step::Invalid(e) => {
                let text = format!("❌ {}\n\nPlease try again.", e);
                self.say(actor.id, &text, Keyboard::Cancel).await;
                FormOutcome::Reprompted
            }
            Step::UseButtons => {
                self.say(
                    actor.id,
                    "Please confirm or cancel the request using the buttons above.",
                    Keyboard::None,
                )
                .await;
                FormOutcome::Reprompted
            }
            Step::Preview(draft) => self.preview(actor, draft).await,
            Step::Commit(draft, preview) => self.commit(actor, draft, preview).await,
            Step::Cancel(preview) => {
                if let Some(preview) = preview {
                    if let Err(e) = self.notifier.delete_message(preview).await {
                        log::debug!("Could not delete preview for user {}: {}", actor.id, e);
                    }
                }
                self.say(actor.id, "❌ Request cancelled.", Keyboard::MainMenu).await;
                FormOutcome::Cancelled
            }
        }
    }

    async fn preview(&self, actor: &Actor, draft: Draft) -> FormOutcome {
        let caption = captions::draft_preview(&draft.balance, &draft.account);
        match self
            .notifier
            .send_image(actor.id, &draft.image_ref, &caption, Keyboard::ConfirmDraft)
            .await
        {
            Ok(sent) => {
                if let Some(mut state) = self.states.get_mut(&actor.id) {
                    if let FormState::Confirming {
                        draft: pending,
                        preview,
                    } = &mut *state
                    {
                        if *pending == draft {
                            *preview = Some(sent);
                        }
                    }
                }
                FormOutcome::Advanced
            }
            Err(e) => {
                log::error!("Failed to show preview to user {}: {}", actor.id, e);
                self.reset(actor.id);
                self.say(actor.id, "❌ Something went wrong. Please start again.", Keyboard::MainMenu)
                    .await;
                FormOutcome::Failed
            }
        }
    }

    async fn commit(&self, actor: &Actor, draft: Draft, preview: Option<MessageRef>) -> FormOutcome {
        let new_request = NewPaymentRequest {
            requester_id: actor.id,
            requester_username: actor.username.clone(),
            balance: draft.balance.clone(),
            account: draft.account.clone(),
            image_ref: draft.image_ref.clone(),
        };

        let request_id = match self.store.create_request(&new_request) {
            Ok(id) => id,
            Err(e) => {
                log::error!("Failed to save request of user {}: {}", actor.id, e);
                self.say(
                    actor.id,
                    "❌ Could not save your request. Please try again later.",
                    Keyboard::MainMenu,
                )
                .await;
                return FormOutcome::Failed;
            }
        };
        log::info!("Request {} created by user {}", request_id, actor.id);

        let request = self.store.get_request(request_id).unwrap_or_else(|| PaymentRequest {
            id: request_id,
            requester_id: new_request.requester_id,
            requester_username: new_request.requester_username.clone(),
            balance: new_request.balance.clone(),
            account: new_request.account.clone(),
            image_ref: new_request.image_ref.clone(),
            status: PaymentStatus::Pending,
            payment_amount: None,
            acknowledged: false,
            requester_message_id: None,
            created_at: Utc::now(),
            paid_at: None,
        });

        let delivered = broadcast_image(
            self.notifier.as_ref(),
            &self.recipients.admin_ids,
            &request.image_ref,
            &captions::admin_request(&request),
            Keyboard::AdminActions {
                request_id,
                acknowledged: false,
            },
        )
        .await;
        if delivered.is_empty() {
            log::warn!("Request {} reached no admin", request_id);
            self.say(
                actor.id,
                "⚠️ Your request was saved, but no admin could be notified. Please contact an admin directly.",
                Keyboard::None,
            )
            .await;
        }

        if let Some(preview) = preview {
            let caption = captions::submitted(request_id, &draft.balance, &draft.account);
            match self.notifier.edit_caption(preview, &caption, Keyboard::None).await {
                Ok(()) => {
                    if let Err(e) = self.store.set_requester_message(request_id, preview.message_id) {
                        log::error!("Failed to store message of request {}: {}", request_id, e);
                    }
                }
                Err(e) => log::warn!("Failed to update preview of request {}: {}", request_id, e),
            }
        }

        self.say(actor.id, "Choose an action:", Keyboard::MainMenu).await;

        FormOutcome::Submitted {
            request_id,
            admins_notified: delivered.len(),
        }
    }

    async fn say(&self, chat_id: i64, text: &str, keyboard: Keyboard) {
        if let Err(e) = self.notifier.send_text(chat_id, text, keyboard).await {
            log::warn!("Failed to message user {}: {}", chat_id, e);
        }
    }
}
