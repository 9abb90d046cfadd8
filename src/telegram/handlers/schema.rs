//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{actor_of, CallbackReply, HandlerDeps, HandlerError};
use super::{admin, employee};
use crate::telegram::bot::Command;
use crate::telegram::keyboards::{CallbackAction, CANCEL, EMPLOYEES, MY_REQUESTS, NEW_REQUEST, STATISTICS};
use crate::workflow::{FormInput, MessageRef};

/// Creates the main dispatcher schema for the Telegram bot.
///
/// The same schema is used in production and can be used in integration tests.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_messages = deps.clone();
    let deps_callback = deps;

    dptree::entry()
        .branch(command_handler(deps_commands))
        .branch(message_handler(deps_messages))
        .branch(callback_handler(deps_callback))
}

/// Only private chats drive the bot; the group chat is write-only
fn is_private(msg: &Message) -> bool {
    msg.chat.is_private()
}

/// Handler for bot commands (/start, /pay, /stats, etc.)
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| is_private(&msg))
        .branch(dptree::entry().filter_command::<Command>().endpoint(
            move |msg: Message, cmd: Command| {
                let deps = deps.clone();
                async move {
                    let Some(user) = msg.from.as_ref() else {
                        return Ok(());
                    };
                    let actor = actor_of(user);
                    log::info!("Received command {:?} from user {}", cmd, actor.id);

                    match cmd {
                        Command::Start => employee::start(&deps, &actor).await,
                        Command::Cancel => employee::handle_form_input(&deps, &actor, FormInput::Cancel).await,
                        Command::MyRequests => employee::show_my_requests(&deps, &actor).await,
                        Command::Pay(args) => admin::pay_command(&deps, &actor, &args).await,
                        Command::Stats(args) => admin::stats_command(&deps, &actor, &args).await,
                        Command::Employees => admin::employees_command(&deps, &actor).await,
                        Command::AddEmployee(args) => {
                            let replied_to = msg.reply_to_message().and_then(|m| m.from.as_ref());
                            admin::add_employee_command(&deps, &actor, &args, replied_to).await
                        }
                        Command::RemoveEmployee(args) => admin::remove_employee_command(&deps, &actor, &args).await,
                    }
                    Ok(())
                }
            },
        ))
}

/// Handler for menu buttons, photos and form text
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| is_private(&msg))
        .endpoint(move |msg: Message| {
            let deps = deps.clone();
            async move {
                let Some(user) = msg.from.as_ref() else {
                    return Ok(());
                };
                let actor = actor_of(user);

                match msg.text() {
                    Some(NEW_REQUEST) => employee::handle_form_input(&deps, &actor, FormInput::Start).await,
                    Some(MY_REQUESTS) => employee::show_my_requests(&deps, &actor).await,
                    Some(CANCEL) => employee::handle_form_input(&deps, &actor, FormInput::Cancel).await,
                    Some(STATISTICS) => admin::stats_command(&deps, &actor, "").await,
                    Some(EMPLOYEES) => admin::employees_command(&deps, &actor).await,
                    _ => employee::handle_form_input(&deps, &actor, employee::form_input(&msg)).await,
                }
                Ok(())
            }
        })
}

/// Handler for callback queries (inline keyboard buttons)
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            let actor = actor_of(&q.from);
            let view = q.message.as_ref().map(|m| MessageRef {
                chat_id: m.chat().id.0,
                message_id: m.id().0,
            });

            let reply = match q.data.as_deref().and_then(CallbackAction::parse) {
                Some(CallbackAction::Acknowledge(request_id)) => {
                    admin::acknowledge_button(&deps, &actor, request_id, view).await
                }
                Some(CallbackAction::Pay { amount, request_id }) => {
                    admin::pay_button(&deps, &actor, request_id, amount, view).await
                }
                Some(CallbackAction::Delete(request_id)) => {
                    employee::delete_button(&deps, &actor, request_id, view).await
                }
                Some(CallbackAction::ConfirmDraft) => employee::draft_button(&deps, &actor, FormInput::Confirm).await,
                Some(CallbackAction::CancelDraft) => employee::draft_button(&deps, &actor, FormInput::Cancel).await,
                None => {
                    log::debug!("Unknown callback data {:?} from user {}", q.data, actor.id);
                    CallbackReply::default()
                }
            };

            let mut answer = bot.answer_callback_query(q.id.clone());
            if let Some(text) = reply.text {
                answer = answer.text(text).show_alert(reply.alert);
            }
            if let Err(e) = answer.await {
                log::warn!("Failed to answer callback query from user {}: {}", actor.id, e);
            }
            Ok(())
        }
    })
}
