//! Employee-facing handlers: welcome, request form, own requests

use indoc::{formatdoc, indoc};
use teloxide::types::Message;

use super::types::{CallbackReply, HandlerDeps};
use crate::core::validation::sanitize_html;
use crate::workflow::{captions, Actor, FormInput, FormOutcome, Keyboard, LifecycleError, MessageRef};

/// Form input carried by a plain message
pub fn form_input(msg: &Message) -> FormInput {
    if let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) {
        return FormInput::Image(photo.file.id.0.clone());
    }
    match msg.text() {
        Some(text) => FormInput::Text(text.to_string()),
        None => FormInput::Other,
    }
}

/// /start: admin menu, employee menu, or a denial
pub async fn start(deps: &HandlerDeps, actor: &Actor) {
    let (text, keyboard) = if deps.recipients.is_admin(actor.id) {
        (
            indoc! {"
                👋 <b>Welcome, admin!</b>

                New requests arrive here with buttons to mark them as contacted or pay them.

                /pay &lt;id&gt; &lt;amount&gt; pays a custom amount
                /stats [days] shows paid totals
                /employees lists the roster"}
            .to_string(),
            Keyboard::AdminMenu,
        )
    } else if deps.store.is_active_employee(actor.id) {
        let name = actor.username.as_deref().unwrap_or("there");
        (
            formatdoc! {"
                👋 <b>Welcome, {name}!</b>

                🤖 I collect payment requests.

                📝 <b>New request</b> - submit a new payment request
                📋 <b>My requests</b> - see your pending requests

                Choose an action below 👇",
                name = sanitize_html(name)
            },
            Keyboard::MainMenu,
        )
    } else {
        (
            "❌ <b>Access denied</b>\n\nYou are not an employee.\nAsk an admin to give you access.".to_string(),
            Keyboard::None,
        )
    };

    if let Err(e) = deps.notifier.send_text(actor.id, &text, keyboard).await {
        log::warn!("Failed to greet user {}: {}", actor.id, e);
    }
}

/// Feeds a message into the request form
pub async fn handle_form_input(deps: &HandlerDeps, actor: &Actor, input: FormInput) {
    let outcome = deps.form.handle(actor, input).await;
    log::debug!("Form input from user {} -> {:?}", actor.id, outcome);
}

/// Lists the actor's pending requests, each with a delete button
pub async fn show_my_requests(deps: &HandlerDeps, actor: &Actor) {
    if !deps.store.is_active_employee(actor.id) {
        say(deps, actor.id, "❌ You do not have access to this function.", Keyboard::None).await;
        return;
    }

    let requests = deps.store.list_pending_for_requester(actor.id);
    if requests.is_empty() {
        say(
            deps,
            actor.id,
            "📋 <b>Your requests</b>\n\nYou have no pending requests.\n\nCreate one from the menu.",
            Keyboard::MainMenu,
        )
        .await;
        return;
    }

    let header = format!(
        "📋 <b>Your pending requests ({}):</b>\n\nUse the button under a request to delete it.",
        requests.len()
    );
    say(deps, actor.id, &header, Keyboard::None).await;

    for request in &requests {
        if let Err(e) = deps
            .notifier
            .send_image(
                actor.id,
                &request.image_ref,
                &captions::requester_request(request),
                Keyboard::RequesterActions { request_id: request.id },
            )
            .await
        {
            log::warn!("Failed to show request {} to user {}: {}", request.id, actor.id, e);
        }
    }
}

/// Confirm or cancel button under a draft preview
pub async fn draft_button(deps: &HandlerDeps, actor: &Actor, input: FormInput) -> CallbackReply {
    match deps.form.handle(actor, input).await {
        FormOutcome::Submitted { .. } => CallbackReply::toast("✅ Request submitted!"),
        FormOutcome::Cancelled => CallbackReply::default(),
        FormOutcome::Failed => CallbackReply::alert("❌ Something went wrong. Please try again."),
        _ => CallbackReply::alert("This request is no longer being edited."),
    }
}

/// Delete button under one of the actor's requests
pub async fn delete_button(deps: &HandlerDeps, actor: &Actor, request_id: i64, view: Option<MessageRef>) -> CallbackReply {
    match deps.lifecycle.delete(request_id, actor.id, view).await {
        Ok(()) => CallbackReply::toast("✅ Request deleted"),
        Err(e @ LifecycleError::Storage(_)) => {
            log::error!("Delete of request {} failed: {}", request_id, e);
            CallbackReply::alert("❌ Something went wrong. Please try again.")
        }
        Err(e) => CallbackReply::alert(format!("❌ {}", e)),
    }
}

async fn say(deps: &HandlerDeps, chat_id: i64, text: &str, keyboard: Keyboard) {
    if let Err(e) = deps.notifier.send_text(chat_id, text, keyboard).await {
        log::warn!("Failed to message user {}: {}", chat_id, e);
    }
}
