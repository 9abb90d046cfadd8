//! Admin handlers: request actions, custom payments, statistics, roster

use teloxide::types::User;

use super::types::{actor_of, CallbackReply, HandlerDeps};
use crate::workflow::{captions, Actor, Keyboard, LifecycleError, MessageRef, RosterError};

/// Parses `/pay <id> <amount>` arguments
pub fn parse_pay_args(args: &str) -> Option<(i64, i64)> {
    let mut parts = args.split_whitespace();
    let id = parts.next()?.parse().ok()?;
    let amount = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((id, amount))
}

/// Parses the optional `/stats [days]` argument; `Err` on garbage
pub fn parse_stats_args(args: &str) -> Result<Option<u32>, std::num::ParseIntError> {
    let args = args.trim();
    if args.is_empty() {
        return Ok(None);
    }
    args.parse().map(Some)
}

fn lifecycle_denial(request_id: i64, err: LifecycleError) -> String {
    if let LifecycleError::Storage(_) = err {
        log::error!("Action on request {} failed: {}", request_id, err);
        return "❌ Something went wrong. Please try again.".to_string();
    }
    format!("❌ {}", err)
}

/// "Contacted" button
pub async fn acknowledge_button(
    deps: &HandlerDeps,
    actor: &Actor,
    request_id: i64,
    view: Option<MessageRef>,
) -> CallbackReply {
    match deps.lifecycle.acknowledge(request_id, actor.id, view).await {
        Ok(_) => CallbackReply::toast("✍️ Marked as contacted"),
        Err(e) => CallbackReply::alert(lifecycle_denial(request_id, e)),
    }
}

/// Quick-pay button
pub async fn pay_button(
    deps: &HandlerDeps,
    actor: &Actor,
    request_id: i64,
    amount: i64,
    view: Option<MessageRef>,
) -> CallbackReply {
    match deps.lifecycle.approve(request_id, actor.id, amount, view).await {
        Ok(approval) => match approval.group_warning {
            Some(e) => CallbackReply::alert(format!(
                "⚠️ Request paid, but the group chat could not be notified: {}",
                e
            )),
            None => CallbackReply::toast(format!("✅ Request paid: {}", amount)),
        },
        Err(e) => CallbackReply::alert(lifecycle_denial(request_id, e)),
    }
}

/// `/pay <id> <amount>`
pub async fn pay_command(deps: &HandlerDeps, actor: &Actor, args: &str) {
    if !deps.recipients.is_admin(actor.id) {
        say(deps, actor.id, "❌ You do not have permission for this action!").await;
        return;
    }
    let Some((request_id, amount)) = parse_pay_args(args) else {
        say(deps, actor.id, "Usage: /pay &lt;id&gt; &lt;amount&gt;").await;
        return;
    };

    let text = match deps.lifecycle.approve(request_id, actor.id, amount, None).await {
        Ok(approval) => match approval.group_warning {
            Some(e) => format!(
                "⚠️ Request #{} paid ({}), but the group chat could not be notified: {}",
                request_id, amount, e
            ),
            None => format!("✅ Request #{} paid: {}", request_id, amount),
        },
        Err(e) => lifecycle_denial(request_id, e),
    };
    say(deps, actor.id, &text).await;
}

/// `/stats [days]`
pub async fn stats_command(deps: &HandlerDeps, actor: &Actor, args: &str) {
    let Ok(days) = parse_stats_args(args) else {
        say(deps, actor.id, "Usage: /stats [days]").await;
        return;
    };
    let text = match deps.lifecycle.statistics(actor.id, days) {
        Ok(stats) => captions::stats(&stats),
        Err(e) => format!("❌ {}", e),
    };
    say(deps, actor.id, &text).await;
}

/// `/employees`
pub async fn employees_command(deps: &HandlerDeps, actor: &Actor) {
    let text = match deps.roster.list(actor.id) {
        Ok(employees) => captions::employee_list(&employees),
        Err(e) => format!("❌ {}", e),
    };
    say(deps, actor.id, &text).await;
}

/// `/add_employee <id>`, or a reply to one of the user's messages
pub async fn add_employee_command(deps: &HandlerDeps, actor: &Actor, args: &str, replied_to: Option<&User>) {
    let target = match args.trim() {
        "" => replied_to.map(|user| {
            let target = actor_of(user);
            (target.id, target.username, Some(user.first_name.clone()))
        }),
        raw => raw.parse::<i64>().ok().map(|id| (id, None, None)),
    };
    let Some((user_id, username, first_name)) = target else {
        say(
            deps,
            actor.id,
            "Usage: /add_employee &lt;telegram id&gt;, or reply with /add_employee to a message from the user",
        )
        .await;
        return;
    };

    let text = match deps
        .roster
        .add(actor.id, user_id, username.as_deref(), first_name.as_deref())
        .await
    {
        Ok(()) => format!(
            "✅ <b>Employee added</b>\n\n🆔 ID: <code>{}</code>\n\nThey can now submit payment requests.",
            user_id
        ),
        Err(e) => roster_denial(e),
    };
    say(deps, actor.id, &text).await;
}

/// `/remove_employee <id>`
pub async fn remove_employee_command(deps: &HandlerDeps, actor: &Actor, args: &str) {
    let Ok(user_id) = args.trim().parse::<i64>() else {
        say(deps, actor.id, "Usage: /remove_employee &lt;telegram id&gt;").await;
        return;
    };

    let text = match deps.roster.remove(actor.id, user_id).await {
        Ok(()) => format!(
            "✅ <b>Employee removed</b>\n\n🆔 ID: <code>{}</code>\n\nThey can no longer submit payment requests.",
            user_id
        ),
        Err(e) => roster_denial(e),
    };
    say(deps, actor.id, &text).await;
}

fn roster_denial(err: RosterError) -> String {
    match err {
        RosterError::Storage(_) => {
            log::error!("Roster change failed: {}", err);
            "❌ Something went wrong. Please try again later.".to_string()
        }
        RosterError::NotAdmin => format!("❌ {}", err),
        other => format!("⚠️ {}", other),
    }
}

async fn say(deps: &HandlerDeps, chat_id: i64, text: &str) {
    if let Err(e) = deps.notifier.send_text(chat_id, text, Keyboard::None).await {
        log::warn!("Failed to message admin {}: {}", chat_id, e);
    }
}
