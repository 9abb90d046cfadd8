//! HTML captions and texts shown to employees, admins and the group chat.
//!
//! Every user-supplied field goes through [`sanitize_html`] exactly once, here.

use crate::core::validation::sanitize_html;
use crate::storage::{Employee, PaymentRequest, PaymentStats};

const NO_USERNAME: &str = "no username";

fn requester_handle(request: &PaymentRequest) -> String {
    match request.requester_username.as_deref() {
        Some(name) if !name.is_empty() => format!("@{}", sanitize_html(name)),
        _ => NO_USERNAME.to_string(),
    }
}

fn fields(balance: &str, account: &str) -> String {
    format!(
        "💰 <b>Balance:</b> {}\n🔑 <b>Account:</b> {}",
        sanitize_html(balance),
        sanitize_html(account)
    )
}

/// Admin copy of a pending request.
pub fn admin_request(request: &PaymentRequest) -> String {
    let mut caption = format!(
        "📋 <b>New request #{}</b>\n\n👤 <b>Employee:</b> {}\n{}",
        request.id,
        requester_handle(request),
        fields(&request.balance, &request.account)
    );
    if request.acknowledged {
        caption.push_str("\n\n✍️ <b>Contacted</b>");
    }
    caption
}

/// Admin copy after approval.
pub fn admin_paid(request: &PaymentRequest, amount: i64) -> String {
    format!(
        "✅ <b>Request #{} PAID</b>\n\n👤 <b>Employee:</b> {}\n{}\n💵 <b>Amount:</b> {}",
        request.id,
        requester_handle(request),
        fields(&request.balance, &request.account),
        amount
    )
}

/// Photo caption posted to the group chat after approval.
pub fn group_paid(request: &PaymentRequest, amount: i64) -> String {
    format!(
        "✅ <b>Paid</b>\n\n🔑 <b>Account:</b> {}\n💵 <b>Payment:</b> {}\n👤 <b>Employee:</b> {}",
        sanitize_html(&request.account),
        amount,
        requester_handle(request)
    )
}

/// Direct message to the requester after approval.
pub fn requester_paid(request: &PaymentRequest, amount: i64) -> String {
    format!(
        "✅ <b>Your request #{} has been paid!</b>\n\n💵 <b>Amount:</b> {}\n🔑 <b>Account:</b> {}\n\nThank you! 🎉",
        request.id,
        amount,
        sanitize_html(&request.account)
    )
}

/// Requester copy of a pending request (submission confirmation and "my requests").
pub fn requester_request(request: &PaymentRequest) -> String {
    let status = if request.acknowledged {
        "✍️ An admin has contacted you"
    } else {
        "⏳ Waiting for review"
    };
    format!(
        "📋 <b>Request #{}</b>\n📅 <b>Created:</b> {}\n\n{}\n📊 <b>Status:</b> {}",
        request.id,
        request.created_at.format("%d.%m.%Y %H:%M"),
        fields(&request.balance, &request.account),
        status
    )
}

/// Preview of the collected draft, shown before confirmation.
pub fn draft_preview(balance: &str, account: &str) -> String {
    format!(
        "✅ <b>Check your request:</b>\n\n{}\n\nConfirm to submit it:",
        fields(balance, account)
    )
}

/// The preview after it has been committed.
pub fn submitted(id: i64, balance: &str, account: &str) -> String {
    format!(
        "✅ <b>Request #{} submitted!</b>\n\n{}\n\nAn admin will review it shortly.",
        id,
        fields(balance, account)
    )
}

pub fn deleted(id: i64) -> String {
    format!("🗑 <b>Request #{} deleted</b>", id)
}

pub fn stats(stats: &PaymentStats) -> String {
    let mut text = format!(
        "📊 <b>Statistics for the last {} days</b>\n\n✅ <b>Paid requests:</b> {}\n💵 <b>Total paid:</b> {}\n⏳ <b>Pending now:</b> {}",
        stats.window_days, stats.total_paid, stats.total_amount, stats.pending_count
    );

    if !stats.by_requester.is_empty() {
        text.push_str("\n\n<b>By employee:</b>");
        for row in &stats.by_requester {
            let who = match row.requester_username.as_deref() {
                Some(name) if !name.is_empty() => format!("@{}", sanitize_html(name)),
                _ => format!("ID {}", row.requester_id),
            };
            text.push_str(&format!("\n• {}: {} paid, {} total", who, row.paid_count, row.total_amount));
        }
    }
    text
}

pub fn employee_list(employees: &[Employee]) -> String {
    if employees.is_empty() {
        return "👥 <b>The employee list is empty</b>\n\nUse /add_employee &lt;id&gt; to add someone.".to_string();
    }

    let mut text = format!("👥 <b>Employees ({}):</b>\n", employees.len());
    for employee in employees {
        text.push_str(&format!(
            "\n• {} (ID: <code>{}</code>)\n  <i>Added: {}</i>",
            sanitize_html(&employee.display_name()),
            employee.user_id,
            employee.added_at.format("%d.%m.%Y")
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{PaymentStatus, RequesterStats};
    use chrono::{TimeZone, Utc};

    fn request() -> PaymentRequest {
        PaymentRequest {
            id: 7,
            requester_id: 42,
            requester_username: Some("bob".to_string()),
            balance: "<b>100$</b>".to_string(),
            account: "@acct".to_string(),
            image_ref: "file".to_string(),
            status: PaymentStatus::Pending,
            payment_amount: None,
            acknowledged: false,
            requester_message_id: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap(),
            paid_at: None,
        }
    }

    #[test]
    fn user_fields_are_escaped() {
        let caption = admin_request(&request());
        assert!(caption.contains("&lt;b&gt;100$&lt;/b&gt;"));
        assert!(!caption.contains("<b>100$"));
    }

    #[test]
    fn acknowledged_marker_appears_on_both_views() {
        let mut req = request();
        assert!(!admin_request(&req).contains("Contacted"));
        req.acknowledged = true;
        assert!(admin_request(&req).contains("Contacted"));
        assert!(requester_request(&req).contains("contacted you"));
    }

    #[test]
    fn missing_username_placeholder() {
        let mut req = request();
        req.requester_username = None;
        assert!(group_paid(&req, 15).contains(NO_USERNAME));
    }

    #[test]
    fn requester_request_formats_date() {
        assert!(requester_request(&request()).contains("05.03.2024 14:30"));
    }

    #[test]
    fn stats_lists_each_requester() {
        let text = stats(&PaymentStats {
            window_days: 30,
            total_paid: 3,
            total_amount: 60,
            pending_count: 1,
            by_requester: vec![
                RequesterStats {
                    requester_id: 1,
                    requester_username: Some("a".to_string()),
                    paid_count: 2,
                    total_amount: 40,
                },
                RequesterStats {
                    requester_id: 2,
                    requester_username: None,
                    paid_count: 1,
                    total_amount: 20,
                },
            ],
        });
        assert!(text.contains("last 30 days"));
        assert!(text.contains("@a: 2 paid, 40 total"));
        assert!(text.contains("ID 2: 1 paid, 20 total"));
    }
}
