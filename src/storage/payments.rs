//! Database operations for payment requests.

use chrono::{DateTime, Duration, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Result};
use strum::{AsRefStr, Display, EnumString};

/// Status of a payment request. `Paid` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

impl ToSql for PaymentStatus {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_ref()))
    }
}

impl FromSql for PaymentStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// A payment request row from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub id: i64,
    pub requester_id: i64,
    pub requester_username: Option<String>,
    /// Free-text balance, e.g. `100$`
    pub balance: String,
    /// Target account in canonical `@name` form
    pub account: String,
    /// Opaque Telegram file id of the screenshot
    pub image_ref: String,
    pub status: PaymentStatus,
    pub payment_amount: Option<i64>,
    /// An admin has contacted the requester; independent of payment
    pub acknowledged: bool,
    /// Message in the requester's chat that shows this request
    pub requester_message_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl PaymentRequest {
    pub fn is_pending(&self) -> bool {
        self.status == PaymentStatus::Pending
    }
}

/// Data collected by the request form, ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaymentRequest {
    pub requester_id: i64,
    pub requester_username: Option<String>,
    pub balance: String,
    pub account: String,
    pub image_ref: String,
}

/// Paid totals for one requester inside a statistics window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequesterStats {
    pub requester_id: i64,
    pub requester_username: Option<String>,
    pub paid_count: i64,
    pub total_amount: i64,
}

/// Aggregate over paid requests in a trailing window plus the current backlog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentStats {
    pub window_days: u32,
    pub total_paid: i64,
    pub total_amount: i64,
    pub pending_count: i64,
    /// Ordered by `total_amount` descending
    pub by_requester: Vec<RequesterStats>,
}

/// Reads a column that older schemas may not have, falling back to the default.
fn optional_column<T: FromSql + Default>(row: &rusqlite::Row<'_>, name: &str) -> Result<T> {
    match row.get::<_, Option<T>>(name) {
        Ok(value) => Ok(value.unwrap_or_default()),
        Err(rusqlite::Error::InvalidColumnName(_)) => Ok(T::default()),
        Err(e) => Err(e),
    }
}

fn parse_row(row: &rusqlite::Row<'_>) -> Result<PaymentRequest> {
    let requester_message_id: Option<i32> = match row.get("employee_message_id") {
        Ok(value) => value,
        Err(rusqlite::Error::InvalidColumnName(_)) => None,
        Err(e) => return Err(e),
    };

    Ok(PaymentRequest {
        id: row.get("id")?,
        requester_id: row.get("employee_id")?,
        requester_username: row.get("employee_username")?,
        balance: row.get("balance")?,
        account: row.get("username_field")?,
        image_ref: row.get("screenshot_file_id")?,
        status: row.get("status")?,
        payment_amount: row.get("payment_amount")?,
        acknowledged: optional_column::<i64>(row, "acknowledged")? != 0,
        requester_message_id,
        created_at: row.get("created_at")?,
        paid_at: row.get("paid_at")?,
    })
}

/// Insert a new pending request. Returns the assigned id.
pub fn create_request(conn: &Connection, draft: &NewPaymentRequest, now: DateTime<Utc>) -> Result<i64> {
    conn.execute(
        "INSERT INTO payments (employee_id, employee_username, balance, username_field, screenshot_file_id, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            draft.requester_id,
            draft.requester_username,
            draft.balance,
            draft.account,
            draft.image_ref,
            PaymentStatus::Pending,
            now
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get a request by id.
pub fn get_request(conn: &Connection, id: i64) -> Result<Option<PaymentRequest>> {
    conn.query_row("SELECT * FROM payments WHERE id = ?1", params![id], parse_row)
        .optional()
}

/// All pending requests of one requester, newest first.
pub fn list_pending_for_requester(conn: &Connection, requester_id: i64) -> Result<Vec<PaymentRequest>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM payments
         WHERE employee_id = ?1 AND status = ?2
         ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt.query_map(params![requester_id, PaymentStatus::Pending], parse_row)?;
    rows.collect()
}

/// Move a pending request to `status` with `amount`, stamping `paid_at` when it becomes paid.
///
/// Only pending rows are touched, so a paid request is never rewritten.
/// Returns whether a row changed; `false` for a missing id.
pub fn set_status(
    conn: &Connection,
    id: i64,
    status: PaymentStatus,
    amount: Option<i64>,
    now: DateTime<Utc>,
) -> Result<bool> {
    let paid_at = (status == PaymentStatus::Paid).then_some(now);
    let changed = conn.execute(
        "UPDATE payments SET status = ?1, payment_amount = ?2, paid_at = ?3
         WHERE id = ?4 AND status = ?5",
        params![status, amount, paid_at, id, PaymentStatus::Pending],
    )?;
    Ok(changed > 0)
}

/// Set the acknowledged flag on a pending, not yet acknowledged request.
///
/// Returns `false` when nothing matched (missing, paid, or already acknowledged).
pub fn mark_acknowledged(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE payments SET acknowledged = 1 WHERE id = ?1 AND status = ?2 AND acknowledged = 0",
        params![id, PaymentStatus::Pending],
    )?;
    Ok(changed > 0)
}

/// Remember which message in the requester's chat shows this request.
pub fn set_requester_message(conn: &Connection, id: i64, message_id: i32) -> Result<()> {
    conn.execute(
        "UPDATE payments SET employee_message_id = ?1 WHERE id = ?2",
        params![message_id, id],
    )?;
    Ok(())
}

/// Delete a request iff it belongs to `requester_id` and is still pending.
///
/// A single conditional statement: two concurrent attempts, or an attempt
/// racing an approval, cannot both succeed.
pub fn delete_request(conn: &Connection, id: i64, requester_id: i64) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM payments WHERE id = ?1 AND employee_id = ?2 AND status = ?3",
        params![id, requester_id, PaymentStatus::Pending],
    )?;
    Ok(deleted > 0)
}

/// Paid totals inside the trailing `window_days`, the pending backlog, and a per-requester breakdown.
pub fn statistics(conn: &Connection, window_days: u32, now: DateTime<Utc>) -> Result<PaymentStats> {
    let since = now - Duration::days(i64::from(window_days));

    let (total_paid, total_amount): (i64, i64) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(payment_amount), 0) FROM payments
         WHERE status = ?1 AND paid_at >= ?2",
        params![PaymentStatus::Paid, since],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let pending_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM payments WHERE status = ?1",
        params![PaymentStatus::Pending],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(
        "SELECT employee_id, MAX(employee_username), COUNT(*), COALESCE(SUM(payment_amount), 0) AS total
         FROM payments
         WHERE status = ?1 AND paid_at >= ?2
         GROUP BY employee_id
         ORDER BY total DESC, employee_id ASC",
    )?;
    let rows = stmt.query_map(params![PaymentStatus::Paid, since], |row| {
        Ok(RequesterStats {
            requester_id: row.get(0)?,
            requester_username: row.get(1)?,
            paid_count: row.get(2)?,
            total_amount: row.get(3)?,
        })
    })?;
    let by_requester = rows.collect::<Result<Vec<_>>>()?;

    Ok(PaymentStats {
        window_days,
        total_paid,
        total_amount,
        pending_count,
        by_requester,
    })
}

#[cfg(test)]
pub(crate) fn create_test_schema(conn: &mut Connection) {
    crate::storage::migrations::run_migrations(conn).unwrap();
}
