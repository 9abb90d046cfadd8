use std::sync::Arc;

use chrono::Utc;
use rusqlite::Connection;

use crate::core::error::AppResult;
use crate::storage::db::{self, DbPool};
use crate::storage::employees::{self, Employee};
use crate::storage::payments::{self, NewPaymentRequest, PaymentRequest, PaymentStats, PaymentStatus};

/// Shared handle to the payment and roster tables.
///
/// Every call checks out its own pooled connection. Writes report failures to
/// the caller; reads log them and fall back to an empty value so a broken
/// database degrades the UI instead of crashing a handler.
#[derive(Clone)]
pub struct PaymentStore {
    pool: Arc<DbPool>,
}

impl PaymentStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) and migrates the database at `path`.
    pub fn open(path: &str) -> AppResult<Self> {
        Ok(Self::new(Arc::new(db::create_pool(path)?)))
    }

    pub fn pool(&self) -> &Arc<DbPool> {
        &self.pool
    }

    fn write<T>(&self, op: impl FnOnce(&Connection) -> rusqlite::Result<T>) -> AppResult<T> {
        let conn = db::get_connection(&self.pool)?;
        Ok(op(&*conn)?)
    }

    fn read<T>(&self, what: &str, fallback: T, op: impl FnOnce(&Connection) -> rusqlite::Result<T>) -> T {
        let result = db::get_connection(&self.pool)
            .map_err(|e| e.to_string())
            .and_then(|conn| op(&*conn).map_err(|e| e.to_string()));
        match result {
            Ok(value) => value,
            Err(e) => {
                log::error!("Failed to read {}: {}", what, e);
                fallback
            }
        }
    }

    // ── payment requests ─────────────────────────────────────────────────────

    pub fn create_request(&self, draft: &NewPaymentRequest) -> AppResult<i64> {
        self.write(|conn| payments::create_request(conn, draft, Utc::now()))
    }

    pub fn get_request(&self, id: i64) -> Option<PaymentRequest> {
        self.read("payment request", None, |conn| payments::get_request(conn, id))
    }

    pub fn list_pending_for_requester(&self, requester_id: i64) -> Vec<PaymentRequest> {
        self.read("pending requests", Vec::new(), |conn| {
            payments::list_pending_for_requester(conn, requester_id)
        })
    }

    /// See [`payments::set_status`]. `Ok(false)` means nothing pending matched.
    pub fn set_status(&self, id: i64, status: PaymentStatus, amount: Option<i64>) -> AppResult<bool> {
        self.write(|conn| payments::set_status(conn, id, status, amount, Utc::now()))
    }

    pub fn mark_acknowledged(&self, id: i64) -> AppResult<bool> {
        self.write(|conn| payments::mark_acknowledged(conn, id))
    }

    pub fn set_requester_message(&self, id: i64, message_id: i32) -> AppResult<()> {
        self.write(|conn| payments::set_requester_message(conn, id, message_id))
    }

    pub fn delete_request(&self, id: i64, requester_id: i64) -> AppResult<bool> {
        self.write(|conn| payments::delete_request(conn, id, requester_id))
    }

    pub fn statistics(&self, window_days: u32) -> PaymentStats {
        let fallback = PaymentStats {
            window_days,
            ..PaymentStats::default()
        };
        self.read("payment statistics", fallback, |conn| {
            payments::statistics(conn, window_days, Utc::now())
        })
    }

    // ── employee roster ──────────────────────────────────────────────────────

    pub fn upsert_employee(
        &self,
        user_id: i64,
        username: Option<&str>,
        first_name: Option<&str>,
        added_by: i64,
    ) -> AppResult<()> {
        self.write(|conn| employees::upsert_employee(conn, user_id, username, first_name, added_by, Utc::now()))
    }

    pub fn deactivate_employee(&self, user_id: i64) -> AppResult<bool> {
        self.write(|conn| employees::deactivate_employee(conn, user_id))
    }

    pub fn list_active_employees(&self) -> Vec<Employee> {
        self.read("employees", Vec::new(), employees::list_active_employees)
    }

    pub fn is_active_employee(&self, user_id: i64) -> bool {
        self.read("employee status", false, |conn| employees::is_active_employee(conn, user_id))
    }

    pub fn active_employee_count(&self) -> i64 {
        self.read("employee count", 0, employees::active_employee_count)
    }

    pub fn employee_display_name(&self, user_id: i64) -> Option<String> {
        self.read("employee name", None, |conn| employees::employee_display_name(conn, user_id))
    }
}
