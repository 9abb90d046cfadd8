//! Employee roster: who may submit payment requests.
//!
//! Removal is a soft delete (`is_active = 0`) so the audit fields survive.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Employee {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub is_active: bool,
    pub added_at: DateTime<Utc>,
    pub added_by: i64,
}

impl Employee {
    /// `@username`, else the first name, else `ID <user_id>`.
    pub fn display_name(&self) -> String {
        display_name(self.user_id, self.username.as_deref(), self.first_name.as_deref())
    }
}

fn display_name(user_id: i64, username: Option<&str>, first_name: Option<&str>) -> String {
    match (username, first_name) {
        (Some(u), _) if !u.is_empty() => format!("@{}", u),
        (_, Some(f)) if !f.is_empty() => f.to_string(),
        _ => format!("ID {}", user_id),
    }
}

fn parse_row(row: &rusqlite::Row<'_>) -> Result<Employee> {
    Ok(Employee {
        user_id: row.get("user_id")?,
        username: row.get("username")?,
        first_name: row.get("first_name")?,
        is_active: row.get::<_, i64>("is_active")? != 0,
        added_at: row.get("added_at")?,
        added_by: row.get("added_by")?,
    })
}

/// Add an employee or reactivate a removed one, overwriting the display fields.
pub fn upsert_employee(
    conn: &Connection,
    user_id: i64,
    username: Option<&str>,
    first_name: Option<&str>,
    added_by: i64,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO employees (user_id, username, first_name, is_active, added_at, added_by)
         VALUES (?1, ?2, ?3, 1, ?4, ?5)
         ON CONFLICT(user_id) DO UPDATE SET
            username = excluded.username,
            first_name = excluded.first_name,
            is_active = 1,
            added_at = excluded.added_at,
            added_by = excluded.added_by",
        params![user_id, username, first_name, now, added_by],
    )?;
    Ok(())
}

/// Soft-delete an employee. Returns `false` if no active entry existed.
pub fn deactivate_employee(conn: &Connection, user_id: i64) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE employees SET is_active = 0 WHERE user_id = ?1 AND is_active = 1",
        params![user_id],
    )?;
    Ok(changed > 0)
}

/// Active employees, oldest first.
pub fn list_active_employees(conn: &Connection) -> Result<Vec<Employee>> {
    let mut stmt = conn.prepare("SELECT * FROM employees WHERE is_active = 1 ORDER BY added_at ASC, user_id ASC")?;
    let rows = stmt.query_map([], parse_row)?;
    rows.collect()
}

pub fn get_employee(conn: &Connection, user_id: i64) -> Result<Option<Employee>> {
    conn.query_row("SELECT * FROM employees WHERE user_id = ?1", params![user_id], parse_row)
        .optional()
}

pub fn is_active_employee(conn: &Connection, user_id: i64) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM employees WHERE user_id = ?1 AND is_active = 1",
            params![user_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn active_employee_count(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM employees WHERE is_active = 1", [], |row| row.get(0))
}

/// Display name of a roster entry (active or not), if the id is known.
pub fn employee_display_name(conn: &Connection, user_id: i64) -> Result<Option<String>> {
    Ok(get_employee(conn, user_id)?.map(|e| e.display_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::payments::create_test_schema;
    use chrono::Duration;

    fn make_conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        create_test_schema(&mut conn);
        conn
    }

    #[test]
    fn upsert_and_lookup() {
        let conn = make_conn();
        upsert_employee(&conn, 10, Some("alice"), Some("Alice"), 1, Utc::now()).unwrap();

        assert!(is_active_employee(&conn, 10).unwrap());
        assert!(!is_active_employee(&conn, 11).unwrap());
        assert_eq!(active_employee_count(&conn).unwrap(), 1);
        assert_eq!(employee_display_name(&conn, 10).unwrap(), Some("@alice".to_string()));
        assert_eq!(employee_display_name(&conn, 11).unwrap(), None);
    }

    #[test]
    fn deactivate_is_soft_delete() {
        let conn = make_conn();
        upsert_employee(&conn, 10, None, None, 1, Utc::now()).unwrap();

        assert!(deactivate_employee(&conn, 10).unwrap());
        assert!(!deactivate_employee(&conn, 10).unwrap());
        assert!(!is_active_employee(&conn, 10).unwrap());

        let row = get_employee(&conn, 10).unwrap().unwrap();
        assert!(!row.is_active);
        assert_eq!(row.added_by, 1);
    }

    #[test]
    fn readd_reactivates_and_overwrites_display_fields() {
        let conn = make_conn();
        let first = Utc::now() - Duration::days(3);
        upsert_employee(&conn, 10, Some("old"), None, 1, first).unwrap();
        deactivate_employee(&conn, 10).unwrap();

        upsert_employee(&conn, 10, None, Some("Bob"), 2, Utc::now()).unwrap();
        let row = get_employee(&conn, 10).unwrap().unwrap();
        assert!(row.is_active);
        assert_eq!(row.username, None);
        assert_eq!(row.first_name.as_deref(), Some("Bob"));
        assert_eq!(row.added_by, 2);
        assert_eq!(row.display_name(), "Bob");
    }

    #[test]
    fn list_active_skips_removed() {
        let conn = make_conn();
        let now = Utc::now();
        upsert_employee(&conn, 1, None, None, 9, now - Duration::minutes(2)).unwrap();
        upsert_employee(&conn, 2, None, None, 9, now - Duration::minutes(1)).unwrap();
        upsert_employee(&conn, 3, None, None, 9, now).unwrap();
        deactivate_employee(&conn, 2).unwrap();

        let ids: Vec<i64> = list_active_employees(&conn).unwrap().iter().map(|e| e.user_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn display_name_fallbacks() {
        assert_eq!(display_name(5, Some("bob"), Some("Bob")), "@bob");
        assert_eq!(display_name(5, Some(""), Some("Bob")), "Bob");
        assert_eq!(display_name(5, None, None), "ID 5");
    }
}
