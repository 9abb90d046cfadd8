use anyhow::{Context, Result};
use rusqlite::Connection;
use std::sync::{Mutex, OnceLock};

use crate::core::config;

mod embedded {
    use refinery::embed_migrations;

    embed_migrations!("./migrations");
}

static MIGRATION_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Columns added to `payments` after the first released schema.
///
/// Databases written by the unversioned bot may lack them; everything else in
/// the table has been there since the beginning.
const LATER_PAYMENT_COLUMNS: [(&str, &str); 2] = [
    ("acknowledged", "INTEGER NOT NULL DEFAULT 0"),
    ("employee_message_id", "INTEGER DEFAULT NULL"),
];

/// Brings the schema up to date. Safe to call on every start.
///
/// Versioned migrations are tracked by refinery; a database created before
/// versioning existed is adopted afterwards by adding whatever later columns
/// it is missing.
pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    // Serialize migrations per-process so two pools opened at once do not interleave.
    let mutex = MIGRATION_LOCK.get_or_init(|| Mutex::new(()));
    let _guard = match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Migration lock was poisoned, recovering...");
            poisoned.into_inner()
        }
    };

    conn.busy_timeout(config::database::busy_timeout())
        .context("set SQLite busy timeout")?;

    let report = embedded::migrations::runner()
        .run(conn)
        .context("apply migrations")?;
    for migration in report.applied_migrations() {
        log::info!("Applied migration {}", migration);
    }

    adopt_legacy_columns(conn).context("adopt legacy payments table")?;
    Ok(())
}

/// Adds later optional columns to a `payments` table created by an older schema.
fn adopt_legacy_columns(conn: &Connection) -> Result<()> {
    let columns = table_columns(conn, "payments")?;

    for (name, definition) in LATER_PAYMENT_COLUMNS {
        if columns.iter().any(|c| c == name) {
            continue;
        }
        log::info!("Adding missing column: {} to payments table", name);
        conn.execute_batch(&format!("ALTER TABLE payments ADD COLUMN {} {};", name, definition))
            .with_context(|| format!("add column {}", name))?;
    }

    Ok(())
}

/// Column names of a table, in declaration order.
pub(crate) fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
    rows.collect()
}
