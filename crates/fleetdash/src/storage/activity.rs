//! Activity log queries.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::{current_time, encode_time, sql_limit, time_column, Storage};
use crate::error::Result;
use crate::model::{Activity, ActivityKind};

/// Append one entry to the activity log, stamped `time`.
pub(super) fn record_at(
    conn: &Connection,
    kind: ActivityKind,
    message: &str,
    time: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO activity (kind, message, time) VALUES (?1, ?2, ?3)",
        params![kind, message, encode_time(time)],
    )?;
    Ok(())
}

/// Append one entry to the activity log, stamped now.
pub(super) fn record(conn: &Connection, kind: ActivityKind, message: &str) -> Result<()> {
    record_at(conn, kind, message, current_time())
}

impl Storage {
    /// Append an entry to the activity log.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn record_activity(&self, kind: ActivityKind, message: &str) -> Result<()> {
        record(&self.conn, kind, message)
    }

    /// Get the newest activity entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn recent_activity(&self, limit: usize) -> Result<Vec<Activity>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT kind, message, time
            FROM activity ORDER BY time DESC, id DESC LIMIT ?1
            ",
        )?;

        let entries = stmt
            .query_map([sql_limit(limit)], |row| {
                Ok(Activity {
                    kind: row.get(0)?,
                    message: row.get(1)?,
                    time: time_column(row, 2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}
