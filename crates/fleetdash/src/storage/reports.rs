//! Report queries.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::{activity, current_time, encode_time, time_column, Storage};
use crate::error::{Error, Result};
use crate::model::{ActivityKind, EntityKind, NewReport, Report, ReportPatch};

const SELECT_REPORT: &str = r"
    SELECT id, name, report_type, date_range, organization_id, format, status,
           file_path, file_size, generated_at, created_by
    FROM reports
";

/// Insert a full record. `id` of `None` lets `SQLite` assign one.
pub(super) fn insert_report(conn: &Connection, id: Option<i64>, report: &Report) -> Result<i64> {
    conn.execute(
        r"
        INSERT INTO reports (id, name, report_type, date_range, organization_id, format, status,
                             file_path, file_size, generated_at, created_by)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        ",
        params![
            id,
            report.name,
            report.report_type,
            report.date_range,
            report.organization_id,
            report.format,
            report.status,
            report.file_path,
            report.file_size,
            encode_time(report.generated_at),
            report.created_by,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn row_to_report(row: &rusqlite::Row) -> rusqlite::Result<Report> {
    Ok(Report {
        id: row.get(0)?,
        name: row.get(1)?,
        report_type: row.get(2)?,
        date_range: row.get(3)?,
        organization_id: row.get(4)?,
        format: row.get(5)?,
        status: row.get(6)?,
        file_path: row.get(7)?,
        file_size: row.get(8)?,
        generated_at: time_column(row, 9)?,
        created_by: row.get(10)?,
    })
}

fn find_report(conn: &Connection, id: i64) -> Result<Option<Report>> {
    let sql = format!("{SELECT_REPORT} WHERE id = ?1");
    let report = conn.query_row(&sql, [id], row_to_report).optional()?;
    Ok(report)
}

impl Storage {
    /// Get all reports, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_reports(&self) -> Result<Vec<Report>> {
        let sql = format!("{SELECT_REPORT} ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let reports = stmt
            .query_map([], row_to_report)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(reports)
    }

    /// Get a report by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_report(&self, id: i64) -> Result<Option<Report>> {
        find_report(&self.conn, id)
    }

    /// Record a report request. No file exists yet.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, or an error if the
    /// database operation fails.
    pub fn create_report(&self, new: NewReport) -> Result<Report> {
        new.validate()?;

        let mut report = Report {
            id: 0,
            name: new.name,
            report_type: new.report_type,
            date_range: new.date_range,
            organization_id: new.organization_id,
            format: new.format,
            status: new.status,
            file_path: None,
            file_size: None,
            generated_at: current_time(),
            created_by: new.created_by,
        };

        let tx = self.conn.unchecked_transaction()?;
        report.id = insert_report(&tx, None, &report)?;
        activity::record(
            &tx,
            ActivityKind::Report,
            &format!("Report \"{}\" requested", report.name),
        )?;
        tx.commit()?;

        debug!("Inserted report with id {}", report.id);
        Ok(report)
    }

    /// Apply a patch to a report.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the report does not exist, a validation
    /// error for bad input, or an error if the database operation fails.
    pub fn update_report(&self, id: i64, patch: ReportPatch) -> Result<Report> {
        patch.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        let mut report =
            find_report(&tx, id)?.ok_or_else(|| Error::not_found(EntityKind::Report, id))?;
        if patch.is_empty() {
            debug!("Empty patch for report {id}, nothing to write");
            return Ok(report);
        }
        patch.apply(&mut report);

        tx.execute(
            r"
            UPDATE reports
            SET name = ?2, report_type = ?3, date_range = ?4, organization_id = ?5,
                format = ?6, status = ?7, created_by = ?8
            WHERE id = ?1
            ",
            params![
                id,
                report.name,
                report.report_type,
                report.date_range,
                report.organization_id,
                report.format,
                report.status,
                report.created_by,
            ],
        )?;
        activity::record(
            &tx,
            ActivityKind::Report,
            &format!("Report \"{}\" updated", report.name),
        )?;
        tx.commit()?;

        Ok(report)
    }

    /// Delete a report by ID.
    ///
    /// Returns `true` if a report was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_report(&self, id: i64) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let Some(report) = find_report(&tx, id)? else {
            return Ok(false);
        };
        tx.execute("DELETE FROM reports WHERE id = ?1", [id])?;
        activity::record(
            &tx,
            ActivityKind::Report,
            &format!("Report \"{}\" deleted", report.name),
        )?;
        tx.commit()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ReportFormat, ReportStatus, ReportType};

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    fn new_report() -> NewReport {
        serde_json::from_str(
            r#"{
                "name": "Monthly Usage",
                "type": "usage",
                "dateRange": "2024-01-01 to 2024-01-31",
                "createdBy": 1
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_create_defaults() {
        let storage = create_test_storage();
        let report = storage.create_report(new_report()).unwrap();

        assert_eq!(report.report_type, ReportType::Usage);
        assert_eq!(report.format, ReportFormat::Pdf);
        assert_eq!(report.status, ReportStatus::Pending);
        assert!(report.file_path.is_none());
        assert!(report.file_size.is_none());
        assert_eq!(storage.get_report(report.id).unwrap().unwrap(), report);
    }

    #[test]
    fn test_update() {
        let storage = create_test_storage();
        let report = storage.create_report(new_report()).unwrap();

        let patch: ReportPatch =
            serde_json::from_str(r#"{"status": "complete", "format": "csv"}"#).unwrap();
        let updated = storage.update_report(report.id, patch).unwrap();

        assert_eq!(updated.status, ReportStatus::Complete);
        assert_eq!(updated.format, ReportFormat::Csv);
        assert_eq!(updated.name, report.name);
        assert_eq!(updated.generated_at, report.generated_at);
    }

    #[test]
    fn test_update_missing() {
        let storage = create_test_storage();
        assert!(storage
            .update_report(1, ReportPatch::default())
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_delete() {
        let storage = create_test_storage();
        let report = storage.create_report(new_report()).unwrap();

        assert!(storage.delete_report(report.id).unwrap());
        assert!(storage.list_reports().unwrap().is_empty());
        assert!(!storage.delete_report(report.id).unwrap());
    }
}
