use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{nullable, present, require_text, ReportFormat, ReportStatus, ReportType};
use crate::error::Result;

/// A report generation request and its outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Identifier assigned by storage.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// What the report covers.
    #[serde(rename = "type")]
    pub report_type: ReportType,
    /// Free-form period, e.g. `2024-01-01 to 2024-01-31`.
    pub date_range: String,
    /// Organization the report is scoped to; `None` for fleet-wide.
    pub organization_id: Option<i64>,
    /// Output format.
    pub format: ReportFormat,
    /// Generation state.
    pub status: ReportStatus,
    /// Location of the generated file.
    pub file_path: Option<String>,
    /// Size of the generated file in bytes.
    pub file_size: Option<i64>,
    /// When the report was requested.
    pub generated_at: DateTime<Utc>,
    /// User who requested the report.
    pub created_by: i64,
}

/// Payload for requesting a report. The file fields are filled in by the
/// generator, never by clients.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    /// Display name.
    pub name: String,
    /// What the report covers.
    #[serde(rename = "type")]
    pub report_type: ReportType,
    /// Free-form period.
    pub date_range: String,
    /// Organization scope.
    #[serde(default)]
    pub organization_id: Option<i64>,
    /// Output format, `pdf` when omitted.
    #[serde(default)]
    pub format: ReportFormat,
    /// Generation state, `pending` when omitted.
    #[serde(default)]
    pub status: ReportStatus,
    /// Requesting user.
    pub created_by: i64,
}

impl NewReport {
    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        require_text("dateRange", &self.date_range)
    }
}

/// Partial update of a report.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPatch {
    /// New name.
    #[serde(default, deserialize_with = "present")]
    pub name: Option<String>,
    /// New subject.
    #[serde(rename = "type", default, deserialize_with = "present")]
    pub report_type: Option<ReportType>,
    /// New period.
    #[serde(default, deserialize_with = "present")]
    pub date_range: Option<String>,
    /// New scope, `null` makes it fleet-wide.
    #[serde(default, deserialize_with = "nullable")]
    pub organization_id: Option<Option<i64>>,
    /// New format.
    #[serde(default, deserialize_with = "present")]
    pub format: Option<ReportFormat>,
    /// New generation state.
    #[serde(default, deserialize_with = "present")]
    pub status: Option<ReportStatus>,
    /// New requesting user.
    #[serde(default, deserialize_with = "present")]
    pub created_by: Option<i64>,
}

impl ReportPatch {
    /// True when the patch carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        if let Some(date_range) = &self.date_range {
            require_text("dateRange", date_range)?;
        }
        Ok(())
    }

    /// Overlay the present fields onto `report`.
    pub fn apply(self, report: &mut Report) {
        if let Some(name) = self.name {
            report.name = name;
        }
        if let Some(report_type) = self.report_type {
            report.report_type = report_type;
        }
        if let Some(date_range) = self.date_range {
            report.date_range = date_range;
        }
        if let Some(organization_id) = self.organization_id {
            report.organization_id = organization_id;
        }
        if let Some(format) = self.format {
            report.format = format;
        }
        if let Some(status) = self.status {
            report.status = status;
        }
        if let Some(created_by) = self.created_by {
            report.created_by = created_by;
        }
    }
}
