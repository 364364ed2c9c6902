//! Dashboard aggregation across every collection.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::model::{Activity, EntityKind};
use crate::storage::Storage;

/// Fleet-wide totals for the dashboard page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Number of devices.
    pub total_devices: i64,
    /// Number of organizations.
    pub total_organizations: i64,
    /// Number of users.
    pub total_users: i64,
    /// Number of SIMs.
    pub total_sims: i64,
    /// Current SIM usage in MB; SIMs without a reading count as 0.
    pub total_data_usage: i64,
    /// Device count per status. Statuses with no devices are left out.
    pub device_stats: BTreeMap<&'static str, i64>,
    /// Newest entries first.
    pub recent_activity: Vec<Activity>,
}

/// Build the dashboard summary, keeping at most `activity_limit` entries of
/// recent activity.
///
/// # Errors
///
/// Returns an error if any database operation fails.
pub fn dashboard(storage: &Storage, activity_limit: usize) -> Result<Dashboard> {
    let device_stats = storage
        .device_status_counts()?
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(status, count)| (status.as_str(), count))
        .collect();

    let summary = Dashboard {
        total_devices: storage.count(EntityKind::Device)?,
        total_organizations: storage.count(EntityKind::Organization)?,
        total_users: storage.count(EntityKind::User)?,
        total_sims: storage.count(EntityKind::Sim)?,
        total_data_usage: storage.total_data_usage()?,
        device_stats,
        recent_activity: storage.recent_activity(activity_limit)?,
    };

    debug!(
        "Dashboard: {} devices, {} organizations",
        summary.total_devices, summary.total_organizations
    );
    Ok(summary)
}
