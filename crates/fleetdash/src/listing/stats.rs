//! Per-collection tallies shown above each list page.

use serde::Serialize;

use crate::model::{AccountStatus, Device, DeviceStatus, Organization, Sim, User, UserRole};

/// Counts of active, inactive and suspended accounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct AccountTally {
    active: usize,
    inactive: usize,
    suspended: usize,
}

impl AccountTally {
    fn add(&mut self, status: AccountStatus) {
        match status {
            AccountStatus::Active => self.active += 1,
            AccountStatus::Inactive => self.inactive += 1,
            AccountStatus::Suspended => self.suspended += 1,
        }
    }
}

/// Device counts by connection status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStats {
    /// Devices reporting in.
    pub online: usize,
    /// Devices not reporting.
    pub offline: usize,
    /// Devices in an error state.
    pub error: usize,
    /// Every record counted.
    pub total: usize,
}

impl DeviceStats {
    /// Count `devices` by status.
    #[must_use]
    pub fn tally(devices: &[Device]) -> Self {
        devices.iter().fold(Self::default(), |mut stats, device| {
            match device.status {
                DeviceStatus::Online => stats.online += 1,
                DeviceStatus::Offline => stats.offline += 1,
                DeviceStatus::Error => stats.error += 1,
            }
            stats.total += 1;
            stats
        })
    }
}

/// SIM counts by status plus data totals in MB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimStats {
    /// Accounts in use.
    pub active: usize,
    /// Accounts switched off.
    pub inactive: usize,
    /// Accounts on hold.
    pub suspended: usize,
    /// Every record counted.
    pub total: usize,
    /// Sum of `currentUsage`, missing values counted as 0.
    pub total_data_usage: i64,
    /// Sum of `dataLimit`, missing values counted as 0.
    pub total_data_limit: i64,
}

impl SimStats {
    /// Count `sims` by status and add up their data figures.
    #[must_use]
    pub fn tally(sims: &[Sim]) -> Self {
        let mut accounts = AccountTally::default();
        let mut total_data_usage = 0_i64;
        let mut total_data_limit = 0_i64;

        for sim in sims {
            accounts.add(sim.status);
            total_data_usage = total_data_usage.saturating_add(sim.current_usage.unwrap_or(0));
            total_data_limit = total_data_limit.saturating_add(sim.data_limit.unwrap_or(0));
        }

        Self {
            active: accounts.active,
            inactive: accounts.inactive,
            suspended: accounts.suspended,
            total: sims.len(),
            total_data_usage,
            total_data_limit,
        }
    }
}

/// Organization counts by account status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationStats {
    /// Accounts in use.
    pub active: usize,
    /// Accounts switched off.
    pub inactive: usize,
    /// Accounts on hold.
    pub suspended: usize,
    /// Every record counted.
    pub total: usize,
}

impl OrganizationStats {
    /// Count `organizations` by status.
    #[must_use]
    pub fn tally(organizations: &[Organization]) -> Self {
        let mut accounts = AccountTally::default();
        for org in organizations {
            accounts.add(org.status);
        }
        Self {
            active: accounts.active,
            inactive: accounts.inactive,
            suspended: accounts.suspended,
            total: organizations.len(),
        }
    }
}

/// User counts by account status and by role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    /// Accounts in use.
    pub active: usize,
    /// Accounts switched off.
    pub inactive: usize,
    /// Accounts on hold.
    pub suspended: usize,
    /// Users with full access.
    pub super_admins: usize,
    /// Organization administrators.
    pub admins: usize,
    /// Regular users.
    pub users: usize,
    /// Every record counted.
    pub total: usize,
}

impl UserStats {
    /// Count `users` by status and role.
    #[must_use]
    pub fn tally(users: &[User]) -> Self {
        let mut accounts = AccountTally::default();
        let mut stats = Self {
            total: users.len(),
            ..Self::default()
        };

        for user in users {
            accounts.add(user.status);
            match user.role {
                UserRole::SuperAdmin => stats.super_admins += 1,
                UserRole::Admin => stats.admins += 1,
                UserRole::User => stats.users += 1,
            }
        }

        stats.active = accounts.active;
        stats.inactive = accounts.inactive;
        stats.suspended = accounts.suspended;
        stats
    }
}
