//! Demo data for an empty database.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::info;

use super::{
    activity, current_time, devices::insert_device, organizations::insert_organization,
    reports::insert_report, sims::insert_sim, users::insert_user, Storage,
};
use crate::error::{Error, Result};
use crate::model::{
    AccountStatus, ActivityKind, Device, DeviceStatus, Location, Organization, Report,
    ReportFormat, ReportStatus, ReportType, Sim, User, UserRole,
};
use crate::password::hash_password;

/// Password shared by the demo users.
pub const DEMO_PASSWORD: &str = "fleetdash-demo";

fn date(year: i32, month: u32, day: u32) -> Result<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| Error::internal(format!("invalid seed date {year}-{month}-{day}")))
}

fn text(value: &str) -> Option<String> {
    Some(value.to_string())
}

fn organizations(now: DateTime<Utc>) -> Result<Vec<Organization>> {
    Ok(vec![
        Organization {
            id: 1,
            name: "TechCorp Solutions".to_string(),
            email: "tech@techcorp.com".to_string(),
            phone: text("+1-555-0100"),
            address: text("123 Tech St, San Francisco, CA"),
            status: AccountStatus::Active,
            created_at: date(2024, 1, 15)?,
            last_active: now,
        },
        Organization {
            id: 2,
            name: "Global Industries".to_string(),
            email: "admin@global.com".to_string(),
            phone: text("+1-555-0200"),
            address: text("456 Global Ave, New York, NY"),
            status: AccountStatus::Active,
            created_at: date(2024, 2, 3)?,
            last_active: now - Duration::days(1),
        },
        Organization {
            id: 3,
            name: "StartupXYZ".to_string(),
            email: "contact@startupxyz.com".to_string(),
            phone: text("+1-555-0300"),
            address: text("789 Innovation Blvd, Austin, TX"),
            status: AccountStatus::Inactive,
            created_at: date(2023, 12, 20)?,
            last_active: now - Duration::days(3),
        },
    ])
}

#[rustfmt::skip]
fn sims(now: DateTime<Utc>) -> Vec<Sim> {
    let sim = |id, sim_id: &str, iccid: &str, msisdn: &str, status, provider: &str, limit, usage| {
        Sim {
            id,
            sim_id: sim_id.to_string(),
            iccid: iccid.to_string(),
            msisdn: msisdn.to_string(),
            status,
            network_provider: provider.to_string(),
            country: "US".to_string(),
            data_limit: Some(limit),
            current_usage: Some(usage),
            last_sync: Some(now),
            created_at: now,
        }
    };
    vec![
        sim(1, "SIM-001", "89014103211118510720", "+1-555-0123", AccountStatus::Active, "Verizon", 10_000, 2_400),
        sim(2, "SIM-002", "89014103211118510721", "+1-555-0124", AccountStatus::Active, "AT&T", 5_000, 1_800),
        sim(3, "SIM-003", "89014103211118510722", "+1-555-0125", AccountStatus::Inactive, "T-Mobile", 8_000, 0),
    ]
}

fn devices(now: DateTime<Utc>) -> Vec<Device> {
    vec![
        Device {
            id: 1,
            label: "DEV-001".to_string(),
            imei: "123456789012345".to_string(),
            model: text("IoT Device Pro"),
            manufacturer: text("TechCorp"),
            description: text("Industrial IoT sensor"),
            status: DeviceStatus::Online,
            organization_id: Some(1),
            sim_id: Some(1),
            last_online: Some(now - Duration::minutes(5)),
            location: Some(Location {
                lat: 37.7749,
                lng: -122.4194,
                accuracy: 10.0,
            }),
            created_at: now,
        },
        Device {
            id: 2,
            label: "DEV-002".to_string(),
            imei: "123456789012346".to_string(),
            model: text("Smart Tracker"),
            manufacturer: text("Global Tech"),
            description: text("GPS tracking device"),
            status: DeviceStatus::Offline,
            organization_id: Some(2),
            sim_id: Some(2),
            last_online: Some(now - Duration::hours(2)),
            location: Some(Location {
                lat: 40.7128,
                lng: -74.0060,
                accuracy: 15.0,
            }),
            created_at: now,
        },
        Device {
            id: 3,
            label: "DEV-003".to_string(),
            imei: "123456789012347".to_string(),
            model: text("Environmental Monitor"),
            manufacturer: text("EcoTech"),
            description: text("Environmental monitoring sensor"),
            status: DeviceStatus::Error,
            organization_id: Some(1),
            sim_id: None,
            last_online: Some(now - Duration::days(1)),
            location: None,
            created_at: now,
        },
    ]
}

#[rustfmt::skip]
fn users(now: DateTime<Utc>, password_hash: &str) -> Vec<User> {
    let user = |id, username: &str, email: &str, full_name: &str, phone: &str, role, org, seen| User {
        id,
        username: username.to_string(),
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        full_name: text(full_name),
        phone: text(phone),
        role,
        organization_id: org,
        status: AccountStatus::Active,
        last_login: Some(seen),
        created_at: now,
    };
    vec![
        user(1, "johnadmin", "john@admin.com", "John Admin", "+1-555-1000", UserRole::SuperAdmin, None, now - Duration::hours(2)),
        user(2, "sarah.manager", "sarah@techcorp.com", "Sarah Manager", "+1-555-1001", UserRole::Admin, Some(1), now - Duration::days(1)),
        user(3, "mike.user", "mike@global.com", "Mike User", "+1-555-1002", UserRole::User, Some(2), now - Duration::hours(1)),
    ]
}

fn reports(now: DateTime<Utc>) -> Vec<Report> {
    vec![
        Report {
            id: 1,
            name: "Monthly Usage Report - January 2024".to_string(),
            report_type: ReportType::Usage,
            date_range: "2024-01-01 to 2024-01-31".to_string(),
            organization_id: None,
            format: ReportFormat::Pdf,
            status: ReportStatus::Complete,
            file_path: text("/reports/usage-jan-2024.pdf"),
            file_size: Some(2_457_600),
            generated_at: now - Duration::hours(2),
            created_by: 1,
        },
        Report {
            id: 2,
            name: "Device Inventory Report".to_string(),
            report_type: ReportType::Device,
            date_range: "2024-01-01 to 2024-07-08".to_string(),
            organization_id: None,
            format: ReportFormat::Csv,
            status: ReportStatus::Complete,
            file_path: text("/reports/devices-inventory.csv"),
            file_size: Some(1_887_436),
            generated_at: now - Duration::days(1),
            created_by: 1,
        },
    ]
}

#[rustfmt::skip]
fn activity_feed(now: DateTime<Utc>) -> [(ActivityKind, &'static str, DateTime<Utc>); 4] {
    [
        (ActivityKind::Error, "Device DEV-045 connection error", now - Duration::minutes(18)),
        (ActivityKind::Organization, "Organization \"TechCorp\" updated", now - Duration::minutes(12)),
        (ActivityKind::User, "User john@acme.com logged in", now - Duration::minutes(5)),
        (ActivityKind::Device, "Device DEV-001 registered", now - Duration::minutes(2)),
    ]
}

impl Storage {
    /// Load the demo fleet into an empty database.
    ///
    /// Returns `false` without touching anything if any record exists.
    ///
    /// # Errors
    ///
    /// Returns an error if hashing or a database operation fails.
    pub fn seed_demo_data(&self) -> Result<bool> {
        if !self.is_empty()? {
            return Ok(false);
        }

        let now = current_time();
        let password_hash = hash_password(DEMO_PASSWORD)?;

        let tx = self.conn.unchecked_transaction()?;
        for org in organizations(now)? {
            insert_organization(&tx, Some(org.id), &org)?;
        }
        for sim in sims(now) {
            insert_sim(&tx, Some(sim.id), &sim)?;
        }
        for device in devices(now) {
            insert_device(&tx, Some(device.id), &device)?;
        }
        for user in users(now, &password_hash) {
            insert_user(&tx, Some(user.id), &user)?;
        }
        for report in reports(now) {
            insert_report(&tx, Some(report.id), &report)?;
        }
        for (kind, message, time) in activity_feed(now) {
            activity::record_at(&tx, kind, message, time)?;
        }
        tx.commit()?;

        info!("Seeded demo data");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind;
    use crate::password::verify_password;

    fn seeded() -> Storage {
        let storage = Storage::open_in_memory().expect("failed to create test storage");
        assert!(storage.seed_demo_data().unwrap());
        storage
    }

    #[test]
    fn test_seed_counts() {
        let storage = seeded();
        assert_eq!(storage.count(EntityKind::Organization).unwrap(), 3);
        assert_eq!(storage.count(EntityKind::Sim).unwrap(), 3);
        assert_eq!(storage.count(EntityKind::Device).unwrap(), 3);
        assert_eq!(storage.count(EntityKind::User).unwrap(), 3);
        assert_eq!(storage.count(EntityKind::Report).unwrap(), 2);
    }

    #[test]
    fn test_seed_skips_populated_database() {
        let storage = seeded();
        assert!(!storage.seed_demo_data().unwrap());
        assert_eq!(storage.count(EntityKind::Device).unwrap(), 3);
    }

    #[test]
    fn test_seed_records() {
        let storage = seeded();

        let org = storage.get_organization(1).unwrap().unwrap();
        assert_eq!(org.name, "TechCorp Solutions");
        assert_eq!(org.created_at, date(2024, 1, 15).unwrap());

        let device = storage.get_device(3).unwrap().unwrap();
        assert_eq!(device.status, DeviceStatus::Error);
        assert!(device.sim_id.is_none());

        let john = storage.user_by_username("johnadmin").unwrap().unwrap();
        assert_eq!(john.role, UserRole::SuperAdmin);
        assert!(verify_password(DEMO_PASSWORD, &john.password_hash).unwrap());

        let report = storage.get_report(2).unwrap().unwrap();
        assert_eq!(report.file_size, Some(1_887_436));
    }

    #[test]
    fn test_new_ids_follow_seed() {
        let storage = seeded();
        let org = storage
            .create_organization(
                serde_json::from_str(r#"{"name": "Acme", "email": "ops@acme.com"}"#).unwrap(),
            )
            .unwrap();
        assert_eq!(org.id, 4);
    }

    #[test]
    fn test_seed_activity_newest_first() {
        let storage = seeded();
        let feed = storage.recent_activity(10).unwrap();
        assert_eq!(feed.len(), 4);
        assert_eq!(feed[0].message, "Device DEV-001 registered");
        assert_eq!(feed[3].kind, ActivityKind::Error);
    }

    #[test]
    fn test_seed_usage_total() {
        let storage = seeded();
        assert_eq!(storage.total_data_usage().unwrap(), 4_200);
    }
}
