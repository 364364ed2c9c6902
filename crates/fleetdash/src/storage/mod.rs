//! Storage layer for fleetdash.
//!
//! This module provides `SQLite`-based persistent storage for the fleet
//! records. Each entity keeps its queries in its own file as an
//! `impl Storage` block; this file holds the connection handling and the
//! column codecs they share.
//!
//! Every write also appends to the activity log inside the same
//! transaction, so the dashboard feed never disagrees with the tables.

pub mod migrations;
pub mod schema;

mod activity;
mod devices;
mod organizations;
mod reports;
mod seed;
mod sims;
mod users;

pub use seed::DEMO_PASSWORD;

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef};
use rusqlite::{Connection, Row};
use tracing::{debug, info};

use crate::config::StorageConfig;
use crate::error::{Error, Result};
use crate::model::{
    AccountStatus, ActivityKind, DeviceStatus, EntityKind, Location, ReportFormat, ReportStatus,
    ReportType, UnknownVariant, UserRole,
};

/// Storage engine for fleet records.
///
/// Provides persistent storage using `SQLite` with support for:
/// - CRUD over organizations, devices, SIMs, users and reports
/// - Uniqueness checks on IMEI, SIM id, username and e-mail
/// - An append-only activity log
/// - Demo data for an empty database
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Open the database described by the storage configuration, loading
    /// the demo data when it is enabled and the database is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or seeded.
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let storage = if config.in_memory {
            Self::open_in_memory()?
        } else {
            Self::open(&config.database_path)?
        };

        if config.seed_demo_data && storage.seed_demo_data()? {
            info!("Loaded demo data into {}", storage.path.display());
        }
        Ok(storage)
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Count the records of one kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self, entity: EntityKind) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", entity.collection());
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count)
    }

    /// True when no entity table holds a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn is_empty(&self) -> Result<bool> {
        for entity in EntityKind::ALL {
            if self.count(entity)? > 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Reject `value` if another row of `entity` already holds it in `column`.
///
/// `exclude_id` is the row being updated, which may keep its own value.
fn ensure_unique(
    conn: &Connection,
    entity: EntityKind,
    column: &str,
    field: &'static str,
    value: &str,
    exclude_id: Option<i64>,
) -> Result<()> {
    let sql = format!(
        "SELECT COUNT(*) FROM {} WHERE {column} = ?1 AND id != ?2",
        entity.collection()
    );
    let count: i64 = conn.query_row(&sql, (value, exclude_id.unwrap_or(0)), |row| row.get(0))?;
    if count > 0 {
        debug!("Rejecting duplicate {} {}", entity, field);
        return Err(Error::duplicate(entity, field, value));
    }
    Ok(())
}

/// Current time, truncated to the precision the database keeps.
fn current_time() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Encode a timestamp as fixed-width RFC 3339 so text order is time order.
fn encode_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_time(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Read a required timestamp column.
fn time_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let value: String = row.get(idx)?;
    parse_time(idx, &value)
}

/// Read a nullable timestamp column.
fn optional_time_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let value: Option<String> = row.get(idx)?;
    value.map(|v| parse_time(idx, &v)).transpose()
}

/// Clamp a `usize` limit into an SQL integer.
fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

macro_rules! sql_enum {
    ($($name:ident),+) => {
        $(
            impl ToSql for $name {
                fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                    Ok(ToSqlOutput::from(self.as_str()))
                }
            }

            impl FromSql for $name {
                fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                    value
                        .as_str()?
                        .parse()
                        .map_err(|e: UnknownVariant| FromSqlError::Other(Box::new(e)))
                }
            }
        )+
    };
}

sql_enum!(
    AccountStatus,
    ActivityKind,
    DeviceStatus,
    ReportFormat,
    ReportStatus,
    ReportType,
    UserRole
);

impl ToSql for Location {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        serde_json::to_string(self)
            .map(ToSqlOutput::from)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
    }
}

impl FromSql for Location {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        serde_json::from_str(value.as_str()?).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewOrganization;

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    #[test]
    fn test_open_in_memory() {
        let storage = create_test_storage();
        assert_eq!(storage.path().to_string_lossy(), ":memory:");
        assert!(storage.is_empty().unwrap());
    }

    #[test]
    fn test_count_per_entity() {
        let storage = create_test_storage();
        for entity in EntityKind::ALL {
            assert_eq!(storage.count(entity).unwrap(), 0);
        }

        let org: NewOrganization =
            serde_json::from_str(r#"{"name": "Acme", "email": "ops@acme.com"}"#).unwrap();
        storage.create_organization(org).unwrap();

        assert_eq!(storage.count(EntityKind::Organization).unwrap(), 1);
        assert!(!storage.is_empty().unwrap());
    }

    #[test]
    fn test_from_config_seeds_once() {
        let config = StorageConfig {
            in_memory: true,
            seed_demo_data: true,
            ..StorageConfig::default()
        };
        let storage = Storage::from_config(&config).unwrap();
        assert_eq!(storage.count(EntityKind::Device).unwrap(), 3);
        assert!(!storage.seed_demo_data().unwrap());
        assert_eq!(storage.count(EntityKind::Device).unwrap(), 3);
    }

    #[test]
    fn test_from_config_without_seed() {
        let config = StorageConfig {
            in_memory: true,
            seed_demo_data: false,
            ..StorageConfig::default()
        };
        let storage = Storage::from_config(&config).unwrap();
        assert!(storage.is_empty().unwrap());
    }

    #[test]
    fn test_time_encoding_is_sortable() {
        let earlier = DateTime::parse_from_rfc3339("2024-01-15T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let later = DateTime::parse_from_rfc3339("2024-01-15T09:00:00.5Z")
            .unwrap()
            .with_timezone(&Utc);
        let (a, b) = (encode_time(earlier), encode_time(later));
        assert_eq!(a.len(), b.len());
        assert!(a < b);
        assert_eq!(parse_time(0, &a).unwrap(), earlier);
    }

    #[test]
    fn test_parse_time_rejects_garbage() {
        assert!(parse_time(3, "yesterday").is_err());
    }

    #[test]
    fn test_enum_column_round_trip() {
        let storage = create_test_storage();
        let status: DeviceStatus = storage
            .conn
            .query_row("SELECT ?1", [DeviceStatus::Error], |row| row.get(0))
            .unwrap();
        assert_eq!(status, DeviceStatus::Error);
    }

    #[test]
    fn test_unknown_enum_value_is_an_error() {
        let storage = create_test_storage();
        let result: rusqlite::Result<UserRole> =
            storage.conn.query_row("SELECT 'janitor'", [], |row| row.get(0));
        assert!(result.is_err());
    }

    #[test]
    fn test_location_column() {
        let storage = create_test_storage();
        let location = Location {
            lat: 37.7749,
            lng: -122.4194,
            accuracy: 10.0,
        };
        let read: Location = storage
            .conn
            .query_row("SELECT ?1", [location], |row| row.get(0))
            .unwrap();
        assert_eq!(read, location);
    }

    #[test]
    fn test_ensure_unique() {
        let storage = create_test_storage();
        let org: NewOrganization =
            serde_json::from_str(r#"{"name": "Acme", "email": "ops@acme.com"}"#).unwrap();
        let created = storage.create_organization(org).unwrap();

        let err = ensure_unique(
            &storage.conn,
            EntityKind::Organization,
            "email",
            "email",
            "ops@acme.com",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Duplicate { .. }));

        ensure_unique(
            &storage.conn,
            EntityKind::Organization,
            "email",
            "email",
            "ops@acme.com",
            Some(created.id),
        )
        .unwrap();
    }
}
