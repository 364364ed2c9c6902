//! `SQLite` schema definitions for fleetdash.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema. Timestamps are stored as RFC 3339 text and
//! enumerations as their wire names.

/// SQL statement to create the organizations table.
pub const CREATE_ORGANIZATIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS organizations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT,
    address TEXT,
    status TEXT NOT NULL DEFAULT 'active',
    created_at TEXT NOT NULL,
    last_active TEXT NOT NULL
)
";

/// SQL statement to create the SIMs table.
pub const CREATE_SIMS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS sims (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    sim_id TEXT NOT NULL UNIQUE,
    iccid TEXT NOT NULL,
    msisdn TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'inactive',
    network_provider TEXT NOT NULL,
    country TEXT NOT NULL DEFAULT 'US',
    data_limit INTEGER DEFAULT 1000,
    current_usage INTEGER DEFAULT 0,
    last_sync TEXT,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create the devices table.
///
/// `location` holds the `{lat, lng, accuracy}` object as JSON text.
pub const CREATE_DEVICES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS devices (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    label TEXT NOT NULL,
    imei TEXT NOT NULL UNIQUE,
    model TEXT,
    manufacturer TEXT,
    description TEXT,
    status TEXT NOT NULL DEFAULT 'offline',
    organization_id INTEGER,
    sim_id INTEGER,
    last_online TEXT,
    location TEXT,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create the users table.
pub const CREATE_USERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    full_name TEXT,
    phone TEXT,
    role TEXT NOT NULL DEFAULT 'user',
    organization_id INTEGER,
    status TEXT NOT NULL DEFAULT 'active',
    last_login TEXT,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create the reports table.
pub const CREATE_REPORTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS reports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    report_type TEXT NOT NULL,
    date_range TEXT NOT NULL,
    organization_id INTEGER,
    format TEXT NOT NULL DEFAULT 'pdf',
    status TEXT NOT NULL DEFAULT 'pending',
    file_path TEXT,
    file_size INTEGER,
    generated_at TEXT NOT NULL,
    created_by INTEGER NOT NULL
)
";

/// SQL statement to create the activity log table.
pub const CREATE_ACTIVITY_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS activity (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    kind TEXT NOT NULL,
    message TEXT NOT NULL,
    time TEXT NOT NULL
)
";

/// Index for the per-organization device lookup.
pub const CREATE_DEVICES_ORG_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_devices_organization ON devices(organization_id)
";

/// Index for the per-organization user lookup.
pub const CREATE_USERS_ORG_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_users_organization ON users(organization_id)
";

/// Index for newest-first activity queries.
pub const CREATE_ACTIVITY_TIME_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_activity_time ON activity(time DESC)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_ORGANIZATIONS_TABLE,
    CREATE_SIMS_TABLE,
    CREATE_DEVICES_TABLE,
    CREATE_USERS_TABLE,
    CREATE_REPORTS_TABLE,
    CREATE_ACTIVITY_TABLE,
    CREATE_DEVICES_ORG_INDEX,
    CREATE_USERS_ORG_INDEX,
    CREATE_ACTIVITY_TIME_INDEX,
    CREATE_METADATA_TABLE,
];
