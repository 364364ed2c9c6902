//! Fleet records and their request payloads.
//!
//! Every entity has three shapes:
//! - the stored record (`Device`), serialized in API responses,
//! - a create payload (`NewDevice`) with defaults for optional fields,
//! - a patch payload (`DevicePatch`) where every field is optional.
//!
//! All wire names are camelCase.

mod activity;
mod device;
mod organization;
mod report;
mod sim;
mod status;
mod user;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};

pub use activity::Activity;
pub use device::{Device, DevicePatch, Location, NewDevice};
pub use organization::{NewOrganization, Organization, OrganizationPatch};
pub use report::{NewReport, Report, ReportPatch};
pub use sim::{NewSim, Sim, SimPatch, DEFAULT_COUNTRY, DEFAULT_DATA_LIMIT_MB};
pub use status::{
    AccountStatus, ActivityKind, DeviceStatus, ReportFormat, ReportStatus, ReportType,
    UnknownVariant, UserRole,
};
pub use user::{NewUser, User, UserPatch, MIN_PASSWORD_LEN};

/// The kinds of record the service manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A customer organization.
    Organization,
    /// A tracked device.
    Device,
    /// A SIM card.
    Sim,
    /// A dashboard user.
    User,
    /// A generated report.
    Report,
}

impl EntityKind {
    /// All entity kinds, in dashboard order.
    pub const ALL: [Self; 5] = [
        Self::Organization,
        Self::Device,
        Self::Sim,
        Self::User,
        Self::Report,
    ];

    /// Lower-case singular name used in messages ("device", "SIM").
    #[must_use]
    pub fn singular(self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Device => "device",
            Self::Sim => "SIM",
            Self::User => "user",
            Self::Report => "report",
        }
    }

    /// Lower-case plural name used in messages ("devices", "SIMs").
    #[must_use]
    pub fn plural(self) -> &'static str {
        match self {
            Self::Organization => "organizations",
            Self::Device => "devices",
            Self::Sim => "SIMs",
            Self::User => "users",
            Self::Report => "reports",
        }
    }

    /// Capitalised singular name ("Device", "SIM").
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Organization => "Organization",
            Self::Device => "Device",
            Self::Sim => "SIM",
            Self::User => "User",
            Self::Report => "Report",
        }
    }

    /// URL path segment and table name ("devices", "sims").
    #[must_use]
    pub fn collection(self) -> &'static str {
        match self {
            Self::Organization => "organizations",
            Self::Device => "devices",
            Self::Sim => "sims",
            Self::User => "users",
            Self::Report => "reports",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.singular())
    }
}

/// Deserialize a patch field that distinguishes "absent" from "null".
///
/// Use with `#[serde(default, deserialize_with = "nullable")]` on an
/// `Option<Option<T>>`: an absent key stays `None`, `null` becomes
/// `Some(None)` and a value becomes `Some(Some(v))`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Deserialize a patch field that may be omitted but never cleared.
///
/// Use with `#[serde(default, deserialize_with = "present")]` on an
/// `Option<T>`: an absent key stays `None` and `null` is rejected.
pub(crate) fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)?
        .map(Some)
        .ok_or_else(|| D::Error::custom("required field must not be null"))
}

/// Require a non-blank string.
pub(crate) fn require_text(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "must not be empty"));
    }
    Ok(())
}

/// Require something that looks like an e-mail address.
pub(crate) fn require_email(field: &'static str, value: &str) -> Result<()> {
    require_text(field, value)?;
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(Error::validation(field, "must be an e-mail address")),
    }
}

/// Require a non-negative quantity.
pub(crate) fn require_non_negative(field: &'static str, value: Option<i64>) -> Result<()> {
    match value {
        Some(v) if v < 0 => Err(Error::validation(field, "must not be negative")),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_names() {
        assert_eq!(EntityKind::Sim.singular(), "SIM");
        assert_eq!(EntityKind::Sim.plural(), "SIMs");
        assert_eq!(EntityKind::Sim.collection(), "sims");
        assert_eq!(EntityKind::Organization.title(), "Organization");
        assert_eq!(EntityKind::Device.to_string(), "device");
    }

    #[test]
    fn test_require_text() {
        assert!(require_text("name", "Acme").is_ok());
        assert!(require_text("name", "   ").is_err());
        assert!(require_text("name", "").is_err());
    }

    #[test]
    fn test_require_email() {
        assert!(require_email("email", "ops@acme.com").is_ok());
        assert!(require_email("email", "ops.acme.com").is_err());
        assert!(require_email("email", "@acme.com").is_err());
        assert!(require_email("email", "ops@").is_err());
    }

    #[test]
    fn test_require_non_negative() {
        assert!(require_non_negative("dataLimit", None).is_ok());
        assert!(require_non_negative("dataLimit", Some(0)).is_ok());
        assert!(require_non_negative("dataLimit", Some(-1)).is_err());
    }

    #[derive(Debug, Deserialize)]
    struct Contact {
        #[serde(default, deserialize_with = "nullable")]
        phone: Option<Option<String>>,
    }

    #[test]
    fn test_nullable_distinguishes_absent_and_null() {
        let absent: Contact = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.phone, None);

        let null: Contact = serde_json::from_str(r#"{"phone": null}"#).unwrap();
        assert_eq!(null.phone, Some(None));

        let set: Contact = serde_json::from_str(r#"{"phone": "+1-555"}"#).unwrap();
        assert_eq!(set.phone, Some(Some("+1-555".to_string())));
    }

    #[derive(Debug, Deserialize)]
    struct Rename {
        #[serde(default, deserialize_with = "present")]
        name: Option<String>,
    }

    #[test]
    fn test_present_rejects_null() {
        let absent: Rename = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.name, None);

        let set: Rename = serde_json::from_str(r#"{"name": "Acme"}"#).unwrap();
        assert_eq!(set.name.as_deref(), Some("Acme"));

        let err = serde_json::from_str::<Rename>(r#"{"name": null}"#).unwrap_err();
        assert!(err.to_string().contains("must not be null"));
    }
}
