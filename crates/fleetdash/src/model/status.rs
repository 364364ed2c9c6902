//! Status and category enumerations shared by the records.
//!
//! Each enum serializes as its `snake_case` name, which is also the value
//! stored in the database column.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Returned when a stored or supplied name matches no variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    /// Name of the enum that was being parsed.
    pub kind: &'static str,
    /// The rejected value.
    pub value: String,
}

impl std::fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The wire and storage name.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $wire, )+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok(Self::$variant), )+
                    _ => Err(UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

wire_enum! {
    /// Lifecycle status of organizations, SIMs and users.
    AccountStatus ("account status") {
        /// In good standing.
        Active => "active",
        /// Disabled, may be re-enabled.
        Inactive => "inactive",
        /// Blocked by an administrator.
        Suspended => "suspended",
    }
}

wire_enum! {
    /// Connectivity status of a device.
    DeviceStatus ("device status") {
        /// Reporting normally.
        Online => "online",
        /// Not currently reachable.
        Offline => "offline",
        /// Reporting a fault.
        Error => "error",
    }
}

wire_enum! {
    /// Dashboard access level.
    UserRole ("user role") {
        /// Manages every organization.
        SuperAdmin => "super_admin",
        /// Manages one organization.
        Admin => "admin",
        /// Read-mostly access.
        User => "user",
    }
}

wire_enum! {
    /// Subject of a report.
    ReportType ("report type") {
        /// SIM data usage.
        Usage => "usage",
        /// Device inventory.
        Device => "device",
        /// Organization summary.
        Organization => "organization",
        /// User activity.
        UserActivity => "user_activity",
    }
}

wire_enum! {
    /// Output format of a report.
    ReportFormat ("report format") {
        /// PDF document.
        Pdf => "pdf",
        /// Comma-separated values.
        Csv => "csv",
        /// Spreadsheet.
        Excel => "excel",
    }
}

wire_enum! {
    /// Generation state of a report.
    ReportStatus ("report status") {
        /// Queued.
        Pending => "pending",
        /// File is available.
        Complete => "complete",
        /// Generation failed.
        Failed => "failed",
    }
}

wire_enum! {
    /// Category of an activity log entry.
    ActivityKind ("activity kind") {
        /// A device changed.
        Device => "device",
        /// An organization changed.
        Organization => "organization",
        /// A SIM changed.
        Sim => "sim",
        /// A user changed.
        User => "user",
        /// A report changed.
        Report => "report",
        /// Something went wrong in the fleet.
        Error => "error",
    }
}

impl Default for AccountStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl Default for DeviceStatus {
    fn default() -> Self {
        Self::Offline
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::User
    }
}

impl Default for ReportFormat {
    fn default() -> Self {
        Self::Pdf
    }
}

impl Default for ReportStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Human-readable badge text: `super_admin` becomes "Super Admin", any other
/// name is capitalised.
#[must_use]
pub fn badge_label(name: &str) -> String {
    if name == "super_admin" {
        return "Super Admin".to_string();
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

macro_rules! impl_label {
    ($($name:ident),+) => {
        $(
            impl $name {
                /// Human-readable badge text.
                #[must_use]
                pub fn label(self) -> String {
                    badge_label(self.as_str())
                }
            }
        )+
    };
}

impl_label!(AccountStatus, DeviceStatus, UserRole, ReportType, ReportFormat, ReportStatus);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(AccountStatus::default(), AccountStatus::Active);
        assert_eq!(DeviceStatus::default(), DeviceStatus::Offline);
        assert_eq!(UserRole::default(), UserRole::User);
        assert_eq!(ReportFormat::default(), ReportFormat::Pdf);
        assert_eq!(ReportStatus::default(), ReportStatus::Pending);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&UserRole::SuperAdmin).unwrap(),
            "\"super_admin\""
        );
        assert_eq!(
            serde_json::to_string(&ReportType::UserActivity).unwrap(),
            "\"user_activity\""
        );
        let status: DeviceStatus = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(status, DeviceStatus::Error);
    }

    #[test]
    fn test_wire_names_match_as_str() {
        for role in UserRole::ALL {
            let json = serde_json::to_string(role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
        }
        for kind in ReportType::ALL {
            let json = serde_json::to_string(kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!("suspended".parse::<AccountStatus>(), Ok(AccountStatus::Suspended));
        let err = "exploded".parse::<DeviceStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown device status 'exploded'");
    }

    #[test]
    fn test_unknown_wire_value_rejected() {
        let result: Result<AccountStatus, _> = serde_json::from_str("\"deleted\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(UserRole::SuperAdmin.label(), "Super Admin");
        assert_eq!(UserRole::Admin.label(), "Admin");
        assert_eq!(DeviceStatus::Online.label(), "Online");
        assert_eq!(ReportType::UserActivity.label(), "User_activity");
        assert_eq!(badge_label(""), "");
    }
}
