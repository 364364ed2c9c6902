use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ActivityKind;

/// One entry of the fleet activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    /// What kind of record the entry is about.
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    /// Human-readable description, e.g. `New device DEV-045 registered`.
    pub message: String,
    /// When it happened.
    pub time: DateTime<Utc>,
}

impl Activity {
    /// Create an entry stamped with the current time.
    #[must_use]
    pub fn now(kind: ActivityKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            time: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_kind_as_type() {
        let activity = Activity::now(ActivityKind::Sim, "SIM SIM-003 suspended");
        let json = serde_json::to_value(&activity).unwrap();
        assert_eq!(json["type"], "sim");
        assert_eq!(json["message"], "SIM SIM-003 suspended");
        assert!(json["time"].is_string());
    }
}
