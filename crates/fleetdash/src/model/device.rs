use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{nullable, present, require_text, DeviceStatus};
use crate::error::{Error, Result};

/// Last known position of a device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Accuracy radius in metres.
    pub accuracy: f64,
}

impl Location {
    /// Check coordinate ranges.
    ///
    /// # Errors
    ///
    /// Returns a validation error for out-of-range coordinates.
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::validation("location", "lat must be within [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(Error::validation("location", "lng must be within [-180, 180]"));
        }
        if self.accuracy.is_nan() || self.accuracy < 0.0 {
            return Err(Error::validation("location", "accuracy must not be negative"));
        }
        Ok(())
    }
}

/// A tracked device.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Identifier assigned by storage.
    pub id: i64,
    /// Human-facing label, e.g. `DEV-001`.
    pub label: String,
    /// Hardware IMEI, unique across devices.
    pub imei: String,
    /// Model name.
    pub model: Option<String>,
    /// Manufacturer name.
    pub manufacturer: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Connectivity status.
    pub status: DeviceStatus,
    /// Owning organization.
    pub organization_id: Option<i64>,
    /// Installed SIM.
    pub sim_id: Option<i64>,
    /// Last time the device was seen online.
    pub last_online: Option<DateTime<Utc>>,
    /// Last known position.
    pub location: Option<Location>,
    /// When the device was registered.
    pub created_at: DateTime<Utc>,
}

/// Payload for registering a device.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDevice {
    /// Human-facing label.
    pub label: String,
    /// Hardware IMEI.
    pub imei: String,
    /// Model name.
    #[serde(default)]
    pub model: Option<String>,
    /// Manufacturer name.
    #[serde(default)]
    pub manufacturer: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Connectivity status, `offline` when omitted.
    #[serde(default)]
    pub status: DeviceStatus,
    /// Owning organization.
    #[serde(default)]
    pub organization_id: Option<i64>,
    /// Installed SIM.
    #[serde(default)]
    pub sim_id: Option<i64>,
    /// Last known position.
    #[serde(default)]
    pub location: Option<Location>,
}

impl NewDevice {
    /// Check required fields and the location.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        require_text("label", &self.label)?;
        require_text("imei", &self.imei)?;
        if let Some(location) = &self.location {
            location.validate()?;
        }
        Ok(())
    }
}

/// Partial update of a device.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicePatch {
    /// New label.
    #[serde(default, deserialize_with = "present")]
    pub label: Option<String>,
    /// New IMEI.
    #[serde(default, deserialize_with = "present")]
    pub imei: Option<String>,
    /// New model, `null` clears it.
    #[serde(default, deserialize_with = "nullable")]
    pub model: Option<Option<String>>,
    /// New manufacturer, `null` clears it.
    #[serde(default, deserialize_with = "nullable")]
    pub manufacturer: Option<Option<String>>,
    /// New description, `null` clears it.
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    /// New status.
    #[serde(default, deserialize_with = "present")]
    pub status: Option<DeviceStatus>,
    /// New owner, `null` detaches the device.
    #[serde(default, deserialize_with = "nullable")]
    pub organization_id: Option<Option<i64>>,
    /// New SIM, `null` removes it.
    #[serde(default, deserialize_with = "nullable")]
    pub sim_id: Option<Option<i64>>,
    /// New position, `null` clears it.
    #[serde(default, deserialize_with = "nullable")]
    pub location: Option<Option<Location>>,
}

impl DevicePatch {
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
        if let Some(label) = &self.label {
            require_text("label", label)?;
        }
        if let Some(imei) = &self.imei {
            require_text("imei", imei)?;
        }
        if let Some(Some(location)) = &self.location {
            location.validate()?;
        }
        Ok(())
    }

    /// Overlay the present fields onto `device`.
    ///
    /// `last_online` moves to `now` only when the patch sets the status to
    /// `online`.
    pub fn apply(self, device: &mut Device, now: DateTime<Utc>) {
        if let Some(label) = self.label {
            device.label = label;
        }
        if let Some(imei) = self.imei {
            device.imei = imei;
        }
        if let Some(model) = self.model {
            device.model = model;
        }
        if let Some(manufacturer) = self.manufacturer {
            device.manufacturer = manufacturer;
        }
        if let Some(description) = self.description {
            device.description = description;
        }
        if let Some(status) = self.status {
            device.status = status;
            if status == DeviceStatus::Online {
                device.last_online = Some(now);
            }
        }
        if let Some(organization_id) = self.organization_id {
            device.organization_id = organization_id;
        }
        if let Some(sim_id) = self.sim_id {
            device.sim_id = sim_id;
        }
        if let Some(location) = self.location {
            device.location = location;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn sample() -> Device {
        Device {
            id: 1,
            label: "DEV-001".to_string(),
            imei: "123456789012345".to_string(),
            model: Some("IoT Device Pro".to_string()),
            manufacturer: None,
            description: None,
            status: DeviceStatus::Offline,
            organization_id: Some(1),
            sim_id: None,
            last_online: None,
            location: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_device_defaults() {
        let new: NewDevice =
            serde_json::from_str(r#"{"label": "DEV-9", "imei": "999"}"#).unwrap();
        assert_eq!(new.status, DeviceStatus::Offline);
        assert!(new.organization_id.is_none());
        assert!(new.validate().is_ok());
    }

    #[test]
    fn test_new_device_bad_location() {
        let new: NewDevice = serde_json::from_str(
            r#"{"label": "DEV-9", "imei": "999", "location": {"lat": 91.0, "lng": 0.0, "accuracy": 1.0}}"#,
        )
        .unwrap();
        assert!(new.validate().is_err());
    }

    #[test]
    fn test_location_nan_accuracy_rejected() {
        let location = Location {
            lat: 0.0,
            lng: 0.0,
            accuracy: f64::NAN,
        };
        assert!(location.validate().is_err());
    }

    #[test]
    fn test_patch_online_bumps_last_online() {
        let mut device = sample();
        let now = Utc::now();
        let patch: DevicePatch = serde_json::from_str(r#"{"status": "online"}"#).unwrap();
        patch.apply(&mut device, now);

        assert_eq!(device.status, DeviceStatus::Online);
        assert_eq!(device.last_online, Some(now));
    }

    #[test]
    fn test_patch_other_status_keeps_last_online() {
        let mut device = sample();
        let earlier = Utc::now() - Duration::hours(2);
        device.last_online = Some(earlier);

        let patch: DevicePatch = serde_json::from_str(r#"{"status": "error"}"#).unwrap();
        patch.apply(&mut device, Utc::now());

        assert_eq!(device.status, DeviceStatus::Error);
        assert_eq!(device.last_online, Some(earlier));
    }

    #[test]
    fn test_patch_null_detaches_organization() {
        let mut device = sample();
        let patch: DevicePatch =
            serde_json::from_str(r#"{"organizationId": null}"#).unwrap();
        patch.apply(&mut device, Utc::now());

        assert!(device.organization_id.is_none());
        assert_eq!(device.label, "DEV-001");
    }

    #[test]
    fn test_patch_null_required_field_rejected() {
        assert!(serde_json::from_str::<DevicePatch>(r#"{"label": null}"#).is_err());
        assert!(serde_json::from_str::<DevicePatch>(r#"{"status": null}"#).is_err());
        assert!(serde_json::from_str::<DevicePatch>(r#"{"imei": null}"#).is_err());
    }

    #[test]
    fn test_serialize_location() {
        let mut device = sample();
        device.location = Some(Location {
            lat: 37.7749,
            lng: -122.4194,
            accuracy: 10.0,
        });
        let json = serde_json::to_value(&device).unwrap();
        assert_eq!(json["location"]["lat"], 37.7749);
        assert_eq!(json["organizationId"], 1);
        assert!(json["simId"].is_null());
    }
}
