use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{nullable, present, require_email, require_text, AccountStatus};
use crate::error::Result;

/// A customer organization owning devices and users.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Identifier assigned by storage.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Contact e-mail address.
    pub email: String,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Account status.
    pub status: AccountStatus,
    /// When the organization was created.
    pub created_at: DateTime<Utc>,
    /// Last time the organization record changed.
    pub last_active: DateTime<Utc>,
}

/// Payload for creating an organization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrganization {
    /// Display name.
    pub name: String,
    /// Contact e-mail address.
    pub email: String,
    /// Contact phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Postal address.
    #[serde(default)]
    pub address: Option<String>,
    /// Account status, `active` when omitted.
    #[serde(default)]
    pub status: AccountStatus,
}

impl NewOrganization {
    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        require_email("email", &self.email)
    }
}

/// Partial update of an organization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationPatch {
    /// New display name.
    #[serde(default, deserialize_with = "present")]
    pub name: Option<String>,
    /// New contact e-mail address.
    #[serde(default, deserialize_with = "present")]
    pub email: Option<String>,
    /// New phone number, `null` clears it.
    #[serde(default, deserialize_with = "nullable")]
    pub phone: Option<Option<String>>,
    /// New address, `null` clears it.
    #[serde(default, deserialize_with = "nullable")]
    pub address: Option<Option<String>>,
    /// New account status.
    #[serde(default, deserialize_with = "present")]
    pub status: Option<AccountStatus>,
}

impl OrganizationPatch {
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
        if let Some(email) = &self.email {
            require_email("email", email)?;
        }
        Ok(())
    }

    /// Overlay the present fields onto `org`.
    pub fn apply(self, org: &mut Organization) {
        if let Some(name) = self.name {
            org.name = name;
        }
        if let Some(email) = self.email {
            org.email = email;
        }
        if let Some(phone) = self.phone {
            org.phone = phone;
        }
        if let Some(address) = self.address {
            org.address = address;
        }
        if let Some(status) = self.status {
            org.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Organization {
        Organization {
            id: 1,
            name: "TechCorp Solutions".to_string(),
            email: "tech@techcorp.com".to_string(),
            phone: Some("+1-555-0100".to_string()),
            address: None,
            status: AccountStatus::Active,
            created_at: Utc::now(),
            last_active: Utc::now(),
        }
    }

    #[test]
    fn test_new_organization_defaults() {
        let new: NewOrganization =
            serde_json::from_str(r#"{"name": "Acme", "email": "ops@acme.com"}"#).unwrap();
        assert_eq!(new.status, AccountStatus::Active);
        assert!(new.phone.is_none());
        assert!(new.validate().is_ok());
    }

    #[test]
    fn test_new_organization_missing_email_rejected() {
        let result: std::result::Result<NewOrganization, _> =
            serde_json::from_str(r#"{"name": "Acme"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_new_organization_blank_name_invalid() {
        let new: NewOrganization =
            serde_json::from_str(r#"{"name": " ", "email": "ops@acme.com"}"#).unwrap();
        assert!(new.validate().is_err());
    }

    #[test]
    fn test_patch_only_touches_present_fields() {
        let mut org = sample();
        let patch: OrganizationPatch =
            serde_json::from_str(r#"{"status": "suspended", "phone": null}"#).unwrap();
        patch.apply(&mut org);

        assert_eq!(org.status, AccountStatus::Suspended);
        assert!(org.phone.is_none());
        assert_eq!(org.name, "TechCorp Solutions");
        assert_eq!(org.email, "tech@techcorp.com");
    }

    #[test]
    fn test_patch_is_empty() {
        let empty: OrganizationPatch = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
        let cleared: OrganizationPatch = serde_json::from_str(r#"{"phone": null}"#).unwrap();
        assert!(!cleared.is_empty());
    }

    #[test]
    fn test_patch_invalid_email() {
        let patch: OrganizationPatch = serde_json::from_str(r#"{"email": "nope"}"#).unwrap();
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_serialize_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("lastActive").is_some());
        assert_eq!(json["status"], "active");
    }
}
