use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{nullable, present, require_email, require_text, AccountStatus, UserRole};
use crate::error::{Error, Result};

/// Shortest password accepted on create or update.
pub const MIN_PASSWORD_LEN: usize = 8;

/// A dashboard user.
///
/// The password hash is kept for storage but never serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identifier assigned by storage.
    pub id: i64,
    /// Login name, unique across users.
    pub username: String,
    /// E-mail address, unique across users.
    pub email: String,
    /// Argon2 PHC string.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Display name.
    pub full_name: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Access level.
    pub role: UserRole,
    /// Organization the user belongs to; `None` for platform staff.
    pub organization_id: Option<i64>,
    /// Account status.
    pub status: AccountStatus,
    /// Last successful login.
    pub last_login: Option<DateTime<Utc>>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a user. `password` is plain text and is hashed
/// before it reaches storage.
#[derive(Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    /// Login name.
    pub username: String,
    /// E-mail address.
    pub email: String,
    /// Plain-text password.
    pub password: String,
    /// Display name.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Access level, `user` when omitted.
    #[serde(default)]
    pub role: UserRole,
    /// Organization the user belongs to.
    #[serde(default)]
    pub organization_id: Option<i64>,
    /// Account status, `active` when omitted.
    #[serde(default)]
    pub status: AccountStatus,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .field("organization_id", &self.organization_id)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

fn require_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

impl NewUser {
    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        require_text("username", &self.username)?;
        require_email("email", &self.email)?;
        require_password(&self.password)
    }
}

/// Partial update of a user.
#[derive(Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    /// New login name.
    #[serde(default, deserialize_with = "present")]
    pub username: Option<String>,
    /// New e-mail address.
    #[serde(default, deserialize_with = "present")]
    pub email: Option<String>,
    /// New plain-text password.
    #[serde(default, deserialize_with = "present")]
    pub password: Option<String>,
    /// New display name, `null` clears it.
    #[serde(default, deserialize_with = "nullable")]
    pub full_name: Option<Option<String>>,
    /// New phone number, `null` clears it.
    #[serde(default, deserialize_with = "nullable")]
    pub phone: Option<Option<String>>,
    /// New access level.
    #[serde(default, deserialize_with = "present")]
    pub role: Option<UserRole>,
    /// New organization, `null` detaches the user.
    #[serde(default, deserialize_with = "nullable")]
    pub organization_id: Option<Option<i64>>,
    /// New account status.
    #[serde(default, deserialize_with = "present")]
    pub status: Option<AccountStatus>,
}

impl std::fmt::Debug for UserPatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserPatch")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("role", &self.role)
            .field("organization_id", &self.organization_id)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl UserPatch {
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
        if let Some(username) = &self.username {
            require_text("username", username)?;
        }
        if let Some(email) = &self.email {
            require_email("email", email)?;
        }
        if let Some(password) = &self.password {
            require_password(password)?;
        }
        Ok(())
    }

    /// Overlay the present fields onto `user`. A new password must already
    /// be hashed and is passed separately.
    pub fn apply(self, user: &mut User, password_hash: Option<String>) {
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(hash) = password_hash {
            user.password_hash = hash;
        }
        if let Some(full_name) = self.full_name {
            user.full_name = full_name;
        }
        if let Some(phone) = self.phone {
            user.phone = phone;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(organization_id) = self.organization_id {
            user.organization_id = organization_id;
        }
        if let Some(status) = self.status {
            user.status = status;
        }
    }
}
