use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{nullable, present, require_non_negative, require_text, AccountStatus};
use crate::error::Result;

/// Country assumed when none is given.
pub const DEFAULT_COUNTRY: &str = "US";

/// Monthly data allowance in MB assumed when none is given.
pub const DEFAULT_DATA_LIMIT_MB: i64 = 1000;

/// A SIM card provisioned for the fleet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sim {
    /// Identifier assigned by storage.
    pub id: i64,
    /// Inventory code, e.g. `SIM-001`; unique across SIMs.
    pub sim_id: String,
    /// Integrated circuit card identifier.
    pub iccid: String,
    /// Subscriber phone number.
    pub msisdn: String,
    /// Account status.
    pub status: AccountStatus,
    /// Carrier name.
    pub network_provider: String,
    /// Country of the carrier.
    pub country: String,
    /// Data allowance in MB.
    pub data_limit: Option<i64>,
    /// Data used in MB.
    pub current_usage: Option<i64>,
    /// Last time the SIM record was synchronised.
    pub last_sync: Option<DateTime<Utc>>,
    /// When the SIM was added.
    pub created_at: DateTime<Utc>,
}

impl Sim {
    /// Usage as a whole percentage of the limit, if a limit is set.
    #[must_use]
    pub fn usage_percent(&self) -> Option<i64> {
        let limit = self.data_limit.filter(|l| *l > 0)?;
        let usage = self.current_usage.unwrap_or(0);
        // Rounded half away from zero.
        Some((usage * 100 + limit / 2) / limit)
    }
}

fn default_sim_status() -> AccountStatus {
    AccountStatus::Inactive
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

#[allow(clippy::unnecessary_wraps)]
fn default_data_limit() -> Option<i64> {
    Some(DEFAULT_DATA_LIMIT_MB)
}

#[allow(clippy::unnecessary_wraps)]
fn default_current_usage() -> Option<i64> {
    Some(0)
}

/// Payload for adding a SIM.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSim {
    /// Inventory code.
    pub sim_id: String,
    /// Integrated circuit card identifier.
    pub iccid: String,
    /// Subscriber phone number.
    pub msisdn: String,
    /// Account status, `inactive` when omitted.
    #[serde(default = "default_sim_status")]
    pub status: AccountStatus,
    /// Carrier name.
    pub network_provider: String,
    /// Country of the carrier, `US` when omitted.
    #[serde(default = "default_country")]
    pub country: String,
    /// Data allowance in MB, 1000 when omitted.
    #[serde(default = "default_data_limit")]
    pub data_limit: Option<i64>,
    /// Data used in MB, 0 when omitted.
    #[serde(default = "default_current_usage")]
    pub current_usage: Option<i64>,
}

impl NewSim {
    /// Check required fields and quantities.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        require_text("simId", &self.sim_id)?;
        require_text("iccid", &self.iccid)?;
        require_text("msisdn", &self.msisdn)?;
        require_text("networkProvider", &self.network_provider)?;
        require_text("country", &self.country)?;
        require_non_negative("dataLimit", self.data_limit)?;
        require_non_negative("currentUsage", self.current_usage)
    }
}

/// Partial update of a SIM.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimPatch {
    /// New inventory code.
    #[serde(default, deserialize_with = "present")]
    pub sim_id: Option<String>,
    /// New ICCID.
    #[serde(default, deserialize_with = "present")]
    pub iccid: Option<String>,
    /// New phone number.
    #[serde(default, deserialize_with = "present")]
    pub msisdn: Option<String>,
    /// New status.
    #[serde(default, deserialize_with = "present")]
    pub status: Option<AccountStatus>,
    /// New carrier.
    #[serde(default, deserialize_with = "present")]
    pub network_provider: Option<String>,
    /// New country.
    #[serde(default, deserialize_with = "present")]
    pub country: Option<String>,
    /// New allowance, `null` clears it.
    #[serde(default, deserialize_with = "nullable")]
    pub data_limit: Option<Option<i64>>,
    /// New usage, `null` clears it.
    #[serde(default, deserialize_with = "nullable")]
    pub current_usage: Option<Option<i64>>,
}

impl SimPatch {
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
        let texts = [
            ("simId", &self.sim_id),
            ("iccid", &self.iccid),
            ("msisdn", &self.msisdn),
            ("networkProvider", &self.network_provider),
            ("country", &self.country),
        ];
        for (field, value) in texts {
            if let Some(value) = value {
                require_text(field, value)?;
            }
        }
        require_non_negative("dataLimit", self.data_limit.flatten())?;
        require_non_negative("currentUsage", self.current_usage.flatten())
    }

    /// Overlay the present fields onto `sim`.
    pub fn apply(self, sim: &mut Sim) {
        if let Some(sim_id) = self.sim_id {
            sim.sim_id = sim_id;
        }
        if let Some(iccid) = self.iccid {
            sim.iccid = iccid;
        }
        if let Some(msisdn) = self.msisdn {
            sim.msisdn = msisdn;
        }
        if let Some(status) = self.status {
            sim.status = status;
        }
        if let Some(network_provider) = self.network_provider {
            sim.network_provider = network_provider;
        }
        if let Some(country) = self.country {
            sim.country = country;
        }
        if let Some(data_limit) = self.data_limit {
            sim.data_limit = data_limit;
        }
        if let Some(current_usage) = self.current_usage {
            sim.current_usage = current_usage;
        }
    }
}
