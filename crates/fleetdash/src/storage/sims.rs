//! SIM queries.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::{
    activity, current_time, encode_time, ensure_unique, optional_time_column, time_column,
    Storage,
};
use crate::error::{Error, Result};
use crate::model::{AccountStatus, ActivityKind, EntityKind, NewSim, Sim, SimPatch};

const SELECT_SIM: &str = r"
    SELECT id, sim_id, iccid, msisdn, status, network_provider, country,
           data_limit, current_usage, last_sync, created_at
    FROM sims
";

/// Insert a full record. `id` of `None` lets `SQLite` assign one.
pub(super) fn insert_sim(conn: &Connection, id: Option<i64>, sim: &Sim) -> Result<i64> {
    conn.execute(
        r"
        INSERT INTO sims (id, sim_id, iccid, msisdn, status, network_provider, country,
                          data_limit, current_usage, last_sync, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        ",
        params![
            id,
            sim.sim_id,
            sim.iccid,
            sim.msisdn,
            sim.status,
            sim.network_provider,
            sim.country,
            sim.data_limit,
            sim.current_usage,
            sim.last_sync.map(encode_time),
            encode_time(sim.created_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn row_to_sim(row: &rusqlite::Row) -> rusqlite::Result<Sim> {
    Ok(Sim {
        id: row.get(0)?,
        sim_id: row.get(1)?,
        iccid: row.get(2)?,
        msisdn: row.get(3)?,
        status: row.get(4)?,
        network_provider: row.get(5)?,
        country: row.get(6)?,
        data_limit: row.get(7)?,
        current_usage: row.get(8)?,
        last_sync: optional_time_column(row, 9)?,
        created_at: time_column(row, 10)?,
    })
}

fn find_sim(conn: &Connection, id: i64) -> Result<Option<Sim>> {
    let sql = format!("{SELECT_SIM} WHERE id = ?1");
    let sim = conn.query_row(&sql, [id], row_to_sim).optional()?;
    Ok(sim)
}

/// Activity line for a SIM update, naming the new status when it changed.
fn update_message(sim: &Sim, previous: AccountStatus) -> String {
    match sim.status {
        status if status == previous => format!("SIM {} updated", sim.sim_id),
        AccountStatus::Active => format!("SIM {} activated", sim.sim_id),
        AccountStatus::Inactive => format!("SIM {} deactivated", sim.sim_id),
        AccountStatus::Suspended => format!("SIM {} suspended", sim.sim_id),
    }
}

impl Storage {
    /// Get all SIMs, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_sims(&self) -> Result<Vec<Sim>> {
        let sql = format!("{SELECT_SIM} ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let sims = stmt
            .query_map([], row_to_sim)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(sims)
    }

    /// Get a SIM by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_sim(&self, id: i64) -> Result<Option<Sim>> {
        find_sim(&self.conn, id)
    }

    /// Add a SIM. The SIM counts as synced at creation.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, a duplicate error if the
    /// SIM id is taken, or an error if the database operation fails.
    pub fn create_sim(&self, new: NewSim) -> Result<Sim> {
        new.validate()?;

        let now = current_time();
        let mut sim = Sim {
            id: 0,
            sim_id: new.sim_id,
            iccid: new.iccid,
            msisdn: new.msisdn,
            status: new.status,
            network_provider: new.network_provider,
            country: new.country,
            data_limit: new.data_limit,
            current_usage: new.current_usage,
            last_sync: Some(now),
            created_at: now,
        };

        let tx = self.conn.unchecked_transaction()?;
        ensure_unique(&tx, EntityKind::Sim, "sim_id", "simId", &sim.sim_id, None)?;
        sim.id = insert_sim(&tx, None, &sim)?;
        activity::record(&tx, ActivityKind::Sim, &format!("SIM {} added", sim.sim_id))?;
        tx.commit()?;

        debug!("Inserted SIM with id {}", sim.id);
        Ok(sim)
    }

    /// Apply a patch to a SIM and mark it synced now.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the SIM does not exist, a validation or
    /// duplicate error for bad input, or an error if the database operation
    /// fails.
    pub fn update_sim(&self, id: i64, patch: SimPatch) -> Result<Sim> {
        patch.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        let mut sim = find_sim(&tx, id)?.ok_or_else(|| Error::not_found(EntityKind::Sim, id))?;
        if patch.is_empty() {
            debug!("Empty patch for SIM {id}, nothing to write");
            return Ok(sim);
        }
        let previous = sim.status;

        if let Some(sim_id) = &patch.sim_id {
            ensure_unique(&tx, EntityKind::Sim, "sim_id", "simId", sim_id, Some(id))?;
        }
        patch.apply(&mut sim);
        sim.last_sync = Some(current_time());

        tx.execute(
            r"
            UPDATE sims
            SET sim_id = ?2, iccid = ?3, msisdn = ?4, status = ?5, network_provider = ?6,
                country = ?7, data_limit = ?8, current_usage = ?9, last_sync = ?10
            WHERE id = ?1
            ",
            params![
                id,
                sim.sim_id,
                sim.iccid,
                sim.msisdn,
                sim.status,
                sim.network_provider,
                sim.country,
                sim.data_limit,
                sim.current_usage,
                sim.last_sync.map(encode_time),
            ],
        )?;
        activity::record(&tx, ActivityKind::Sim, &update_message(&sim, previous))?;
        tx.commit()?;

        Ok(sim)
    }

    /// Delete a SIM by ID. Devices that held it keep their dangling `simId`.
    ///
    /// Returns `true` if a SIM was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_sim(&self, id: i64) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let Some(sim) = find_sim(&tx, id)? else {
            return Ok(false);
        };
        tx.execute("DELETE FROM sims WHERE id = ?1", [id])?;
        activity::record(&tx, ActivityKind::Sim, &format!("SIM {} removed", sim.sim_id))?;
        tx.commit()?;
        Ok(true)
    }

    /// Sum of `currentUsage` over all SIMs, counting unknown usage as zero.
    ///
    /// Saturates at `i64::MAX` like [`SimStats`](crate::listing::SimStats)
    /// instead of failing on overflow.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn total_data_usage(&self) -> Result<i64> {
        let mut stmt = self.conn.prepare("SELECT current_usage FROM sims")?;
        let usages = stmt
            .query_map([], |row| row.get::<_, Option<i64>>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(usages
            .into_iter()
            .flatten()
            .fold(0_i64, i64::saturating_add))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DEFAULT_COUNTRY, DEFAULT_DATA_LIMIT_MB};

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    fn new_sim(sim_id: &str) -> NewSim {
        serde_json::from_value(serde_json::json!({
            "simId": sim_id,
            "iccid": "89014103211118510799",
            "msisdn": "+1-555-0199",
            "networkProvider": "Verizon",
        }))
        .unwrap()
    }

    fn patch(json: &str) -> SimPatch {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_create_defaults() {
        let storage = create_test_storage();
        let sim = storage.create_sim(new_sim("SIM-100")).unwrap();

        assert_eq!(sim.status, AccountStatus::Inactive);
        assert_eq!(sim.country, DEFAULT_COUNTRY);
        assert_eq!(sim.data_limit, Some(DEFAULT_DATA_LIMIT_MB));
        assert_eq!(sim.current_usage, Some(0));
        assert_eq!(sim.last_sync, Some(sim.created_at));
        assert_eq!(storage.get_sim(sim.id).unwrap().unwrap(), sim);
    }

    #[test]
    fn test_duplicate_sim_id_rejected() {
        let storage = create_test_storage();
        storage.create_sim(new_sim("SIM-100")).unwrap();

        let err = storage.create_sim(new_sim("SIM-100")).unwrap_err();
        assert!(matches!(err, Error::Duplicate { field: "simId", .. }));
    }

    #[test]
    fn test_update_clears_limit_and_resyncs() {
        let storage = create_test_storage();
        let sim = storage.create_sim(new_sim("SIM-100")).unwrap();

        let updated = storage
            .update_sim(sim.id, patch(r#"{"dataLimit": null, "currentUsage": 250}"#))
            .unwrap();
        assert_eq!(updated.data_limit, None);
        assert_eq!(updated.current_usage, Some(250));
        assert_eq!(updated.network_provider, "Verizon");
        assert!(updated.last_sync >= sim.last_sync);
        assert_eq!(storage.get_sim(sim.id).unwrap().unwrap(), updated);
    }

    #[test]
    fn test_status_change_message() {
        let storage = create_test_storage();
        let sim = storage.create_sim(new_sim("SIM-003")).unwrap();
        storage
            .update_sim(sim.id, patch(r#"{"status": "suspended"}"#))
            .unwrap();

        let latest = &storage.recent_activity(1).unwrap()[0];
        assert_eq!(latest.message, "SIM SIM-003 suspended");
        assert_eq!(latest.kind, ActivityKind::Sim);
    }

    #[test]
    fn test_update_missing() {
        let storage = create_test_storage();
        assert!(storage
            .update_sim(3, SimPatch::default())
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_delete() {
        let storage = create_test_storage();
        let sim = storage.create_sim(new_sim("SIM-100")).unwrap();

        assert!(storage.delete_sim(sim.id).unwrap());
        assert!(storage.get_sim(sim.id).unwrap().is_none());
        assert!(!storage.delete_sim(sim.id).unwrap());
    }

    #[test]
    fn test_total_data_usage() {
        let storage = create_test_storage();
        assert_eq!(storage.total_data_usage().unwrap(), 0);

        let a = storage.create_sim(new_sim("SIM-1")).unwrap();
        let b = storage.create_sim(new_sim("SIM-2")).unwrap();
        storage
            .update_sim(a.id, patch(r#"{"currentUsage": 2400}"#))
            .unwrap();
        storage
            .update_sim(b.id, patch(r#"{"currentUsage": null}"#))
            .unwrap();

        assert_eq!(storage.total_data_usage().unwrap(), 2400);
    }

    #[test]
    fn test_total_data_usage_saturates() {
        let storage = create_test_storage();
        let a = storage.create_sim(new_sim("SIM-1")).unwrap();
        let b = storage.create_sim(new_sim("SIM-2")).unwrap();
        for id in [a.id, b.id] {
            storage
                .update_sim(id, patch(r#"{"currentUsage": 5000000000000000000}"#))
                .unwrap();
        }

        assert_eq!(storage.total_data_usage().unwrap(), i64::MAX);
    }
}
