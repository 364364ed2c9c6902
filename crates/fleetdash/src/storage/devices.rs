//! Device queries.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

use super::{
    activity, current_time, encode_time, ensure_unique, optional_time_column, time_column, Storage,
};
use crate::error::{Error, Result};
use crate::model::{ActivityKind, Device, DevicePatch, DeviceStatus, EntityKind, NewDevice};

const SELECT_DEVICE: &str = r"
    SELECT id, label, imei, model, manufacturer, description, status,
           organization_id, sim_id, last_online, location, created_at
    FROM devices
";

/// Insert a full record. `id` of `None` lets `SQLite` assign one.
pub(super) fn insert_device(conn: &Connection, id: Option<i64>, device: &Device) -> Result<i64> {
    conn.execute(
        r"
        INSERT INTO devices (id, label, imei, model, manufacturer, description, status,
                             organization_id, sim_id, last_online, location, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        ",
        params![
            id,
            device.label,
            device.imei,
            device.model,
            device.manufacturer,
            device.description,
            device.status,
            device.organization_id,
            device.sim_id,
            device.last_online.map(encode_time),
            device.location,
            encode_time(device.created_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn row_to_device(row: &rusqlite::Row) -> rusqlite::Result<Device> {
    Ok(Device {
        id: row.get(0)?,
        label: row.get(1)?,
        imei: row.get(2)?,
        model: row.get(3)?,
        manufacturer: row.get(4)?,
        description: row.get(5)?,
        status: row.get(6)?,
        organization_id: row.get(7)?,
        sim_id: row.get(8)?,
        last_online: optional_time_column(row, 9)?,
        location: row.get(10)?,
        created_at: time_column(row, 11)?,
    })
}

fn find_device(conn: &Connection, id: i64) -> Result<Option<Device>> {
    let sql = format!("{SELECT_DEVICE} WHERE id = ?1");
    let device = conn.query_row(&sql, [id], row_to_device).optional()?;
    Ok(device)
}

fn write_device(conn: &Connection, device: &Device) -> Result<()> {
    conn.execute(
        r"
        UPDATE devices
        SET label = ?2, imei = ?3, model = ?4, manufacturer = ?5, description = ?6,
            status = ?7, organization_id = ?8, sim_id = ?9, last_online = ?10, location = ?11
        WHERE id = ?1
        ",
        params![
            device.id,
            device.label,
            device.imei,
            device.model,
            device.manufacturer,
            device.description,
            device.status,
            device.organization_id,
            device.sim_id,
            device.last_online.map(encode_time),
            device.location,
        ],
    )?;
    Ok(())
}

impl Storage {
    /// Get all devices, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_devices(&self) -> Result<Vec<Device>> {
        let sql = format!("{SELECT_DEVICE} ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let devices = stmt
            .query_map([], row_to_device)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(devices)
    }

    /// Get a device by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_device(&self, id: i64) -> Result<Option<Device>> {
        find_device(&self.conn, id)
    }

    /// Get the devices owned by an organization, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn devices_by_organization(&self, organization_id: i64) -> Result<Vec<Device>> {
        let sql = format!("{SELECT_DEVICE} WHERE organization_id = ?1 ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let devices = stmt
            .query_map([organization_id], row_to_device)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(devices)
    }

    /// Register a device. A device created `online` is stamped as seen now.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, a duplicate error if the
    /// IMEI is taken, or an error if the database operation fails.
    pub fn create_device(&self, new: NewDevice) -> Result<Device> {
        new.validate()?;

        let now = current_time();
        let mut device = Device {
            id: 0,
            label: new.label,
            imei: new.imei,
            model: new.model,
            manufacturer: new.manufacturer,
            description: new.description,
            status: new.status,
            organization_id: new.organization_id,
            sim_id: new.sim_id,
            last_online: (new.status == DeviceStatus::Online).then_some(now),
            location: new.location,
            created_at: now,
        };

        let tx = self.conn.unchecked_transaction()?;
        ensure_unique(&tx, EntityKind::Device, "imei", "imei", &device.imei, None)?;
        device.id = insert_device(&tx, None, &device)?;
        activity::record(
            &tx,
            ActivityKind::Device,
            &format!("New device {} registered", device.label),
        )?;
        tx.commit()?;

        debug!("Inserted device with id {}", device.id);
        Ok(device)
    }

    /// Apply a patch to a device.
    ///
    /// A device that moves into the `error` status also gets an `error`
    /// entry in the activity log.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the device does not exist, a validation
    /// or duplicate error for bad input, or an error if the database
    /// operation fails.
    pub fn update_device(&self, id: i64, patch: DevicePatch) -> Result<Device> {
        patch.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        let mut device =
            find_device(&tx, id)?.ok_or_else(|| Error::not_found(EntityKind::Device, id))?;
        if patch.is_empty() {
            debug!("Empty patch for device {id}, nothing to write");
            return Ok(device);
        }
        let previous = device.status;

        if let Some(imei) = &patch.imei {
            ensure_unique(&tx, EntityKind::Device, "imei", "imei", imei, Some(id))?;
        }
        patch.apply(&mut device, current_time());
        write_device(&tx, &device)?;

        activity::record(
            &tx,
            ActivityKind::Device,
            &format!("Device {} updated", device.label),
        )?;
        if device.status == DeviceStatus::Error && previous != DeviceStatus::Error {
            warn!("Device {} reported an error", device.label);
            activity::record(
                &tx,
                ActivityKind::Error,
                &format!("Device {} connection error", device.label),
            )?;
        }
        tx.commit()?;

        Ok(device)
    }

    /// Attach a device to an organization.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if either the device or the organization
    /// does not exist, or an error if the database operation fails.
    pub fn assign_device(&self, device_id: i64, organization_id: i64) -> Result<Device> {
        let tx = self.conn.unchecked_transaction()?;
        let mut device = find_device(&tx, device_id)?
            .ok_or_else(|| Error::not_found(EntityKind::Device, device_id))?;
        let org_name: Option<String> = tx
            .query_row(
                "SELECT name FROM organizations WHERE id = ?1",
                [organization_id],
                |row| row.get(0),
            )
            .optional()?;
        let org_name =
            org_name.ok_or_else(|| Error::not_found(EntityKind::Organization, organization_id))?;

        device.organization_id = Some(organization_id);
        write_device(&tx, &device)?;
        activity::record(
            &tx,
            ActivityKind::Device,
            &format!("Device {} assigned to \"{org_name}\"", device.label),
        )?;
        tx.commit()?;

        Ok(device)
    }

    /// Delete a device by ID.
    ///
    /// Returns `true` if a device was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_device(&self, id: i64) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let Some(device) = find_device(&tx, id)? else {
            return Ok(false);
        };
        tx.execute("DELETE FROM devices WHERE id = ?1", [id])?;
        activity::record(
            &tx,
            ActivityKind::Device,
            &format!("Device {} removed", device.label),
        )?;
        tx.commit()?;
        Ok(true)
    }

    /// Count devices per status. Statuses with no devices are left out.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn device_status_counts(&self) -> Result<Vec<(DeviceStatus, i64)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM devices GROUP BY status ORDER BY status")?;
        let counts = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(counts)
    }
}
