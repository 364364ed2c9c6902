//! Organization queries.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::{activity, current_time, encode_time, time_column, Storage};
use crate::error::{Error, Result};
use crate::model::{ActivityKind, EntityKind, NewOrganization, Organization, OrganizationPatch};

const SELECT_ORGANIZATION: &str = r"
    SELECT id, name, email, phone, address, status, created_at, last_active
    FROM organizations
";

/// Insert a full record. `id` of `None` lets `SQLite` assign one.
pub(super) fn insert_organization(
    conn: &Connection,
    id: Option<i64>,
    org: &Organization,
) -> Result<i64> {
    conn.execute(
        r"
        INSERT INTO organizations (id, name, email, phone, address, status, created_at, last_active)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ",
        params![
            id,
            org.name,
            org.email,
            org.phone,
            org.address,
            org.status,
            encode_time(org.created_at),
            encode_time(org.last_active),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn row_to_organization(row: &rusqlite::Row) -> rusqlite::Result<Organization> {
    Ok(Organization {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        address: row.get(4)?,
        status: row.get(5)?,
        created_at: time_column(row, 6)?,
        last_active: time_column(row, 7)?,
    })
}

fn find_organization(conn: &Connection, id: i64) -> Result<Option<Organization>> {
    let sql = format!("{SELECT_ORGANIZATION} WHERE id = ?1");
    let org = conn
        .query_row(&sql, [id], row_to_organization)
        .optional()?;
    Ok(org)
}

impl Storage {
    /// Get all organizations, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_organizations(&self) -> Result<Vec<Organization>> {
        let sql = format!("{SELECT_ORGANIZATION} ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let orgs = stmt
            .query_map([], row_to_organization)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(orgs)
    }

    /// Get an organization by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_organization(&self, id: i64) -> Result<Option<Organization>> {
        find_organization(&self.conn, id)
    }

    /// Create an organization.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, or an error if the
    /// database operation fails.
    pub fn create_organization(&self, new: NewOrganization) -> Result<Organization> {
        new.validate()?;

        let now = current_time();
        let mut org = Organization {
            id: 0,
            name: new.name,
            email: new.email,
            phone: new.phone,
            address: new.address,
            status: new.status,
            created_at: now,
            last_active: now,
        };

        let tx = self.conn.unchecked_transaction()?;
        org.id = insert_organization(&tx, None, &org)?;
        activity::record(
            &tx,
            ActivityKind::Organization,
            &format!("New organization \"{}\" created", org.name),
        )?;
        tx.commit()?;

        debug!("Inserted organization with id {}", org.id);
        Ok(org)
    }

    /// Apply a patch to an organization. Any change counts as activity, so
    /// `last_active` moves to now.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the organization does not exist, a
    /// validation error for bad input, or an error if the database
    /// operation fails.
    pub fn update_organization(&self, id: i64, patch: OrganizationPatch) -> Result<Organization> {
        patch.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        let mut org = find_organization(&tx, id)?
            .ok_or_else(|| Error::not_found(EntityKind::Organization, id))?;
        if patch.is_empty() {
            debug!("Empty patch for organization {id}, nothing to write");
            return Ok(org);
        }
        patch.apply(&mut org);
        org.last_active = current_time();

        tx.execute(
            r"
            UPDATE organizations
            SET name = ?2, email = ?3, phone = ?4, address = ?5, status = ?6, last_active = ?7
            WHERE id = ?1
            ",
            params![
                id,
                org.name,
                org.email,
                org.phone,
                org.address,
                org.status,
                encode_time(org.last_active),
            ],
        )?;
        activity::record(
            &tx,
            ActivityKind::Organization,
            &format!("Organization \"{}\" updated", org.name),
        )?;
        tx.commit()?;

        Ok(org)
    }

    /// Delete an organization by ID. Devices and users that pointed at it
    /// keep their dangling `organizationId`.
    ///
    /// Returns `true` if an organization was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_organization(&self, id: i64) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let Some(org) = find_organization(&tx, id)? else {
            return Ok(false);
        };
        tx.execute("DELETE FROM organizations WHERE id = ?1", [id])?;
        activity::record(
            &tx,
            ActivityKind::Organization,
            &format!("Organization \"{}\" deleted", org.name),
        )?;
        tx.commit()?;
        Ok(true)
    }
}
