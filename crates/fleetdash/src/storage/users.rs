//! User queries.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::{
    activity, current_time, encode_time, ensure_unique, optional_time_column, time_column,
    Storage,
};
use crate::error::{Error, Result};
use crate::model::{ActivityKind, EntityKind, NewUser, User, UserPatch};
use crate::password::hash_password;

const SELECT_USER: &str = r"
    SELECT id, username, email, password_hash, full_name, phone, role,
           organization_id, status, last_login, created_at
    FROM users
";

/// Insert a full record. `id` of `None` lets `SQLite` assign one.
pub(super) fn insert_user(conn: &Connection, id: Option<i64>, user: &User) -> Result<i64> {
    conn.execute(
        r"
        INSERT INTO users (id, username, email, password_hash, full_name, phone, role,
                           organization_id, status, last_login, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        ",
        params![
            id,
            user.username,
            user.email,
            user.password_hash,
            user.full_name,
            user.phone,
            user.role,
            user.organization_id,
            user.status,
            user.last_login.map(encode_time),
            encode_time(user.created_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        full_name: row.get(4)?,
        phone: row.get(5)?,
        role: row.get(6)?,
        organization_id: row.get(7)?,
        status: row.get(8)?,
        last_login: optional_time_column(row, 9)?,
        created_at: time_column(row, 10)?,
    })
}

fn find_user(conn: &Connection, id: i64) -> Result<Option<User>> {
    let sql = format!("{SELECT_USER} WHERE id = ?1");
    let user = conn.query_row(&sql, [id], row_to_user).optional()?;
    Ok(user)
}

impl Storage {
    /// Get all users, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let sql = format!("{SELECT_USER} ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let users = stmt
            .query_map([], row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Get a user by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        find_user(&self.conn, id)
    }

    /// Get a user by exact username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("{SELECT_USER} WHERE username = ?1");
        let user = self
            .conn
            .query_row(&sql, [username], row_to_user)
            .optional()?;
        Ok(user)
    }

    /// Get the users belonging to an organization, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn users_by_organization(&self, organization_id: i64) -> Result<Vec<User>> {
        let sql = format!("{SELECT_USER} WHERE organization_id = ?1 ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let users = stmt
            .query_map([organization_id], row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Create a user. The plain-text password is replaced by its Argon2
    /// hash; the user has never logged in.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, a duplicate error if the
    /// username or e-mail is taken, or an error if hashing or the database
    /// operation fails.
    pub fn create_user(&self, new: NewUser) -> Result<User> {
        new.validate()?;
        ensure_unique(&self.conn, EntityKind::User, "username", "username", &new.username, None)?;
        ensure_unique(&self.conn, EntityKind::User, "email", "email", &new.email, None)?;

        let password_hash = hash_password(&new.password)?;
        let mut user = User {
            id: 0,
            username: new.username,
            email: new.email,
            password_hash,
            full_name: new.full_name,
            phone: new.phone,
            role: new.role,
            organization_id: new.organization_id,
            status: new.status,
            last_login: None,
            created_at: current_time(),
        };

        let tx = self.conn.unchecked_transaction()?;
        user.id = insert_user(&tx, None, &user)?;
        activity::record(
            &tx,
            ActivityKind::User,
            &format!("User {} created", user.username),
        )?;
        tx.commit()?;

        debug!("Inserted user with id {}", user.id);
        Ok(user)
    }

    /// Apply a patch to a user, hashing a new password if one is given.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the user does not exist, a validation or
    /// duplicate error for bad input, or an error if hashing or the
    /// database operation fails.
    pub fn update_user(&self, id: i64, mut patch: UserPatch) -> Result<User> {
        patch.validate()?;

        let mut user =
            find_user(&self.conn, id)?.ok_or_else(|| Error::not_found(EntityKind::User, id))?;
        if patch.is_empty() {
            debug!("Empty patch for user {id}, nothing to write");
            return Ok(user);
        }
        if let Some(username) = &patch.username {
            ensure_unique(&self.conn, EntityKind::User, "username", "username", username, Some(id))?;
        }
        if let Some(email) = &patch.email {
            ensure_unique(&self.conn, EntityKind::User, "email", "email", email, Some(id))?;
        }

        let password_hash = patch
            .password
            .take()
            .map(|password| hash_password(&password))
            .transpose()?;
        patch.apply(&mut user, password_hash);

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            r"
            UPDATE users
            SET username = ?2, email = ?3, password_hash = ?4, full_name = ?5, phone = ?6,
                role = ?7, organization_id = ?8, status = ?9
            WHERE id = ?1
            ",
            params![
                id,
                user.username,
                user.email,
                user.password_hash,
                user.full_name,
                user.phone,
                user.role,
                user.organization_id,
                user.status,
            ],
        )?;
        activity::record(
            &tx,
            ActivityKind::User,
            &format!("User {} updated", user.username),
        )?;
        tx.commit()?;

        Ok(user)
    }

    /// Delete a user by ID.
    ///
    /// Returns `true` if a user was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let Some(user) = find_user(&tx, id)? else {
            return Ok(false);
        };
        tx.execute("DELETE FROM users WHERE id = ?1", [id])?;
        activity::record(
            &tx,
            ActivityKind::User,
            &format!("User {} removed", user.username),
        )?;
        tx.commit()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AccountStatus, UserRole};
    use crate::password::verify_password;

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    fn new_user(username: &str) -> NewUser {
        serde_json::from_value(serde_json::json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "correct horse battery",
        }))
        .unwrap()
    }

    #[test]
    fn test_create_hashes_password() {
        let storage = create_test_storage();
        let user = storage.create_user(new_user("ana")).unwrap();

        assert_eq!(user.role, UserRole::User);
        assert_eq!(user.status, AccountStatus::Active);
        assert!(user.last_login.is_none());
        assert_ne!(user.password_hash, "correct horse battery");
        assert!(verify_password("correct horse battery", &user.password_hash).unwrap());
        assert_eq!(storage.get_user(user.id).unwrap().unwrap(), user);
    }

    #[test]
    fn test_duplicate_username_and_email() {
        let storage = create_test_storage();
        storage.create_user(new_user("ana")).unwrap();

        let err = storage.create_user(new_user("ana")).unwrap_err();
        assert!(matches!(err, Error::Duplicate { field: "username", .. }));

        let mut other = new_user("bea");
        other.email = "ana@example.com".to_string();
        let err = storage.create_user(other).unwrap_err();
        assert!(matches!(err, Error::Duplicate { field: "email", .. }));
    }

    #[test]
    fn test_update_password_rehashes() {
        let storage = create_test_storage();
        let user = storage.create_user(new_user("ana")).unwrap();

        let patch: UserPatch =
            serde_json::from_str(r#"{"password": "new password 123", "role": "admin"}"#).unwrap();
        let updated = storage.update_user(user.id, patch).unwrap();

        assert_eq!(updated.role, UserRole::Admin);
        assert!(verify_password("new password 123", &updated.password_hash).unwrap());
        assert!(!verify_password("correct horse battery", &updated.password_hash).unwrap());
        assert_eq!(updated.email, user.email);
    }

    #[test]
    fn test_update_without_password_keeps_hash() {
        let storage = create_test_storage();
        let user = storage.create_user(new_user("ana")).unwrap();

        let patch: UserPatch = serde_json::from_str(r#"{"fullName": "Ana Lima"}"#).unwrap();
        let updated = storage.update_user(user.id, patch).unwrap();
        assert_eq!(updated.password_hash, user.password_hash);
        assert_eq!(updated.full_name.as_deref(), Some("Ana Lima"));
    }

    #[test]
    fn test_update_missing() {
        let storage = create_test_storage();
        assert!(storage
            .update_user(5, UserPatch::default())
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_lookups() {
        let storage = create_test_storage();
        let mut admin = new_user("sarah.manager");
        admin.organization_id = Some(1);
        storage.create_user(admin).unwrap();
        storage.create_user(new_user("mike.user")).unwrap();

        let found = storage.user_by_username("sarah.manager").unwrap().unwrap();
        assert_eq!(found.email, "sarah.manager@example.com");
        assert!(storage.user_by_username("SARAH.MANAGER").unwrap().is_none());

        let members = storage.users_by_organization(1).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].username, "sarah.manager");
    }

    #[test]
    fn test_delete() {
        let storage = create_test_storage();
        let user = storage.create_user(new_user("ana")).unwrap();

        assert!(storage.delete_user(user.id).unwrap());
        assert!(storage.get_user(user.id).unwrap().is_none());
        assert!(!storage.delete_user(user.id).unwrap());
    }
}
