use crate::auth::{hash_password, verify_password};
use crate::models::{NewUser, User, UserChangeset};
use crate::schema::users;
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use larder_core::normalize_email;
use uuid::Uuid;

use super::StoreError;

/// Fields a user may change on their own account. `None` keeps the current value.
#[derive(Debug, Default)]
pub struct UserUpdate<'a> {
    pub email: Option<&'a str>,
    pub name: Option<&'a str>,
    pub password: Option<&'a str>,
}

pub fn create_user(
    conn: &mut PgConnection,
    email: &str,
    password: &str,
    name: &str,
) -> Result<User, StoreError> {
    insert_user(conn, email, password, name, false)
}

/// Like [`create_user`], with staff and superuser rights.
pub fn create_superuser(
    conn: &mut PgConnection,
    email: &str,
    password: &str,
) -> Result<User, StoreError> {
    insert_user(conn, email, password, "", true)
}

fn insert_user(
    conn: &mut PgConnection,
    email: &str,
    password: &str,
    name: &str,
    privileged: bool,
) -> Result<User, StoreError> {
    let email = normalize_email(email)?;
    let password_hash =
        hash_password(password).map_err(|e| StoreError::PasswordHash(e.to_string()))?;

    let new_user = NewUser {
        id: Uuid::new_v4(),
        email: &email,
        name: name.trim(),
        password_hash: &password_hash,
        is_staff: privileged,
        is_superuser: privileged,
    };

    diesel::insert_into(users::table)
        .values(&new_user)
        .returning(User::as_returning())
        .get_result(conn)
        .map_err(map_unique_email)
}

/// Check credentials. Unknown, inactive and wrong-password logins all come back `None`.
pub fn authenticate(
    conn: &mut PgConnection,
    email: &str,
    password: &str,
) -> Result<Option<User>, StoreError> {
    let Ok(email) = normalize_email(email) else {
        return Ok(None);
    };

    let user: Option<User> = users::table
        .filter(users::email.eq(&email))
        .filter(users::is_active.eq(true))
        .select(User::as_select())
        .first(conn)
        .optional()?;

    Ok(user.filter(|u| verify_password(password, &u.password_hash)))
}

pub fn update_user(
    conn: &mut PgConnection,
    user_id: Uuid,
    update: &UserUpdate<'_>,
) -> Result<User, StoreError> {
    let email = update.email.map(normalize_email).transpose()?;
    let password_hash = update
        .password
        .map(hash_password)
        .transpose()
        .map_err(|e| StoreError::PasswordHash(e.to_string()))?;

    let changes = UserChangeset {
        email: email.as_deref(),
        name: update.name.map(str::trim),
        password_hash: password_hash.as_deref(),
        updated_at: Utc::now(),
    };

    diesel::update(users::table.find(user_id))
        .set(&changes)
        .returning(User::as_returning())
        .get_result(conn)
        .map_err(map_unique_email)
}

fn map_unique_email(err: DieselError) -> StoreError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => StoreError::EmailTaken,
        other => StoreError::Database(other),
    }
}
