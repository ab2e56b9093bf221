use crate::models::{NewTag, Tag};
use crate::schema::{recipe_tags, tags};
use diesel::prelude::*;
use uuid::Uuid;

use super::{first_missing, StoreError};

/// The owner's tags in descending name order. With `assigned_only`, tags not
/// attached to any recipe are left out.
pub fn list_tags(
    conn: &mut PgConnection,
    owner: Uuid,
    assigned_only: bool,
) -> QueryResult<Vec<Tag>> {
    let mut query = tags::table
        .filter(tags::user_id.eq(owner))
        .select(Tag::as_select())
        .into_boxed();

    if assigned_only {
        query = query.filter(tags::id.eq_any(recipe_tags::table.select(recipe_tags::tag_id)));
    }

    query
        .order((tags::name.desc(), tags::id.desc()))
        .load(conn)
}

pub fn create_tag(conn: &mut PgConnection, owner: Uuid, name: &str) -> QueryResult<Tag> {
    diesel::insert_into(tags::table)
        .values(NewTag {
            user_id: owner,
            name,
        })
        .returning(Tag::as_returning())
        .get_result(conn)
}

/// Fails with `UnknownTag` for the first id the owner does not have.
pub fn ensure_owned(conn: &mut PgConnection, owner: Uuid, ids: &[i32]) -> Result<(), StoreError> {
    if ids.is_empty() {
        return Ok(());
    }

    let owned: Vec<i32> = tags::table
        .filter(tags::user_id.eq(owner))
        .filter(tags::id.eq_any(ids.to_vec()))
        .select(tags::id)
        .load(conn)?;

    match first_missing(ids, &owned) {
        Some(id) => Err(StoreError::UnknownTag(id)),
        None => Ok(()),
    }
}
