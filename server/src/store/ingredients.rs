use crate::models::{Ingredient, NewIngredient};
use crate::schema::{ingredients, recipe_ingredients};
use diesel::prelude::*;
use uuid::Uuid;

use super::{first_missing, StoreError};

/// Same ordering and `assigned_only` rule as [`super::tags::list_tags`].
pub fn list_ingredients(
    conn: &mut PgConnection,
    owner: Uuid,
    assigned_only: bool,
) -> QueryResult<Vec<Ingredient>> {
    let mut query = ingredients::table
        .filter(ingredients::user_id.eq(owner))
        .select(Ingredient::as_select())
        .into_boxed();

    if assigned_only {
        query = query.filter(
            ingredients::id.eq_any(
                recipe_ingredients::table.select(recipe_ingredients::ingredient_id),
            ),
        );
    }

    query
        .order((ingredients::name.desc(), ingredients::id.desc()))
        .load(conn)
}

pub fn create_ingredient(
    conn: &mut PgConnection,
    owner: Uuid,
    name: &str,
) -> QueryResult<Ingredient> {
    diesel::insert_into(ingredients::table)
        .values(NewIngredient {
            user_id: owner,
            name,
        })
        .returning(Ingredient::as_returning())
        .get_result(conn)
}

pub fn ensure_owned(conn: &mut PgConnection, owner: Uuid, ids: &[i32]) -> Result<(), StoreError> {
    if ids.is_empty() {
        return Ok(());
    }

    let owned: Vec<i32> = ingredients::table
        .filter(ingredients::user_id.eq(owner))
        .filter(ingredients::id.eq_any(ids.to_vec()))
        .select(ingredients::id)
        .load(conn)?;

    match first_missing(ids, &owned) {
        Some(id) => Err(StoreError::UnknownIngredient(id)),
        None => Ok(()),
    }
}
