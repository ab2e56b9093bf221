use crate::models::{
    Ingredient, NewRecipe, NewRecipeIngredient, NewRecipeTag, Recipe, RecipeChangeset, Tag,
};
use crate::schema::{ingredients, recipe_ingredients, recipe_tags, recipes, tags};
use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::prelude::*;
use std::collections::HashMap;
use uuid::Uuid;

use super::{ingredients as owned_ingredients, tags as owned_tags, StoreError};

/// Recipe row plus the ids of its tags and ingredients, ascending.
#[derive(Debug, Clone)]
pub struct RecipeWithIds {
    pub recipe: Recipe,
    pub tag_ids: Vec<i32>,
    pub ingredient_ids: Vec<i32>,
}

/// Recipe row with its tags and ingredients loaded in full.
#[derive(Debug, Clone)]
pub struct RecipeDetail {
    pub recipe: Recipe,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<Ingredient>,
}

/// Restricts a recipe listing. Within one list any id matches; when both
/// lists are set a recipe must match each of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub tag_ids: Vec<i32>,
    pub ingredient_ids: Vec<i32>,
}

#[derive(Debug, Clone)]
pub struct RecipeFields {
    pub title: String,
    pub time_minutes: i32,
    pub price: BigDecimal,
    pub link: Option<String>,
}

/// What to do with one of a recipe's relation sets on update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationUpdate {
    Keep,
    Replace(Vec<i32>),
}

/// Changes to apply to an existing recipe. `None` keeps the current value.
#[derive(Debug, Clone)]
pub struct RecipeUpdate {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<BigDecimal>,
    /// `Some(None)` clears the link.
    pub link: Option<Option<String>>,
    pub tags: RelationUpdate,
    pub ingredients: RelationUpdate,
}

pub fn list_recipes(
    conn: &mut PgConnection,
    owner: Uuid,
    filter: &RecipeFilter,
) -> Result<Vec<RecipeWithIds>, StoreError> {
    let mut query = recipes::table
        .filter(recipes::user_id.eq(owner))
        .select(Recipe::as_select())
        .into_boxed();

    if !filter.tag_ids.is_empty() {
        query = query.filter(
            recipes::id.eq_any(
                recipe_tags::table
                    .filter(recipe_tags::tag_id.eq_any(filter.tag_ids.clone()))
                    .select(recipe_tags::recipe_id),
            ),
        );
    }

    if !filter.ingredient_ids.is_empty() {
        query = query.filter(
            recipes::id.eq_any(
                recipe_ingredients::table
                    .filter(recipe_ingredients::ingredient_id.eq_any(filter.ingredient_ids.clone()))
                    .select(recipe_ingredients::recipe_id),
            ),
        );
    }

    let rows: Vec<Recipe> = query.order(recipes::id.desc()).load(conn)?;
    attach_ids(conn, rows).map_err(Into::into)
}

/// Owned recipe by id; someone else's recipe is reported as not found.
pub fn find_recipe(conn: &mut PgConnection, owner: Uuid, id: i32) -> Result<Recipe, StoreError> {
    recipes::table
        .filter(recipes::id.eq(id))
        .filter(recipes::user_id.eq(owner))
        .select(Recipe::as_select())
        .first(conn)
        .optional()?
        .ok_or(StoreError::RecipeNotFound)
}

pub fn get_recipe(conn: &mut PgConnection, owner: Uuid, id: i32) -> Result<RecipeDetail, StoreError> {
    let recipe = find_recipe(conn, owner, id)?;

    let tags = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq(recipe.id))
        .order(tags::id.asc())
        .select(Tag::as_select())
        .load(conn)?;

    let ingredients = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq(recipe.id))
        .order(ingredients::id.asc())
        .select(Ingredient::as_select())
        .load(conn)?;

    Ok(RecipeDetail {
        recipe,
        tags,
        ingredients,
    })
}

pub fn create_recipe(
    conn: &mut PgConnection,
    owner: Uuid,
    fields: &RecipeFields,
    tag_ids: &[i32],
    ingredient_ids: &[i32],
) -> Result<RecipeWithIds, StoreError> {
    conn.transaction::<_, StoreError, _>(|conn| {
        owned_tags::ensure_owned(conn, owner, tag_ids)?;
        owned_ingredients::ensure_owned(conn, owner, ingredient_ids)?;

        let recipe: Recipe = diesel::insert_into(recipes::table)
            .values(NewRecipe {
                user_id: owner,
                title: &fields.title,
                time_minutes: fields.time_minutes,
                price: &fields.price,
                link: fields.link.as_deref(),
            })
            .returning(Recipe::as_returning())
            .get_result(conn)?;

        link_tags(conn, recipe.id, tag_ids)?;
        link_ingredients(conn, recipe.id, ingredient_ids)?;

        tracing::info!(recipe_id = recipe.id, user_id = %owner, "Created recipe");

        Ok(RecipeWithIds {
            recipe,
            tag_ids: tag_ids.to_vec(),
            ingredient_ids: ingredient_ids.to_vec(),
        })
    })
}

pub fn update_recipe(
    conn: &mut PgConnection,
    owner: Uuid,
    id: i32,
    update: &RecipeUpdate,
) -> Result<RecipeWithIds, StoreError> {
    conn.transaction::<_, StoreError, _>(|conn| {
        find_recipe(conn, owner, id)?;

        if let RelationUpdate::Replace(ids) = &update.tags {
            owned_tags::ensure_owned(conn, owner, ids)?;
        }
        if let RelationUpdate::Replace(ids) = &update.ingredients {
            owned_ingredients::ensure_owned(conn, owner, ids)?;
        }

        let changes = RecipeChangeset {
            title: update.title.as_deref(),
            time_minutes: update.time_minutes,
            price: update.price.as_ref(),
            link: update.link.as_ref().map(|link| link.as_deref()),
            updated_at: Utc::now(),
        };

        let recipe: Recipe = diesel::update(recipes::table.find(id))
            .set(&changes)
            .returning(Recipe::as_returning())
            .get_result(conn)?;

        if let RelationUpdate::Replace(ids) = &update.tags {
            diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(id)))
                .execute(conn)?;
            link_tags(conn, id, ids)?;
        }
        if let RelationUpdate::Replace(ids) = &update.ingredients {
            diesel::delete(recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(id)))
                .execute(conn)?;
            link_ingredients(conn, id, ids)?;
        }

        let mut updated = attach_ids(conn, vec![recipe])?;
        updated.pop().ok_or(StoreError::RecipeNotFound)
    })
}

/// Point the recipe at a new image. Returns the path it replaces, if any.
pub fn set_recipe_image(
    conn: &mut PgConnection,
    owner: Uuid,
    id: i32,
    image: &str,
) -> Result<Option<String>, StoreError> {
    conn.transaction::<_, StoreError, _>(|conn| {
        // FOR UPDATE serializes concurrent swaps on this recipe.
        let previous: Option<String> = recipes::table
            .filter(recipes::id.eq(id))
            .filter(recipes::user_id.eq(owner))
            .select(recipes::image)
            .for_update()
            .first::<Option<String>>(conn)
            .optional()?
            .ok_or(StoreError::RecipeNotFound)?;

        diesel::update(recipes::table.find(id))
            .set((
                recipes::image.eq(Some(image)),
                recipes::updated_at.eq(Utc::now()),
            ))
            .execute(conn)?;

        Ok(previous)
    })
}

/// Delete an owned recipe and its links. Returns the image path it held, if any.
pub fn delete_recipe(
    conn: &mut PgConnection,
    owner: Uuid,
    id: i32,
) -> Result<Option<String>, StoreError> {
    let deleted: Option<Option<String>> = diesel::delete(
        recipes::table
            .filter(recipes::id.eq(id))
            .filter(recipes::user_id.eq(owner)),
    )
    .returning(recipes::image)
    .get_result(conn)
    .optional()?;

    match deleted {
        Some(image) => {
            tracing::info!(recipe_id = id, user_id = %owner, "Deleted recipe");
            Ok(image)
        }
        None => Err(StoreError::RecipeNotFound),
    }
}

fn link_tags(conn: &mut PgConnection, recipe_id: i32, tag_ids: &[i32]) -> QueryResult<()> {
    if tag_ids.is_empty() {
        return Ok(());
    }
    let rows: Vec<NewRecipeTag> = tag_ids
        .iter()
        .map(|&tag_id| NewRecipeTag { recipe_id, tag_id })
        .collect();
    diesel::insert_into(recipe_tags::table)
        .values(&rows)
        .execute(conn)?;
    Ok(())
}

fn link_ingredients(
    conn: &mut PgConnection,
    recipe_id: i32,
    ingredient_ids: &[i32],
) -> QueryResult<()> {
    if ingredient_ids.is_empty() {
        return Ok(());
    }
    let rows: Vec<NewRecipeIngredient> = ingredient_ids
        .iter()
        .map(|&ingredient_id| NewRecipeIngredient {
            recipe_id,
            ingredient_id,
        })
        .collect();
    diesel::insert_into(recipe_ingredients::table)
        .values(&rows)
        .execute(conn)?;
    Ok(())
}

/// Load relation ids for all `rows` in two queries, keeping the row order.
fn attach_ids(conn: &mut PgConnection, rows: Vec<Recipe>) -> QueryResult<Vec<RecipeWithIds>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let recipe_ids: Vec<i32> = rows.iter().map(|r| r.id).collect();

    let tag_pairs: Vec<(i32, i32)> = recipe_tags::table
        .filter(recipe_tags::recipe_id.eq_any(recipe_ids.clone()))
        .select((recipe_tags::recipe_id, recipe_tags::tag_id))
        .order((recipe_tags::recipe_id, recipe_tags::tag_id))
        .load(conn)?;

    let ingredient_pairs: Vec<(i32, i32)> = recipe_ingredients::table
        .filter(recipe_ingredients::recipe_id.eq_any(recipe_ids))
        .select((recipe_ingredients::recipe_id, recipe_ingredients::ingredient_id))
        .order((recipe_ingredients::recipe_id, recipe_ingredients::ingredient_id))
        .load(conn)?;

    let mut tags_by_recipe = group_pairs(tag_pairs);
    let mut ingredients_by_recipe = group_pairs(ingredient_pairs);

    Ok(rows
        .into_iter()
        .map(|recipe| RecipeWithIds {
            tag_ids: tags_by_recipe.remove(&recipe.id).unwrap_or_default(),
            ingredient_ids: ingredients_by_recipe.remove(&recipe.id).unwrap_or_default(),
            recipe,
        })
        .collect())
}

fn group_pairs(pairs: Vec<(i32, i32)>) -> HashMap<i32, Vec<i32>> {
    let mut grouped: HashMap<i32, Vec<i32>> = HashMap::new();
    for (recipe_id, related_id) in pairs {
        grouped.entry(recipe_id).or_default().push(related_id);
    }
    grouped
}
