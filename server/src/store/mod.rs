//! Diesel queries behind the HTTP handlers.
//!
//! Every function takes the owning user's id and only ever reads or writes
//! that user's rows.

pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;

use larder_core::EmailError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Recipe not found")]
    RecipeNotFound,

    #[error("Unknown tag id: {0}")]
    UnknownTag(i32),

    #[error("Unknown ingredient id: {0}")]
    UnknownIngredient(i32),

    #[error(transparent)]
    InvalidEmail(#[from] EmailError),

    #[error("A user with this email already exists")]
    EmailTaken,

    #[error("Failed to hash password: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Database(#[from] diesel::result::Error),
}

/// First requested id that is not in `owned`, if any.
fn first_missing(requested: &[i32], owned: &[i32]) -> Option<i32> {
    requested.iter().copied().find(|id| !owned.contains(id))
}
