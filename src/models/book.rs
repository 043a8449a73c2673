//! Book, genre and collection models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Full book record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub publication_year: Option<i32>,
    pub cover: Option<String>,
    pub synopsis: Option<String>,
    pub author_photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Book for list display
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publication_year: Option<i32>,
    pub cover: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Book page with genres and related titles
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    pub genres: Vec<String>,
    /// Other books sharing at least one genre
    pub similar: Vec<BookShort>,
}

/// A book held by a library and its number of copies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct HeldBook {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publication_year: Option<i32>,
    pub cover: Option<String>,
    pub quantity: i32,
}

/// Collection entry opened for editing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CollectionBook {
    #[serde(flatten)]
    pub book: Book,
    pub genre_ids: Vec<i64>,
    pub genres: Vec<String>,
    pub quantity: i32,
}

/// Book fields shared by create and update requests
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookInput {
    /// 13 digits, no separators
    pub isbn: String,
    #[validate(length(min = 1, max = 255, message = "is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 255, message = "is required"))]
    pub author: String,
    #[validate(length(max = 255))]
    pub publisher: Option<String>,
    pub publication_year: Option<i32>,
    #[validate(length(max = 255))]
    pub cover: Option<String>,
    pub synopsis: Option<String>,
    #[validate(length(max = 255))]
    pub author_photo: Option<String>,
    /// Replaces the book's genres when present
    pub genre_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddBook {
    #[serde(flatten)]
    #[validate(nested)]
    pub book: BookInput,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[serde(flatten)]
    #[validate(nested)]
    pub book: BookInput,
    /// 0 removes the book from the collection
    #[validate(range(min = 0, message = "cannot be negative"))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateQuantity {
    /// 0 removes the book from the collection
    #[validate(range(min = 0, message = "cannot be negative"))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookSearch {
    /// Case-insensitive title fragment
    pub title: Option<String>,
}

/// Optional caller position for proximity sorting
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ProximityQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}
