//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Book record from the catalog.
///
/// `total_copies` is fixed at creation; `available_copies` moves only through
/// the ledger's paired borrow/return adjustments, so at all times
/// `available_copies + active loans == total_copies`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub book_id: i64,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub category: Option<String>,
    pub total_copies: i64,
    pub available_copies: i64,
    pub created_at: DateTime<Utc>,
}

/// Catalog intake request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 17))]
    pub isbn: String,
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub author: String,
    pub publisher: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 1))]
    pub copies: i64,
}

/// Catalog entry ranked by all-time borrow count
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PopularBook {
    pub book_id: i64,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub total_copies: i64,
    pub available_copies: i64,
    pub borrow_count: i64,
}
