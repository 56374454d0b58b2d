use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::Owned;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    /// Globally unique across all books when present, not just within one
    /// user's shelf.
    pub isbn: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub created_by_id: Uuid,
    /// At least one entry; each must resolve to an existing author at write
    /// time (not enforced continuously).
    pub author_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    pub fn new(
        created_by_id: Uuid,
        title: String,
        isbn: Option<String>,
        published_date: Option<NaiveDate>,
        author_ids: Vec<Uuid>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            isbn,
            published_date,
            created_by_id,
            author_ids,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Owned for Book {
    fn created_by(&self) -> Uuid {
        self.created_by_id
    }

    fn resource_name() -> &'static str {
        "Book"
    }
}
