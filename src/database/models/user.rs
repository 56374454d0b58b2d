use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Account identity. The favorite id arrays mirror the favorite edges for
/// fast membership checks; mutations go through the store's atomic
/// set-add/set-remove so concurrent favoriting cannot lose updates.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: Option<String>,
    pub favorite_author_ids: Vec<Uuid>,
    pub favorite_book_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, password_hash: String, display_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            display_name,
            favorite_author_ids: vec![],
            favorite_book_ids: vec![],
            created_at: now,
            updated_at: now,
        }
    }
}
