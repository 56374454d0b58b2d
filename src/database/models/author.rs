use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::Owned;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: Uuid,
    pub name: String,
    pub bio: Option<String>,
    pub created_by_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Author {
    /// `created_by_id` is forced to the acting user; any client-supplied
    /// value never reaches this constructor.
    pub fn new(created_by_id: Uuid, name: String, bio: Option<String>) -> Self {
        let now = Utc::now();
        Self { id: Uuid::new_v4(), name, bio, created_by_id, created_at: now, updated_at: now }
    }
}

impl Owned for Author {
    fn created_by(&self) -> Uuid {
        self.created_by_id
    }

    fn resource_name() -> &'static str {
        "Author"
    }
}
