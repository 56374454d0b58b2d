//! Repository traits consumed by the core services. Two backends exist:
//! sqlx/Postgres for deployments and an in-memory store for tests and
//! secretless local runs.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{Author, Book, User};
use crate::listing::ListQuery;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Duplicate value on a unique column (email, ISBN).
    #[error("{0}")]
    UniqueViolation(String),

    /// Delete blocked because other rows still reference the target.
    #[error("{0}")]
    ReferentialIntegrity(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Which favorite set / edge table a favorite operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Author,
    Book,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: User) -> Result<User, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// Case-insensitive email lookup.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Atomically add `resource_id` to the user's favorite set and record
    /// the edge. Returns false when the id was already present, so callers
    /// can distinguish a no-op without a read-modify-write race.
    async fn add_favorite(
        &self,
        user_id: Uuid,
        kind: ResourceKind,
        resource_id: Uuid,
    ) -> Result<bool, StoreError>;

    /// Atomic counterpart of [`add_favorite`]; false when absent.
    async fn remove_favorite(
        &self,
        user_id: Uuid,
        kind: ResourceKind,
        resource_id: Uuid,
    ) -> Result<bool, StoreError>;

    /// Connectivity probe for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait AuthorStore: Send + Sync {
    async fn insert(&self, author: Author) -> Result<Author, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Author>, StoreError>;
    /// Of the given ids, return those that do NOT resolve to an author.
    async fn filter_missing(&self, ids: &[Uuid]) -> Result<Vec<Uuid>, StoreError>;
    async fn update(&self, author: Author) -> Result<Author, StoreError>;
    /// Fails with `ReferentialIntegrity` while any book references the author.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
    /// Execute the resolved listing query plus the matching count query.
    async fn find_page(&self, query: &ListQuery) -> Result<(Vec<Author>, i64), StoreError>;
}

#[async_trait]
pub trait BookStore: Send + Sync {
    /// Fails with `UniqueViolation` on an ISBN already used by any book.
    async fn insert(&self, book: Book) -> Result<Book, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Book>, StoreError>;
    async fn update(&self, book: Book) -> Result<Book, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
    async fn find_page(&self, query: &ListQuery) -> Result<(Vec<Book>, i64), StoreError>;
}
