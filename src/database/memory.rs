//! In-memory store over `RwLock<HashMap>`. Backs the integration tests and
//! local runs without a DATABASE_URL; interprets the same [`ListQuery`] the
//! Postgres backend renders to SQL.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use crate::database::models::{Author, Book, User};
use crate::database::store::{AuthorStore, BookStore, ResourceKind, StoreError, UserStore};
use crate::listing::{ListQuery, ScopeFilter, SortDirection};

#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    authors: Arc<RwLock<HashMap<Uuid, Author>>>,
    books: Arc<RwLock<HashMap<Uuid, Book>>>,
    // Favorite edges, mirroring the id arrays on User.
    author_edges: Arc<RwLock<Vec<(Uuid, Uuid)>>>,
    book_edges: Arc<RwLock<Vec<(Uuid, Uuid)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_err<T>(_: T) -> StoreError {
    StoreError::Query("store lock poisoned".to_string())
}

/// Column accessors for search and sort; unknown columns simply never match
/// (the allow-list upstream prevents them from arriving).
fn author_text(author: &Author, column: &str) -> Option<String> {
    match column {
        "name" => Some(author.name.clone()),
        "bio" => author.bio.clone(),
        _ => None,
    }
}

fn book_text(book: &Book, column: &str) -> Option<String> {
    match column {
        "title" => Some(book.title.clone()),
        "isbn" => book.isbn.clone(),
        _ => None,
    }
}

fn author_cmp(a: &Author, b: &Author, column: &str) -> Ordering {
    match column {
        "name" => a.name.cmp(&b.name),
        _ => a.created_at.cmp(&b.created_at),
    }
}

fn book_cmp(a: &Book, b: &Book, column: &str) -> Ordering {
    match column {
        "title" => a.title.cmp(&b.title),
        "published_date" => a.published_date.cmp(&b.published_date),
        _ => a.created_at.cmp(&b.created_at),
    }
}

/// Shared listing interpreter: scope, search, sort (ties broken by id for a
/// deterministic order), then count + slice.
fn run_list_query<T, FText, FCmp, FCreator, FId>(
    rows: Vec<T>,
    query: &ListQuery,
    text_of: FText,
    cmp: FCmp,
    creator_of: FCreator,
    id_of: FId,
) -> (Vec<T>, i64)
where
    FText: Fn(&T, &str) -> Option<String>,
    FCmp: Fn(&T, &T, &str) -> Ordering,
    FCreator: Fn(&T) -> Uuid,
    FId: Fn(&T) -> Uuid,
{
    let mut matched: Vec<T> = rows
        .into_iter()
        .filter(|row| {
            query.scope.iter().all(|filter| match filter {
                ScopeFilter::CreatedBy(user_id) => creator_of(row) == *user_id,
                ScopeFilter::IdIn(ids) => ids.contains(&id_of(row)),
            })
        })
        .filter(|row| match &query.search {
            None => true,
            Some(clause) => {
                let needle = clause.term.to_lowercase();
                clause.columns.iter().any(|column| {
                    text_of(row, column)
                        .map(|text| text.to_lowercase().contains(&needle))
                        .unwrap_or(false)
                })
            }
        })
        .collect();

    matched.sort_by(|a, b| {
        let ord = cmp(a, b, query.sort.column);
        let ord = match query.sort.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        };
        ord.then_with(|| id_of(a).cmp(&id_of(b)))
    });

    let total = matched.len() as i64;
    let items = matched
        .into_iter()
        .skip(query.skip.max(0) as usize)
        .take(query.take.max(0) as usize)
        .collect();
    (items, total)
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().map_err(lock_err)?;
        let duplicate =
            users.values().any(|existing| existing.email.eq_ignore_ascii_case(&user.email));
        if duplicate {
            return Err(StoreError::UniqueViolation(
                "A user with this email already exists".to_string(),
            ));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().map_err(lock_err)?.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(lock_err)?;
        Ok(users.values().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn add_favorite(
        &self,
        user_id: Uuid,
        kind: ResourceKind,
        resource_id: Uuid,
    ) -> Result<bool, StoreError> {
        // Single write-lock critical section keeps membership atomic.
        let mut users = self.users.write().map_err(lock_err)?;
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::Query(format!("user {} vanished", user_id)))?;
        let set = match kind {
            ResourceKind::Author => &mut user.favorite_author_ids,
            ResourceKind::Book => &mut user.favorite_book_ids,
        };
        if set.contains(&resource_id) {
            return Ok(false);
        }
        set.push(resource_id);
        user.updated_at = chrono::Utc::now();
        drop(users);

        let edges = match kind {
            ResourceKind::Author => &self.author_edges,
            ResourceKind::Book => &self.book_edges,
        };
        edges.write().map_err(lock_err)?.push((user_id, resource_id));
        Ok(true)
    }

    async fn remove_favorite(
        &self,
        user_id: Uuid,
        kind: ResourceKind,
        resource_id: Uuid,
    ) -> Result<bool, StoreError> {
        let mut users = self.users.write().map_err(lock_err)?;
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::Query(format!("user {} vanished", user_id)))?;
        let set = match kind {
            ResourceKind::Author => &mut user.favorite_author_ids,
            ResourceKind::Book => &mut user.favorite_book_ids,
        };
        let Some(position) = set.iter().position(|id| *id == resource_id) else {
            return Ok(false);
        };
        set.remove(position);
        user.updated_at = chrono::Utc::now();
        drop(users);

        let edges = match kind {
            ResourceKind::Author => &self.author_edges,
            ResourceKind::Book => &self.book_edges,
        };
        edges.write().map_err(lock_err)?.retain(|edge| *edge != (user_id, resource_id));
        Ok(true)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl AuthorStore for MemoryStore {
    async fn insert(&self, author: Author) -> Result<Author, StoreError> {
        self.authors.write().map_err(lock_err)?.insert(author.id, author.clone());
        Ok(author)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Author>, StoreError> {
        Ok(self.authors.read().map_err(lock_err)?.get(&id).cloned())
    }

    async fn filter_missing(&self, ids: &[Uuid]) -> Result<Vec<Uuid>, StoreError> {
        let authors = self.authors.read().map_err(lock_err)?;
        Ok(ids.iter().copied().filter(|id| !authors.contains_key(id)).collect())
    }

    async fn update(&self, author: Author) -> Result<Author, StoreError> {
        self.authors.write().map_err(lock_err)?.insert(author.id, author.clone());
        Ok(author)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let referenced = self
            .books
            .read()
            .map_err(lock_err)?
            .values()
            .any(|book| book.author_ids.contains(&id));
        if referenced {
            return Err(StoreError::ReferentialIntegrity(
                "Cannot delete author: still referenced by at least one book".to_string(),
            ));
        }
        self.authors.write().map_err(lock_err)?.remove(&id);
        Ok(())
    }

    async fn find_page(&self, query: &ListQuery) -> Result<(Vec<Author>, i64), StoreError> {
        let rows: Vec<Author> = self.authors.read().map_err(lock_err)?.values().cloned().collect();
        Ok(run_list_query(rows, query, author_text, author_cmp, |a| a.created_by_id, |a| a.id))
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn insert(&self, book: Book) -> Result<Book, StoreError> {
        let mut books = self.books.write().map_err(lock_err)?;
        if let Some(isbn) = &book.isbn {
            let duplicate = books
                .values()
                .any(|existing| existing.isbn.as_deref() == Some(isbn.as_str()));
            if duplicate {
                return Err(StoreError::UniqueViolation(
                    "A book with this ISBN already exists".to_string(),
                ));
            }
        }
        books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Book>, StoreError> {
        Ok(self.books.read().map_err(lock_err)?.get(&id).cloned())
    }

    async fn update(&self, book: Book) -> Result<Book, StoreError> {
        let mut books = self.books.write().map_err(lock_err)?;
        if let Some(isbn) = &book.isbn {
            let duplicate = books.values().any(|existing| {
                existing.id != book.id && existing.isbn.as_deref() == Some(isbn.as_str())
            });
            if duplicate {
                return Err(StoreError::UniqueViolation(
                    "A book with this ISBN already exists".to_string(),
                ));
            }
        }
        books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.books.write().map_err(lock_err)?.remove(&id);
        Ok(())
    }

    async fn find_page(&self, query: &ListQuery) -> Result<(Vec<Book>, i64), StoreError> {
        let rows: Vec<Book> = self.books.read().map_err(lock_err)?.values().cloned().collect();
        Ok(run_list_query(rows, query, book_text, book_cmp, |b| b.created_by_id, |b| b.id))
    }
}
