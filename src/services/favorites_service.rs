//! Per-user favorite sets over authors and books. Favoriting is owner-only:
//! a user can only favorite resources they created, so the ledger never
//! leaks the existence of someone else's records beyond the usual
//! NotFound/Forbidden sequence.

use std::sync::Arc;

use uuid::Uuid;

use crate::auth::AuthUser;
use crate::config::PaginationConfig;
use crate::database::models::{Author, Book, User};
use crate::database::store::{AuthorStore, BookStore, ResourceKind, UserStore};
use crate::error::ApiError;
use crate::listing::{
    ListParams, ListQuery, Page, ScopeFilter, AUTHOR_LIST_SPEC, BOOK_LIST_SPEC,
};

use super::ownership::authorize_owned;

pub struct FavoritesService {
    users: Arc<dyn UserStore>,
    authors: Arc<dyn AuthorStore>,
    books: Arc<dyn BookStore>,
    pagination: PaginationConfig,
}

impl FavoritesService {
    pub fn new(
        users: Arc<dyn UserStore>,
        authors: Arc<dyn AuthorStore>,
        books: Arc<dyn BookStore>,
        pagination: PaginationConfig,
    ) -> Self {
        Self { users, authors, books, pagination }
    }

    /// Not idempotent: favoriting an author that is already in the set is
    /// `AlreadyFavorited`. Returns the user with the updated set.
    pub async fn add_author(&self, caller: &AuthUser, author_id: Uuid) -> Result<User, ApiError> {
        self.authorize_author(caller, author_id).await?;
        let changed = self.users.add_favorite(caller.id, ResourceKind::Author, author_id).await?;
        if !changed {
            return Err(ApiError::already_favorited("Author is already in your favorites"));
        }
        self.reload_user(caller.id).await
    }

    /// Not idempotent either: removing an absent author is `NotInFavorites`.
    pub async fn remove_author(&self, caller: &AuthUser, author_id: Uuid) -> Result<User, ApiError> {
        self.authorize_author(caller, author_id).await?;
        let changed =
            self.users.remove_favorite(caller.id, ResourceKind::Author, author_id).await?;
        if !changed {
            return Err(ApiError::not_in_favorites("Author is not in your favorites"));
        }
        self.reload_user(caller.id).await
    }

    pub async fn add_book(&self, caller: &AuthUser, book_id: Uuid) -> Result<User, ApiError> {
        self.authorize_book(caller, book_id).await?;
        let changed = self.users.add_favorite(caller.id, ResourceKind::Book, book_id).await?;
        if !changed {
            return Err(ApiError::already_favorited("Book is already in your favorites"));
        }
        self.reload_user(caller.id).await
    }

    pub async fn remove_book(&self, caller: &AuthUser, book_id: Uuid) -> Result<User, ApiError> {
        self.authorize_book(caller, book_id).await?;
        let changed = self.users.remove_favorite(caller.id, ResourceKind::Book, book_id).await?;
        if !changed {
            return Err(ApiError::not_in_favorites("Book is not in your favorites"));
        }
        self.reload_user(caller.id).await
    }

    /// An empty favorite set short-circuits to an empty page without ever
    /// touching the author store.
    pub async fn list_authors(
        &self,
        caller: &AuthUser,
        params: ListParams,
    ) -> Result<Page<Author>, ApiError> {
        let user = self.reload_user(caller.id).await?;
        let query = ListQuery::resolve(
            &params,
            &AUTHOR_LIST_SPEC,
            &self.pagination,
            vec![
                ScopeFilter::IdIn(user.favorite_author_ids.clone()),
                ScopeFilter::CreatedBy(caller.id),
            ],
        );
        if user.favorite_author_ids.is_empty() {
            return Ok(Page::empty(query.page, query.limit));
        }
        let (items, total) = self.authors.find_page(&query).await?;
        Ok(Page::assemble(items, total, query.page, query.limit))
    }

    pub async fn list_books(
        &self,
        caller: &AuthUser,
        params: ListParams,
    ) -> Result<Page<Book>, ApiError> {
        let user = self.reload_user(caller.id).await?;
        let query = ListQuery::resolve(
            &params,
            &BOOK_LIST_SPEC,
            &self.pagination,
            vec![
                ScopeFilter::IdIn(user.favorite_book_ids.clone()),
                ScopeFilter::CreatedBy(caller.id),
            ],
        );
        if user.favorite_book_ids.is_empty() {
            return Ok(Page::empty(query.page, query.limit));
        }
        let (items, total) = self.books.find_page(&query).await?;
        Ok(Page::assemble(items, total, query.page, query.limit))
    }

    async fn authorize_author(&self, caller: &AuthUser, id: Uuid) -> Result<Author, ApiError> {
        authorize_owned(self.authors.find_by_id(id).await?, caller.id)
    }

    async fn authorize_book(&self, caller: &AuthUser, id: Uuid) -> Result<Book, ApiError> {
        authorize_owned(self.books.find_by_id(id).await?, caller.id)
    }

    async fn reload_user(&self, id: Uuid) -> Result<User, ApiError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::stale_token("Account no longer exists"))
    }
}
