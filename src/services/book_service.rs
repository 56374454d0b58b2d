use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::config::PaginationConfig;
use crate::database::models::Book;
use crate::database::store::{AuthorStore, BookStore};
use crate::error::ApiError;
use crate::listing::{ListParams, ListQuery, Page, ScopeFilter, BOOK_LIST_SPEC};

use super::ownership::authorize_owned;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookInput {
    pub title: String,
    pub isbn: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub author_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookInput {
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub author_ids: Option<Vec<Uuid>>,
}

pub struct BookService {
    books: Arc<dyn BookStore>,
    authors: Arc<dyn AuthorStore>,
    pagination: PaginationConfig,
}

impl BookService {
    pub fn new(
        books: Arc<dyn BookStore>,
        authors: Arc<dyn AuthorStore>,
        pagination: PaginationConfig,
    ) -> Self {
        Self { books, authors, pagination }
    }

    /// Every referenced author must exist before anything is written; an
    /// unknown id aborts the create with a `NotFound` naming that id. A
    /// duplicate ISBN (any owner) surfaces as `Conflict`.
    pub async fn create(&self, caller: &AuthUser, input: CreateBookInput) -> Result<Book, ApiError> {
        self.ensure_authors_exist(&input.author_ids).await?;

        let book = Book::new(
            caller.id,
            input.title,
            input.isbn,
            input.published_date,
            input.author_ids,
        );
        let book = self.books.insert(book).await?;
        tracing::debug!(book_id = %book.id, user_id = %caller.id, "book created");
        Ok(book)
    }

    pub async fn get(&self, caller: &AuthUser, id: Uuid) -> Result<Book, ApiError> {
        authorize_owned(self.books.find_by_id(id).await?, caller.id)
    }

    pub async fn update(
        &self,
        caller: &AuthUser,
        id: Uuid,
        input: UpdateBookInput,
    ) -> Result<Book, ApiError> {
        let mut book = authorize_owned(self.books.find_by_id(id).await?, caller.id)?;

        if let Some(author_ids) = &input.author_ids {
            self.ensure_authors_exist(author_ids).await?;
        }

        if let Some(title) = input.title {
            book.title = title;
        }
        if let Some(isbn) = input.isbn {
            book.isbn = Some(isbn);
        }
        if let Some(published_date) = input.published_date {
            book.published_date = Some(published_date);
        }
        if let Some(author_ids) = input.author_ids {
            book.author_ids = author_ids;
        }
        book.updated_at = chrono::Utc::now();
        Ok(self.books.update(book).await?)
    }

    pub async fn delete(&self, caller: &AuthUser, id: Uuid) -> Result<(), ApiError> {
        authorize_owned(self.books.find_by_id(id).await?, caller.id)?;
        self.books.delete(id).await?;
        Ok(())
    }

    pub async fn list(&self, caller: &AuthUser, params: ListParams) -> Result<Page<Book>, ApiError> {
        let query = ListQuery::resolve(
            &params,
            &BOOK_LIST_SPEC,
            &self.pagination,
            vec![ScopeFilter::CreatedBy(caller.id)],
        );
        let (items, total) = self.books.find_page(&query).await?;
        Ok(Page::assemble(items, total, query.page, query.limit))
    }

    async fn ensure_authors_exist(&self, author_ids: &[Uuid]) -> Result<(), ApiError> {
        let missing = self.authors.filter_missing(author_ids).await?;
        if let Some(id) = missing.first() {
            return Err(ApiError::not_found(format!("Author {} not found", id)));
        }
        Ok(())
    }
}
