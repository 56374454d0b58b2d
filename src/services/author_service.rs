use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::config::PaginationConfig;
use crate::database::models::Author;
use crate::database::store::AuthorStore;
use crate::error::ApiError;
use crate::listing::{ListParams, ListQuery, Page, ScopeFilter, AUTHOR_LIST_SPEC};

use super::ownership::authorize_owned;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAuthorInput {
    pub name: String,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAuthorInput {
    pub name: Option<String>,
    pub bio: Option<String>,
}

pub struct AuthorService {
    authors: Arc<dyn AuthorStore>,
    pagination: PaginationConfig,
}

impl AuthorService {
    pub fn new(authors: Arc<dyn AuthorStore>, pagination: PaginationConfig) -> Self {
        Self { authors, pagination }
    }

    /// Any authenticated caller may create; `created_by_id` is forced to the
    /// caller regardless of the request body.
    pub async fn create(
        &self,
        caller: &AuthUser,
        input: CreateAuthorInput,
    ) -> Result<Author, ApiError> {
        let author = self.authors.insert(Author::new(caller.id, input.name, input.bio)).await?;
        tracing::debug!(author_id = %author.id, user_id = %caller.id, "author created");
        Ok(author)
    }

    pub async fn get(&self, caller: &AuthUser, id: Uuid) -> Result<Author, ApiError> {
        authorize_owned(self.authors.find_by_id(id).await?, caller.id)
    }

    pub async fn update(
        &self,
        caller: &AuthUser,
        id: Uuid,
        input: UpdateAuthorInput,
    ) -> Result<Author, ApiError> {
        let mut author = authorize_owned(self.authors.find_by_id(id).await?, caller.id)?;
        if let Some(name) = input.name {
            author.name = name;
        }
        if let Some(bio) = input.bio {
            author.bio = Some(bio);
        }
        author.updated_at = chrono::Utc::now();
        Ok(self.authors.update(author).await?)
    }

    /// Refused with `Conflict` while any book still references the author.
    pub async fn delete(&self, caller: &AuthUser, id: Uuid) -> Result<(), ApiError> {
        authorize_owned(self.authors.find_by_id(id).await?, caller.id)?;
        self.authors.delete(id).await?;
        Ok(())
    }

    /// Scoped to the caller's own authors in the query itself; never 403.
    pub async fn list(&self, caller: &AuthUser, params: ListParams) -> Result<Page<Author>, ApiError> {
        let query = ListQuery::resolve(
            &params,
            &AUTHOR_LIST_SPEC,
            &self.pagination,
            vec![ScopeFilter::CreatedBy(caller.id)],
        );
        let (items, total) = self.authors.find_page(&query).await?;
        Ok(Page::assemble(items, total, query.page, query.limit))
    }
}
