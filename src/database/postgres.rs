//! sqlx/Postgres store. Renders the resolved [`ListQuery`] to SQL the same
//! way the in-memory backend interprets it, so both backends page and sort
//! identically.

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::{FromRow, PgPool, Row};
use uuid::Uuid;

use crate::database::models::{Author, Book, User};
use crate::database::store::{AuthorStore, BookStore, ResourceKind, StoreError, UserStore};
use crate::listing::{ListQuery, ScopeFilter};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new().max_connections(10).connect(database_url).await?;
        Ok(Self::new(pool))
    }
}

/// Parameter values collected while rendering a list query.
enum Bind {
    Id(Uuid),
    Ids(Vec<Uuid>),
    Text(String),
}

fn bind_all<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    binds: &'q [Bind],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    for bind in binds {
        q = match bind {
            Bind::Id(id) => q.bind(*id),
            Bind::Ids(ids) => q.bind(ids),
            Bind::Text(text) => q.bind(text),
        };
    }
    q
}

fn bind_all_scalar<'q>(
    mut q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    binds: &'q [Bind],
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    for bind in binds {
        q = match bind {
            Bind::Id(id) => q.bind(*id),
            Bind::Ids(ids) => q.bind(ids),
            Bind::Text(text) => q.bind(text),
        };
    }
    q
}

/// Escape LIKE wildcards so search terms match literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// Render the WHERE clause shared by the items query and the count query.
fn render_where(query: &ListQuery, binds: &mut Vec<Bind>) -> String {
    let mut clauses: Vec<String> = Vec::new();

    for filter in &query.scope {
        match filter {
            ScopeFilter::CreatedBy(user_id) => {
                binds.push(Bind::Id(*user_id));
                clauses.push(format!("created_by_id = ${}", binds.len()));
            }
            ScopeFilter::IdIn(ids) => {
                binds.push(Bind::Ids(ids.clone()));
                clauses.push(format!("id = ANY(${})", binds.len()));
            }
        }
    }

    if let Some(search) = &query.search {
        let pattern = format!("%{}%", escape_like(&search.term));
        let ors: Vec<String> = search
            .columns
            .iter()
            .map(|column| {
                binds.push(Bind::Text(pattern.clone()));
                format!("\"{}\" ILIKE ${}", column, binds.len())
            })
            .collect();
        clauses.push(format!("({})", ors.join(" OR ")));
    }

    if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    }
}

fn render_select(table: &str, query: &ListQuery, binds: &mut Vec<Bind>) -> String {
    let where_clause = render_where(query, binds);
    // Sort column comes from the compile-time allow-list, never from input.
    // The id tiebreak keeps identical calls returning identical orderings.
    format!(
        "SELECT * FROM \"{}\" {} ORDER BY \"{}\" {}, id ASC LIMIT {} OFFSET {}",
        table,
        where_clause,
        query.sort.column,
        query.sort.direction.to_sql(),
        query.take.max(0),
        query.skip.max(0),
    )
}

fn render_count(table: &str, query: &ListQuery, binds: &mut Vec<Bind>) -> String {
    let where_clause = render_where(query, binds);
    format!("SELECT COUNT(*) AS count FROM \"{}\" {}", table, where_clause)
}

async fn fetch_page<T>(
    pool: &PgPool,
    table: &str,
    query: &ListQuery,
) -> Result<(Vec<T>, i64), StoreError>
where
    T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
{
    let mut binds = Vec::new();
    let select_sql = render_select(table, query, &mut binds);
    let rows = bind_all(sqlx::query_as::<_, T>(&select_sql), &binds).fetch_all(pool).await?;

    let mut count_binds = Vec::new();
    let count_sql = render_count(table, query, &mut count_binds);
    let count_row = bind_all_scalar(sqlx::query(&count_sql), &count_binds).fetch_one(pool).await?;
    let total: i64 = count_row.try_get("count")?;

    Ok((rows, total))
}

fn map_unique(err: sqlx::Error, message: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return StoreError::UniqueViolation(message.to_string());
        }
    }
    StoreError::Sqlx(err)
}

fn favorite_target(kind: ResourceKind) -> (&'static str, &'static str, &'static str) {
    match kind {
        ResourceKind::Author => ("favorite_author_ids", "user_favorite_authors", "author_id"),
        ResourceKind::Book => ("favorite_book_ids", "user_favorite_books", "book_id"),
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert(&self, user: User) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users
               (id, email, password_hash, display_name, favorite_author_ids, favorite_book_ids, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING *"#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(&user.favorite_author_ids)
        .bind(&user.favorite_book_ids)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique(e, "A user with this email already exists"))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn add_favorite(
        &self,
        user_id: Uuid,
        kind: ResourceKind,
        resource_id: Uuid,
    ) -> Result<bool, StoreError> {
        let (column, edge_table, edge_column) = favorite_target(kind);

        // Guarded array_append: membership check and append happen in one
        // statement, so concurrent adds cannot both succeed.
        let sql = format!(
            "UPDATE users SET {col} = array_append({col}, $2), updated_at = now() \
             WHERE id = $1 AND NOT ($2 = ANY({col}))",
            col = column
        );
        let result = sqlx::query(&sql).bind(user_id).bind(resource_id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }

        let edge_sql = format!(
            "INSERT INTO {} (user_id, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            edge_table, edge_column
        );
        sqlx::query(&edge_sql).bind(user_id).bind(resource_id).execute(&self.pool).await?;
        Ok(true)
    }

    async fn remove_favorite(
        &self,
        user_id: Uuid,
        kind: ResourceKind,
        resource_id: Uuid,
    ) -> Result<bool, StoreError> {
        let (column, edge_table, edge_column) = favorite_target(kind);

        let sql = format!(
            "UPDATE users SET {col} = array_remove({col}, $2), updated_at = now() \
             WHERE id = $1 AND $2 = ANY({col})",
            col = column
        );
        let result = sqlx::query(&sql).bind(user_id).bind(resource_id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }

        let edge_sql =
            format!("DELETE FROM {} WHERE user_id = $1 AND {} = $2", edge_table, edge_column);
        sqlx::query(&edge_sql).bind(user_id).bind(resource_id).execute(&self.pool).await?;
        Ok(true)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl AuthorStore for PgStore {
    async fn insert(&self, author: Author) -> Result<Author, StoreError> {
        let author = sqlx::query_as::<_, Author>(
            r#"INSERT INTO authors (id, name, bio, created_by_id, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(author.id)
        .bind(&author.name)
        .bind(&author.bio)
        .bind(author.created_by_id)
        .bind(author.created_at)
        .bind(author.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(author)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Author>, StoreError> {
        let author = sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(author)
    }

    async fn filter_missing(&self, ids: &[Uuid]) -> Result<Vec<Uuid>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let rows = sqlx::query("SELECT id FROM authors WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        let mut found: Vec<Uuid> = Vec::with_capacity(rows.len());
        for row in rows {
            found.push(row.try_get("id")?);
        }
        Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
    }

    async fn update(&self, author: Author) -> Result<Author, StoreError> {
        let author = sqlx::query_as::<_, Author>(
            r#"UPDATE authors SET name = $2, bio = $3, updated_at = $4
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(author.id)
        .bind(&author.name)
        .bind(&author.bio)
        .bind(author.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(author)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        // author_ids is an array column, so the reference check is explicit
        // rather than a foreign-key cascade.
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM books WHERE $1 = ANY(author_ids)) AS referenced")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        let referenced: bool = row.try_get("referenced")?;
        if referenced {
            return Err(StoreError::ReferentialIntegrity(
                "Cannot delete author: still referenced by at least one book".to_string(),
            ));
        }

        sqlx::query("DELETE FROM authors WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(())
    }

    async fn find_page(&self, query: &ListQuery) -> Result<(Vec<Author>, i64), StoreError> {
        fetch_page(&self.pool, "authors", query).await
    }
}

#[async_trait]
impl BookStore for PgStore {
    async fn insert(&self, book: Book) -> Result<Book, StoreError> {
        sqlx::query_as::<_, Book>(
            r#"INSERT INTO books
               (id, title, isbn, published_date, created_by_id, author_ids, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING *"#,
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.isbn)
        .bind(book.published_date)
        .bind(book.created_by_id)
        .bind(&book.author_ids)
        .bind(book.created_at)
        .bind(book.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique(e, "A book with this ISBN already exists"))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Book>, StoreError> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(book)
    }

    async fn update(&self, book: Book) -> Result<Book, StoreError> {
        sqlx::query_as::<_, Book>(
            r#"UPDATE books
               SET title = $2, isbn = $3, published_date = $4, author_ids = $5, updated_at = $6
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.isbn)
        .bind(book.published_date)
        .bind(&book.author_ids)
        .bind(book.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique(e, "A book with this ISBN already exists"))
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM books WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(())
    }

    async fn find_page(&self, query: &ListQuery) -> Result<(Vec<Book>, i64), StoreError> {
        fetch_page(&self.pool, "books", query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaginationConfig;
    use crate::listing::{ListParams, ListQuery};
    use crate::listing::query::AUTHOR_LIST_SPEC;

    fn resolve(params: ListParams, scope: Vec<ScopeFilter>) -> ListQuery {
        let pagination = PaginationConfig { default_limit: 10, max_limit: 100 };
        ListQuery::resolve(&params, &AUTHOR_LIST_SPEC, &pagination, scope)
    }

    #[test]
    fn renders_scoped_select_with_tiebreak() {
        let user = Uuid::new_v4();
        let query = resolve(ListParams::new(2, 10), vec![ScopeFilter::CreatedBy(user)]);
        let mut binds = Vec::new();
        let sql = render_select("authors", &query, &mut binds);
        assert_eq!(
            sql,
            "SELECT * FROM \"authors\" WHERE created_by_id = $1 \
             ORDER BY \"created_at\" DESC, id ASC LIMIT 10 OFFSET 10"
        );
        assert_eq!(binds.len(), 1);
    }

    #[test]
    fn renders_search_as_or_over_columns() {
        let mut params = ListParams::new(1, 10);
        params.search = Some("orwell".to_string());
        let query = resolve(params, vec![]);
        let mut binds = Vec::new();
        let sql = render_select("authors", &query, &mut binds);
        assert!(sql.contains("(\"name\" ILIKE $1 OR \"bio\" ILIKE $2)"));
        assert_eq!(binds.len(), 2);
    }

    #[test]
    fn count_sql_ignores_pagination() {
        let query = resolve(ListParams::new(5, 10), vec![]);
        let mut binds = Vec::new();
        let sql = render_count("authors", &query, &mut binds);
        assert!(!sql.contains("LIMIT"));
        assert!(!sql.contains("OFFSET"));
    }

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(escape_like("100%_done"), "100\\%\\_done");
    }
}
