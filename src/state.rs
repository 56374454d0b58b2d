//! Shared application state handed to every handler. Everything is wired
//! once at startup from an [`AppConfig`] plus a set of store backends.

use std::sync::Arc;

use crate::auth::{AuthGate, PasswordHasher, TokenCodec};
use crate::config::AppConfig;
use crate::database::store::{AuthorStore, BookStore, UserStore};
use crate::services::{AuthService, AuthorService, BookService, FavoritesService};

/// The three repository handles behind the services. Both backends (Postgres
/// and in-memory) are handed over through these trait objects.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub authors: Arc<dyn AuthorStore>,
    pub books: Arc<dyn BookStore>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub gate: Arc<AuthGate>,
    pub auth: Arc<AuthService>,
    pub authors: Arc<AuthorService>,
    pub books: Arc<BookService>,
    pub favorites: Arc<FavoritesService>,
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    pub fn build(config: AppConfig, stores: Stores) -> Self {
        let tokens = TokenCodec::new(&config.security);
        let hasher = PasswordHasher::new(&config.security);
        let pagination = config.pagination.clone();

        Self {
            gate: Arc::new(AuthGate::new(tokens.clone(), stores.users.clone())),
            auth: Arc::new(AuthService::new(stores.users.clone(), hasher, tokens)),
            authors: Arc::new(AuthorService::new(stores.authors.clone(), pagination.clone())),
            books: Arc::new(BookService::new(
                stores.books.clone(),
                stores.authors.clone(),
                pagination.clone(),
            )),
            favorites: Arc::new(FavoritesService::new(
                stores.users.clone(),
                stores.authors,
                stores.books,
                pagination,
            )),
            users: stores.users,
            config: Arc::new(config),
        }
    }
}
