pub mod auth_service;
pub mod author_service;
pub mod book_service;
pub mod favorites_service;
pub mod ownership;

pub use auth_service::AuthService;
pub use author_service::AuthorService;
pub use book_service::BookService;
pub use favorites_service::FavoritesService;
