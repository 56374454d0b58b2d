pub mod author;
pub mod book;
pub mod user;

pub use author::Author;
pub use book::Book;
pub use user::User;

use uuid::Uuid;

/// A resource subject to ownership rules: its creator is recorded once at
/// creation and never changes.
pub trait Owned {
    fn created_by(&self) -> Uuid;
    fn resource_name() -> &'static str;
}
