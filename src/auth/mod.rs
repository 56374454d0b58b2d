pub mod gate;
pub mod password;
pub mod token;

pub use gate::{AuthGate, AuthUser};
pub use password::PasswordHasher;
pub use token::{Claims, TokenCodec};
