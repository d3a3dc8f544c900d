// Auth domain models
pub mod auth;
pub mod claims;
pub mod session;
pub mod user;

pub use auth::*;
pub use claims::*;
pub use session::*;
pub use user::*;
