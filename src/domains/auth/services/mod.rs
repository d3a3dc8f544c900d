// Auth domain services
pub mod auth_service;
pub mod session_resolver;
pub mod session_sweeper;
pub mod state;
pub mod token_service;

pub use auth_service::*;
pub use session_resolver::*;
pub use session_sweeper::*;
pub use state::*;
pub use token_service::*;
