// Notifications domain services
pub mod hub;

pub use hub::NotificationHub;
