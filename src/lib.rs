pub mod domains;
pub mod routes;
pub mod shared;
