mod account_service;
mod auth_service;

pub use account_service::*;
pub use auth_service::*;
