mod account_service_impl;
mod auth_service_fake;
mod auth_service_impl;

pub use account_service_impl::*;
pub use auth_service_fake::*;
pub use auth_service_impl::*;
