mod api_client;
pub mod endpoints;
mod route_gate;
mod session_guard;
mod token_inspector;
mod token_refresher;
mod token_store;

pub use api_client::*;
pub use route_gate::*;
pub use session_guard::*;
pub use token_inspector::*;
pub use token_refresher::*;
pub use token_store::*;
