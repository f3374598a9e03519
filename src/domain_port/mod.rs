mod http_transport;
mod navigator;
mod notifier;
mod session_persistence;

pub use http_transport::*;
pub use navigator::*;
pub use notifier::*;
pub use session_persistence::*;
