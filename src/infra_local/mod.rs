mod file_session_persistence;
mod memory_session_persistence;
mod tracing_navigator;
mod tracing_notifier;

pub use file_session_persistence::*;
pub use memory_session_persistence::*;
pub use tracing_navigator::*;
pub use tracing_notifier::*;
