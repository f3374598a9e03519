use crate::domain_model::*;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt session entry: {0}")]
    Corrupt(String),
}

/// Durable key-value slot holding the serialized session.
pub trait SessionPersistence: Send + Sync {
    /// `Ok(None)` when nothing was persisted yet.
    fn load(&self) -> Result<Option<Session>, PersistenceError>;
    fn save(&self, session: &Session) -> Result<(), PersistenceError>;
}
