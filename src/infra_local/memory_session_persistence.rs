use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::{Mutex, PoisonError};

/// Keeps the persisted session in memory only.
#[derive(Default)]
pub struct MemorySessionPersistence {
    slot: Mutex<Option<Session>>,
}

impl MemorySessionPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }

    pub fn stored(&self) -> Option<Session> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SessionPersistence for MemorySessionPersistence {
    fn load(&self) -> Result<Option<Session>, PersistenceError> {
        Ok(self.stored())
    }

    fn save(&self, session: &Session) -> Result<(), PersistenceError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }
}
