use crate::domain_port::*;
use crate::logger::*;
use std::sync::{Mutex, PoisonError};

/// Headless navigator: tracks the current route and logs every move.
pub struct TracingNavigator {
    path: Mutex<String>,
}

impl TracingNavigator {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            path: Mutex::new(start.into()),
        }
    }

    fn set(&self, path: &str) {
        *self.path.lock().unwrap_or_else(PoisonError::into_inner) = path.to_string();
    }
}

impl Navigator for TracingNavigator {
    fn current_path(&self) -> String {
        self.path
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace(&self, path: &str) {
        info!(to = %path, "navigate");
        self.set(path);
    }

    fn hard_redirect(&self, path: &str) {
        warn!(to = %path, "hard redirect");
        self.set(path);
    }
}
