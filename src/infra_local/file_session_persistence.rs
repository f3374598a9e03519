use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

const ENVELOPE_VERSION: u32 = 0;
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

#[derive(Serialize, Deserialize)]
struct Envelope {
    state: Session,
    #[serde(default)]
    version: u32,
}

/// One JSON file per storage key: `<dir>/<key>.json`.
pub struct FileSessionPersistence {
    path: PathBuf,
}

impl FileSessionPersistence {
    pub fn new(dir: impl AsRef<Path>, storage_key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", storage_key)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionPersistence for FileSessionPersistence {
    fn load(&self) -> Result<Option<Session>, PersistenceError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        // The version is written for compatibility only; there are no migrations.
        let envelope: Envelope =
            serde_json::from_str(&raw).map_err(|e| PersistenceError::Corrupt(e.to_string()))?;
        Ok(Some(envelope.state))
    }

    fn save(&self, session: &Session) -> Result<(), PersistenceError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let envelope = Envelope {
            state: session.clone(),
            version: ENVELOPE_VERSION,
        };
        let raw = serde_json::to_vec(&envelope)
            .map_err(|e| PersistenceError::Corrupt(e.to_string()))?;

        // Readers only ever see a complete file.
        let tmp = self
            .path
            .with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        if let Err(e) = write_private(&tmp, &raw) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        trace!(path = %self.path.display(), "session persisted");
        Ok(())
    }
}

/// Creates `path` readable by the owner only; it holds the refresh token.
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE);
    }
    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}
