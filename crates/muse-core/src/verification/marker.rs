//! Persisted "email awaiting verification" marker.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;

/// Storage key under which the pending email is kept.
pub const PENDING_VERIFICATION_KEY: &str = "pending_email_verification";
const MARKER_FILE_NAME: &str = "pending-verification.json";

#[derive(Debug, Error)]
pub enum MarkerError {
    #[error("Failed to access pending verification marker at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse pending verification marker: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Could not resolve a data directory for the verification marker")]
    NoDataDir,
    #[error("Pending verification marker is unavailable")]
    Poisoned,
}

pub type MarkerResult<T> = Result<T, MarkerError>;

/// Where the pending-verification email lives between runs.
///
/// `clear` is idempotent: clearing an absent marker succeeds.
pub trait PendingVerificationStore {
    fn pending_email(&self) -> MarkerResult<Option<String>>;
    fn set_pending_email(&self, email: &str) -> MarkerResult<()>;
    fn clear(&self) -> MarkerResult<()>;
}

/// Marker kept in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryMarkerStore {
    email: Arc<Mutex<Option<String>>>,
}

impl PendingVerificationStore for MemoryMarkerStore {
    fn pending_email(&self) -> MarkerResult<Option<String>> {
        Ok(self.email.lock().map_err(|_| MarkerError::Poisoned)?.clone())
    }

    fn set_pending_email(&self, email: &str) -> MarkerResult<()> {
        *self.email.lock().map_err(|_| MarkerError::Poisoned)? = Some(email.to_string());
        Ok(())
    }

    fn clear(&self) -> MarkerResult<()> {
        self.email.lock().map_err(|_| MarkerError::Poisoned)?.take();
        Ok(())
    }
}

/// Marker stored as a small JSON object in the platform data directory.
#[derive(Debug, Clone)]
pub struct FileMarkerStore {
    path: PathBuf,
}

impl FileMarkerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `{data_dir}/muse/pending-verification.json`
    pub fn in_data_dir() -> MarkerResult<Self> {
        let dir = dirs::data_dir().ok_or(MarkerError::NoDataDir)?;
        Ok(Self::new(dir.join("muse").join(MARKER_FILE_NAME)))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> MarkerError {
        MarkerError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_entries(&self) -> MarkerResult<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(error) => Err(self.io_error(error)),
        }
    }
}

impl PendingVerificationStore for FileMarkerStore {
    fn pending_email(&self) -> MarkerResult<Option<String>> {
        Ok(self.read_entries()?.remove(PENDING_VERIFICATION_KEY))
    }

    fn set_pending_email(&self, email: &str) -> MarkerResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| self.io_error(error))?;
        }
        let mut entries = self.read_entries()?;
        entries.insert(PENDING_VERIFICATION_KEY.to_string(), email.to_string());
        let serialized = serde_json::to_string_pretty(&entries)?;
        std::fs::write(&self.path, serialized).map_err(|error| self.io_error(error))
    }

    fn clear(&self) -> MarkerResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!("Cleared pending verification marker");
                Ok(())
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(self.io_error(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_marker() -> FileMarkerStore {
        FileMarkerStore::new(std::env::temp_dir().join(format!(
            "muse-marker-test-{}/{MARKER_FILE_NAME}",
            uuid::Uuid::now_v7()
        )))
    }

    #[test]
    fn memory_marker_set_and_clear() {
        let marker = MemoryMarkerStore::default();
        assert_eq!(marker.pending_email().unwrap(), None);
        marker.set_pending_email("reader@example.com").unwrap();
        assert_eq!(
            marker.pending_email().unwrap().as_deref(),
            Some("reader@example.com")
        );
        marker.clear().unwrap();
        marker.clear().unwrap();
        assert_eq!(marker.pending_email().unwrap(), None);
    }

    #[test]
    fn file_marker_roundtrip_and_idempotent_clear() {
        let marker = temp_marker();
        assert_eq!(marker.pending_email().unwrap(), None);

        marker.set_pending_email("reader@example.com").unwrap();
        let raw = std::fs::read_to_string(marker.path()).unwrap();
        assert!(raw.contains(PENDING_VERIFICATION_KEY));
        assert_eq!(
            marker.pending_email().unwrap().as_deref(),
            Some("reader@example.com")
        );

        marker.clear().unwrap();
        marker.clear().unwrap();
        assert_eq!(marker.pending_email().unwrap(), None);

        if let Some(parent) = marker.path().parent() {
            let _ = std::fs::remove_dir_all(parent);
        }
    }
}
