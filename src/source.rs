//! Where raw profile attributes come from.

use crate::error::FetchError;
use crate::features::ProfileAttributes;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Supplies the raw attributes for a username. One attempt per call, no retries.
pub trait AttributeSource: Send + Sync {
    fn fetch(&self, username: &str) -> Result<ProfileAttributes, FetchError>;
}

/// Profile snapshots stored as `<dir>/<username>.json`.
#[derive(Debug, Clone)]
pub struct ProfileDirectory {
    dir: PathBuf,
}

impl ProfileDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ProfileDirectory { dir: dir.into() }
    }

    fn path_for(&self, username: &str) -> Option<PathBuf> {
        // Usernames never contain path separators; reject anything that would escape the dir.
        if username.is_empty()
            || username.contains(['/', '\\'])
            || username.starts_with('.')
        {
            return None;
        }
        Some(self.dir.join(format!("{username}.json")))
    }
}

impl AttributeSource for ProfileDirectory {
    fn fetch(&self, username: &str) -> Result<ProfileAttributes, FetchError> {
        let path = self
            .path_for(username)
            .ok_or_else(|| FetchError::NotFound(username.to_string()))?;
        debug!(username, path = %path.display(), "fetching profile snapshot");

        let raw = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => FetchError::NotFound(username.to_string()),
            ErrorKind::PermissionDenied => FetchError::AccessRequired(username.to_string()),
            _ => FetchError::Unknown(e.to_string()),
        })?;

        serde_json::from_str(&raw).map_err(|e| {
            warn!(username, error = %e, "profile snapshot is malformed");
            FetchError::Unknown(e.to_string())
        })
    }
}

/// Fixed set of profiles held in memory.
impl AttributeSource for std::collections::HashMap<String, Result<ProfileAttributes, FetchError>> {
    fn fetch(&self, username: &str) -> Result<ProfileAttributes, FetchError> {
        self.get(username)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::NotFound(username.to_string())))
    }
}
