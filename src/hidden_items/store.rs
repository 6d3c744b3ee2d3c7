//! Persistence for the hidden-item collection: one JSON file, written
//! atomically after every mutation.

use std::path::{Path, PathBuf};
use std::{fs, io};

use super::types::HiddenItem;

const FILE_NAME: &str = "hidden_items.json";

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl From<io::Error> for StoreError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "store io error: {error}"),
            Self::Json(error) => write!(f, "store encoding error: {error}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Stateless codec + persister for [`HiddenItem`] records. The model owns
/// the collection; the store only moves it to and from disk.
pub struct HiddenItemsStore {
    base_dir: PathBuf,
}

impl HiddenItemsStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Store rooted at the user's data directory, falling back to the
    /// temp dir when the platform exposes none.
    pub fn at_default_location() -> Self {
        let base = dirs::data_dir()
            .map(|dir| dir.join("Barkeep"))
            .unwrap_or_else(std::env::temp_dir);
        Self::new(base)
    }

    pub fn file_path(&self) -> PathBuf {
        self.base_dir.join(FILE_NAME)
    }

    /// Read the persisted collection. Missing or corrupt files degrade to an
    /// empty collection; persistence is never a fatal concern.
    pub fn load(&self) -> Vec<HiddenItem> {
        let path = self.file_path();
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(error) => {
                if error.kind() != io::ErrorKind::NotFound {
                    tracing::debug!(path = %path.display(), %error, "hidden items unreadable");
                }
                return Vec::new();
            }
        };
        match serde_json::from_slice(&data) {
            Ok(items) => items,
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "hidden items corrupt, starting empty");
                Vec::new()
            }
        }
    }

    /// Write the collection with temp-then-rename semantics so a crash
    /// mid-write never truncates the previous state.
    pub fn save(&self, items: &[HiddenItem]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.base_dir)?;
        let data = serde_json::to_vec_pretty(items)?;
        let path = self.file_path();
        let tmp = tmp_path(&path);
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
