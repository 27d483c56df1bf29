//! Surface configuration and the file-backed widget store

use crate::core::{WidgetId, WidgetRecord, WidgetStore};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current on-disk format version.
const STORE_VERSION: u32 = 1;

/// Paged surface dimensions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Horizontal page count.
    pub pages_x: u32,
    /// Vertical page count.
    pub pages_y: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            pages_x: 3,
            pages_y: 1,
        }
    }
}

/// On-disk layout of the widget store.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    widgets: Vec<WidgetRecord>,
}

impl Default for StoreFile {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
            widgets: Vec::new(),
        }
    }
}

/// Widget record store persisted as pretty-printed JSON.
///
/// Every mutation writes the file back; records are few and small, so the
/// synchronous write stays within the fast-local persistence contract.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    file: StoreFile,
}

impl FileStore {
    /// Open the store at the default config location.
    pub fn open() -> Result<Self> {
        Self::open_path(Self::store_path()?)
    }

    /// Open the store at a specific file path.
    pub fn open_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            StoreFile::default()
        };
        Ok(Self { path, file })
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.file)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    /// Default store file path.
    fn store_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("com", "github.homeboard", "homeboard")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("widgets.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WidgetStore for FileStore {
    fn list(&self) -> Result<Vec<WidgetRecord>> {
        Ok(self.file.widgets.clone())
    }

    fn insert(&mut self, record: &WidgetRecord) -> Result<WidgetId> {
        match self
            .file
            .widgets
            .iter_mut()
            .find(|r| r.widget_id == record.widget_id)
        {
            Some(existing) => *existing = *record,
            None => self.file.widgets.push(*record),
        }
        self.save()?;
        Ok(record.widget_id)
    }

    fn delete(&mut self, id: WidgetId) -> Result<()> {
        let before = self.file.widgets.len();
        self.file.widgets.retain(|r| r.widget_id != id);
        if self.file.widgets.len() != before {
            self.save()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("widgets.json");

        {
            let mut store = FileStore::open_path(&path).unwrap();
            store.insert(&WidgetRecord::new(1, 160, 80)).unwrap();
            store.insert(&WidgetRecord::new(2, 320, 160)).unwrap();
            store.delete(1).unwrap();
        }

        let store = FileStore::open_path(&path).unwrap();
        let records = store.list().unwrap();
        assert_eq!(records, vec![WidgetRecord::new(2, 320, 160)]);
    }

    #[test]
    fn missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open_path(dir.path().join("none.json")).unwrap();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn resize_update_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("widgets.json");

        let mut store = FileStore::open_path(&path).unwrap();
        store.insert(&WidgetRecord::new(5, 100, 100)).unwrap();
        store.insert(&WidgetRecord::new(5, 250, 120)).unwrap();

        let store = FileStore::open_path(&path).unwrap();
        assert_eq!(store.list().unwrap(), vec![WidgetRecord::new(5, 250, 120)]);
    }
}
