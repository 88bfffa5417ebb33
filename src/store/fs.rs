use super::DocumentStore;
use crate::error::{Result, StoreError};
use crate::model::Document;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// File-based document storage.
///
/// The whole document lives in one pretty-printed JSON file so deployments
/// stay human-readable and diffable. Loading a file that fails to parse
/// resets it to the empty structure and proceeds: availability is traded
/// for durability here, and the data loss is the documented behavior, not
/// an error surfaced to callers.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_file(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(StoreError::Io)?;
            }
        }
        if !self.path.exists() {
            self.write_atomic(&Document::default())?;
        }
        Ok(())
    }

    fn write_atomic(&self, doc: &Document) -> Result<()> {
        let content = serde_json::to_string_pretty(doc).map_err(StoreError::Serialization)?;
        // Temp file must live in the same directory for the rename to stay
        // atomic across filesystems.
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        let tmp_path = parent.join(format!(".document-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_path, content).map_err(StoreError::Io)?;
        fs::rename(&tmp_path, &self.path).map_err(StoreError::Io)?;
        Ok(())
    }
}

impl DocumentStore for FileStore {
    fn load(&self) -> Result<Document> {
        self.ensure_file()?;
        let content = fs::read_to_string(&self.path).map_err(StoreError::Io)?;
        match serde_json::from_str(&content) {
            Ok(doc) => Ok(doc),
            Err(_) => {
                // Corrupted document: self-heal by resetting to the empty
                // structure. I/O failures during the reset still propagate.
                let empty = Document::default();
                self.write_atomic(&empty)?;
                Ok(empty)
            }
        }
    }

    fn save(&mut self, doc: &Document) -> Result<()> {
        self.ensure_file()?;
        self.write_atomic(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> FileStore {
        FileStore::new(dir.path().join("data.json"))
    }

    #[test]
    fn load_creates_missing_file_with_empty_structure() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let doc = store.load().unwrap();
        assert!(doc.users.is_empty());
        assert!(store.path().exists());

        let on_disk = fs::read_to_string(store.path()).unwrap();
        let parsed: Document = serde_json::from_str(&on_disk).unwrap();
        assert!(parsed.boards.is_empty());
    }

    #[test]
    fn load_creates_missing_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nested/deeper/data.json"));
        store.load().unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn corrupted_file_resets_to_empty_structure() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{not json at all").unwrap();

        let doc = store.load().unwrap();
        assert!(doc.users.is_empty());

        // The file on disk was healed too.
        let on_disk = fs::read_to_string(store.path()).unwrap();
        let parsed: Document = serde_json::from_str(&on_disk).unwrap();
        assert!(parsed.posts.is_empty());
    }

    #[test]
    fn save_leaves_no_tmp_residue() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        let mut doc = store.load().unwrap();
        doc.boards.push(crate::model::Board {
            id: 1,
            name: "General".into(),
            description: String::new(),
            created_at: chrono::Utc::now(),
            updated_at: None,
        });
        store.save(&doc).unwrap();

        for entry in fs::read_dir(dir.path()).unwrap() {
            let path = entry.unwrap().path();
            let name = path.file_name().unwrap().to_str().unwrap();
            assert!(!name.ends_with(".tmp"), "leftover tmp file: {}", name);
        }

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.boards.len(), 1);
        assert_eq!(reloaded.boards[0].name, "General");
    }
}
