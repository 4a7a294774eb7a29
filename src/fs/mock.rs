// src/fs/mock.rs

use super::FileSystem;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockEntry {
    File { executable: bool },
    Dir,
}

/// In-memory filesystem for tests.
///
/// Clones share the same underlying table, so a test can keep a handle and
/// add files while a poller is waiting on another clone.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        // Ensure root exists
        entries.insert(PathBuf::from("."), MockEntry::Dir);

        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::File { executable: false });
    }

    pub fn add_executable(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::File { executable: true });
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::Dir);
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(path.as_ref());
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(path.to_path_buf(), entry);

        // Parent directories exist implicitly.
        let mut current = path.parent();
        while let Some(parent) = current {
            if parent.as_os_str().is_empty() {
                break;
            }
            entries
                .entry(parent.to_path_buf())
                .or_insert(MockEntry::Dir);
            current = parent.parent();
        }
    }

    fn get(&self, path: &Path) -> Option<MockEntry> {
        let entries = self.entries.lock().unwrap();
        entries.get(path).copied()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.get(path).is_some()
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.get(path), Some(MockEntry::File { .. }))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.get(path), Some(MockEntry::Dir))
    }

    fn is_executable(&self, path: &Path) -> bool {
        matches!(self.get(path), Some(MockEntry::File { executable: true }))
    }
}
