use super::{DirEntry, FileSystem, FileType};
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct MockEntry {
    pub content: Option<String>,
    pub file_type: FileType,
}

/// In-memory file tree; relative paths are rooted at `/mock`
pub struct MockFileSystem {
    files: RwLock<BTreeMap<PathBuf, MockEntry>>,
    root: PathBuf,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(BTreeMap::new()),
            root: PathBuf::from("/mock"),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        let path = self.normalize_path(path.as_ref());
        let mut files = self.files.write().unwrap();

        if let Some(parent) = path.parent() {
            Self::ensure_parents(&mut files, parent);
        }

        files.insert(
            path,
            MockEntry {
                content: Some(content.to_string()),
                file_type: FileType::File,
            },
        );
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        let mut files = self.files.write().unwrap();
        Self::ensure_parents(&mut files, &path);
    }

    /// All regular files currently held, for assertions
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.files
            .read()
            .unwrap()
            .iter()
            .filter(|(_, e)| e.file_type == FileType::File)
            .map(|(p, _)| p.clone())
            .collect()
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn ensure_parents(files: &mut BTreeMap<PathBuf, MockEntry>, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            files.entry(current.clone()).or_insert(MockEntry {
                content: None,
                file_type: FileType::Directory,
            });
        }
    }

    fn entry(&self, path: &Path) -> Option<MockEntry> {
        let path = self.normalize_path(path);
        self.files.read().unwrap().get(&path).cloned()
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.entry(path).is_some()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.entry(path)
            .map(|e| e.file_type == FileType::Directory)
            .unwrap_or(false)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.entry(path)
            .map(|e| e.file_type == FileType::File)
            .unwrap_or(false)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.entry(path)
            .and_then(|e| e.content)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let path = self.normalize_path(path);
        if !self.is_dir(&path) {
            return Err(anyhow!("Not a directory: {:?}", path));
        }

        let files = self.files.read().unwrap();
        Ok(files
            .iter()
            .filter(|(p, _)| p.parent() == Some(path.as_path()))
            .map(|(p, e)| DirEntry {
                path: p.clone(),
                name: p
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
                file_type: e.file_type,
            })
            .collect())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        if self.is_file(path) {
            return Err(anyhow!("File exists at {:?}", path));
        }
        self.add_dir(path);
        Ok(())
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        let normalized = self.normalize_path(path);
        let parent_exists = normalized
            .parent()
            .map(|p| self.is_dir(p))
            .unwrap_or(true);
        if !parent_exists {
            return Err(anyhow!("Parent directory missing for {:?}", path));
        }
        if self.is_dir(&normalized) {
            return Err(anyhow!("Is a directory: {:?}", path));
        }

        self.files.write().unwrap().insert(
            normalized,
            MockEntry {
                content: Some(contents.to_string()),
                file_type: FileType::File,
            },
        );
        Ok(())
    }

    fn append(&self, path: &Path, contents: &str) -> Result<()> {
        let existing = if self.is_file(path) {
            self.read_to_string(path)?
        } else {
            String::new()
        };
        self.write(path, &format!("{}{}", existing, contents))
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        let content = self.read_to_string(from)?;
        self.write(to, &content)
    }
}
