use super::{DirEntry, FileSystem, FileType};
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).context(format!("Failed to read file {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let entries = fs::read_dir(path).context(format!("Failed to read directory {:?}", path))?;

        let mut result = Vec::new();
        for entry in entries {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            let file_type = if path.is_file() {
                FileType::File
            } else if path.is_dir() {
                FileType::Directory
            } else {
                FileType::Symlink
            };

            result.push(DirEntry {
                path,
                name,
                file_type,
            });
        }

        Ok(result)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).context(format!("Failed to create directory {:?}", path))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        fs::write(path, contents).context(format!("Failed to write file {:?}", path))
    }

    fn append(&self, path: &Path, contents: &str) -> Result<()> {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .context(format!("Failed to open file {:?} for append", path))?;
        file.write_all(contents.as_bytes())
            .context(format!("Failed to append to file {:?}", path))
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        fs::copy(from, to)
            .map(|_| ())
            .context(format!("Failed to copy {:?} to {:?}", from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_append() {
        let temp = TempDir::new().unwrap();
        let fs = RealFileSystem::new();
        let file = temp.path().join("app_svc.yaml");

        fs.write(&file, "first\n").unwrap();
        fs.append(&file, "second\n").unwrap();

        assert_eq!(fs.read_to_string(&file).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_append_creates_missing_file() {
        let temp = TempDir::new().unwrap();
        let fs = RealFileSystem::new();
        let file = temp.path().join("new.yaml");

        fs.append(&file, "content").unwrap();
        assert!(fs.is_file(&file));
    }

    #[test]
    fn test_create_dir_all_and_read_dir() {
        let temp = TempDir::new().unwrap();
        let fs = RealFileSystem::new();
        let nested = temp.path().join("kubernetes/hello");

        fs.create_dir_all(&nested).unwrap();
        fs.write(&nested.join("a.yaml"), "a").unwrap();

        assert!(fs.is_dir(&nested));
        let entries = fs.read_dir(&nested).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name(), "a.yaml");
        assert_eq!(entries[0].file_type(), FileType::File);
    }

    #[test]
    fn test_copy_file() {
        let temp = TempDir::new().unwrap();
        let fs = RealFileSystem::new();
        let src = temp.path().join("conf.toml");
        let dst = temp.path().join("copy.toml");

        fs.write(&src, "key = 1").unwrap();
        fs.copy_file(&src, &dst).unwrap();
        assert_eq!(fs.read_to_string(&dst).unwrap(), "key = 1");
    }

    #[test]
    fn test_read_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let fs = RealFileSystem::new();
        assert!(fs.read_to_string(&temp.path().join("missing")).is_err());
    }
}
