//! FileSystem abstraction for testable file operations

mod mock;
mod real;
mod r#trait;

pub use mock::MockFileSystem;
pub use r#trait::{DirEntry, FileSystem, FileType};
pub use real::RealFileSystem;

use anyhow::{anyhow, Result};
use std::path::Path;

/// Copies a file or a whole directory tree
///
/// A file copied onto an existing directory lands inside it under its own
/// name; a directory source is mirrored recursively into `destination`.
/// Sources that are neither are ignored.
pub fn copy_file_or_directory(fs: &dyn FileSystem, source: &Path, destination: &Path) -> Result<()> {
    if fs.is_file(source) {
        if fs.is_dir(destination) {
            let file_name = source
                .file_name()
                .ok_or_else(|| anyhow!("Source has no file name: {:?}", source))?;
            return fs.copy_file(source, &destination.join(file_name));
        }
        if let Some(parent) = destination.parent() {
            fs.create_dir_all(parent)?;
        }
        return fs.copy_file(source, destination);
    }

    if fs.is_dir(source) {
        fs.create_dir_all(destination)?;
        for entry in fs.read_dir(source)? {
            copy_file_or_directory(fs, entry.path(), &destination.join(entry.file_name()))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_copy_file_into_directory() {
        let fs = MockFileSystem::new();
        fs.add_file("/src/conf.toml", "x = 1");
        fs.add_dir("/dst");

        copy_file_or_directory(&fs, Path::new("/src/conf.toml"), Path::new("/dst")).unwrap();
        assert_eq!(
            fs.read_to_string(Path::new("/dst/conf.toml")).unwrap(),
            "x = 1"
        );
    }

    #[test]
    fn test_copy_file_to_new_path_creates_parents() {
        let fs = MockFileSystem::new();
        fs.add_file("/src/conf.toml", "x = 1");

        copy_file_or_directory(
            &fs,
            Path::new("/src/conf.toml"),
            Path::new("/dst/nested/renamed.toml"),
        )
        .unwrap();
        assert!(fs.is_file(Path::new("/dst/nested/renamed.toml")));
    }

    #[test]
    fn test_copy_directory_recursively() {
        let fs = MockFileSystem::new();
        fs.add_file("/res/a.txt", "a");
        fs.add_file("/res/deep/b.txt", "b");

        copy_file_or_directory(&fs, Path::new("/res"), Path::new("/out/res")).unwrap();

        let mut files = fs.file_paths();
        files.retain(|p| p.starts_with("/out"));
        assert_eq!(
            files,
            vec![
                PathBuf::from("/out/res/a.txt"),
                PathBuf::from("/out/res/deep/b.txt")
            ]
        );
    }

    #[test]
    fn test_copy_missing_source_is_noop() {
        let fs = MockFileSystem::new();
        copy_file_or_directory(&fs, Path::new("/missing"), Path::new("/out")).unwrap();
        assert!(fs.file_paths().is_empty());
    }
}
