use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::{Category, StoreError};
use crate::ports::StateBackend;

/// File-backed state: one pretty-printed JSON document per category.
///
/// Writes go through a temp file and a rename, so a crash mid-write leaves
/// either the previous or the new document on disk, never a torn one.
pub struct JsonFileBackend {
    data_dir: PathBuf,
}

impl JsonFileBackend {
    /// Create a backend rooted at `data_dir`. The directory is created lazily
    /// on first write.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_for(&self, category: Category) -> PathBuf {
        self.data_dir.join(category.file_name())
    }
}

impl StateBackend for JsonFileBackend {
    fn read(&self, category: Category) -> Result<Option<String>, StoreError> {
        let path = self.path_for(category);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("[bv-01] No file for {} at {}", category, path.display());
                return Ok(None);
            }
            Err(e) => return Err(StoreError::io(category, e)),
        };

        // Invalid UTF-8 is corrupt content, not an I/O failure: hand it on so
        // the store's parse step resets the category.
        match String::from_utf8(bytes) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) => {
                warn!(category = %category, error = %e, "[bv-01] File is not valid UTF-8");
                Ok(Some(String::from_utf8_lossy(e.as_bytes()).into_owned()))
            }
        }
    }

    fn write(&self, category: Category, contents: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.data_dir).map_err(|e| StoreError::io(category, e))?;

        let path = self.path_for(category);
        let temp_path = path.with_extension("json.tmp");

        let written = write_and_rename(&temp_path, &path, contents);
        if written.is_err() {
            let _ = std::fs::remove_file(&temp_path);
        }
        written.map_err(|e| StoreError::io(category, e))
    }
}

fn write_and_rename(temp_path: &Path, path: &Path, contents: &str) -> std::io::Result<()> {
    let mut file = std::fs::File::create(temp_path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    drop(file);
    std::fs::rename(temp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path());
        assert!(backend.read(Category::Stats).unwrap().is_none());
    }

    #[test]
    fn test_write_creates_directory_and_file() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("nested/data"));

        backend.write(Category::Badges, "{}").unwrap();

        let path = backend.path_for(Category::Badges);
        assert!(path.ends_with("badges.json"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "{}");
        assert_eq!(backend.read(Category::Badges).unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_write_replaces_content_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path());

        backend.write(Category::Cooldowns, "{\"a\": 1}").unwrap();
        backend.write(Category::Cooldowns, "{\"a\": 2}").unwrap();

        assert_eq!(
            backend.read(Category::Cooldowns).unwrap().as_deref(),
            Some("{\"a\": 2}")
        );
        assert!(!dir.path().join("cooldowns.json.tmp").exists());
    }

    #[test]
    fn test_invalid_utf8_reads_as_content() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path());
        std::fs::write(backend.path_for(Category::Stats), [0xff, 0xfe, b'{', b'}']).unwrap();

        let raw = backend.read(Category::Stats).unwrap().unwrap();

        assert!(raw.ends_with("{}"));
        assert!(raw.starts_with('\u{FFFD}'));
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path());
        // A non-empty directory where the file should go makes the rename fail.
        let target = backend.path_for(Category::Badges);
        std::fs::create_dir_all(target.join("occupied")).unwrap();

        assert!(backend.write(Category::Badges, "{}").is_err());

        assert!(!dir.path().join("badges.json.tmp").exists());
        assert!(target.is_dir());
    }
}
