//! Handles to configuration content.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Locator of a configuration resource.
pub trait ConfigFile: std::fmt::Debug {
    /// Displayable location of the configuration.
    fn path(&self) -> &str;

    /// Read the full configuration text.
    fn read_content(&self) -> Result<String>;
}

/// Configuration stored on the local filesystem.
#[derive(Debug, Clone)]
pub struct PathConfigFile {
    path: PathBuf,
    display: String,
}

impl PathConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let display = path.display().to_string();
        Self { path, display }
    }

    pub fn as_path(&self) -> &Path {
        &self.path
    }
}

impl ConfigFile for PathConfigFile {
    fn path(&self) -> &str {
        &self.display
    }

    fn read_content(&self) -> Result<String> {
        std::fs::read_to_string(&self.path).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("Cannot read config file '{}': {}", self.display, e),
            )
            .into()
        })
    }
}

/// Configuration whose content was already fetched, e.g. from a past revision.
#[derive(Debug, Clone)]
pub struct InMemoryConfigFile {
    path: String,
    content: String,
}

impl InMemoryConfigFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

impl ConfigFile for InMemoryConfigFile {
    fn path(&self) -> &str {
        &self.path
    }

    fn read_content(&self) -> Result<String> {
        Ok(self.content.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FerryError;

    #[test]
    fn test_path_config_file_reads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ferry.toml");
        std::fs::write(&path, "[[workflow]]\n").unwrap();
        let file = PathConfigFile::new(&path);
        assert_eq!(file.path(), path.display().to_string());
        assert_eq!(file.read_content().unwrap(), "[[workflow]]\n");
    }

    #[test]
    fn test_path_config_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let file = PathConfigFile::new(dir.path().join("absent.toml"));
        match file.read_content() {
            Err(FerryError::IoError(e)) => {
                assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
                assert!(e.to_string().contains("absent.toml"));
            }
            other => panic!("expected IoError, got {:?}", other),
        }
    }

    #[test]
    fn test_in_memory_config_file() {
        let file = InMemoryConfigFile::new("abc123:ferry.toml", "content");
        assert_eq!(file.path(), "abc123:ferry.toml");
        assert_eq!(file.read_content().unwrap(), "content");
    }
}
