//! Folder origin: the current contents of a local directory.

use std::path::{Path, PathBuf};

use crate::error::{FerryError, Result};
use crate::origin::Origin;
use crate::revision::{Revision, StaticRevision};

pub const FOLDER_LABEL_NAME: &str = "FolderOrigin-RevId";

/// Reads changes from a directory. A folder has no history, so its only
/// revision is the directory itself and no timestamp is tracked.
#[derive(Debug, Clone)]
pub struct FolderOrigin {
    path: PathBuf,
    /// Directory relative references are joined onto.
    base_dir: PathBuf,
}

impl FolderOrigin {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            base_dir: PathBuf::from("."),
        }
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }
}

impl Origin for FolderOrigin {
    /// `reference`, when given, names a different folder to read. Relative
    /// references are taken from the base directory.
    fn resolve(&self, reference: Option<&str>) -> Result<Box<dyn Revision>> {
        let requested = match reference {
            Some(r) if Path::new(r).is_relative() => self.base_dir.join(r),
            Some(r) => PathBuf::from(r),
            None => self.path.clone(),
        };
        let canonical = std::fs::canonicalize(&requested).map_err(|e| {
            FerryError::RepoAccessError(format!(
                "Cannot resolve folder '{}': {}",
                requested.display(),
                e
            ))
        })?;
        if !canonical.is_dir() {
            return Err(FerryError::RepoAccessError(format!(
                "'{}' is not a directory",
                canonical.display()
            )));
        }

        let id = canonical.display().to_string();
        let mut revision = StaticRevision::new(&id, FOLDER_LABEL_NAME);
        let given = reference
            .map(str::to_string)
            .unwrap_or_else(|| requested.display().to_string());
        if given != id {
            revision = revision.with_context_reference(given);
        }
        Ok(Box::new(revision))
    }

    fn label_name(&self) -> &str {
        FOLDER_LABEL_NAME
    }
}
