//! Working-directory resolution: where migration-time file operations are staged.

use std::io;
use std::path::{Component, Path, PathBuf};

use tempfile::TempDir;

use crate::console::Console;
use crate::error::Result;

/// Hands out fresh, empty, uniquely named directories.
pub trait TempDirFactory {
    fn new_temp_dir(&self, prefix: &str) -> io::Result<TempDir>;
}

/// Creates temporary directories under `root` (the system temp dir by default).
#[derive(Debug, Clone, Default)]
pub struct SystemTempDirFactory {
    root: Option<PathBuf>,
}

impl SystemTempDirFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_dir(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }
}

impl TempDirFactory for SystemTempDirFactory {
    fn new_temp_dir(&self, prefix: &str) -> io::Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix);
        match &self.root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
    }
}

/// The staging directory of one run.
///
/// A directory created by a [`TempDirFactory`] is removed when this value is
/// dropped unless [`keep`](Workdir::keep) is called. A user-supplied
/// directory is never removed.
#[derive(Debug)]
pub struct Workdir {
    path: PathBuf,
    temp: Option<TempDir>,
}

impl Workdir {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the directory was created for this run.
    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }

    /// Give up ownership of a temporary directory so it outlives this value.
    pub fn keep(mut self) -> PathBuf {
        if let Some(temp) = self.temp.take() {
            let _ = temp.keep();
        }
        self.path
    }
}

/// Lexically normalize a path: drop `.` components and fold `..` into its parent.
///
/// Leading `..` components of a relative path are kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }
    normalized
}

/// Pick the staging directory for this run.
///
/// Uses `explicit` (normalized) when given, otherwise a new directory from
/// `factory`. Fails if the path exists and is not a directory. A non-empty
/// existing directory is allowed but reported through `console` as a warning.
pub fn resolve_workdir(
    explicit: Option<&Path>,
    factory: &dyn TempDirFactory,
    console: &mut dyn Console,
) -> Result<Workdir> {
    let (workdir, temp) = match explicit {
        Some(path) => (normalize_path(path), None),
        None => {
            let temp = factory.new_temp_dir("workdir")?;
            (temp.path().to_path_buf(), Some(temp))
        }
    };
    let absolute = std::path::absolute(&workdir).unwrap_or_else(|_| workdir.clone());
    log::info!("Using workdir: {}", absolute.display());

    if workdir.exists() && !workdir.is_dir() {
        return Err(io::Error::other(format!(
            "'{}' exists and is not a directory",
            workdir.display()
        ))
        .into());
    }
    if workdir.is_dir() && std::fs::read_dir(&workdir)?.next().is_some() {
        console.warn(&format!("{} is not empty", workdir.display()));
    }
    Ok(Workdir {
        path: workdir,
        temp,
    })
}
