//! Origins: resolve user references into [`Revision`]s.
//!
//! - [`git`]: git repositories, local or remote, via the `git` binary
//! - [`folder`]: a plain directory on disk

pub mod folder;
pub mod git;

use std::path::{Path, PathBuf};

use crate::config::{OriginConfig, RepoKind};
use crate::error::Result;
use crate::loader::RevisionConfigSource;
use crate::revision::Revision;

pub use folder::FolderOrigin;
pub use git::{GitOrigin, GitRevision, GitRevisionConfigSource};

/// A source of changes for a workflow.
pub trait Origin {
    /// Resolve `reference`, or the origin's configured reference when `None`.
    fn resolve(&self, reference: Option<&str>) -> Result<Box<dyn Revision>>;

    /// Label name stamped on destination commits for revisions of this origin.
    fn label_name(&self) -> &str;

    /// Reader for past contents of `config_path`, if this origin's history
    /// holds that file. Origins without history have none.
    fn revision_config_source(
        &self,
        _config_path: &Path,
    ) -> Option<Box<dyn RevisionConfigSource>> {
        None
    }
}

/// Build the origin described by `config`. Relative local paths are taken
/// relative to `base_dir`, normally the directory holding the config file.
pub fn origin_for(config: &OriginConfig, base_dir: &Path) -> Box<dyn Origin> {
    match config.kind {
        RepoKind::Git => {
            if git::is_remote_url(&config.url) {
                Box::new(GitOrigin::remote(&config.url, &config.reference))
            } else {
                Box::new(GitOrigin::local(
                    resolve_local(&config.url, base_dir),
                    &config.reference,
                ))
            }
        }
        RepoKind::Folder => Box::new(
            FolderOrigin::new(resolve_local(&config.url, base_dir)).with_base_dir(base_dir),
        ),
    }
}

fn resolve_local(url: &str, base_dir: &Path) -> PathBuf {
    let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_local() {
        let base = Path::new("/etc/ferry");
        assert_eq!(resolve_local("repo", base), PathBuf::from("/etc/ferry/repo"));
        assert_eq!(resolve_local("/srv/repo", base), PathBuf::from("/srv/repo"));
        assert_eq!(resolve_local("file:///srv/repo", base), PathBuf::from("/srv/repo"));
    }

    #[test]
    fn test_origin_for_labels() {
        let base = Path::new("/tmp");
        let git = OriginConfig {
            kind: RepoKind::Git,
            url: "https://example.com/a.git".to_string(),
            reference: "main".to_string(),
        };
        assert_eq!(origin_for(&git, base).label_name(), "GitOrigin-RevId");

        let folder = OriginConfig {
            kind: RepoKind::Folder,
            url: "src".to_string(),
            reference: "main".to_string(),
        };
        assert_eq!(origin_for(&folder, base).label_name(), "FolderOrigin-RevId");
    }
}
