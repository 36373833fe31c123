//! Git origin backed by the `git` binary.
//!
//! Local repositories are resolved with `git rev-parse`, remote ones with
//! `git ls-remote`. Commit timestamps are read lazily and only for local
//! repositories; a revision of a remote that was never fetched has no
//! readable metadata.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, FixedOffset};

use crate::config_file::{ConfigFile, InMemoryConfigFile};
use crate::error::{FerryError, Result};
use crate::loader::RevisionConfigSource;
use crate::origin::Origin;
use crate::revision::Revision;

pub const GIT_LABEL_NAME: &str = "GitOrigin-RevId";

/// Whether `url` points at a remote rather than a local path.
pub fn is_remote_url(url: &str) -> bool {
    if url.starts_with("file://") {
        return false;
    }
    if url.contains("://") {
        return true;
    }
    // scp-like syntax: user@host:path
    match (url.find('@'), url.find(':')) {
        (Some(at), Some(colon)) => at < colon && !url[..colon].contains('/'),
        _ => false,
    }
}

/// Run git and return its stdout.
fn run_git(dir: Option<&Path>, args: &[&str]) -> Result<String> {
    let mut command = Command::new("git");
    if let Some(dir) = dir {
        command.arg("-C").arg(dir);
    }
    let output = command
        .args(args)
        .output()
        .map_err(|e| FerryError::RepoAccessError(format!("Failed to run git: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(FerryError::RepoAccessError(format!(
            "git {} failed: {}",
            args.join(" "),
            stderr.trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn is_full_sha(value: &str) -> bool {
    (value.len() == 40 || value.len() == 64) && value.chars().all(|c| c.is_ascii_hexdigit())
}

/// Labels implied by a code-review reference such as `refs/changes/45/12345/3`.
///
/// Such a ref names exactly one patchset, so the labels are safe to attach.
/// Branch names imply nothing.
pub fn review_labels(reference: &str) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    let parts: Vec<&str> = reference.split('/').collect();
    if let ["refs", "changes", _, change, patchset] = parts.as_slice() {
        if change.parse::<u64>().is_ok() && patchset.parse::<u64>().is_ok() {
            labels.insert("Change-Number".to_string(), change.to_string());
            labels.insert("Patchset".to_string(), patchset.to_string());
        }
    }
    labels
}

/// Parse the first `<sha>\t<ref>` line of `git ls-remote` output.
fn parse_ls_remote(output: &str) -> Option<String> {
    output
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .find(|sha| is_full_sha(sha))
        .map(str::to_string)
}

/// A git commit.
#[derive(Debug, Clone)]
pub struct GitRevision {
    sha: String,
    /// Local repository the commit can be inspected in, if any.
    repo: Option<PathBuf>,
    context_reference: Option<String>,
    labels: BTreeMap<String, String>,
}

impl GitRevision {
    fn new(sha: String, repo: Option<PathBuf>, reference: &str) -> Self {
        let context_reference = (reference != sha).then(|| reference.to_string());
        Self {
            sha,
            repo,
            context_reference,
            labels: review_labels(reference),
        }
    }
}

impl Revision for GitRevision {
    fn as_string(&self) -> &str {
        &self.sha
    }

    fn label_name(&self) -> &str {
        GIT_LABEL_NAME
    }

    fn read_timestamp(&self) -> Result<Option<DateTime<FixedOffset>>> {
        let Some(repo) = &self.repo else {
            return Ok(None);
        };
        let raw = run_git(
            Some(repo.as_path()),
            &["show", "-s", "--format=%cI", self.sha.as_str()],
        )?;
        DateTime::parse_from_rfc3339(raw.trim())
            .map(Some)
            .map_err(|e| {
                FerryError::RepoAccessError(format!(
                    "Cannot read timestamp of {}: {}",
                    self.sha, e
                ))
            })
    }

    fn context_reference(&self) -> Option<&str> {
        self.context_reference.as_deref()
    }

    fn associated_labels(&self) -> BTreeMap<String, String> {
        self.labels.clone()
    }
}

#[derive(Debug, Clone)]
enum Location {
    Local(PathBuf),
    Remote(String),
}

/// Reads changes from a git repository.
#[derive(Debug, Clone)]
pub struct GitOrigin {
    location: Location,
    default_ref: String,
}

impl GitOrigin {
    pub fn local(repo: impl Into<PathBuf>, default_ref: &str) -> Self {
        Self {
            location: Location::Local(repo.into()),
            default_ref: default_ref.to_string(),
        }
    }

    pub fn remote(url: &str, default_ref: &str) -> Self {
        Self {
            location: Location::Remote(url.to_string()),
            default_ref: default_ref.to_string(),
        }
    }
}

impl Origin for GitOrigin {
    fn resolve(&self, reference: Option<&str>) -> Result<Box<dyn Revision>> {
        let reference = reference.unwrap_or(&self.default_ref);
        let revision = match &self.location {
            Location::Local(repo) => {
                let spec = format!("{}^{{commit}}", reference);
                let sha = run_git(
                    Some(repo.as_path()),
                    &["rev-parse", "--verify", "--quiet", spec.as_str()],
                )
                .map_err(|e| match e {
                    FerryError::RepoAccessError(detail) => FerryError::RepoAccessError(format!(
                        "Cannot resolve reference '{}' in {}: {}",
                        reference,
                        repo.display(),
                        detail
                    )),
                    other => other,
                })?;
                GitRevision::new(sha.trim().to_string(), Some(repo.clone()), reference)
            }
            Location::Remote(url) => {
                let sha = if is_full_sha(reference) {
                    reference.to_string()
                } else {
                    let output = run_git(None, &["ls-remote", url.as_str(), reference])?;
                    parse_ls_remote(&output).ok_or_else(|| {
                        FerryError::RepoAccessError(format!(
                            "Reference '{}' not found in {}",
                            reference, url
                        ))
                    })?
                };
                GitRevision::new(sha, None, reference)
            }
        };
        log::debug!(
            "Resolved {}; revision={}",
            reference,
            revision.as_string()
        );
        Ok(Box::new(revision))
    }

    fn label_name(&self) -> &str {
        GIT_LABEL_NAME
    }

    /// Only a local repository that also contains `config_path` qualifies.
    fn revision_config_source(
        &self,
        config_path: &Path,
    ) -> Option<Box<dyn RevisionConfigSource>> {
        let Location::Local(repo) = &self.location else {
            return None;
        };
        let origin_root = toplevel(repo).ok()?;
        let source = GitRevisionConfigSource::discover(config_path).ok()?;
        let config_root = std::fs::canonicalize(&source.repo_root).ok()?;
        if origin_root != config_root {
            log::debug!(
                "{} is outside origin repository {}",
                config_path.display(),
                origin_root.display()
            );
            return None;
        }
        Some(Box::new(source))
    }
}

/// Canonical root of the work tree containing `dir`.
fn toplevel(dir: &Path) -> Result<PathBuf> {
    let root = run_git(Some(dir), &["rev-parse", "--show-toplevel"])?;
    Ok(std::fs::canonicalize(root.trim())?)
}

/// Reads a config file's content at a past commit of the repository holding it.
#[derive(Debug, Clone)]
pub struct GitRevisionConfigSource {
    repo_root: PathBuf,
}

impl GitRevisionConfigSource {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }

    /// Find the repository containing `config_path`.
    pub fn discover(config_path: &Path) -> Result<Self> {
        let dir = match config_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        Ok(Self::new(toplevel(dir)?))
    }

    /// Path of `config_path` relative to the repository root, with `/` separators.
    fn repo_relative(&self, config_path: &Path) -> Result<String> {
        let root = std::fs::canonicalize(&self.repo_root)?;
        let file_name = config_path.file_name().ok_or_else(|| {
            FerryError::ConfigError(format!("'{}' is not a file path", config_path.display()))
        })?;
        let parent = match config_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let absolute = std::fs::canonicalize(parent)?.join(file_name);
        let relative = absolute.strip_prefix(&root).map_err(|_| {
            FerryError::RepoAccessError(format!(
                "'{}' is not inside repository {}",
                absolute.display(),
                root.display()
            ))
        })?;
        Ok(relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/"))
    }
}

impl RevisionConfigSource for GitRevisionConfigSource {
    fn config_file_at(
        &self,
        config_file: &dyn ConfigFile,
        revision: &dyn Revision,
    ) -> Result<Box<dyn ConfigFile>> {
        let relative = self.repo_relative(Path::new(config_file.path()))?;
        let object = format!("{}:{}", revision.as_string(), relative);
        let content = run_git(Some(self.repo_root.as_path()), &["show", object.as_str()])?;
        Ok(Box::new(InMemoryConfigFile::new(object, content)))
    }
}
