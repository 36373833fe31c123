//! Loading a [`Config`] from a config handle, either as it is now or as it
//! was at a given [`Revision`].
//!
//! Revision-pinned loading needs an origin that can hand back historical
//! content. That ability is a single optional [`RevisionConfigSource`] held
//! by the loader: [`ConfigLoader::supports_load_for_revision`] reports whether
//! it is present, and [`ConfigLoader::load_for_revision`] uses it. The two can
//! never disagree.

use crate::config::{Config, ConfigParser, Options, TomlConfigParser};
use crate::config_file::{ConfigFile, PathConfigFile};
use crate::console::Console;
use crate::error::{FerryError, Result};
use crate::revision::Revision;

/// Fetches configuration content as it existed at a revision.
///
/// Implementations only locate the content; parsing and validation stay in
/// the loader's shared pipeline.
pub trait RevisionConfigSource {
    fn config_file_at(
        &self,
        config_file: &dyn ConfigFile,
        revision: &dyn Revision,
    ) -> Result<Box<dyn ConfigFile>>;
}

/// Loads the configuration from one config handle.
///
/// Not meant to be shared between threads; build one loader per migration.
pub struct ConfigLoader {
    parser: Box<dyn ConfigParser>,
    config_file: Box<dyn ConfigFile>,
    revision_source: Option<Box<dyn RevisionConfigSource>>,
}

impl ConfigLoader {
    pub fn new(parser: Box<dyn ConfigParser>, config_file: Box<dyn ConfigFile>) -> Self {
        Self {
            parser,
            config_file,
            revision_source: None,
        }
    }

    /// A TOML loader for a config file on disk.
    pub fn for_path(path: impl Into<std::path::PathBuf>) -> Self {
        Self::new(
            Box::new(TomlConfigParser),
            Box::new(PathConfigFile::new(path)),
        )
    }

    /// Enable loading this configuration at arbitrary revisions.
    pub fn with_revision_source(mut self, source: Box<dyn RevisionConfigSource>) -> Self {
        self.revision_source = Some(source);
        self
    }

    /// Displayable location of the configuration.
    pub fn location(&self) -> &str {
        self.config_file.path()
    }

    /// Load the configuration as it currently is.
    pub fn load(&self, options: &Options, console: &mut dyn Console) -> Result<Config> {
        self.load_for_config_file(options, console, self.config_file.as_ref())
    }

    /// Load the configuration as it existed at `revision`.
    ///
    /// Fails with [`FerryError::UnsupportedOperation`] unless
    /// [`supports_load_for_revision`](Self::supports_load_for_revision) is true.
    pub fn load_for_revision(
        &self,
        options: &Options,
        console: &mut dyn Console,
        revision: &dyn Revision,
    ) -> Result<Config> {
        let source = self.revision_source.as_ref().ok_or_else(|| {
            FerryError::UnsupportedOperation(
                "This origin/configuration doesn't allow loading configs from specific revisions"
                    .to_string(),
            )
        })?;
        let historical = source.config_file_at(self.config_file.as_ref(), revision)?;
        log::debug!(
            "Loading config {} at revision {}; path={}",
            self.location(),
            revision.as_string(),
            historical.path()
        );
        self.load_for_config_file(options, console, historical.as_ref())
    }

    pub fn supports_load_for_revision(&self) -> bool {
        self.revision_source.is_some()
    }

    fn load_for_config_file(
        &self,
        options: &Options,
        console: &mut dyn Console,
        config_file: &dyn ConfigFile,
    ) -> Result<Config> {
        self.parser.parse(config_file, options, console)
    }
}

impl std::fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigLoader")
            .field("config_file", &self.config_file)
            .field("supports_load_for_revision", &self.supports_load_for_revision())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::config_file::InMemoryConfigFile;
    use crate::console::RecordingConsole;
    use crate::revision::StaticRevision;

    fn workflow_toml(origin_ref: &str) -> String {
        format!(
            r#"
[[workflow]]
name = "default"
[workflow.origin]
url = "https://example.com/a.git"
ref = "{origin_ref}"
[workflow.destination]
url = "https://example.com/b.git"
"#
        )
    }

    /// Serves fixed content per revision id.
    struct MapSource(HashMap<String, String>);

    impl RevisionConfigSource for MapSource {
        fn config_file_at(
            &self,
            config_file: &dyn ConfigFile,
            revision: &dyn Revision,
        ) -> Result<Box<dyn ConfigFile>> {
            let content = self.0.get(revision.as_string()).ok_or_else(|| {
                FerryError::RepoAccessError(format!("unknown revision {}", revision.as_string()))
            })?;
            Ok(Box::new(InMemoryConfigFile::new(
                format!("{}:{}", revision.as_string(), config_file.path()),
                content.clone(),
            )))
        }
    }

    fn loader() -> ConfigLoader {
        ConfigLoader::new(
            Box::new(TomlConfigParser),
            Box::new(InMemoryConfigFile::new("ferry.toml", workflow_toml("main"))),
        )
    }

    #[test]
    fn test_location_idempotent() {
        let loader = loader();
        assert_eq!(loader.location(), "ferry.toml");
        assert_eq!(loader.location(), loader.location());
    }

    #[test]
    fn test_load_current() {
        let mut console = RecordingConsole::new();
        let config = loader().load(&Options::default(), &mut console).unwrap();
        assert_eq!(config.workflow("default").unwrap().origin.reference, "main");
    }

    #[test]
    fn test_base_loader_rejects_revision_loading() {
        let loader = loader();
        assert!(!loader.supports_load_for_revision());
        let rev = StaticRevision::new("abc", "Test-RevId");
        let mut console = RecordingConsole::new();
        let err = loader
            .load_for_revision(&Options::default(), &mut console, &rev)
            .unwrap_err();
        match err {
            FerryError::UnsupportedOperation(msg) => {
                assert!(msg.contains("doesn't allow loading configs from specific revisions"))
            }
            other => panic!("expected UnsupportedOperation, got {:?}", other),
        }
    }

    #[test]
    fn test_revision_source_enables_both_flag_and_behavior() {
        let mut contents = HashMap::new();
        contents.insert("abc".to_string(), workflow_toml("old-branch"));
        let loader = loader().with_revision_source(Box::new(MapSource(contents)));
        assert!(loader.supports_load_for_revision());

        let rev = StaticRevision::new("abc", "Test-RevId");
        let mut console = RecordingConsole::new();
        let config = loader
            .load_for_revision(&Options::default(), &mut console, &rev)
            .unwrap();
        assert_eq!(config.location, "abc:ferry.toml");
        assert_eq!(
            config.workflow("default").unwrap().origin.reference,
            "old-branch"
        );
        // The current handle is untouched.
        assert_eq!(loader.location(), "ferry.toml");
    }

    #[test]
    fn test_revision_source_errors_propagate() {
        let loader = loader().with_revision_source(Box::new(MapSource(HashMap::new())));
        let rev = StaticRevision::new("missing", "Test-RevId");
        let mut console = RecordingConsole::new();
        let err = loader
            .load_for_revision(&Options::default(), &mut console, &rev)
            .unwrap_err();
        assert!(matches!(err, FerryError::RepoAccessError(_)));
    }

    #[test]
    fn test_invalid_content_is_validation_error() {
        let loader = ConfigLoader::new(
            Box::new(TomlConfigParser),
            Box::new(InMemoryConfigFile::new("bad/ferry.toml", "[[workflow]]\n")),
        );
        let mut console = RecordingConsole::new();
        let err = loader.load(&Options::default(), &mut console).unwrap_err();
        assert!(matches!(err, FerryError::ValidationError(_)));
    }

    #[test]
    fn test_unreadable_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ConfigLoader::for_path(dir.path().join("ferry.toml"));
        let mut console = RecordingConsole::new();
        let err = loader.load(&Options::default(), &mut console).unwrap_err();
        assert!(matches!(err, FerryError::IoError(_)));
    }
}
