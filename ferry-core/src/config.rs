//! Migration configuration: model, option layering and the TOML parser.
//!
//! A config file declares one or more workflows. Values are resolved with
//! the following priority (highest wins): CLI overrides > environment
//! variables > config file > built-in defaults.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::config_file::ConfigFile;
use crate::console::Console;
use crate::error::{FerryError, Result};

/// Basename of the default configuration file. A first positional token
/// ending with this literal is treated as a config path, not a subcommand.
pub const DEFAULT_CONFIG_FILENAME: &str = "ferry.toml";

/// Workflow selected when the command line names none.
pub const DEFAULT_WORKFLOW_NAME: &str = "default";

/// Helper macro to apply an optional owned value directly to a target field.
macro_rules! apply_option {
    ($opt:expr => $target:expr) => {
        if let Some(v) = $opt {
            $target = v;
        }
    };
}

/// Helper macro to clone a borrowed optional value directly to a target field.
macro_rules! apply_option_clone {
    ($opt:expr => $target:expr) => {
        if let Some(ref v) = $opt {
            $target = v.clone();
        }
    };
}

static AUTHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^<>]+ <[^<>@\s]+@[^<>\s]+>$").expect("valid author regex"));

/// How a workflow turns origin changes into destination changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowMode {
    /// Collapse all pending changes into one destination change.
    #[default]
    Squash,
    /// One destination change per origin change.
    Iterative,
    /// Import a single pending change for review.
    ChangeRequest,
}

impl std::str::FromStr for WorkflowMode {
    type Err = FerryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "squash" => Ok(WorkflowMode::Squash),
            "iterative" => Ok(WorkflowMode::Iterative),
            "change_request" => Ok(WorkflowMode::ChangeRequest),
            _ => Err(FerryError::ValidationError(format!(
                "Invalid workflow mode '{}'. Use 'squash', 'iterative', or 'change_request'.",
                s
            ))),
        }
    }
}

impl fmt::Display for WorkflowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowMode::Squash => write!(f, "squash"),
            WorkflowMode::Iterative => write!(f, "iterative"),
            WorkflowMode::ChangeRequest => write!(f, "change_request"),
        }
    }
}

/// Kind of repository backing an origin or destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoKind {
    #[default]
    Git,
    Folder,
}

impl std::str::FromStr for RepoKind {
    type Err = FerryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "git" => Ok(RepoKind::Git),
            "folder" => Ok(RepoKind::Folder),
            _ => Err(FerryError::ValidationError(format!(
                "Invalid repository type '{}'. Use 'git' or 'folder'.",
                s
            ))),
        }
    }
}

impl fmt::Display for RepoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoKind::Git => write!(f, "git"),
            RepoKind::Folder => write!(f, "folder"),
        }
    }
}

/// Whether authors are preserved from the origin or replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthoringMode {
    #[default]
    PassThru,
    Overwrite,
}

impl std::str::FromStr for AuthoringMode {
    type Err = FerryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pass_thru" => Ok(AuthoringMode::PassThru),
            "overwrite" => Ok(AuthoringMode::Overwrite),
            _ => Err(FerryError::ValidationError(format!(
                "Invalid authoring mode '{}'. Use 'pass_thru' or 'overwrite'.",
                s
            ))),
        }
    }
}

/// Where a workflow reads changes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OriginConfig {
    pub kind: RepoKind,
    /// Repository URL or local path.
    pub url: String,
    /// Reference resolved when the command line gives no source ref.
    pub reference: String,
}

/// Where a workflow writes changes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DestinationConfig {
    pub kind: RepoKind,
    pub url: String,
    /// Branch or reference pushed to.
    pub push: String,
}

/// Author attribution for migrated changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Authoring {
    /// Author used when the origin author is not kept, as `Name <email>`.
    pub default_author: String,
    pub mode: AuthoringMode,
}

/// One named origin-to-destination migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workflow {
    pub name: String,
    pub mode: WorkflowMode,
    pub description: Option<String>,
    pub origin: OriginConfig,
    pub destination: DestinationConfig,
    /// Include globs selecting origin files.
    pub origin_files: Vec<String>,
    pub authoring: Authoring,
}

/// A parsed, validated migration configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Displayable location the configuration was read from.
    pub location: String,
    /// Workflows keyed by name.
    pub workflows: BTreeMap<String, Workflow>,
}

impl Config {
    /// Look up a workflow, listing the available ones when it does not exist.
    pub fn workflow(&self, name: &str) -> Result<&Workflow> {
        self.workflows.get(name).ok_or_else(|| {
            FerryError::ConfigError(format!(
                "Workflow '{}' not found in '{}'. Available workflows: {}",
                name,
                self.location,
                self.workflow_names().join(", ")
            ))
        })
    }

    pub fn workflow_names(&self) -> Vec<String> {
        self.workflows.keys().cloned().collect()
    }
}

/// Command-line overrides that take highest priority. Applied to every workflow.
#[derive(Debug, Default, Clone)]
pub struct Options {
    /// Override the origin URL.
    pub origin_url: Option<String>,
    /// Override the origin reference.
    pub origin_ref: Option<String>,
    /// Override the destination URL.
    pub destination_url: Option<String>,
}

/// Turns configuration content into a validated [`Config`].
pub trait ConfigParser {
    fn parse(
        &self,
        config_file: &dyn ConfigFile,
        options: &Options,
        console: &mut dyn Console,
    ) -> Result<Config>;
}

// ── TOML deserialization structs ──

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    workflow: Option<Vec<TomlWorkflow>>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlWorkflow {
    name: Option<String>,
    mode: Option<String>,
    description: Option<String>,
    origin_files: Option<Vec<String>>,
    origin: Option<TomlOrigin>,
    destination: Option<TomlDestination>,
    authoring: Option<TomlAuthoring>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlOrigin {
    #[serde(rename = "type")]
    kind: Option<String>,
    url: Option<String>,
    #[serde(rename = "ref")]
    reference: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlDestination {
    #[serde(rename = "type")]
    kind: Option<String>,
    url: Option<String>,
    push: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlAuthoring {
    default: Option<String>,
    mode: Option<String>,
}

/// Unvalidated workflow values while the layers are applied.
#[derive(Debug, Clone)]
struct WorkflowDraft {
    name: String,
    mode: String,
    description: Option<String>,
    origin_kind: String,
    origin_url: String,
    origin_ref: String,
    destination_kind: String,
    destination_url: String,
    destination_push: String,
    origin_files: Vec<String>,
    default_author: String,
    authoring_mode: String,
}

impl Default for WorkflowDraft {
    fn default() -> Self {
        Self {
            name: DEFAULT_WORKFLOW_NAME.to_string(),
            mode: WorkflowMode::default().to_string(),
            description: None,
            origin_kind: RepoKind::Git.to_string(),
            origin_url: String::new(),
            origin_ref: "main".to_string(),
            destination_kind: RepoKind::Git.to_string(),
            destination_url: String::new(),
            destination_push: "main".to_string(),
            origin_files: vec!["**".to_string()],
            default_author: "Ferry <ferry@localhost>".to_string(),
            authoring_mode: "pass_thru".to_string(),
        }
    }
}

impl WorkflowDraft {
    fn from_toml(toml: TomlWorkflow) -> Self {
        let mut draft = WorkflowDraft::default();
        apply_option!(toml.name => draft.name);
        apply_option!(toml.mode => draft.mode);
        draft.description = toml.description;
        apply_option!(toml.origin_files => draft.origin_files);
        if let Some(o) = toml.origin {
            apply_option!(o.kind => draft.origin_kind);
            apply_option!(o.url => draft.origin_url);
            apply_option!(o.reference => draft.origin_ref);
        }
        if let Some(d) = toml.destination {
            apply_option!(d.kind => draft.destination_kind);
            apply_option!(d.url => draft.destination_url);
            apply_option!(d.push => draft.destination_push);
        }
        if let Some(a) = toml.authoring {
            apply_option!(a.default => draft.default_author);
            apply_option!(a.mode => draft.authoring_mode);
        }
        draft
    }

    fn apply_env(&mut self, env: &dyn Fn(&str) -> Option<String>) {
        apply_option!(env("FERRY_ORIGIN_URL") => self.origin_url);
        apply_option!(env("FERRY_ORIGIN_REF") => self.origin_ref);
        apply_option!(env("FERRY_DESTINATION_URL") => self.destination_url);
    }

    fn apply_cli(&mut self, options: &Options) {
        apply_option_clone!(options.origin_url => self.origin_url);
        apply_option_clone!(options.origin_ref => self.origin_ref);
        apply_option_clone!(options.destination_url => self.destination_url);
    }

    fn validate(self, errors: &mut Vec<String>) -> Option<Workflow> {
        let before = errors.len();
        let name = self.name.trim().to_string();
        if name.is_empty() {
            errors.push("workflow name must not be empty".to_string());
        }
        let mode = self.mode.parse::<WorkflowMode>();
        let origin_kind = self.origin_kind.parse::<RepoKind>();
        let destination_kind = self.destination_kind.parse::<RepoKind>();
        let authoring_mode = self.authoring_mode.parse::<AuthoringMode>();
        record_error(&mode, &name, errors);
        record_error(&origin_kind, &name, errors);
        record_error(&destination_kind, &name, errors);
        record_error(&authoring_mode, &name, errors);

        if self.origin_url.trim().is_empty() {
            errors.push(format!("workflow '{}': origin url is required", name));
        }
        if self.destination_url.trim().is_empty() {
            errors.push(format!("workflow '{}': destination url is required", name));
        }
        if self.origin_ref.trim().is_empty() {
            errors.push(format!("workflow '{}': origin ref must not be empty", name));
        }
        if self.origin_files.is_empty() || self.origin_files.iter().any(|g| g.trim().is_empty()) {
            errors.push(format!(
                "workflow '{}': origin_files must contain at least one non-empty glob",
                name
            ));
        }
        if !AUTHOR_RE.is_match(&self.default_author) {
            errors.push(format!(
                "workflow '{}': author '{}' must have the form 'Name <email>'",
                name, self.default_author
            ));
        }

        if errors.len() > before {
            return None;
        }
        Some(Workflow {
            name,
            mode: mode.ok()?,
            description: self.description,
            origin: OriginConfig {
                kind: origin_kind.ok()?,
                url: self.origin_url,
                reference: self.origin_ref,
            },
            destination: DestinationConfig {
                kind: destination_kind.ok()?,
                url: self.destination_url,
                push: self.destination_push,
            },
            origin_files: self.origin_files,
            authoring: Authoring {
                default_author: self.default_author,
                mode: authoring_mode.ok()?,
            },
        })
    }
}

fn record_error<T>(result: &Result<T>, workflow: &str, errors: &mut Vec<String>) {
    if let Err(e) = result {
        let msg = match e {
            FerryError::ValidationError(msg) => msg.clone(),
            other => other.to_string(),
        };
        errors.push(format!("workflow '{}': {}", workflow, msg));
    }
}

/// Parser for TOML migration configs.
#[derive(Debug, Default)]
pub struct TomlConfigParser;

impl TomlConfigParser {
    /// Parse already-read content. `location` is used in messages and kept in the [`Config`].
    pub fn parse_str(&self, location: &str, content: &str, options: &Options) -> Result<Config> {
        self.parse_str_with_env(location, content, options, &|key| std::env::var(key).ok())
    }

    /// Like [`parse_str`](Self::parse_str), reading environment overrides through `env`.
    pub fn parse_str_with_env(
        &self,
        location: &str,
        content: &str,
        options: &Options,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Config> {
        let toml_config: TomlConfig = toml::from_str(content).map_err(|e| {
            FerryError::ValidationError(format!(
                "Failed to parse config file '{}': {}",
                location, e
            ))
        })?;

        let drafts: Vec<WorkflowDraft> = toml_config
            .workflow
            .unwrap_or_default()
            .into_iter()
            .map(WorkflowDraft::from_toml)
            .collect();
        if drafts.is_empty() {
            return Err(FerryError::ValidationError(format!(
                "'{}' does not define any [[workflow]]",
                location
            )));
        }

        let mut errors = Vec::new();
        let mut seen = HashSet::new();
        let mut workflows = BTreeMap::new();
        for mut draft in drafts {
            draft.apply_env(env);
            draft.apply_cli(options);
            if !seen.insert(draft.name.trim().to_string()) {
                errors.push(format!("duplicate workflow name '{}'", draft.name.trim()));
                continue;
            }
            if let Some(workflow) = draft.validate(&mut errors) {
                workflows.insert(workflow.name.clone(), workflow);
            }
        }

        if !errors.is_empty() {
            return Err(FerryError::ValidationError(format!(
                "'{}' is invalid:\n  {}",
                location,
                errors.join("\n  ")
            )));
        }

        Ok(Config {
            location: location.to_string(),
            workflows,
        })
    }
}

impl ConfigParser for TomlConfigParser {
    fn parse(
        &self,
        config_file: &dyn ConfigFile,
        options: &Options,
        console: &mut dyn Console,
    ) -> Result<Config> {
        let content = config_file.read_content()?;
        let config = self.parse_str(config_file.path(), &content, options)?;
        console.info(&format!(
            "Loaded {} workflow(s) from {}",
            config.workflows.len(),
            config.location
        ));
        Ok(config)
    }
}
