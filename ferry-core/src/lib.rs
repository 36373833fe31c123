//! Entry-point resolution, configuration loading and the revision model for
//! the ferry source-migration tool.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ferry_core::commands::{CommandContext, GeneralOptions};
//! use ferry_core::commands::migrate::ReportingRunner;
//! use ferry_core::config::Options;
//! use ferry_core::console::LogConsole;
//! use ferry_core::resolver::CommandRegistry;
//! use ferry_core::workdir::{resolve_workdir, SystemTempDirFactory};
//!
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = CommandRegistry::standard();
//! let tokens = vec!["ferry.toml".to_string(), "default".to_string()];
//! let (command, args) = registry.resolve(&tokens)?.into_parts();
//!
//! let mut console = LogConsole;
//! let workdir = resolve_workdir(None, &SystemTempDirFactory::new(), &mut console)?;
//! let mut ctx = CommandContext {
//!     options: Options::default(),
//!     general: GeneralOptions {
//!         workdir: workdir.path().to_path_buf(),
//!         read_config_from_revision: false,
//!     },
//!     console: Box::new(console),
//!     runner: Box::new(ReportingRunner),
//! };
//! let _outcome = command.execute(&args, &mut ctx)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`resolver`]: Subcommand registry and positional-token resolution
//! - [`workdir`]: Staging directory selection
//! - [`loader`]: Current and revision-pinned config loading
//! - [`config`]: Config model, option layering, TOML parser
//! - [`config_file`]: Config content handles
//! - [`revision`]: Revision trait, value type and snapshot
//! - [`origin`]: Git and folder origins
//! - [`commands`]: migrate, validate, info
//! - [`console`]: User-facing message sink
//! - [`error`]: Error types

pub mod commands;
pub mod config;
pub mod config_file;
pub mod console;
pub mod error;
pub mod loader;
pub mod origin;
pub mod resolver;
pub mod revision;
pub mod workdir;

pub use commands::{CommandContext, CommandOutcome, FerryCommand, GeneralOptions};
pub use config::{Config, Options, DEFAULT_CONFIG_FILENAME};
pub use error::{FerryError, Result};
pub use loader::{ConfigLoader, RevisionConfigSource};
pub use resolver::{CommandRegistry, CommandWithArgs};
pub use revision::{Revision, RevisionInfo, StaticRevision};
