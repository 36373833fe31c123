//! Error types for ferry operations.

use thiserror::Error;

/// Render a list of names the way the command-line error messages show them.
pub fn format_names(names: &[String]) -> String {
    format!("[{}]", names.join(", "))
}

/// All error types that ferry operations can produce.
#[derive(Error, Debug)]
pub enum FerryError {
    /// The first positional token is neither a known subcommand nor a config file.
    #[error("Invalid subcommand '{command}'. Available commands: {}", format_names(.available))]
    InvalidCommand {
        command: String,
        /// Valid command names, lexicographically sorted.
        available: Vec<String>,
    },

    /// Bad command-line usage or option values (missing config path, unknown workflow, etc.).
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The configuration content is syntactically or semantically invalid.
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// A filesystem I/O operation failed (unreadable config, unusable workdir, etc.).
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The loader or origin does not implement the requested operation.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The repository is reachable but a revision or its metadata could not be read.
    #[error("Repository error: {0}")]
    RepoAccessError(String),
}

/// Convenience type alias for `Result<T, FerryError>`.
pub type Result<T> = std::result::Result<T, FerryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_command_message_lists_names() {
        let err = FerryError::InvalidCommand {
            command: "bogus".to_string(),
            available: vec!["info".to_string(), "migrate".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Invalid subcommand 'bogus'. Available commands: [info, migrate]"
        );
    }

    #[test]
    fn test_io_error_from() {
        let io = std::io::Error::other("'/tmp/x' exists and is not a directory");
        let err: FerryError = io.into();
        assert!(matches!(err, FerryError::IoError(_)));
        assert!(err.to_string().contains("exists and is not a directory"));
    }
}
