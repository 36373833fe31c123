//! User-facing message sink shared by config loading, workdir resolution
//! and subcommands.

/// Severity of a console message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warn,
    Error,
}

/// Where progress messages and non-fatal warnings go.
pub trait Console {
    fn info(&mut self, message: &str);
    fn warn(&mut self, message: &str);
    fn error(&mut self, message: &str);
}

/// Console that forwards to the `log` facade.
#[derive(Debug, Default)]
pub struct LogConsole;

impl Console for LogConsole {
    fn info(&mut self, message: &str) {
        log::info!("{}", message);
    }

    fn warn(&mut self, message: &str) {
        log::warn!("{}", message);
    }

    fn error(&mut self, message: &str) {
        log::error!("{}", message);
    }
}

/// Console that keeps every message, for callers that inspect output afterwards.
#[derive(Debug, Default)]
pub struct RecordingConsole {
    pub messages: Vec<(MessageLevel, String)>,
}

impl RecordingConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages recorded at `level`, in order.
    pub fn at(&self, level: MessageLevel) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.as_str())
            .collect()
    }

    pub fn warnings(&self) -> Vec<&str> {
        self.at(MessageLevel::Warn)
    }
}

impl Console for RecordingConsole {
    fn info(&mut self, message: &str) {
        self.messages.push((MessageLevel::Info, message.to_string()));
    }

    fn warn(&mut self, message: &str) {
        self.messages.push((MessageLevel::Warn, message.to_string()));
    }

    fn error(&mut self, message: &str) {
        self.messages.push((MessageLevel::Error, message.to_string()));
    }
}
