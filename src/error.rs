//! Error types and reporting for the shell.
//!
//! Executor and builtin failures are reported as `ShellError`, which carries:
//! - Error kind (setup, redirection, program resolution, ...)
//! - Human-readable message
//! - Optional hint shown on a second line

use std::fmt;
use std::io;
use std::path::Path;

/// Categorized error types for better diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Pipe or process creation failed before the pipeline could run
    Setup,
    /// A redirection target could not be opened
    Redirection,
    /// The program could not be found or is not executable
    Resolution,
    /// A builtin rejected its arguments or environment
    Builtin,
    /// Error loading/parsing configuration
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::Setup => write!(f, "Setup error"),
            ErrorKind::Redirection => write!(f, "Redirection error"),
            ErrorKind::Resolution => write!(f, "Command error"),
            ErrorKind::Builtin => write!(f, "Builtin error"),
            ErrorKind::Config => write!(f, "Config error"),
        }
    }
}

/// Rich error type with context information
#[derive(Debug, Clone)]
pub struct ShellError {
    pub kind: ErrorKind,
    pub message: String,
    /// Additional context explaining what was being processed
    pub context: Option<String>,
}

impl ShellError {
    /// Create a new error with just the kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ShellError {
            kind,
            message: message.into(),
            context: None,
        }
    }

    /// Add context string (e.g., "while creating pipe 2 of 3")
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn setup(what: &str, err: impl fmt::Display) -> Self {
        ShellError::new(ErrorKind::Setup, format!("{what}: {err}"))
    }

    pub fn redirection(path: &str, err: &io::Error) -> Self {
        ShellError::new(
            ErrorKind::Redirection,
            format!("{path}: {}", describe_io(err)),
        )
    }

    /// Classify a failed spawn. `resolved` is the program path as handed to
    /// the OS, already joined to the session directory when it has a slash.
    /// Missing or non-executable programs are per-command failures; anything
    /// else means process creation broke.
    pub fn from_spawn(program: &str, resolved: &Path, err: &io::Error) -> Self {
        if program.contains('/') && resolved.is_dir() {
            return ShellError::new(
                ErrorKind::Resolution,
                format!("{program}: is a directory"),
            );
        }
        match err.kind() {
            io::ErrorKind::NotFound => ShellError::new(
                ErrorKind::Resolution,
                format!("{program}: command not found"),
            ),
            io::ErrorKind::PermissionDenied => ShellError::new(
                ErrorKind::Resolution,
                format!("{program}: permission denied"),
            ),
            _ => ShellError::setup(program, err),
        }
    }

    /// True when only the failing command is affected, not the pipeline.
    pub fn is_per_command(&self) -> bool {
        matches!(self.kind, ErrorKind::Redirection | ErrorKind::Resolution)
    }

    /// Simplified display without input context
    pub fn display_simple(&self) -> String {
        let mut msg = format!("{}: {}", self.kind, self.message);
        if let Some(context) = &self.context {
            msg.push_str(&format!("\n  hint: {}", context));
        }
        msg
    }
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display_simple())
    }
}

impl std::error::Error for ShellError {}

impl From<ShellError> for io::Error {
    fn from(err: ShellError) -> Self {
        io::Error::other(err.to_string())
    }
}

/// Convenience type alias for Results with ShellError
pub type ShellResult<T> = Result<T, ShellError>;

// io::Error's Display appends "(os error N)"; diagnostics read better without it.
fn describe_io(err: &io::Error) -> String {
    match err.kind() {
        io::ErrorKind::NotFound => "No such file or directory".to_string(),
        io::ErrorKind::PermissionDenied => "Permission denied".to_string(),
        _ => err.to_string(),
    }
}
