//! Error types and handling infrastructure for build dispatch

use anyhow::Error;
use std::fmt;
use std::path::{Path, PathBuf};

/// Failures tied to a single mapping entry's tool invocation
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("tool '{tool}' not found on PATH")]
    ToolNotFound {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to launch '{tool}': {source}")]
    Launch {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("source file not found: {}", .path.display())]
    MissingSource { path: PathBuf },

    #[error("external tool exited with {}", status_label(.status))]
    ToolFailed { status: Option<i32>, stderr: String },

    #[error("external tool timed out after {limit_secs}s")]
    Timeout { limit_secs: u64 },

    #[error("failed waiting for tool: {source}")]
    Wait {
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    /// Diagnostic output captured from the tool, if any
    pub fn tool_stderr(&self) -> Option<&str> {
        match self {
            Self::ToolFailed { stderr, .. } if !stderr.trim().is_empty() => Some(stderr),
            _ => None,
        }
    }
}

fn status_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {}", code),
        None => "signal termination".to_string(),
    }
}

/// Mapping manifest errors
#[derive(Debug, Clone)]
pub struct ManifestError {
    pub message: String,
    pub path: Option<PathBuf>,
}

impl ManifestError {
    pub fn new(message: String) -> Self {
        Self {
            message,
            path: None,
        }
    }

    pub fn with_path(mut self, path: &Path) -> Self {
        self.path = Some(path.to_path_buf());
        self
    }
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(path) = &self.path {
            write!(f, " in {}", path.display())?;
        }
        Ok(())
    }
}

impl std::error::Error for ManifestError {}

/// Main error type for dispatch operations
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("invalid configuration: {message}")]
    Configuration { message: String },

    #[error("cannot resolve base directory {}: {source}", .path.display())]
    PathResolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
    },

    #[error(transparent)]
    Other(#[from] Error),
}

impl DispatchError {
    pub fn configuration(message: String) -> Self {
        Self::Configuration { message }
    }

    pub fn io(message: String, path: Option<PathBuf>) -> Self {
        Self::Io { message, path }
    }

    /// Create a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Manifest(err) => {
                format!("Mapping manifest error: {}", err)
            }
            Self::Build(err) => err.to_string(),
            Self::Configuration { message } => {
                format!("Invalid configuration: {}", message)
            }
            Self::PathResolution { path, source } => {
                format!(
                    "Cannot resolve base directory '{}': {}",
                    path.display(),
                    source
                )
            }
            Self::Io { message, path } => match path {
                Some(path) => format!("IO error at '{}': {}", path.display(), message),
                None => format!("IO error: {}", message),
            },
            Self::Other(err) => {
                format!("Unexpected error: {}", err)
            }
        }
    }
}

/// Result type for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Convenience result type for single-entry tool invocations
pub type BuildResult<T> = Result<T, BuildError>;

/// Convenience result type for manifest loading
pub type ManifestResult<T> = Result<T, ManifestError>;
