//! Error types for repo-scout-core.
//!
//! The library exposes a `thiserror` enum for its public API; the CLI wraps
//! these in `anyhow` for reporting. Failures that happen while visiting a
//! single directory or repository never surface here: the walker turns them
//! into [`ScanIssue`](crate::models::ScanIssue) records and warning logs.

use std::path::PathBuf;
use thiserror::Error;

/// A specialized Result type for repo-scout-core operations.
///
/// # Example
///
/// ```
/// use repo_scout_core::Result;
///
/// fn count_providers() -> Result<usize> {
///     Ok(4)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single external `git` invocation.
///
/// Each fallback tier in the collector catches these; they only matter once a
/// whole chain of tiers is exhausted.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The process could not be started at all (binary missing, bad cwd, ...).
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran but exited unsuccessfully.
    #[error("`{command}` exited with {}: {stderr}", describe_exit(.code))]
    Failed {
        /// The command line, for diagnostics only.
        command: String,
        /// Exit code, `None` when terminated by a signal.
        code: Option<i32>,
        /// Trimmed standard error output.
        stderr: String,
    },

    /// The command succeeded but printed nothing usable.
    #[error("`{0}` produced no output")]
    EmptyOutput(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "signal".to_string(),
    }
}

/// Errors that can occur while configuring or running a discovery scan.
#[derive(Error, Debug)]
pub enum Error {
    /// An I/O error occurred while accessing the filesystem or spawning threads.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to open a Git repository in-process.
    #[error("Failed to open Git repository at {path}: {source}")]
    GitOpen {
        /// The path to the repository that couldn't be opened.
        path: PathBuf,
        /// The underlying gitoxide error.
        #[source]
        source: Box<gix::open::Error>,
    },

    /// An external `git` command failed.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// A provider URL pattern could not be used.
    ///
    /// Either the expression does not compile or it lacks the `repo`
    /// named capture group.
    #[error("Invalid pattern for provider '{name}': {message}")]
    InvalidPattern {
        /// Provider the pattern was registered for.
        name: String,
        /// What is wrong with it.
        message: String,
    },

    /// A required path does not exist.
    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Configuration could not be interpreted.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Localization system error.
    #[error("Localization error: {0}")]
    L10n(String),

    /// The scan itself broke down outside of any single directory.
    ///
    /// This indicates a defect; the in-progress flag is still cleared.
    #[error("Scan of {root} aborted: {message}")]
    Orchestration {
        /// Root the scan was started from.
        root: PathBuf,
        /// Panic payload or other description.
        message: String,
    },

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

// Helper constructors for common error cases
impl Error {
    /// Creates a GitOpen error.
    pub fn git_open(path: impl Into<PathBuf>, source: gix::open::Error) -> Self {
        Error::GitOpen {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Creates an InvalidPattern error.
    ///
    /// # Example
    ///
    /// ```
    /// use repo_scout_core::Error;
    ///
    /// let err = Error::invalid_pattern("Corp", "missing `repo` group");
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Invalid pattern for provider 'Corp': missing `repo` group"
    /// );
    /// ```
    pub fn invalid_pattern(name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidPattern {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a PathNotFound error.
    pub fn path_not_found(path: impl Into<PathBuf>) -> Self {
        Error::PathNotFound(path.into())
    }

    /// Creates a NotADirectory error.
    pub fn not_a_directory(path: impl Into<PathBuf>) -> Self {
        Error::NotADirectory(path.into())
    }

    /// Creates a Config error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Creates an L10n error.
    pub fn l10n(message: impl Into<String>) -> Self {
        Error::L10n(message.into())
    }

    /// Creates an Orchestration error.
    pub fn orchestration(root: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Orchestration {
            root: root.into(),
            message: message.into(),
        }
    }

    /// Creates an Other error.
    pub fn other(message: impl Into<String>) -> Self {
        Error::Other(message.into())
    }
}
