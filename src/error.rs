use std::path::{Path, PathBuf};
use thiserror::Error;

/// A pattern that failed to compile while the finder was being configured.
///
/// The offending predicate is dropped; every other filter keeps working.
#[derive(Error, Debug, Clone)]
pub enum SetupError {
    #[error("error parsing glob {pattern:?}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("error parsing regex {pattern:?}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl SetupError {
    /// The pattern text that failed to compile.
    pub fn pattern(&self) -> &str {
        match self {
            Self::InvalidGlob { pattern, .. } | Self::InvalidRegex { pattern, .. } => pattern,
        }
    }
}

/// A failure reported by the walk primitive while traversing a root.
#[derive(Error, Debug)]
pub enum TraversalError {
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("symlink loop: {}", .0.display())]
    SymlinkLoop(PathBuf),

    #[error("IO error at {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The walk primitive yielded a path that does not live under the root.
    #[error("path outside of search root: {}", .0.display())]
    OutsideRoot(PathBuf),

    #[error("walk error: {0}")]
    Walk(String),
}

impl TraversalError {
    /// Classify an I/O error for `path` into the closest variant.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io { path, source },
        }
    }

    /// The path this error occurred at, if applicable.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::PermissionDenied(p)
            | Self::NotFound(p)
            | Self::SymlinkLoop(p)
            | Self::OutsideRoot(p)
            | Self::Io { path: p, .. } => Some(p),
            Self::Walk(_) => None,
        }
    }
}

/// Any error surfaced by a finder run.
///
/// Runs never abort on these; they are accumulated and handed back with the
/// results, setup errors first.
#[derive(Error, Debug)]
pub enum FinderError {
    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Traversal(#[from] TraversalError),

    #[error("failed to spawn walk thread")]
    Spawn(#[source] std::io::Error),
}

impl FinderError {
    /// The path this error occurred at, if applicable.
    /// Callers use this to present "Skipped: <path>" without matching on variants.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Traversal(e) => e.path(),
            _ => None,
        }
    }

    /// Whether this error was recorded while assembling the configuration.
    pub fn is_setup(&self) -> bool {
        matches!(self, Self::Setup(_))
    }
}
