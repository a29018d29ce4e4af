use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::entry::{Candidate, EntryKind};
use crate::error::TraversalError;

/// Decides whether a candidate satisfies one filter.
///
/// Every built-in filter (globs, regexes, size and depth ranges) implements
/// this, and so does any `Fn(&Candidate) -> bool` closure, which is what
/// [`Finder::filter`](crate::Finder::filter) accepts.
///
/// # Thread Safety
///
/// `Send + Sync` are required so a configured finder can be moved onto the
/// producer thread behind [`Finder::iter`](crate::Finder::iter).
///
/// # Example
///
/// ```rust
/// use treefind::{Candidate, Predicate};
///
/// struct ExtensionIs(&'static str);
///
/// impl Predicate for ExtensionIs {
///     fn evaluate(&self, candidate: &Candidate) -> bool {
///         candidate
///             .path()
///             .extension()
///             .map(|e| e.eq_ignore_ascii_case(self.0))
///             .unwrap_or(false)
///     }
/// }
/// ```
pub trait Predicate: Send + Sync {
    /// Returns `true` if the candidate satisfies this predicate.
    fn evaluate(&self, candidate: &Candidate) -> bool;
}

impl<F> Predicate for F
where
    F: Fn(&Candidate) -> bool + Send + Sync,
{
    fn evaluate(&self, candidate: &Candidate) -> bool {
        self(candidate)
    }
}

/// What the walk primitive should do after visiting an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkDecision {
    /// Keep walking, descending into this entry if it is a directory.
    Continue,

    /// Do not descend into this entry. Ignored for non-directories.
    SkipSubtree,

    /// Stop walking the current root entirely.
    Abort,
}

/// Raw entry handed from a [`Walker`] to the traversal driver.
#[derive(Debug, Clone)]
pub struct WalkEntry {
    /// Full path, starting with the root passed to [`Walker::walk`].
    pub path: PathBuf,
    pub kind: EntryKind,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

/// Walk-level parameters passed from the finder to the walk primitive.
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Deepest level any configured depth filter can accept. Walkers should
    /// not yield entries below it; `None` means unbounded.
    pub max_depth: Option<usize>,

    /// Follow symbolic links into directories.
    pub follow_links: bool,
}

/// The recursive directory walk primitive.
///
/// Implementations visit `root` itself and then every descendant depth-first,
/// parents before children, calling `visit` once per entry and honouring the
/// returned [`WalkDecision`]. [`FsWalker`](crate::FsWalker) is the default;
/// tests and embedders swap in their own through
/// [`Finder::walker`](crate::Finder::walker).
///
/// # Error Handling
///
/// Per-entry failures (an unreadable directory, a metadata error) go to
/// `visit` as `Err` and the walk carries on. Returning `Err` from `walk`
/// means the root itself could not be walked; the driver records it and moves
/// on to the next root.
pub trait Walker: Send + Sync {
    fn walk(
        &self,
        root: &Path,
        options: &WalkOptions,
        visit: &mut dyn FnMut(Result<WalkEntry, TraversalError>) -> WalkDecision,
    ) -> Result<(), TraversalError>;
}
