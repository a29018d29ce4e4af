use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

/// One visited filesystem entry, as seen by the predicate engine.
///
/// Candidates are built fresh for every entry the walk yields and never change
/// afterwards. Accepted candidates end up in [`Results`](crate::Results) or are
/// handed to the caller's callback.
#[derive(Debug, Clone)]
pub struct Candidate {
    name: String,
    path: PathBuf,
    rel_path: PathBuf,
    kind: EntryKind,
    size: u64,
    modified: Option<SystemTime>,
    depth: usize,

    // `/`-joined relative path and its containing directory, precomputed
    // once because every path predicate reads them.
    match_path: String,
    parent_match_path: String,
}

impl Candidate {
    /// Build a candidate for `rel_path` found under `root`.
    ///
    /// Depth is the number of components in `rel_path`, so direct children of
    /// the root sit at depth 1.
    pub fn new(
        root: &Path,
        rel_path: impl Into<PathBuf>,
        kind: EntryKind,
        size: u64,
        modified: Option<SystemTime>,
    ) -> Self {
        let rel_path = rel_path.into();

        let parts: Vec<String> = rel_path
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        let depth = parts.len();
        let name = parts.last().cloned().unwrap_or_default();
        let match_path = parts.join("/");
        let parent_match_path = match match_path.rsplit_once('/') {
            Some((parent, _)) => parent.to_string(),
            None => ".".to_string(),
        };

        Self {
            name,
            path: root.join(&rel_path),
            rel_path,
            kind,
            size,
            modified,
            depth,
            match_path,
            parent_match_path,
        }
    }

    /// Base name of the entry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path including the root it was found under.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path relative to the searched root.
    pub fn rel_path(&self) -> &Path {
        &self.rel_path
    }

    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Size in bytes as reported by the walk primitive.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    /// Number of components in the relative path. Root children = 1.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Relative path with `/` separators, the string path globs match against.
    pub fn match_path(&self) -> &str {
        &self.match_path
    }

    /// `/`-separated relative path of the containing directory, `.` at the root.
    pub fn parent_match_path(&self) -> &str {
        &self.parent_match_path
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// The kind of a traversed entry.
///
/// Anything that is not a directory counts as a file for type filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,

    /// A directory.
    Dir,

    /// A symbolic link that was not followed.
    Symlink,

    /// Anything else (device files, pipes, sockets, etc.).
    Other,
}

impl EntryKind {
    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Dir)
    }
}
