use globset::{Glob, GlobBuilder, GlobMatcher};
use regex::Regex;

use crate::entry::Candidate;
use crate::error::SetupError;
use crate::traits::Predicate;

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

/// Compile a glob where `*` and `?` never cross a `/`.
fn compile_glob(pattern: &str) -> Result<Glob, SetupError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| SetupError::InvalidGlob {
            pattern: pattern.to_string(),
            source,
        })
}

// ---------------------------------------------------------------------------
// Name matchers
// ---------------------------------------------------------------------------

/// Matches the candidate's base name against a glob.
#[derive(Debug, Clone)]
pub(crate) struct NameGlob(GlobMatcher);

impl NameGlob {
    pub(crate) fn new(pattern: &str) -> Result<Self, SetupError> {
        Ok(Self(compile_glob(pattern)?.compile_matcher()))
    }
}

impl Predicate for NameGlob {
    fn evaluate(&self, candidate: &Candidate) -> bool {
        self.0.is_match(candidate.name())
    }
}

/// Matches the candidate's base name against a regex (unanchored).
#[derive(Debug, Clone)]
pub(crate) struct NameRegex(Regex);

impl NameRegex {
    pub(crate) fn new(pattern: &str) -> Result<Self, SetupError> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|source| SetupError::InvalidRegex {
                pattern: pattern.to_string(),
                source,
            })
    }
}

impl Predicate for NameRegex {
    fn evaluate(&self, candidate: &Candidate) -> bool {
        self.0.is_match(candidate.name())
    }
}

// ---------------------------------------------------------------------------
// Path matchers
// ---------------------------------------------------------------------------

/// How a directory path relates to a path glob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reach {
    /// The glob matches the path or one of its ancestors.
    Within,
    /// Not matched yet, but a descendant path still could be.
    Toward,
    /// Neither the path nor anything beneath it can match.
    Outside,
}

#[derive(Debug, Clone)]
enum Segment {
    Glob(GlobMatcher),
    AnyDepth,
}

/// A glob matched against `/`-separated relative directory paths.
///
/// Directories are matched on their own relative path, files on the path of
/// the directory containing them (`.` for files directly under the root).
#[derive(Debug, Clone)]
pub(crate) struct PathGlob {
    whole: GlobMatcher,
    // Per-component matchers used to tell whether a directory can still lead
    // to a match. `None` when the glob does not split cleanly on `/` (a brace
    // alternative spanning a separator), in which case nothing is ruled out.
    segments: Option<Vec<Segment>>,
}

impl PathGlob {
    /// Compile a directory glob. A trailing `/` is dropped, so `D/` and `D`
    /// name the same directory.
    pub(crate) fn new(pattern: &str) -> Result<Self, SetupError> {
        let pattern = match pattern.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => pattern,
        };
        let whole = compile_glob(pattern)?.compile_matcher();

        let segments = pattern
            .split('/')
            .map(|part| {
                if part == "**" {
                    Some(Segment::AnyDepth)
                } else {
                    compile_glob(part)
                        .ok()
                        .map(|g| Segment::Glob(g.compile_matcher()))
                }
            })
            .collect::<Option<Vec<_>>>();

        Ok(Self { whole, segments })
    }

    /// Whether the glob matches `dir` exactly.
    pub(crate) fn is_match(&self, dir: &str) -> bool {
        self.whole.is_match(dir)
    }

    /// Classify a `/`-separated directory path against this glob.
    pub(crate) fn reach(&self, dir: &str) -> Reach {
        let ancestors = dir
            .match_indices('/')
            .map(|(i, _)| &dir[..i])
            .chain(std::iter::once(dir));

        for prefix in ancestors {
            if self.whole.is_match(prefix) {
                return Reach::Within;
            }
        }

        if dir == "." {
            return Reach::Outside;
        }

        let Some(segments) = &self.segments else {
            return Reach::Toward;
        };

        let mut depth = 0;
        for component in dir.split('/') {
            match segments.get(depth) {
                None => return Reach::Outside,
                Some(Segment::AnyDepth) => return Reach::Toward,
                Some(Segment::Glob(g)) if !g.is_match(component) => return Reach::Outside,
                Some(Segment::Glob(_)) => depth += 1,
            }
        }

        if depth < segments.len() {
            Reach::Toward
        } else {
            Reach::Outside
        }
    }
}

impl Predicate for PathGlob {
    fn evaluate(&self, candidate: &Candidate) -> bool {
        if candidate.is_dir() {
            self.is_match(candidate.match_path())
        } else {
            self.is_match(candidate.parent_match_path())
        }
    }
}

/// Directory names used by common version control systems.
pub(crate) const VCS_DIRS: &[&str] = &[
    ".svn",
    "_svn",
    "CVS",
    "_darcs",
    ".arch-params",
    ".monotone",
    ".bzr",
    ".git",
    ".hg",
];

/// Matches directories named like a VCS metadata directory.
#[derive(Debug, Clone, Copy)]
pub(crate) struct VcsDir;

impl Predicate for VcsDir {
    fn evaluate(&self, candidate: &Candidate) -> bool {
        candidate.is_dir() && VCS_DIRS.contains(&candidate.name())
    }
}

/// Matches any entry whose name starts with a dot.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DotEntry;

impl Predicate for DotEntry {
    fn evaluate(&self, candidate: &Candidate) -> bool {
        candidate.name().starts_with('.')
    }
}

// ---------------------------------------------------------------------------
// Ranges
// ---------------------------------------------------------------------------

/// Inclusive size range. An inverted range (`max < min`) has no upper bound.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SizeRange {
    min: u64,
    max: Option<u64>,
}

impl SizeRange {
    pub(crate) fn new(min: u64, max: Option<u64>) -> Self {
        Self {
            min,
            max: max.filter(|&m| m >= min),
        }
    }
}

impl Predicate for SizeRange {
    fn evaluate(&self, candidate: &Candidate) -> bool {
        let size = candidate.size();
        size >= self.min && self.max.map_or(true, |max| size <= max)
    }
}

/// Inclusive depth range. An inverted range (`max < min`) has no upper bound.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DepthRange {
    min: usize,
    max: Option<usize>,
}

impl DepthRange {
    pub(crate) fn new(min: usize, max: Option<usize>) -> Self {
        Self {
            min,
            max: max.filter(|&m| m >= min),
        }
    }

    pub(crate) fn max(&self) -> Option<usize> {
        self.max
    }

    pub(crate) fn contains(&self, depth: usize) -> bool {
        depth >= self.min && self.max.map_or(true, |max| depth <= max)
    }
}
