use std::fmt;
use std::sync::Arc;

use crate::entry::Candidate;
use crate::matchers::{DepthRange, PathGlob, Reach, SizeRange};
use crate::traits::Predicate;

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// The engine's decision for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Every active filter passed; emit the candidate.
    Accept,

    /// Drop the candidate but keep descending into it.
    Reject,

    /// Drop the candidate and everything beneath it.
    PruneSubtree,
}

/// Which entry types the engine accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntryType {
    #[default]
    All,
    Files,
    Dirs,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The predicate engine: ordered filter categories plus the depth bound.
///
/// Built once by [`Finder`](crate::Finder) and only read during traversal,
/// so one configuration can drive any number of runs.
#[derive(Clone, Default)]
pub struct Engine {
    entry_type: EntryType,
    depths: Vec<DepthRange>,
    depth_bound: Option<usize>,
    sizes: Vec<SizeRange>,
    custom: Vec<Arc<dyn Predicate>>,
    paths: Vec<PathGlob>,
    not_paths: Vec<Arc<dyn Predicate>>,
    names: Vec<Arc<dyn Predicate>>,
    not_names: Vec<Arc<dyn Predicate>>,
}

impl Engine {
    pub(crate) fn set_entry_type(&mut self, entry_type: EntryType) {
        self.entry_type = entry_type;
    }

    pub(crate) fn add_depth(&mut self, range: DepthRange) {
        // One unbounded range means no depth can be ruled out.
        self.depth_bound = match (self.depths.is_empty(), self.depth_bound, range.max()) {
            (true, _, max) => max,
            (false, Some(bound), Some(max)) => Some(bound.max(max)),
            _ => None,
        };
        self.depths.push(range);
    }

    pub(crate) fn add_size(&mut self, range: SizeRange) {
        self.sizes.push(range);
    }

    pub(crate) fn add_custom(&mut self, p: Arc<dyn Predicate>) {
        self.custom.push(p);
    }

    pub(crate) fn add_path(&mut self, glob: PathGlob) {
        self.paths.push(glob);
    }

    pub(crate) fn add_not_path(&mut self, p: Arc<dyn Predicate>) {
        self.not_paths.push(p);
    }

    pub(crate) fn add_name(&mut self, p: Arc<dyn Predicate>) {
        self.names.push(p);
    }

    pub(crate) fn add_not_name(&mut self, p: Arc<dyn Predicate>) {
        self.not_names.push(p);
    }

    /// Deepest level any depth filter can accept, or `None` when no depth
    /// filter bounds it.
    pub fn max_depth(&self) -> Option<usize> {
        if self.depths.is_empty() {
            None
        } else {
            self.depth_bound
        }
    }

    /// Evaluate a candidate against every active category.
    ///
    /// Cheap checks and the ones that can prune whole directories run first;
    /// name patterns only ever discard the single entry, so they run last.
    pub fn evaluate(&self, c: &Candidate) -> Verdict {
        let steps: [fn(&Self, &Candidate) -> Verdict; 8] = [
            Self::check_type,
            Self::check_depth,
            Self::check_size,
            Self::check_custom,
            Self::check_paths,
            Self::check_not_paths,
            Self::check_names,
            Self::check_not_names,
        ];

        for step in steps {
            let verdict = step(self, c);
            if verdict != Verdict::Accept {
                return verdict;
            }
        }
        Verdict::Accept
    }

    fn check_type(&self, c: &Candidate) -> Verdict {
        match (self.entry_type, c.is_dir()) {
            (EntryType::Files, true) | (EntryType::Dirs, false) => Verdict::Reject,
            _ => Verdict::Accept,
        }
    }

    fn check_depth(&self, c: &Candidate) -> Verdict {
        if self.depths.is_empty() {
            return Verdict::Accept;
        }
        if self.depth_bound.is_some_and(|bound| c.depth() > bound) {
            return Verdict::PruneSubtree;
        }
        any_or_reject(self.depths.iter().any(|d| d.contains(c.depth())))
    }

    fn check_size(&self, c: &Candidate) -> Verdict {
        if self.sizes.is_empty() {
            return Verdict::Accept;
        }
        any_or_reject(self.sizes.iter().any(|s| s.evaluate(c)))
    }

    fn check_custom(&self, c: &Candidate) -> Verdict {
        if self.custom.is_empty() {
            return Verdict::Accept;
        }
        any_or_reject(self.custom.iter().any(|p| p.evaluate(c)))
    }

    fn check_paths(&self, c: &Candidate) -> Verdict {
        if self.paths.is_empty() {
            return Verdict::Accept;
        }

        if !c.is_dir() {
            let dir = c.parent_match_path();
            return any_or_reject(self.paths.iter().any(|p| p.reach(dir) == Reach::Within));
        }

        // Directories must satisfy every glob. One that can only lead towards
        // a match is walked through but not emitted.
        let mut toward = false;
        for p in &self.paths {
            match p.reach(c.match_path()) {
                Reach::Within => {}
                Reach::Toward => toward = true,
                Reach::Outside => return Verdict::PruneSubtree,
            }
        }
        if toward {
            Verdict::Reject
        } else {
            Verdict::Accept
        }
    }

    fn check_not_paths(&self, c: &Candidate) -> Verdict {
        if !self.not_paths.iter().any(|p| p.evaluate(c)) {
            return Verdict::Accept;
        }
        if c.is_dir() {
            Verdict::PruneSubtree
        } else {
            Verdict::Reject
        }
    }

    fn check_names(&self, c: &Candidate) -> Verdict {
        if self.names.is_empty() {
            return Verdict::Accept;
        }
        any_or_reject(self.names.iter().any(|p| p.evaluate(c)))
    }

    fn check_not_names(&self, c: &Candidate) -> Verdict {
        any_or_reject(!self.not_names.iter().any(|p| p.evaluate(c)))
    }
}

fn any_or_reject(matched: bool) -> Verdict {
    if matched {
        Verdict::Accept
    } else {
        Verdict::Reject
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("entry_type", &self.entry_type)
            .field("depths", &self.depths)
            .field("max_depth", &self.max_depth())
            .field("sizes", &self.sizes)
            .field("custom", &self.custom.len())
            .field("paths", &self.paths.len())
            .field("not_paths", &self.not_paths.len())
            .field("names", &self.names.len())
            .field("not_names", &self.not_names.len())
            .finish()
    }
}
