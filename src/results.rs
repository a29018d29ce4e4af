use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::entry::Candidate;
use crate::error::FinderError;

/// The output of a completed find.
pub struct Results {
    /// Accepted entries, in traversal order unless re-sorted.
    pub items: Vec<Candidate>,

    /// Setup errors first, then traversal errors in the order they occurred.
    /// Empty means the run succeeded.
    pub errors: Vec<FinderError>,

    /// Scan statistics.
    pub stats: ScanStats,
}

/// Statistics for a completed scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanStats {
    /// Non-root entries handed to the engine.
    pub visited: usize,

    /// Entries the engine accepted.
    pub accepted: usize,

    /// Entries that got a prune verdict. Their subtrees were not walked.
    pub pruned: usize,

    /// Wall-clock time spent walking.
    pub duration: Duration,
}

/// Orderings available through [`Results::sort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Name,
    Path,
    Size,
    Modified,
    Extension,
}

impl Results {
    /// `true` when no setup or traversal error was recorded.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.items.iter()
    }

    /// Sum of the sizes of every accepted non-directory entry.
    pub fn total_size(&self) -> u64 {
        self.items
            .iter()
            .filter(|c| !c.is_dir())
            .map(Candidate::size)
            .sum()
    }

    /// Full paths of the accepted entries.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.items.iter().map(|c| c.path().to_path_buf()).collect()
    }

    /// Full paths rendered as strings.
    pub fn to_string_vec(&self) -> Vec<String> {
        self.items.iter().map(ToString::to_string).collect()
    }

    /// Stable sort by one of the built-in orderings, ascending.
    pub fn sort(&mut self, order: SortOrder) {
        match order {
            SortOrder::Name => self.sort_by(|a, b| a.name().cmp(b.name())),
            SortOrder::Path => self.sort_by(|a, b| a.path().cmp(b.path())),
            SortOrder::Size => self.sort_by(|a, b| a.size().cmp(&b.size())),
            SortOrder::Modified => self.sort_by(|a, b| a.modified().cmp(&b.modified())),
            SortOrder::Extension => {
                self.sort_by(|a, b| extension(a.name()).cmp(extension(b.name())))
            }
        }
    }

    /// Stable sort with a caller-supplied comparison.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Candidate, &Candidate) -> Ordering,
    {
        self.items.sort_by(compare);
    }
}

impl IntoIterator for Results {
    type Item = Candidate;
    type IntoIter = std::vec::IntoIter<Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Results {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

fn extension(name: &str) -> &str {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;
    use crate::entry::EntryKind;

    fn results() -> Results {
        let root = Path::new("fixtures");
        let epoch = SystemTime::UNIX_EPOCH;
        let items = vec![
            Candidate::new(root, "b.txt", EntryKind::File, 30, Some(epoch + Duration::from_secs(3))),
            Candidate::new(root, "a", EntryKind::Dir, 4096, Some(epoch + Duration::from_secs(1))),
            Candidate::new(root, "a/c.log", EntryKind::File, 10, Some(epoch + Duration::from_secs(2))),
        ];
        Results {
            items,
            errors: Vec::new(),
            stats: ScanStats::default(),
        }
    }

    fn names(r: &Results) -> Vec<&str> {
        r.iter().map(Candidate::name).collect()
    }

    #[test]
    fn total_size_skips_directories() {
        assert_eq!(results().total_size(), 40);
    }

    #[test]
    fn sorts_by_each_order() {
        let mut r = results();
        r.sort(SortOrder::Name);
        assert_eq!(names(&r), ["a", "b.txt", "c.log"]);
        r.sort(SortOrder::Size);
        assert_eq!(names(&r), ["c.log", "b.txt", "a"]);
        r.sort(SortOrder::Modified);
        assert_eq!(names(&r), ["a", "c.log", "b.txt"]);
        r.sort(SortOrder::Extension);
        assert_eq!(names(&r), ["a", "c.log", "b.txt"]);
        r.sort(SortOrder::Path);
        assert_eq!(names(&r), ["a", "c.log", "b.txt"]);
    }

    #[test]
    fn string_paths_include_root() {
        let mut r = results();
        r.sort(SortOrder::Path);
        let expected: Vec<String> = ["a", "a/c.log", "b.txt"]
            .iter()
            .map(|p| Path::new("fixtures").join(p).display().to_string())
            .collect();
        assert_eq!(r.to_string_vec(), expected);
        assert!(r.is_ok());
    }
}
