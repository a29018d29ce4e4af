//! # treefind
//!
//! Fluent file and directory finder with subtree pruning.
//!
//! treefind walks one or more roots depth-first and yields the entries that
//! pass a set of filters assembled with a [`Finder`]: name and path globs,
//! name regexes, size and depth ranges, file/directory type, and arbitrary
//! closures. Filters that can rule out a whole directory (depth bounds, path
//! includes and excludes) are evaluated before the rest, so excluded subtrees
//! are never read from disk.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! let results = treefind::finder()
//!     .root("test-fixtures")
//!     .ignore_vcs()
//!     .files()
//!     .size(1, None)
//!     .find();
//!
//! assert!(results.is_ok(), "{:?}", results.errors);
//! for item in &results {
//!     println!("{} ({} bytes)", item.rel_path().display(), item.size());
//! }
//! ```
//!
//! # Errors
//!
//! Nothing here returns `Err`. Patterns that fail to compile are recorded as
//! [`SetupError`]s and dropped; I/O failures during the walk are recorded as
//! [`TraversalError`]s and the walk moves on. Both end up, setup errors first,
//! in [`Results::errors`] or the vector returned by [`Finder::each`].
//!
//! # Custom Walkers
//!
//! Implement [`Walker`] to search something other than the local filesystem,
//! or to instrument the walk:
//!
//! ```rust
//! use std::path::Path;
//! use treefind::{EntryKind, TraversalError, WalkDecision, WalkEntry, WalkOptions, Walker};
//!
//! struct Flat(Vec<&'static str>);
//!
//! impl Walker for Flat {
//!     fn walk(
//!         &self,
//!         root: &Path,
//!         _options: &WalkOptions,
//!         visit: &mut dyn FnMut(Result<WalkEntry, TraversalError>) -> WalkDecision,
//!     ) -> Result<(), TraversalError> {
//!         let entries = std::iter::once(root.to_path_buf())
//!             .chain(self.0.iter().map(|name| root.join(name)));
//!         for path in entries {
//!             let kind = if path == root { EntryKind::Dir } else { EntryKind::File };
//!             let entry = WalkEntry { path, kind, size: 0, modified: None };
//!             if visit(Ok(entry)) == WalkDecision::Abort {
//!                 break;
//!             }
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let results = treefind::finder()
//!     .root("inbox")
//!     .walker(Flat(vec!["invoice_jan.txt", "invoice_feb.txt", "report.txt"]))
//!     .name("invoice_*")
//!     .find();
//!
//! assert_eq!(results.len(), 2);
//! ```

#![forbid(unsafe_code)]

mod builder;
mod driver;
mod engine;
mod entry;
mod error;
mod matchers;
mod results;
mod stream;
mod traits;
mod walker;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::Finder;
pub use engine::{Engine, EntryType, Verdict};
pub use entry::{Candidate, EntryKind};
pub use error::{FinderError, SetupError, TraversalError};
pub use results::{Results, ScanStats, SortOrder};
pub use stream::FindIter;
pub use traits::{Predicate, WalkDecision, WalkEntry, WalkOptions, Walker};
pub use walker::FsWalker;

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`Finder`] to configure and run a search.
///
/// By default both files and directories are returned.
pub fn finder() -> Finder {
    Finder::new()
}
