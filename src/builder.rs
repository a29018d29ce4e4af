use std::fmt;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Arc;

use crate::driver;
use crate::engine::{Engine, EntryType};
use crate::entry::Candidate;
use crate::error::{FinderError, SetupError};
use crate::matchers::{DepthRange, DotEntry, NameGlob, NameRegex, PathGlob, SizeRange, VcsDir};
use crate::results::Results;
use crate::stream::{FindIter, StreamJob};
use crate::traits::{Predicate, WalkOptions, Walker};
use crate::walker::FsWalker;

// ---------------------------------------------------------------------------
// Finder
// ---------------------------------------------------------------------------

/// Entry point for configuring and running a find.
///
/// Created via [`treefind::finder()`](crate::finder) or [`Finder::new`].
/// Configure with chained builder methods, then call [`find()`](Finder::find),
/// [`each()`](Finder::each) or [`iter()`](Finder::iter). Running never
/// mutates the configuration, so the same finder can be run repeatedly.
///
/// A pattern that fails to compile is recorded in [`errors()`](Finder::errors)
/// and left out; the remaining filters still apply.
///
/// # Example
///
/// ```rust,no_run
/// let results = treefind::finder()
///     .root("src")
///     .files()
///     .name("*.rs")
///     .not_path("target")
///     .find();
///
/// for item in &results {
///     println!("{}", item.rel_path().display());
/// }
/// ```
pub struct Finder {
    roots: Vec<PathBuf>,
    engine: Arc<Engine>,
    errors: Vec<SetupError>,
    walker: Arc<dyn Walker>,
    follow_links: bool,
}

impl Default for Finder {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            engine: Arc::new(Engine::default()),
            errors: Vec::new(),
            walker: Arc::new(FsWalker),
            follow_links: false,
        }
    }
}

impl Finder {
    /// An empty configuration: no roots, files and directories both accepted.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Roots ─────────────────────────────────────────────────────────────

    /// Search in `dir`. Roots are walked in the order they were added.
    pub fn root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.roots.push(dir.into());
        self
    }

    /// Search in each of `dirs`.
    pub fn roots<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.roots.extend(dirs.into_iter().map(Into::into));
        self
    }

    // ── Paths ─────────────────────────────────────────────────────────────

    /// Only search beneath directories matching the glob.
    ///
    /// Directories are matched on their root-relative path, files on the
    /// path of the directory containing them. Directories that cannot lead
    /// to a match are not descended into. A trailing `/` is ignored.
    pub fn path(mut self, glob: &str) -> Self {
        if let Some(p) = self.record(PathGlob::new(glob)) {
            self.engine_mut().add_path(p);
        }
        self
    }

    /// Exclude directories matching the glob, and everything inside them.
    pub fn not_path(mut self, glob: &str) -> Self {
        if let Some(p) = self.record(PathGlob::new(glob)) {
            self.engine_mut().add_not_path(Arc::new(p));
        }
        self
    }

    /// Skip directories used by common version control systems.
    pub fn ignore_vcs(mut self) -> Self {
        self.engine_mut().add_not_path(Arc::new(VcsDir));
        self
    }

    /// Skip files and directories whose name starts with a dot.
    pub fn ignore_dots(mut self) -> Self {
        self.engine_mut().add_not_path(Arc::new(DotEntry));
        self
    }

    // ── Names ─────────────────────────────────────────────────────────────

    /// Match the base name against a glob. Multiple name filters are OR'd.
    pub fn name(mut self, glob: &str) -> Self {
        if let Some(p) = self.record(NameGlob::new(glob)) {
            self.engine_mut().add_name(Arc::new(p));
        }
        self
    }

    /// Match the base name against a regular expression.
    pub fn name_regex(mut self, re: &str) -> Self {
        if let Some(p) = self.record(NameRegex::new(re)) {
            self.engine_mut().add_name(Arc::new(p));
        }
        self
    }

    /// Exclude entries whose base name matches the glob.
    pub fn not_name(mut self, glob: &str) -> Self {
        if let Some(p) = self.record(NameGlob::new(glob)) {
            self.engine_mut().add_not_name(Arc::new(p));
        }
        self
    }

    /// Exclude entries whose base name matches the regular expression.
    pub fn not_name_regex(mut self, re: &str) -> Self {
        if let Some(p) = self.record(NameRegex::new(re)) {
            self.engine_mut().add_not_name(Arc::new(p));
        }
        self
    }

    // ── Types and ranges ──────────────────────────────────────────────────

    /// Return files only.
    pub fn files(mut self) -> Self {
        self.engine_mut().set_entry_type(EntryType::Files);
        self
    }

    /// Return directories only.
    pub fn dirs(mut self) -> Self {
        self.engine_mut().set_entry_type(EntryType::Dirs);
        self
    }

    /// Filter on depth below the root, where direct children are depth 1.
    /// `max` is ignored when it is `None` or lower than `min`.
    ///
    /// ```text
    /// depth(1, Some(1))  // direct children only
    /// depth(2, None)     // anything deeper than that
    /// ```
    pub fn depth(mut self, min: usize, max: Option<usize>) -> Self {
        self.engine_mut().add_depth(DepthRange::new(min, max));
        self
    }

    /// Filter on size in bytes, inclusive. `max` is ignored when it is `None`
    /// or lower than `min`.
    ///
    /// ```text
    /// size(0, Some(1024))     // <= 1kB
    /// size(1024, Some(1024))  // == 1kB
    /// size(1024, None)        // >= 1kB
    /// ```
    pub fn size(mut self, min: u64, max: Option<u64>) -> Self {
        self.engine_mut().add_size(SizeRange::new(min, max));
        self
    }

    // ── Custom ────────────────────────────────────────────────────────────

    /// Filter with a closure. Multiple custom filters are OR'd.
    pub fn filter<F>(self, f: F) -> Self
    where
        F: Fn(&Candidate) -> bool + Send + Sync + 'static,
    {
        self.with_predicate(f)
    }

    /// Filter with any [`Predicate`] implementation.
    pub fn with_predicate(mut self, p: impl Predicate + 'static) -> Self {
        self.engine_mut().add_custom(Arc::new(p));
        self
    }

    // ── Walk options ──────────────────────────────────────────────────────

    /// Follow symbolic links into directories. Off by default.
    pub fn follow_links(mut self, yes: bool) -> Self {
        self.follow_links = yes;
        self
    }

    /// Replace the walk primitive. Defaults to [`FsWalker`].
    pub fn walker(mut self, w: impl Walker + 'static) -> Self {
        self.walker = Arc::new(w);
        self
    }

    // ── Inspect ───────────────────────────────────────────────────────────

    /// Setup errors recorded so far, in the order the patterns were added.
    pub fn errors(&self) -> &[SetupError] {
        &self.errors
    }

    /// The assembled predicate engine.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Call `f` with every accepted entry, in traversal order.
    ///
    /// Returns setup errors followed by traversal errors; an empty vector
    /// means success.
    pub fn each<F>(&self, mut f: F) -> Vec<FinderError>
    where
        F: FnMut(Candidate),
    {
        let traversal = driver::run(
            &self.roots,
            &self.engine,
            self.walker.as_ref(),
            &self.walk_options(),
            &|| false,
            &mut |candidate: Candidate| {
                f(candidate);
                ControlFlow::Continue(())
            },
        );

        self.setup_errors()
            .chain(traversal.errors.into_iter().map(FinderError::from))
            .collect()
    }

    /// Run the find and collect everything into [`Results`].
    pub fn find(&self) -> Results {
        let mut items = Vec::new();
        let traversal = driver::run(
            &self.roots,
            &self.engine,
            self.walker.as_ref(),
            &self.walk_options(),
            &|| false,
            &mut |candidate: Candidate| {
                items.push(candidate);
                ControlFlow::Continue(())
            },
        );

        Results {
            items,
            errors: self
                .setup_errors()
                .chain(traversal.errors.into_iter().map(FinderError::from))
                .collect(),
            stats: traversal.stats,
        }
    }

    /// Stream accepted entries from a background walk.
    ///
    /// See [`FindIter`] for buffering and cancellation behaviour.
    pub fn iter(&self) -> FindIter {
        FindIter::spawn(StreamJob {
            roots: self.roots.clone(),
            engine: Arc::clone(&self.engine),
            walker: Arc::clone(&self.walker),
            options: self.walk_options(),
            setup_errors: self.errors.clone(),
        })
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn engine_mut(&mut self) -> &mut Engine {
        Arc::make_mut(&mut self.engine)
    }

    fn record<T>(&mut self, compiled: Result<T, SetupError>) -> Option<T> {
        match compiled {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!(pattern = e.pattern(), error = %e, "skipping invalid pattern");
                self.errors.push(e);
                None
            }
        }
    }

    fn setup_errors(&self) -> impl Iterator<Item = FinderError> + '_ {
        self.errors.iter().cloned().map(FinderError::from)
    }

    fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            max_depth: self.engine.max_depth(),
            follow_links: self.follow_links,
        }
    }
}

impl fmt::Debug for Finder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Finder")
            .field("roots", &self.roots)
            .field("engine", &self.engine)
            .field("errors", &self.errors)
            .field("walker", &"...")
            .field("follow_links", &self.follow_links)
            .finish()
    }
}
