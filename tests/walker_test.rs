use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use treefind::{
    finder, EntryKind, FinderError, TraversalError, WalkDecision, WalkEntry, WalkOptions, Walker,
};

// ---------------------------------------------------------------------------
// In-memory walker
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum Node {
    Dir,
    File(u64),
    /// Reported to the visitor as a permission error.
    Unreadable,
}

/// Walks a fixed pre-ordered list of relative paths and records every entry
/// it hands to the visitor.
#[derive(Clone)]
struct MemWalker {
    nodes: Vec<(&'static str, Node)>,
    missing_roots: Vec<PathBuf>,
    honour_max_depth: bool,
    visited: Arc<Mutex<Vec<String>>>,
}

impl MemWalker {
    fn new(nodes: &[(&'static str, Node)]) -> Self {
        Self {
            nodes: nodes.to_vec(),
            missing_roots: Vec::new(),
            honour_max_depth: true,
            visited: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn ignoring_max_depth(mut self) -> Self {
        self.honour_max_depth = false;
        self
    }

    fn missing(mut self, root: &str) -> Self {
        self.missing_roots.push(PathBuf::from(root));
        self
    }

    fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }
}

fn depth_of(rel: &str) -> usize {
    rel.split('/').count()
}

impl Walker for MemWalker {
    fn walk(
        &self,
        root: &Path,
        options: &WalkOptions,
        visit: &mut dyn FnMut(Result<WalkEntry, TraversalError>) -> WalkDecision,
    ) -> Result<(), TraversalError> {
        if self.missing_roots.iter().any(|r| r == root) {
            return Err(TraversalError::NotFound(root.to_path_buf()));
        }

        let root_entry = WalkEntry {
            path: root.to_path_buf(),
            kind: EntryKind::Dir,
            size: 0,
            modified: None,
        };
        if visit(Ok(root_entry)) == WalkDecision::Abort {
            return Ok(());
        }

        let mut skipped: Vec<String> = Vec::new();
        for (rel, node) in &self.nodes {
            if skipped.iter().any(|s| rel.starts_with(&format!("{s}/"))) {
                continue;
            }
            if self.honour_max_depth && options.max_depth.is_some_and(|m| depth_of(rel) > m) {
                continue;
            }

            self.visited.lock().unwrap().push(rel.to_string());

            let path = root.join(rel);
            let res = match node {
                Node::Dir => Ok(WalkEntry { path, kind: EntryKind::Dir, size: 0, modified: None }),
                Node::File(size) => Ok(WalkEntry { path, kind: EntryKind::File, size: *size, modified: None }),
                Node::Unreadable => Err(TraversalError::PermissionDenied(path)),
            };
            let is_dir = matches!(node, Node::Dir);

            match visit(res) {
                WalkDecision::Continue => {}
                WalkDecision::SkipSubtree if is_dir => skipped.push(rel.to_string()),
                WalkDecision::SkipSubtree => {}
                WalkDecision::Abort => break,
            }
        }
        Ok(())
    }
}

fn deep_tree() -> MemWalker {
    MemWalker::new(&[
        ("a", Node::Dir),
        ("a/b", Node::Dir),
        ("a/b/c", Node::Dir),
        ("a/b/c/d.txt", Node::File(4)),
        ("a/b/x.txt", Node::File(3)),
        ("e.txt", Node::File(1)),
    ])
}

fn rels(walker: MemWalker, f: treefind::Finder) -> BTreeSet<String> {
    let results = f.walker(walker).find();
    assert!(results.is_ok(), "{:?}", results.errors);
    results.iter().map(|c| c.match_path().to_string()).collect()
}

fn set(paths: &[&str]) -> BTreeSet<String> {
    paths.iter().map(|p| p.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Pruning
// ---------------------------------------------------------------------------

#[test]
fn depth_bound_is_passed_to_the_walker() {
    let walker = deep_tree();
    let got = rels(walker.clone(), finder().root("r").depth(1, Some(2)));

    assert_eq!(got, set(&["a", "a/b", "e.txt"]));
    assert!(walker.visited().iter().all(|rel| depth_of(rel) <= 2));
}

#[test]
fn depth_bound_prunes_when_walker_ignores_the_hint() {
    let walker = deep_tree().ignoring_max_depth();
    let results = finder().root("r").depth(1, Some(2)).walker(walker.clone()).find();

    let got: BTreeSet<String> = results.iter().map(|c| c.match_path().to_string()).collect();
    assert_eq!(got, set(&["a", "a/b", "e.txt"]));

    let visited = walker.visited();
    assert!(visited.contains(&"a/b/c".to_string()));
    assert!(!visited.contains(&"a/b/c/d.txt".to_string()));
    assert_eq!(results.stats.pruned, 2);
}

#[test]
fn unbounded_depth_range_walks_everything() {
    let walker = deep_tree();
    let got = rels(walker.clone(), finder().root("r").depth(3, Some(1)));
    assert_eq!(got, set(&["a/b/c", "a/b/c/d.txt", "a/b/x.txt"]));
    assert_eq!(walker.visited().len(), 6);
}

#[test]
fn not_path_never_descends_into_excluded_directory() {
    let walker = deep_tree();
    let got = rels(walker.clone(), finder().root("r").not_path("a"));

    assert_eq!(got, set(&["e.txt"]));
    assert_eq!(walker.visited(), ["a", "e.txt"]);
}

#[test]
fn path_include_skips_unrelated_subtrees() {
    let walker = MemWalker::new(&[
        ("D", Node::Dir),
        ("D/a", Node::File(1)),
        ("D/sub", Node::Dir),
        ("D/sub/b", Node::File(1)),
        ("other", Node::Dir),
        ("other/c", Node::File(1)),
    ]);
    let got = rels(walker.clone(), finder().root("r").path("D"));

    assert_eq!(got, set(&["D", "D/a", "D/sub", "D/sub/b"]));
    assert!(!walker.visited().contains(&"other/c".to_string()));
}

#[test]
fn path_include_descends_through_ancestors_of_a_match() {
    let walker = deep_tree();
    let got = rels(walker.clone(), finder().root("r").path("a/b/c"));

    assert_eq!(got, set(&["a/b/c", "a/b/c/d.txt"]));
    assert_eq!(walker.visited().len(), 6);
}

#[test]
fn type_filter_does_not_prune() {
    let walker = deep_tree();
    let got = rels(walker.clone(), finder().root("r").files());

    assert_eq!(got, set(&["a/b/c/d.txt", "a/b/x.txt", "e.txt"]));
    assert_eq!(walker.visited().len(), 6);
}

#[test]
fn name_mismatch_does_not_prune() {
    let walker = deep_tree();
    let got = rels(walker.clone(), finder().root("r").name("d.txt"));

    assert_eq!(got, set(&["a/b/c/d.txt"]));
    assert_eq!(walker.visited().len(), 6);
}

#[test]
fn size_filter_applies_or_semantics() {
    let got = rels(
        deep_tree(),
        finder().root("r").files().size(4, Some(4)).size(1, Some(1)),
    );
    assert_eq!(got, set(&["a/b/c/d.txt", "e.txt"]));
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn entry_errors_are_collected_and_walk_continues() {
    let walker = MemWalker::new(&[
        ("locked", Node::Unreadable),
        ("open.txt", Node::File(2)),
    ]);
    let results = finder().root("r").walker(walker).find();

    assert_eq!(results.len(), 1);
    assert_eq!(results.errors.len(), 1);
    assert!(matches!(
        results.errors[0],
        FinderError::Traversal(TraversalError::PermissionDenied(_))
    ));
    assert_eq!(results.errors[0].path(), Some(Path::new("r/locked")));
}

#[test]
fn setup_errors_precede_traversal_errors() {
    let walker = deep_tree().missing("gone");
    let results = finder()
        .root("gone")
        .root("r")
        .not_name("[")
        .name("*.txt")
        .walker(walker)
        .find();

    assert_eq!(results.errors.len(), 2);
    assert!(results.errors[0].is_setup());
    assert!(matches!(
        results.errors[1],
        FinderError::Traversal(TraversalError::NotFound(_))
    ));
    assert_eq!(results.len(), 3);
}

#[test]
fn each_reports_errors_for_the_run() {
    let walker = deep_tree().missing("gone");
    let f = finder().root("gone").walker(walker);

    let mut count = 0;
    let errors = f.each(|_| count += 1);
    assert_eq!(count, 0);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path(), Some(Path::new("gone")));
}

// ---------------------------------------------------------------------------
// Streaming cancellation
// ---------------------------------------------------------------------------

/// Yields one `hit` file followed by `misses` files that match nothing.
/// After the first entry it waits for `gate` so the consumer can stop first.
struct HitThenMisses {
    misses: usize,
    gate: Mutex<Receiver<()>>,
    visited: Arc<AtomicUsize>,
}

impl Walker for HitThenMisses {
    fn walk(
        &self,
        root: &Path,
        _options: &WalkOptions,
        visit: &mut dyn FnMut(Result<WalkEntry, TraversalError>) -> WalkDecision,
    ) -> Result<(), TraversalError> {
        let names = std::iter::once("hit".to_string()).chain((0..self.misses).map(|i| format!("miss{i}")));
        for (i, name) in names.enumerate() {
            if i == 1 {
                let _ = self.gate.lock().unwrap().recv();
            }
            self.visited.fetch_add(1, Ordering::SeqCst);
            let entry = WalkEntry { path: root.join(name), kind: EntryKind::File, size: 0, modified: None };
            if visit(Ok(entry)) == WalkDecision::Abort {
                break;
            }
        }
        Ok(())
    }
}

fn hit_then_misses(misses: usize) -> (HitThenMisses, Arc<AtomicUsize>, mpsc::Sender<()>) {
    let (open, gate) = mpsc::channel();
    let visited = Arc::new(AtomicUsize::new(0));
    let walker = HitThenMisses { misses, gate: Mutex::new(gate), visited: Arc::clone(&visited) };
    (walker, visited, open)
}

/// Opens the gate once the consumer has had time to start shutting down.
fn open_later(open: mpsc::Sender<()>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        let _ = open.send(());
    })
}

#[test]
fn dropping_iter_stops_walk_without_further_matches() {
    let (walker, visited, open) = hit_then_misses(100_000);
    let mut it = finder().root("r").name("hit").walker(walker).iter();

    assert_eq!(it.next().map(|c| c.name().to_string()), Some("hit".to_string()));
    let opener = open_later(open);
    drop(it);
    opener.join().unwrap();

    assert!(visited.load(Ordering::SeqCst) <= 2, "walked {} entries", visited.load(Ordering::SeqCst));
}

#[test]
fn finish_stops_walk_without_further_matches() {
    let (walker, visited, open) = hit_then_misses(100_000);
    let mut it = finder().root("r").root("r2").name("hit").walker(walker).iter();

    assert!(it.next().is_some());
    let opener = open_later(open);
    let errors = it.finish();
    opener.join().unwrap();

    assert!(errors.is_empty(), "{errors:?}");
    assert!(visited.load(Ordering::SeqCst) <= 2, "walked {} entries", visited.load(Ordering::SeqCst));
}
