use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::engine::{Engine, Verdict};
use crate::entry::Candidate;
use crate::error::TraversalError;
use crate::results::ScanStats;
use crate::traits::{WalkDecision, WalkEntry, WalkOptions, Walker};

/// Everything a run produced besides the accepted candidates.
pub(crate) struct Traversal {
    pub errors: Vec<TraversalError>,
    pub stats: ScanStats,
}

/// Walk every root in order and feed each entry through the engine.
///
/// Accepted candidates go to `on_accept`; returning `Break` from it aborts the
/// current walk and skips the remaining roots. `cancelled` is polled before
/// every entry and has the same effect. Errors never stop the run: a failed
/// root is recorded and the next one is walked.
pub(crate) fn run(
    roots: &[PathBuf],
    engine: &Engine,
    walker: &dyn Walker,
    options: &WalkOptions,
    cancelled: &dyn Fn() -> bool,
    on_accept: &mut dyn FnMut(Candidate) -> ControlFlow<()>,
) -> Traversal {
    let start = Instant::now();
    let mut errors = Vec::new();
    let mut stats = ScanStats::default();
    let mut stopped = false;

    for root in roots {
        if cancelled() {
            tracing::debug!("run cancelled, abandoning remaining roots");
            break;
        }
        tracing::debug!(root = %root.display(), max_depth = ?options.max_depth, "walking root");

        let result = walker.walk(root, options, &mut |res: Result<WalkEntry, TraversalError>| {
            if cancelled() {
                stopped = true;
                return WalkDecision::Abort;
            }

            let entry = match res {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!(error = %e, "traversal error");
                    errors.push(e);
                    return WalkDecision::Continue;
                }
            };

            let Ok(rel) = entry.path.strip_prefix(root).map(Path::to_path_buf) else {
                errors.push(TraversalError::OutsideRoot(entry.path));
                return WalkDecision::Continue;
            };

            // The root itself is never a candidate.
            if rel.as_os_str().is_empty() {
                return WalkDecision::Continue;
            }

            stats.visited += 1;
            let candidate = Candidate::new(root, rel, entry.kind, entry.size, entry.modified);

            match engine.evaluate(&candidate) {
                Verdict::Accept => {
                    stats.accepted += 1;
                    match on_accept(candidate) {
                        ControlFlow::Continue(()) => WalkDecision::Continue,
                        ControlFlow::Break(()) => {
                            stopped = true;
                            WalkDecision::Abort
                        }
                    }
                }
                Verdict::Reject => WalkDecision::Continue,
                Verdict::PruneSubtree => {
                    tracing::trace!(path = %candidate.rel_path().display(), "pruning subtree");
                    stats.pruned += 1;
                    WalkDecision::SkipSubtree
                }
            }
        });

        if let Err(e) = result {
            tracing::debug!(root = %root.display(), error = %e, "root walk failed");
            errors.push(e);
        }

        if stopped {
            tracing::debug!("consumer stopped, abandoning remaining roots");
            break;
        }
    }

    stats.duration = start.elapsed();
    tracing::debug!(
        visited = stats.visited,
        accepted = stats.accepted,
        pruned = stats.pruned,
        errors = errors.len(),
        "run complete"
    );

    Traversal { errors, stats }
}
