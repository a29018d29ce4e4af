use std::path::Path;

use walkdir::{DirEntry, WalkDir};

use crate::entry::EntryKind;
use crate::error::TraversalError;
use crate::traits::{WalkDecision, WalkEntry, WalkOptions, Walker};

/// The default [`Walker`]: a sequential, depth-first filesystem walk.
///
/// Siblings are visited in file-name order so results are stable across
/// platforms and runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWalker;

impl Walker for FsWalker {
    fn walk(
        &self,
        root: &Path,
        options: &WalkOptions,
        visit: &mut dyn FnMut(Result<WalkEntry, TraversalError>) -> WalkDecision,
    ) -> Result<(), TraversalError> {
        // A root we cannot stat is fatal for this root only.
        std::fs::metadata(root).map_err(|e| TraversalError::from_io(root, e))?;

        let mut walk = WalkDir::new(root)
            .follow_links(options.follow_links)
            .sort_by_file_name();
        if let Some(depth) = options.max_depth {
            walk = walk.max_depth(depth);
        }

        let mut it = walk.into_iter();
        while let Some(res) = it.next() {
            let (decision, is_dir) = match res.map_err(map_walkdir_error).and_then(to_walk_entry) {
                Ok(entry) => {
                    let is_dir = entry.kind.is_dir();
                    (visit(Ok(entry)), is_dir)
                }
                Err(err) => (visit(Err(err)), false),
            };

            match decision {
                WalkDecision::Continue => {}
                // skip_current_dir() acts on the last yielded directory, so it
                // must never be called for a file.
                WalkDecision::SkipSubtree if is_dir => it.skip_current_dir(),
                WalkDecision::SkipSubtree => {}
                WalkDecision::Abort => break,
            }
        }

        Ok(())
    }
}

fn to_walk_entry(entry: DirEntry) -> Result<WalkEntry, TraversalError> {
    let metadata = entry.metadata().map_err(map_walkdir_error)?;

    let ft = entry.file_type();
    let kind = if ft.is_dir() {
        EntryKind::Dir
    } else if ft.is_file() {
        EntryKind::File
    } else if ft.is_symlink() {
        EntryKind::Symlink
    } else {
        EntryKind::Other
    };

    Ok(WalkEntry {
        path: entry.into_path(),
        kind,
        size: metadata.len(),
        modified: metadata.modified().ok(),
    })
}

// ---------------------------------------------------------------------------
// Map walkdir::Error to TraversalError
// ---------------------------------------------------------------------------

fn map_walkdir_error(e: walkdir::Error) -> TraversalError {
    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
    if e.loop_ancestor().is_some() {
        return TraversalError::SymlinkLoop(path);
    }

    let message = e.to_string();
    match e.into_io_error() {
        Some(io_err) => TraversalError::from_io(path, io_err),
        None => TraversalError::Walk(message),
    }
}
