use std::io;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::driver;
use crate::engine::Engine;
use crate::entry::Candidate;
use crate::error::{FinderError, SetupError};
use crate::traits::{WalkOptions, Walker};

/// Candidates buffered between the walk thread and the consumer.
const BUFFER: usize = 32;

/// Streaming results from [`Finder::iter`](crate::Finder::iter).
///
/// A single producer thread walks the roots and feeds accepted candidates
/// through a bounded channel. Dropping the iterator early (or calling
/// [`finish`](FindIter::finish)) stops the walk before its next entry and
/// joins the thread.
pub struct FindIter {
    rx: Option<Receiver<Candidate>>,
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<Vec<FinderError>>>,
    errors: Vec<FinderError>,
}

pub(crate) struct StreamJob {
    pub roots: Vec<PathBuf>,
    pub engine: Arc<Engine>,
    pub walker: Arc<dyn Walker>,
    pub options: WalkOptions,
    pub setup_errors: Vec<SetupError>,
}

impl FindIter {
    pub(crate) fn spawn(job: StreamJob) -> Self {
        let (tx, rx) = mpsc::sync_channel(BUFFER);
        let cancel = Arc::new(AtomicBool::new(false));
        let producer_cancel = Arc::clone(&cancel);
        let StreamJob {
            roots,
            engine,
            walker,
            options,
            setup_errors,
        } = job;
        let producer_setup_errors = setup_errors.clone();

        let spawned = thread::Builder::new()
            .name("treefind-walk".into())
            .spawn(move || {
                let traversal = driver::run(
                    &roots,
                    &engine,
                    walker.as_ref(),
                    &options,
                    &|| producer_cancel.load(Ordering::Relaxed),
                    &mut |candidate: Candidate| match tx.send(candidate) {
                        Ok(()) => ControlFlow::Continue(()),
                        Err(_) => ControlFlow::Break(()),
                    },
                );

                producer_setup_errors
                    .into_iter()
                    .map(FinderError::from)
                    .chain(traversal.errors.into_iter().map(FinderError::from))
                    .collect::<Vec<_>>()
            });

        match spawned {
            Ok(handle) => Self {
                rx: Some(rx),
                cancel,
                handle: Some(handle),
                errors: Vec::new(),
            },
            Err(e) => Self::spawn_failed(setup_errors, e),
        }
    }

    fn spawn_failed(setup_errors: Vec<SetupError>, e: io::Error) -> Self {
        tracing::warn!(error = %e, "failed to spawn walk thread");
        Self {
            rx: None,
            cancel: Arc::new(AtomicBool::new(true)),
            handle: None,
            errors: setup_errors
                .into_iter()
                .map(FinderError::from)
                .chain(std::iter::once(FinderError::Spawn(e)))
                .collect(),
        }
    }

    /// Stop the walk if it is still running and return every error recorded,
    /// setup errors first.
    pub fn finish(mut self) -> Vec<FinderError> {
        self.shutdown();
        std::mem::take(&mut self.errors)
    }

    fn shutdown(&mut self) {
        // The flag stops the walk at its next entry; closing the receiver
        // unblocks a producer waiting on a full buffer.
        self.cancel.store(true, Ordering::Relaxed);
        self.rx.take();
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(errors) => self.errors.extend(errors),
                Err(_) => tracing::warn!("walk thread panicked"),
            }
        }
    }
}

impl Iterator for FindIter {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        self.rx.as_ref()?.recv().ok()
    }
}

impl Drop for FindIter {
    fn drop(&mut self) {
        self.shutdown();
    }
}
