// Chunk: docs/chunks/background_reparse - Off-thread full reparses

//! Background full reparses.
//!
//! The worker owns one thread that receives version-tagged jobs over a
//! crossbeam channel, parses each job's text snapshot, and sends the tree back
//! tagged with the same version. The owning [`TextStorage`](crate::TextStorage)
//! installs a result only if its version is the current one; anything older
//! is discarded.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use markup_kit_buffer::PieceTable;
use markup_kit_syntax::{parse, SyntaxTree};

use crate::error::StorageError;

/// A document version to parse.
#[derive(Debug)]
pub(crate) struct ReparseJob {
    pub(crate) version: u64,
    pub(crate) text: PieceTable,
}

/// A finished parse for one version.
#[derive(Debug)]
pub(crate) struct ReparseResult {
    pub(crate) version: u64,
    pub(crate) tree: SyntaxTree,
}

/// Handle to the reparse thread.
///
/// Dropping the handle closes the job channel; the thread finishes its
/// current parse (if any) and exits. It is not joined.
#[derive(Debug)]
pub(crate) struct ReparseWorker {
    jobs: Sender<ReparseJob>,
    results: Receiver<ReparseResult>,
    _thread: JoinHandle<()>,
}

impl ReparseWorker {
    pub(crate) fn spawn() -> Result<Self, StorageError> {
        let (job_tx, job_rx) = unbounded::<ReparseJob>();
        let (result_tx, result_rx) = unbounded();

        let thread = thread::Builder::new()
            .name("markup-kit-reparse".into())
            .spawn(move || run(job_rx, result_tx))
            .map_err(StorageError::Worker)?;

        Ok(Self {
            jobs: job_tx,
            results: result_rx,
            _thread: thread,
        })
    }

    /// Queues a parse of `text` for `version`. Returns false if the worker
    /// thread is gone.
    pub(crate) fn submit(&self, version: u64, text: PieceTable) -> bool {
        self.jobs.send(ReparseJob { version, text }).is_ok()
    }

    /// Returns the tree for `version` if one arrives within `wait`.
    ///
    /// Results for other versions are discarded on the way.
    pub(crate) fn take_matching(&self, version: u64, wait: Duration) -> Option<SyntaxTree> {
        let deadline = Instant::now() + wait;
        loop {
            let result = if wait.is_zero() {
                self.results.try_recv().ok()?
            } else {
                self.results.recv_deadline(deadline).ok()?
            };
            if result.version == version {
                return Some(result.tree);
            }
            tracing::debug!(
                result_version = result.version,
                current_version = version,
                "discarding stale background reparse"
            );
        }
    }
}

fn run(jobs: Receiver<ReparseJob>, results: Sender<ReparseResult>) {
    while let Ok(mut job) = jobs.recv() {
        // Only the newest queued version can still be installed.
        while let Ok(newer) = jobs.try_recv() {
            tracing::trace!(skipped = job.version, "superseded reparse job");
            job = newer;
        }

        let tree = parse(&job.text);
        tracing::trace!(version = job.version, len = tree.len(), "background reparse done");
        if results
            .send(ReparseResult {
                version: job.version,
                tree,
            })
            .is_err()
        {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_parses_submitted_text() {
        let worker = ReparseWorker::spawn().unwrap();
        let text = PieceTable::from_str("# Title\n\nbody\n");
        assert!(worker.submit(1, text.clone()));

        let tree = worker.take_matching(1, WAIT).unwrap();
        assert!(tree.same_shape(&parse(&text)));
    }

    #[test]
    fn test_older_versions_are_discarded() {
        let worker = ReparseWorker::spawn().unwrap();
        let old = PieceTable::from_str("old\n");
        let new = PieceTable::from_str("# new\n");
        assert!(worker.submit(1, old));
        assert!(worker.submit(2, new.clone()));

        let tree = worker.take_matching(2, WAIT).unwrap();
        assert!(tree.same_shape(&parse(&new)));
        // Version 1 was either skipped by the worker or discarded above.
        assert!(worker.take_matching(1, Duration::from_millis(50)).is_none());
    }

    #[test]
    fn test_nothing_pending_returns_none() {
        let worker = ReparseWorker::spawn().unwrap();
        assert!(worker.take_matching(7, Duration::ZERO).is_none());
    }
}
