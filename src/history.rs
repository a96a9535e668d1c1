//! Recording reporters.
//!
//! Reporters are created fresh for every run, so their state is gone once the run
//! ends. A [`History`] is a shared, cheaply clonable log that outlives runs: hand a
//! [`Recorder`] (from [`History::recorder`]) to the driver through the reporter factory
//! and read the collected [`Snapshot`]s back from the `History` afterwards.
//!
//! # Synchronization Strategy
//!
//! The log is an `Arc<Mutex<Vec<_>>>`. A recorder takes the lock once per checkpoint to
//! append; readers take it once to clone the list.

use std::{fmt, sync::Arc, time::Duration};

use parking_lot::Mutex;

use crate::{
    error::Abort,
    reporter::{Flow, Reporter},
    telemetry::{Snapshot, Telemetry},
};

/// A thread-safe, shared-clonable log of checkpoint snapshots.
pub struct History<T> {
    inner: Arc<Mutex<Vec<Snapshot<T>>>>,
}

impl<T> Clone for History<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T> fmt::Debug for History<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("count", &self.len())
            .finish()
    }
}

impl<T> History<T> {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a reporter appending to this history.
    #[must_use]
    pub fn recorder(&self) -> Recorder<T> {
        Recorder {
            history: self.clone(),
        }
    }

    /// Appends a snapshot.
    pub fn push(&self, snapshot: Snapshot<T>) {
        self.inner.lock().push(snapshot);
    }

    /// Returns a copy of every recorded snapshot, oldest first.
    #[must_use]
    pub fn snapshots(&self) -> Vec<Snapshot<T>>
    where
        T: Clone,
    {
        self.inner.lock().clone()
    }

    /// Returns the partial results of every recorded checkpoint.
    #[must_use]
    pub fn partial_results(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.inner
            .lock()
            .iter()
            .map(|snapshot| snapshot.partial_result().clone())
            .collect()
    }

    /// Returns the progress values of every recorded checkpoint.
    #[must_use]
    pub fn progress(&self) -> Vec<Option<f64>> {
        self.inner.lock().iter().map(Snapshot::progress).collect()
    }

    /// Returns the elapsed time of every recorded checkpoint.
    #[must_use]
    pub fn elapsed(&self) -> Vec<Duration> {
        self.inner.lock().iter().map(Snapshot::elapsed).collect()
    }

    /// Returns the wall-clock intervals between consecutive checkpoints.
    ///
    /// Snapshots from different runs should not be mixed: the first checkpoint of each
    /// run restarts the elapsed clock at zero, which shows up here as a zero interval.
    #[must_use]
    pub fn elapsed_deltas(&self) -> Vec<Duration> {
        self.elapsed()
            .windows(2)
            .map(|pair| pair[1].saturating_sub(pair[0]))
            .collect()
    }

    /// Removes every snapshot.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Returns the number of recorded snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

/// A reporter that appends a [`Snapshot`] of every checkpoint to a [`History`].
pub struct Recorder<T> {
    history: History<T>,
}

impl<T> fmt::Debug for Recorder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("history", &self.history)
            .finish()
    }
}

impl<T: Clone, A: ?Sized> Reporter<T, A> for Recorder<T> {
    fn on_yield(&mut self, telemetry: &Telemetry<'_, T, A>) -> Result<Flow<T>, Abort<T>> {
        self.history.push(telemetry.snapshot());
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::History;
    use crate::{
        reporter::{Flow, Reporter},
        telemetry::{Remaining, Telemetry},
    };

    fn record(history: &History<&'static str>, secs: u64, partial: &'static str) {
        let telemetry = Telemetry {
            step: history.len(),
            progress: None,
            elapsed: Duration::from_secs(secs),
            remaining: Remaining::Undefined,
            partial: &partial,
            args: &(),
        };
        assert_eq!(history.recorder().on_yield(&telemetry), Ok(Flow::Continue));
    }

    /// Shared Log
    /// Recorders and clones all append to the same underlying list.
    #[test]
    fn test_recorders_share_history() {
        let history = History::new();
        let reader = history.clone();
        assert!(reader.is_empty());

        record(&history, 0, "a");
        record(&history, 1, "b");
        record(&history, 3, "c");

        assert_eq!(reader.len(), 3);
        assert_eq!(reader.partial_results(), vec!["a", "b", "c"]);
        assert_eq!(reader.progress(), vec![None, None, None]);
        assert_eq!(
            reader.elapsed_deltas(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
        assert_eq!(reader.snapshots()[2].step(), 2);

        history.clear();
        assert!(reader.is_empty());
        assert!(reader.elapsed_deltas().is_empty());
    }
}
