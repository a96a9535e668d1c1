//! Error types.
//!
//! Configuration problems are reported by [`ConfigError`] when a
//! [`BreakpointBuilder`](crate::BreakpointBuilder) is built, before any run starts.
//! Failures during a run are reported by [`RunError`]; the most important one carries
//! the [`Abort`] a reporter raised to stop the run.

use std::{error::Error, fmt};

use compact_str::CompactString;

use crate::telemetry::{Snapshot, Telemetry};

/// Invalid driver configuration.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The target interval between checkpoints is zero, negative or not finite.
    #[error("target interval must be a positive, finite number of seconds, got {0}")]
    InvalidTargetInterval(f64),
}

/// A reporter's request to stop a run because something is wrong.
///
/// Carries the telemetry of the checkpoint at which the reporter gave up, so the caller
/// can inspect how far the run got and the last partial result.
#[derive(Clone, Debug, PartialEq)]
pub struct Abort<T> {
    reason: CompactString,
    snapshot: Snapshot<T>,
}

impl<T> Abort<T> {
    /// Builds an abort from the telemetry of the current checkpoint.
    pub fn new<A: ?Sized>(
        reason: impl Into<CompactString>,
        telemetry: &Telemetry<'_, T, A>,
    ) -> Self
    where
        T: Clone,
    {
        Self::from_snapshot(reason, telemetry.snapshot())
    }

    /// Builds an abort from an already captured snapshot.
    pub fn from_snapshot(reason: impl Into<CompactString>, snapshot: Snapshot<T>) -> Self {
        Self {
            reason: reason.into(),
            snapshot,
        }
    }

    /// Why the run was aborted.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// The telemetry at the point of the abort.
    #[must_use]
    pub const fn snapshot(&self) -> &Snapshot<T> {
        &self.snapshot
    }

    /// Consumes the abort, returning its snapshot.
    pub fn into_snapshot(self) -> Snapshot<T> {
        self.snapshot
    }
}

impl<T> fmt::Display for Abort<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (checkpoint {}, {:.3}s elapsed, remaining {})",
            self.reason,
            self.snapshot.step(),
            self.snapshot.elapsed().as_secs_f64(),
            self.snapshot.remaining()
        )
    }
}

impl<T: fmt::Debug> Error for Abort<T> {}

/// A run that did not produce a value.
#[derive(Debug, thiserror::Error)]
pub enum RunError<T> {
    /// The reporter aborted the run.
    #[error("run aborted: {0}")]
    Aborted(Abort<T>),

    /// Progress reporting is enabled but a checkpoint carried no progress value.
    #[error("checkpoint {step} carried no progress value")]
    MissingProgress {
        /// Index of the offending checkpoint.
        step: usize,
    },

    /// The computation finished without ever yielding a value.
    #[error("computation finished without producing a value")]
    Empty,
}

impl<T> RunError<T> {
    /// Returns the abort, if the run was aborted by its reporter.
    #[must_use]
    pub const fn as_abort(&self) -> Option<&Abort<T>> {
        match self {
            Self::Aborted(abort) => Some(abort),
            Self::MissingProgress { .. } | Self::Empty => None,
        }
    }
}

impl<T> From<Abort<T>> for RunError<T> {
    fn from(abort: Abort<T>) -> Self {
        Self::Aborted(abort)
    }
}
