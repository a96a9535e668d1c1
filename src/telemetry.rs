//! Per-checkpoint timing data handed to reporters.
//!
//! The driver derives a [`Telemetry`] value at every checkpoint: how far the computation
//! says it is, how long the run has taken so far, and how long it is likely to take
//! still. Telemetry borrows the partial result and the call arguments, so it only lives
//! for the duration of one reporter call; use [`Telemetry::snapshot`] to keep an owned
//! copy (for example inside an [`Abort`](crate::Abort)).

use std::{fmt, time::Duration};

/// Estimated time to completion.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "rkyv",
    derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "rkyv", rkyv(derive(Debug)))]
pub enum Remaining {
    /// No estimate can be made: progress is unknown or out of range, or this is the
    /// first checkpoint of the run.
    #[default]
    Undefined,
    /// The computation has made no progress yet, so completion is infinitely far away.
    Unbounded,
    /// Remaining wall-clock time, extrapolated from the average speed since the first
    /// checkpoint.
    Estimate(Duration),
}

impl Remaining {
    /// Extrapolates the remaining time from a progress fraction and the time it took to
    /// get there: `(1 - progress) / progress * elapsed`.
    ///
    /// * Unknown progress, or progress outside `[0.0, 1.0]` (including NaN), is
    ///   [`Undefined`](Self::Undefined).
    /// * Zero progress is [`Unbounded`](Self::Unbounded), as is an estimate too large to
    ///   represent as a [`Duration`].
    #[must_use]
    pub fn estimate(progress: Option<f64>, elapsed: Duration) -> Self {
        let Some(progress) = progress else {
            return Self::Undefined;
        };
        if !(0.0..=1.0).contains(&progress) {
            return Self::Undefined;
        }
        if progress == 0.0 {
            return Self::Unbounded;
        }

        let secs = (1.0 - progress) / progress * elapsed.as_secs_f64();
        Duration::try_from_secs_f64(secs).map_or(Self::Unbounded, Self::Estimate)
    }

    /// Returns the estimate, if there is a finite one.
    #[must_use]
    pub const fn duration(&self) -> Option<Duration> {
        match self {
            Self::Estimate(duration) => Some(*duration),
            Self::Undefined | Self::Unbounded => None,
        }
    }

    /// Returns the estimate in seconds: NaN when undefined, positive infinity when
    /// unbounded.
    #[must_use]
    pub fn as_secs_f64(&self) -> f64 {
        match self {
            Self::Undefined => f64::NAN,
            Self::Unbounded => f64::INFINITY,
            Self::Estimate(duration) => duration.as_secs_f64(),
        }
    }

    /// Returns `true` for [`Undefined`](Self::Undefined).
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Unbounded => f.write_str("unbounded"),
            Self::Estimate(duration) => write!(f, "{:.3}s", duration.as_secs_f64()),
        }
    }
}

/// The data available to a reporter at one checkpoint.
#[derive(Debug)]
pub struct Telemetry<'a, T, A: ?Sized> {
    pub(crate) step: usize,
    pub(crate) progress: Option<f64>,
    pub(crate) elapsed: Duration,
    pub(crate) remaining: Remaining,
    pub(crate) partial: &'a T,
    pub(crate) args: &'a A,
}

impl<T, A: ?Sized> Clone for Telemetry<'_, T, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, A: ?Sized> Copy for Telemetry<'_, T, A> {}

impl<'a, T, A: ?Sized> Telemetry<'a, T, A> {
    /// Zero-based index of this checkpoint within the run.
    #[must_use]
    pub const fn step(&self) -> usize {
        self.step
    }

    /// Progress fraction, or `None` when the run does not report progress.
    #[must_use]
    pub const fn progress(&self) -> Option<f64> {
        self.progress
    }

    /// Wall-clock time since the first checkpoint of the run.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Estimated time to completion.
    #[must_use]
    pub const fn remaining(&self) -> Remaining {
        self.remaining
    }

    /// The partial result carried by this checkpoint.
    #[must_use]
    pub const fn partial_result(&self) -> &'a T {
        self.partial
    }

    /// The arguments of the wrapped call.
    #[must_use]
    pub const fn args(&self) -> &'a A {
        self.args
    }

    /// Copies the telemetry into an owned [`Snapshot`].
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<T>
    where
        T: Clone,
    {
        self.into()
    }
}

/// An owned copy of a [`Telemetry`] value, minus the call arguments.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot<T> {
    step: usize,
    progress: Option<f64>,
    elapsed: Duration,
    remaining: Remaining,
    partial: T,
}

impl<T: Clone, A: ?Sized> From<&Telemetry<'_, T, A>> for Snapshot<T> {
    fn from(telemetry: &Telemetry<'_, T, A>) -> Self {
        Self {
            step: telemetry.step,
            progress: telemetry.progress,
            elapsed: telemetry.elapsed,
            remaining: telemetry.remaining,
            partial: telemetry.partial.clone(),
        }
    }
}

impl<T> Snapshot<T> {
    /// Zero-based index of the checkpoint.
    #[must_use]
    pub const fn step(&self) -> usize {
        self.step
    }

    /// Progress fraction, if reported.
    #[must_use]
    pub const fn progress(&self) -> Option<f64> {
        self.progress
    }

    /// Wall-clock time since the first checkpoint.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Estimated time to completion.
    #[must_use]
    pub const fn remaining(&self) -> Remaining {
        self.remaining
    }

    /// The partial result.
    #[must_use]
    pub const fn partial_result(&self) -> &T {
        &self.partial
    }

    /// Consumes the snapshot, returning the partial result.
    pub fn into_partial_result(self) -> T {
        self.partial
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{Remaining, Telemetry};

    fn secs(value: f64) -> Duration {
        Duration::from_secs_f64(value)
    }

    /// Remaining-Time Formula
    /// Progress strictly inside (0, 1) extrapolates linearly from the elapsed time.
    #[test]
    fn test_estimate_formula() {
        for (progress, elapsed) in [(0.25, 3.0), (0.5, 10.0), (2.0 / 3.0, 2.0), (0.1, 1.0)] {
            let expected = secs((1.0 - progress) / progress * elapsed);
            assert_eq!(
                Remaining::estimate(Some(progress), secs(elapsed)),
                Remaining::Estimate(expected)
            );
        }
    }

    /// Degenerate Inputs
    /// Division by zero and out-of-range progress resolve to fixed outcomes.
    #[test]
    fn test_estimate_degenerate() {
        let elapsed = secs(4.0);
        assert_eq!(Remaining::estimate(None, elapsed), Remaining::Undefined);
        assert_eq!(Remaining::estimate(Some(0.0), elapsed), Remaining::Unbounded);
        assert_eq!(
            Remaining::estimate(Some(0.0), Duration::ZERO),
            Remaining::Unbounded
        );
        assert_eq!(
            Remaining::estimate(Some(1.0), elapsed),
            Remaining::Estimate(Duration::ZERO)
        );
        assert_eq!(Remaining::estimate(Some(1.5), elapsed), Remaining::Undefined);
        assert_eq!(Remaining::estimate(Some(-0.1), elapsed), Remaining::Undefined);
        assert_eq!(
            Remaining::estimate(Some(f64::NAN), elapsed),
            Remaining::Undefined
        );
        assert_eq!(
            Remaining::estimate(Some(f64::MIN_POSITIVE), secs(1e6)),
            Remaining::Unbounded
        );
    }

    /// Numeric View
    /// Seconds view maps the variants onto NaN / infinity / finite values.
    #[allow(clippy::float_cmp)]
    #[test]
    fn test_as_secs_and_display() {
        assert!(Remaining::Undefined.as_secs_f64().is_nan());
        assert_eq!(Remaining::Unbounded.as_secs_f64(), f64::INFINITY);
        assert_eq!(Remaining::Estimate(secs(1.5)).as_secs_f64(), 1.5);
        assert_eq!(Remaining::Estimate(secs(1.5)).duration(), Some(secs(1.5)));
        assert_eq!(Remaining::Unbounded.duration(), None);

        assert_eq!(Remaining::Undefined.to_string(), "undefined");
        assert_eq!(Remaining::Unbounded.to_string(), "unbounded");
        assert_eq!(Remaining::Estimate(secs(2.0)).to_string(), "2.000s");
    }

    /// Snapshots
    /// A snapshot owns a copy of the partial result and keeps every timing field.
    #[test]
    fn test_snapshot_copies_fields() {
        let partial = vec![1, 2, 3];
        let args = "input";
        let telemetry = Telemetry {
            step: 4,
            progress: Some(0.5),
            elapsed: secs(2.0),
            remaining: Remaining::Estimate(secs(2.0)),
            partial: &partial,
            args: &args,
        };

        let snapshot = telemetry.snapshot();
        drop(partial);

        assert_eq!(snapshot.step(), 4);
        assert_eq!(snapshot.progress(), Some(0.5));
        assert_eq!(snapshot.elapsed(), secs(2.0));
        assert_eq!(snapshot.remaining(), Remaining::Estimate(secs(2.0)));
        assert_eq!(snapshot.into_partial_result(), vec![1, 2, 3]);
    }
}
