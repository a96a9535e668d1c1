//! Telemetry consumers.
//!
//! A [`Reporter`] is called once per checkpoint with the run's [`Telemetry`]. It may
//!
//! * observe the run and return [`Flow::Continue`],
//! * end the run early with [`Flow::Stop`], whose value becomes the run's result,
//! * or abort it with an [`Abort`], which the driver propagates unchanged.
//!
//! The driver creates a fresh reporter for every run through a zero-argument factory,
//! so reporters are free to keep private state (counters, thresholds, history).
//!
//! Any `FnMut(&Telemetry<'_, T, A>) -> Result<Flow<T>, Abort<T>>` closure is a reporter.

use compact_str::CompactString;

use crate::{error::Abort, telemetry::Telemetry};

/// What the driver should do after a checkpoint has been reported.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Flow<T> {
    /// Resume the computation.
    #[default]
    Continue,
    /// End the run now with this value.
    Stop(T),
}

impl<T> Flow<T> {
    /// Returns `true` for [`Flow::Stop`].
    #[must_use]
    pub const fn is_stop(&self) -> bool {
        matches!(self, Self::Stop(_))
    }
}

/// A consumer of per-checkpoint telemetry.
///
/// `T` is the computation's result type and `A` the type of the wrapped call's arguments.
pub trait Reporter<T, A: ?Sized = ()> {
    /// Handles one checkpoint.
    ///
    /// # Errors
    ///
    /// Returns an [`Abort`] to terminate the run as failed.
    fn on_yield(&mut self, telemetry: &Telemetry<'_, T, A>) -> Result<Flow<T>, Abort<T>>;
}

impl<T, A, F> Reporter<T, A> for F
where
    A: ?Sized,
    F: FnMut(&Telemetry<'_, T, A>) -> Result<Flow<T>, Abort<T>>,
{
    fn on_yield(&mut self, telemetry: &Telemetry<'_, T, A>) -> Result<Flow<T>, Abort<T>> {
        self(telemetry)
    }
}

/// A reporter that never interferes with the run.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl<T, A: ?Sized> Reporter<T, A> for Silent {
    fn on_yield(&mut self, _telemetry: &Telemetry<'_, T, A>) -> Result<Flow<T>, Abort<T>> {
        Ok(Flow::Continue)
    }
}

/// A reporter that emits one `tracing` event per checkpoint.
///
/// Events are logged at `INFO` level with the reporter's label and the checkpoint's
/// progress, elapsed and remaining times as structured fields.
#[derive(Clone, Debug, Default)]
pub struct Log {
    label: CompactString,
}

impl Log {
    /// Creates a logging reporter with the given label.
    #[must_use]
    pub fn new(label: impl Into<CompactString>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// Returns the label attached to every event.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<T, A: ?Sized> Reporter<T, A> for Log {
    fn on_yield(&mut self, telemetry: &Telemetry<'_, T, A>) -> Result<Flow<T>, Abort<T>> {
        tracing::info!(
            label = %self.label,
            step = telemetry.step(),
            progress = telemetry.progress(),
            elapsed = telemetry.elapsed().as_secs_f64(),
            remaining = %telemetry.remaining(),
            "checkpoint"
        );
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{Flow, Log, Reporter, Silent};
    use crate::{
        error::Abort,
        telemetry::{Remaining, Telemetry},
    };

    fn telemetry<'a>(step: usize, partial: &'a i32, args: &'a str) -> Telemetry<'a, i32, str> {
        Telemetry {
            step,
            progress: None,
            elapsed: Duration::from_secs(step as u64),
            remaining: Remaining::Undefined,
            partial,
            args,
        }
    }

    /// Passive Reporters
    /// `Silent` and `Log` always let the run continue.
    #[test]
    fn test_passive_reporters() {
        let partial = 1;
        let t = telemetry(0, &partial, "args");

        assert_eq!(Silent.on_yield(&t), Ok(Flow::Continue));

        let mut log = Log::new("job");
        assert_eq!(log.label(), "job");
        assert_eq!(log.on_yield(&t), Ok(Flow::Continue));
    }

    /// Stateful Closures
    /// A closure keeps state across calls and can stop or abort the run.
    #[test]
    fn test_closure_reporter() {
        let mut calls = 0;
        let mut reporter = |t: &Telemetry<'_, i32, str>| {
            calls += 1;
            match *t.partial_result() {
                p if p >= 10 => Err(Abort::new("overflow", t)),
                p if p >= 5 => Ok(Flow::Stop(p * 2)),
                _ => Ok(Flow::Continue),
            }
        };

        assert_eq!(reporter.on_yield(&telemetry(0, &1, "x")), Ok(Flow::Continue));
        assert_eq!(reporter.on_yield(&telemetry(1, &6, "x")), Ok(Flow::Stop(12)));
        let abort = reporter
            .on_yield(&telemetry(2, &11, "x"))
            .expect_err("aborted");
        assert_eq!(abort.reason(), "overflow");
        assert_eq!(*abort.snapshot().partial_result(), 11);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_flow_helpers() {
        assert!(Flow::Stop(1).is_stop());
        assert!(!Flow::<i32>::Continue.is_stop());
    }
}
