//! The driver loop.
//!
//! A [`Breakpoint`] resumes a [`Computation`] until it finishes, and at every checkpoint:
//!
//! 1. reads the clock and derives the elapsed time since the first checkpoint,
//! 2. estimates the remaining time from the reported progress,
//! 3. hands the resulting [`Telemetry`] to the run's [`Reporter`], which may stop or
//!    abort the run,
//! 4. if a target interval is configured, computes the pacing multiplier
//!    `target / interval` sent into the computation at the next resumption.
//!
//! [`Breakpoint::wrap`] turns a computation factory into a [`Wrapped`] callable that runs
//! a fresh computation (and a fresh reporter) on every call.

use std::{fmt, sync::Arc, time::Duration};

use web_time::Instant;

use crate::{
    builder::BreakpointBuilder,
    clock::Clock,
    computation::{Computation, Step},
    error::RunError,
    reporter::{Flow, Reporter},
    telemetry::{Remaining, Telemetry},
};

/// A configured driver for resumable computations.
///
/// `K` is the reporter factory type; see [`BreakpointBuilder::on_yield`].
pub struct Breakpoint<K> {
    pub(crate) on_yield: Option<K>,
    pub(crate) reports_progress: bool,
    pub(crate) target_interval: Option<Duration>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl<K: Clone> Clone for Breakpoint<K> {
    fn clone(&self) -> Self {
        Self {
            on_yield: self.on_yield.clone(),
            reports_progress: self.reports_progress,
            target_interval: self.target_interval,
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<K> fmt::Debug for Breakpoint<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Breakpoint")
            .field("on_yield", &self.on_yield.is_some())
            .field("reports_progress", &self.reports_progress)
            .field("target_interval", &self.target_interval)
            .finish_non_exhaustive()
    }
}

impl Breakpoint<crate::builder::NoReporter> {
    /// Starts configuring a driver.
    #[must_use]
    pub fn builder() -> BreakpointBuilder {
        BreakpointBuilder::new()
    }
}

/// Timestamps of the current run.
#[derive(Clone, Copy, Debug)]
struct Timing {
    start: Instant,
    last: Instant,
}

impl<K> Breakpoint<K> {
    /// Whether checkpoints are expected to carry progress.
    #[must_use]
    pub const fn reports_progress(&self) -> bool {
        self.reports_progress
    }

    /// The desired time between checkpoints, if pacing is enabled.
    #[must_use]
    pub const fn target_interval(&self) -> Option<Duration> {
        self.target_interval
    }

    /// Whether a reporter factory is configured.
    #[must_use]
    pub const fn has_reporter(&self) -> bool {
        self.on_yield.is_some()
    }

    /// Wraps a computation factory into a callable with the factory's argument type.
    pub const fn wrap<F>(self, factory: F) -> Wrapped<K, F> {
        Wrapped {
            breakpoint: self,
            factory,
        }
    }

    /// Computes the pacing multiplier for an interval of `dt`.
    fn multiplier(&self, dt: Duration) -> Option<f64> {
        let target = self.target_interval?;
        if dt.is_zero() {
            return Some(f64::INFINITY);
        }
        Some(target.as_secs_f64() / dt.as_secs_f64())
    }

    /// Drives `computation` to completion, reporting every checkpoint.
    ///
    /// `args` is made available to the reporter through [`Telemetry::args`].
    ///
    /// # Errors
    ///
    /// * [`RunError::Aborted`] if the reporter aborts the run.
    /// * [`RunError::MissingProgress`] if progress reporting is enabled and a checkpoint
    ///   carries none.
    /// * [`RunError::Empty`] if the computation finishes without any value.
    pub fn run<C, A, R>(
        &self,
        mut computation: C,
        args: &A,
    ) -> Result<C::Output, RunError<C::Output>>
    where
        C: Computation,
        A: ?Sized,
        K: Fn() -> R,
        R: Reporter<C::Output, A>,
    {
        let mut reporter = self.on_yield.as_ref().map(|factory| factory());
        let mut timing: Option<Timing> = None;
        let mut last: Option<C::Output> = None;
        let mut signal = None;
        let mut step = 0_usize;

        tracing::debug!(
            reporter = reporter.is_some(),
            reports_progress = self.reports_progress,
            "run started"
        );

        loop {
            let checkpoint = match computation.resume(signal.take()) {
                Step::Yield(checkpoint) => checkpoint,
                Step::Done(value) => {
                    tracing::debug!(checkpoints = step, "run finished");
                    return value.or(last).ok_or(RunError::Empty);
                }
            };

            let now = self.clock.now();
            let (elapsed, remaining_known) = match timing.as_mut() {
                None => {
                    timing = Some(Timing {
                        start: now,
                        last: now,
                    });
                    (Duration::ZERO, false)
                }
                Some(timing) => {
                    if now < timing.last {
                        tracing::warn!(step, "clock went backwards; ignoring the step back");
                    }
                    let now = now.max(timing.last);
                    let dt = now.duration_since(timing.last);
                    signal = self.multiplier(dt);
                    timing.last = now;
                    (now.duration_since(timing.start), true)
                }
            };

            let (progress, partial) = checkpoint.into_parts();
            let progress = if self.reports_progress {
                Some(progress.ok_or(RunError::MissingProgress { step })?)
            } else {
                None
            };
            let remaining = if remaining_known {
                Remaining::estimate(progress, elapsed)
            } else {
                Remaining::Undefined
            };

            tracing::trace!(
                step,
                progress,
                elapsed = elapsed.as_secs_f64(),
                remaining = %remaining,
                multiplier = signal,
                "checkpoint"
            );

            let partial = last.insert(partial);
            if let Some(reporter) = reporter.as_mut() {
                let telemetry = Telemetry {
                    step,
                    progress,
                    elapsed,
                    remaining,
                    partial,
                    args,
                };
                match reporter.on_yield(&telemetry) {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Stop(value)) => {
                        tracing::debug!(step, "run stopped early by reporter");
                        return Ok(value);
                    }
                    Err(abort) => {
                        tracing::debug!(step, reason = abort.reason(), "run aborted by reporter");
                        return Err(RunError::Aborted(abort));
                    }
                }
            }

            step += 1;
        }
    }
}

/// A computation factory bound to a [`Breakpoint`].
///
/// Every [`call`](Self::call) creates a new computation from the arguments and a new
/// reporter from the driver's factory, so independent calls never share run state.
pub struct Wrapped<K, F> {
    breakpoint: Breakpoint<K>,
    factory: F,
}

impl<K: Clone, F: Clone> Clone for Wrapped<K, F> {
    fn clone(&self) -> Self {
        Self {
            breakpoint: self.breakpoint.clone(),
            factory: self.factory.clone(),
        }
    }
}

impl<K, F> fmt::Debug for Wrapped<K, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wrapped")
            .field("breakpoint", &self.breakpoint)
            .finish_non_exhaustive()
    }
}

impl<K, F> Wrapped<K, F> {
    /// Builds a computation from `args` and drives it to completion.
    ///
    /// # Errors
    ///
    /// See [`Breakpoint::run`].
    pub fn call<A, C, R>(&self, args: A) -> Result<C::Output, RunError<C::Output>>
    where
        F: Fn(&A) -> C,
        C: Computation,
        K: Fn() -> R,
        R: Reporter<C::Output, A>,
    {
        let computation = (self.factory)(&args);
        self.breakpoint.run(computation, &args)
    }

    /// The driver this factory is bound to.
    #[must_use]
    pub const fn breakpoint(&self) -> &Breakpoint<K> {
        &self.breakpoint
    }
}
