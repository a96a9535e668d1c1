//! A reporter that enforces a wall-clock budget.
//!
//! [`Deadline`] watches the elapsed time of a run and ends it once the budget is spent:
//!
//! * **Hard** (the default): the run fails with an [`Abort`] carrying the telemetry of
//!   the checkpoint where the deadline was hit.
//! * **Soft** ([`Deadline::soft`]): the run ends successfully with the last partial
//!   result.
//!
//! In "as soon as possible" mode ([`Deadline::asap`]) the reporter also acts on the
//! *projected* total time `elapsed + remaining`. Remaining-time estimates are noisy early
//! in a run, so the projection must exceed the deadline on several consecutive
//! checkpoints (the debounce threshold) and progress must be past a small floor before
//! the reporter gives up.

use std::time::Duration;

use crate::{
    error::Abort,
    reporter::{Flow, Reporter},
    telemetry::{Remaining, Telemetry},
};

/// Consecutive over-budget projections required before an early abort.
pub const DEFAULT_DEBOUNCE: u32 = 5;

/// Progress that must be exceeded before an early abort.
pub const DEFAULT_PROGRESS_FLOOR: f64 = 0.01;

/// A reporter that ends runs which exceed (or are projected to exceed) a deadline.
#[derive(Clone, Debug, PartialEq)]
pub struct Deadline {
    deadline: Duration,
    abort: bool,
    asap: bool,
    debounce: u32,
    progress_floor: f64,
    strikes: u32,
}

impl Deadline {
    /// Creates a hard deadline that aborts once `elapsed >= deadline`.
    #[must_use]
    pub const fn new(deadline: Duration) -> Self {
        Self {
            deadline,
            abort: true,
            asap: false,
            debounce: DEFAULT_DEBOUNCE,
            progress_floor: DEFAULT_PROGRESS_FLOOR,
            strikes: 0,
        }
    }

    /// Stops with the last partial result instead of aborting.
    #[must_use]
    pub const fn soft(mut self) -> Self {
        self.abort = false;
        self
    }

    /// Also gives up as soon as the projected total time exceeds the deadline.
    #[must_use]
    pub const fn asap(mut self) -> Self {
        self.asap = true;
        self
    }

    /// Sets how many consecutive over-budget projections trigger an early stop.
    ///
    /// Zero behaves like 1.
    #[must_use]
    pub const fn with_debounce(mut self, debounce: u32) -> Self {
        self.debounce = debounce;
        self
    }

    /// Sets the progress an early stop requires.
    #[must_use]
    pub const fn with_progress_floor(mut self, floor: f64) -> Self {
        self.progress_floor = floor;
        self
    }

    /// The configured deadline.
    #[must_use]
    pub const fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Current number of consecutive over-budget projections.
    #[must_use]
    pub const fn strikes(&self) -> u32 {
        self.strikes
    }

    fn projection_exceeded<T, A: ?Sized>(&mut self, telemetry: &Telemetry<'_, T, A>) -> bool {
        let over = match telemetry.remaining() {
            Remaining::Undefined => return false,
            Remaining::Unbounded => true,
            Remaining::Estimate(remaining) => {
                telemetry.elapsed().saturating_add(remaining) > self.deadline
            }
        };

        if over {
            self.strikes = self.strikes.saturating_add(1);
        } else {
            self.strikes = 0;
        }

        self.strikes >= self.debounce.max(1)
            && telemetry.progress().is_some_and(|p| p > self.progress_floor)
    }
}

impl<T: Clone, A: ?Sized> Reporter<T, A> for Deadline {
    fn on_yield(&mut self, telemetry: &Telemetry<'_, T, A>) -> Result<Flow<T>, Abort<T>> {
        let reason = if telemetry.elapsed() >= self.deadline {
            "deadline exceeded"
        } else if self.asap && self.projection_exceeded(telemetry) {
            "deadline projected to be exceeded"
        } else {
            return Ok(Flow::Continue);
        };

        tracing::debug!(
            deadline = self.deadline.as_secs_f64(),
            elapsed = telemetry.elapsed().as_secs_f64(),
            remaining = %telemetry.remaining(),
            abort = self.abort,
            reason,
        );

        if self.abort {
            Err(Abort::new(reason, telemetry))
        } else {
            Ok(Flow::Stop(telemetry.partial_result().clone()))
        }
    }
}
