//! # `breakpoint`
//!
//! Progress, timing and adaptive pacing for long-running computations.
//!
//! A long computation is written as a resumable [`Computation`] that suspends at
//! checkpoints, each carrying an optional progress fraction and a partial result. A
//! [`Breakpoint`] driver resumes it until it finishes and, at every checkpoint:
//!
//! * **Measures**: elapsed wall-clock time since the first checkpoint, and the estimated
//!   remaining time derived from the progress.
//! * **Reports**: hands the [`Telemetry`] to a [`Reporter`] created fresh for the run,
//!   which may observe, stop the run early with a value, or abort it.
//! * **Paces**: when a target interval is configured, sends a multiplier back into the
//!   computation so it can scale how often it checkpoints (see [`AdaptiveCounter`]).
//!
//! ## Modules
//!
//! * [`builder`]: Fluent configuration of [`Breakpoint`] drivers.
//! * [`clock`]: Injectable time sources.
//! * [`computation`]: The resume/suspend protocol.
//! * [`deadline`]: A reporter enforcing a time budget.
//! * [`driver`]: The driver loop and wrapped callables.
//! * [`error`]: Configuration and run errors.
//! * [`history`]: A reporter recording every checkpoint.
//! * [`pacing`]: Adaptive checkpoint frequency for tight loops.
//! * [`reporter`]: The reporter contract and basic reporters.
//! * [`telemetry`]: Per-checkpoint timing data.
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//!
//! use breakpoint::{Breakpoint, Checkpoint, History, ManualClock, Step};
//!
//! let clock = ManualClock::new();
//! let history = History::new();
//! let recorder = history.clone();
//!
//! let sum_to = Breakpoint::builder()
//!     .on_yield(move || recorder.recorder())
//!     .reports_progress(true)
//!     .with_clock(clock.clone())
//!     .build()
//!     .unwrap()
//!     .wrap(move |n: &u64| {
//!         let (n, clock) = (*n, clock.clone());
//!         let (mut i, mut sum) = (0, 0);
//!         move |_signal: Option<f64>| {
//!             if i == n {
//!                 return Step::Done(Some(sum));
//!             }
//!             i += 1;
//!             sum += i;
//!             clock.advance(Duration::from_secs(1));
//!             Step::Yield(Checkpoint::with_progress(i as f64 / n as f64, sum))
//!         }
//!     });
//!
//! assert_eq!(sum_to.call(4).unwrap(), 10);
//! assert_eq!(history.len(), 4);
//! assert_eq!(history.elapsed().last(), Some(&Duration::from_secs(3)));
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod builder;
pub mod clock;
pub mod computation;
pub mod deadline;
pub mod driver;
pub mod error;
pub mod history;
pub mod pacing;
pub mod reporter;
pub mod telemetry;

pub use builder::{BreakpointBuilder, NoReporter, Settings};
pub use clock::{Clock, ManualClock, SystemClock};
pub use computation::{Checkpoint, Checkpoints, Computation, IntoComputation, Partials, Step};
pub use deadline::Deadline;
pub use driver::{Breakpoint, Wrapped};
pub use error::{Abort, ConfigError, RunError};
pub use history::{History, Recorder};
pub use pacing::AdaptiveCounter;
pub use reporter::{Flow, Log, Reporter, Silent};
pub use telemetry::{Remaining, Snapshot, Telemetry};
