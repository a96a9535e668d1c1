//! Fluent configuration for [`Breakpoint`] drivers.
//!
//! A driver is configured once and validated when [`BreakpointBuilder::build`] is called,
//! before any computation runs. The options are:
//!
//! * **`on_yield`**: a zero-argument factory producing a fresh [`Reporter`](crate::Reporter)
//!   per run. Without one, the driver only drains computations to their result.
//! * **`reports_progress`**: whether checkpoints carry a progress fraction.
//! * **`target_interval`**: the desired wall-clock time between checkpoints. When set, the
//!   driver sends a pacing multiplier back into the computation at every resumption.
//! * **`clock`**: the time source, [`SystemClock`] unless replaced (typically by a
//!   [`ManualClock`](crate::ManualClock) in tests).
//!
//! The plain-data part of the configuration is also available as [`Settings`], which can
//! be deserialized with the `serde` feature.

use std::{fmt, sync::Arc, time::Duration};

use crate::{
    clock::{Clock, SystemClock},
    driver::Breakpoint,
    error::ConfigError,
    reporter::Silent,
};

/// The factory type of a driver without a reporter.
pub type NoReporter = fn() -> Silent;

/// Plain-data driver configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "rkyv",
    derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Settings {
    /// Whether checkpoints carry a progress fraction.
    pub reports_progress: bool,
    /// Desired seconds between checkpoints; `None` disables pacing.
    pub target_interval: Option<f64>,
}

impl Settings {
    /// Checks the settings and returns the target interval as a [`Duration`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTargetInterval`] if the target interval is zero,
    /// negative, NaN or too large to represent.
    pub fn validate(&self) -> Result<Option<Duration>, ConfigError> {
        self.target_interval
            .map(|secs| {
                if secs > 0.0 {
                    Duration::try_from_secs_f64(secs)
                        .map_err(|_| ConfigError::InvalidTargetInterval(secs))
                } else {
                    Err(ConfigError::InvalidTargetInterval(secs))
                }
            })
            .transpose()
    }
}

/// A builder for [`Breakpoint`] drivers.
pub struct BreakpointBuilder<K = NoReporter> {
    settings: Settings,
    on_yield: Option<K>,
    clock: Arc<dyn Clock>,
}

impl Default for BreakpointBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for BreakpointBuilder<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BreakpointBuilder")
            .field("settings", &self.settings)
            .field("on_yield", &self.on_yield.is_some())
            .finish_non_exhaustive()
    }
}

impl BreakpointBuilder {
    /// Starts a configuration with no reporter, no progress and no target interval.
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
            on_yield: None,
            clock: Arc::new(SystemClock),
        }
    }
}

impl<K> BreakpointBuilder<K> {
    /// Sets the reporter factory, called once at the start of every run.
    #[must_use]
    pub fn on_yield<F>(self, factory: F) -> BreakpointBuilder<F> {
        BreakpointBuilder {
            settings: self.settings,
            on_yield: Some(factory),
            clock: self.clock,
        }
    }

    /// Sets whether checkpoints carry a progress fraction.
    #[must_use]
    pub const fn reports_progress(mut self, reports_progress: bool) -> Self {
        self.settings.reports_progress = reports_progress;
        self
    }

    /// Sets the desired number of seconds between checkpoints.
    ///
    /// The value is validated by [`build`](Self::build).
    #[must_use]
    pub const fn target_interval(mut self, secs: f64) -> Self {
        self.settings.target_interval = Some(secs);
        self
    }

    /// Sets the desired time between checkpoints.
    #[must_use]
    pub const fn target_interval_duration(self, interval: Duration) -> Self {
        self.target_interval(interval.as_secs_f64())
    }

    /// Replaces the progress and target interval options.
    #[must_use]
    pub const fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Validates the configuration and returns the driver.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTargetInterval`] if the target interval is zero,
    /// negative or not finite.
    pub fn build(self) -> Result<Breakpoint<K>, ConfigError> {
        let target_interval = self.settings.validate()?;
        tracing::debug!(
            reports_progress = self.settings.reports_progress,
            target_interval = target_interval.map(|t| t.as_secs_f64()),
            reporter = self.on_yield.is_some(),
            "breakpoint configured"
        );

        Ok(Breakpoint {
            on_yield: self.on_yield,
            reports_progress: self.settings.reports_progress,
            target_interval,
            clock: self.clock,
        })
    }
}
