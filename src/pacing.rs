//! Adaptive checkpoint pacing for tight loops.
//!
//! When each iteration of a loop is cheap, emitting a checkpoint on every iteration
//! costs more than the work itself. An [`AdaptiveCounter`] lets the loop checkpoint only
//! every `threshold` iterations and rescales `threshold` with the pacing multiplier the
//! driver sends back, so the wall-clock time between checkpoints converges to the
//! configured target interval.
//!
//! ```
//! use breakpoint::AdaptiveCounter;
//!
//! let mut counter = AdaptiveCounter::new();
//! assert!(counter.tick()); // threshold starts at 1
//!
//! // The driver reports that checkpoints come three times too often.
//! counter.update(Some(3.0));
//! assert!(!counter.tick());
//! assert!(!counter.tick());
//! assert!(counter.tick());
//! ```

/// Counts loop iterations and decides when the next checkpoint is due.
///
/// `threshold` is never less than 1.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AdaptiveCounter {
    count: u64,
    threshold: u64,
    ceiling: u64,
}

impl Default for AdaptiveCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptiveCounter {
    /// Creates a counter that is ready on the first iteration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            count: 0,
            threshold: 1,
            ceiling: u64::MAX,
        }
    }

    /// Creates a counter with an initial threshold (raised to 1 if zero).
    #[must_use]
    pub const fn with_threshold(threshold: u64) -> Self {
        let threshold = if threshold == 0 { 1 } else { threshold };
        Self {
            count: 0,
            threshold,
            ceiling: u64::MAX,
        }
    }

    /// Caps the threshold, so that an unbounded multiplier cannot silence a loop for
    /// good. A ceiling of zero is treated as 1.
    #[must_use]
    pub fn with_ceiling(mut self, ceiling: u64) -> Self {
        self.ceiling = ceiling.max(1);
        self.threshold = self.threshold.min(self.ceiling);
        self
    }

    /// Iterations since the last checkpoint.
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Iterations required before the next checkpoint.
    #[must_use]
    pub const fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Registers one iteration and returns `true` if a checkpoint is due.
    pub const fn tick(&mut self) -> bool {
        self.count = self.count.saturating_add(1);
        self.is_ready()
    }

    /// Returns `true` if a checkpoint is due.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.count >= self.threshold
    }

    /// Resets the iteration count after a checkpoint and rescales the threshold by the
    /// multiplier received from the driver.
    ///
    /// `None` and NaN keep the current threshold. The new threshold is rounded and
    /// clamped to `1..=ceiling`; an infinite multiplier saturates at the ceiling.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn update(&mut self, multiplier: Option<f64>) {
        self.count = 0;
        let Some(multiplier) = multiplier.filter(|m| !m.is_nan()) else {
            return;
        };

        // Float-to-int casts saturate: negatives go to 0 and infinity to u64::MAX.
        let scaled = (multiplier * self.threshold as f64).round() as u64;
        self.threshold = scaled.clamp(1, self.ceiling);
    }
}

#[cfg(test)]
mod tests {
    use super::AdaptiveCounter;

    /// Threshold Rescaling
    /// The threshold follows `round(multiplier * threshold)`.
    #[test]
    fn test_update_rescales_threshold() {
        let mut counter = AdaptiveCounter::new();
        counter.update(Some(2.0));
        assert_eq!(counter.threshold(), 2);
        counter.update(Some(2.6));
        assert_eq!(counter.threshold(), 5);
        counter.update(Some(0.5));
        assert_eq!(counter.threshold(), 3); // 2.5 rounds away from zero
        counter.update(None);
        assert_eq!(counter.threshold(), 3);
    }

    /// Lower Bound
    /// The threshold never collapses to zero, whatever the multiplier.
    #[test]
    fn test_threshold_never_zero() {
        let mut counter = AdaptiveCounter::with_threshold(4);
        for multiplier in [0.01, 0.0, -3.0, f64::NEG_INFINITY] {
            counter.update(Some(multiplier));
            assert_eq!(counter.threshold(), 1);
        }
        assert_eq!(AdaptiveCounter::with_threshold(0).threshold(), 1);

        counter.update(Some(f64::NAN));
        assert_eq!(counter.threshold(), 1);
    }

    /// Upper Bound
    /// An infinite multiplier saturates at the ceiling.
    #[test]
    fn test_ceiling() {
        let mut unbounded = AdaptiveCounter::new();
        unbounded.update(Some(f64::INFINITY));
        assert_eq!(unbounded.threshold(), u64::MAX);

        let mut capped = AdaptiveCounter::new().with_ceiling(100);
        capped.update(Some(f64::INFINITY));
        assert_eq!(capped.threshold(), 100);

        assert_eq!(AdaptiveCounter::with_threshold(50).with_ceiling(10).threshold(), 10);
    }

    /// Readiness Cycle
    /// `tick` counts iterations and `update` resets the count.
    #[test]
    fn test_tick_cycle() {
        let mut counter = AdaptiveCounter::with_threshold(3);
        assert!(!counter.tick());
        assert!(!counter.tick());
        assert!(counter.tick());
        assert_eq!(counter.count(), 3);

        counter.update(None);
        assert_eq!(counter.count(), 0);
        assert!(!counter.is_ready());
    }
}
