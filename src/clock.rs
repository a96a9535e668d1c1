//! Time sources for the driver.
//!
//! Every timestamp the driver takes comes from a single [`Clock`] handed to it at
//! construction. Production code uses [`SystemClock`]; tests substitute a
//! [`ManualClock`] and advance it by hand, which makes elapsed times, remaining-time
//! estimates and pacing multipliers exactly reproducible.

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use web_time::Instant;

/// A source of monotonic timestamps.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// The real wall clock (`Instant::now()`).
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
///
/// Cloning is cheap and every clone observes the same time, so a computation can hold
/// one clone (and "sleep" by advancing it) while the driver reads another.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use breakpoint::ManualClock;
///
/// let clock = ManualClock::new();
/// clock.advance_secs(1.5);
/// assert_eq!(clock.offset(), Duration::from_millis(1500));
/// ```
#[derive(Clone, Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Creates a clock frozen at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Moves the clock forward by `step`.
    pub fn advance(&self, step: Duration) {
        *self.offset.lock() += step;
    }

    /// Moves the clock forward by `secs` seconds.
    ///
    /// Negative, NaN or unrepresentable values are ignored.
    pub fn advance_secs(&self, secs: f64) {
        if let Ok(step) = Duration::try_from_secs_f64(secs) {
            self.advance(step);
        }
    }

    /// Sets the absolute offset from the clock's origin.
    ///
    /// Unlike [`advance`](Self::advance) this may move the clock backwards.
    pub fn set_offset(&self, offset: Duration) {
        *self.offset.lock() = offset;
    }

    /// Returns how far the clock has been moved since creation.
    #[must_use]
    pub fn offset(&self) -> Duration {
        *self.offset.lock()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::{Clock, ManualClock, SystemClock};

    /// Shared Time
    /// Clones of a manual clock move together.
    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let other = clock.clone();
        let start = clock.now();

        other.advance(Duration::from_secs(2));

        assert_eq!(clock.now().duration_since(start), Duration::from_secs(2));
        assert_eq!(clock.offset(), Duration::from_secs(2));
    }

    /// Invalid Steps
    /// Negative or NaN second counts leave the clock untouched.
    #[test]
    fn test_advance_secs_ignores_invalid() {
        let clock = ManualClock::new();
        clock.advance_secs(-1.0);
        clock.advance_secs(f64::NAN);
        assert_eq!(clock.offset(), Duration::ZERO);

        clock.advance_secs(0.25);
        assert_eq!(clock.offset(), Duration::from_millis(250));
    }

    /// Trait Objects
    /// Clocks work behind `Arc<dyn Clock>`, the form the driver stores.
    #[test]
    fn test_dyn_clock() {
        let manual = ManualClock::new();
        let shared: Arc<dyn Clock> = Arc::new(manual.clone());
        let start = shared.now();
        manual.advance(Duration::from_millis(10));
        assert_eq!(shared.now() - start, Duration::from_millis(10));

        let system: Arc<dyn Clock> = Arc::new(SystemClock);
        let a = system.now();
        assert!(system.now() >= a);
    }
}
