//! The resumable unit of work driven by a [`Breakpoint`](crate::Breakpoint).
//!
//! A [`Computation`] suspends at every checkpoint and hands control back to the driver.
//! When the driver resumes it, it passes the pacing multiplier measured over the
//! previous interval (or `None` when there is no estimate yet, or no target interval is
//! configured).
//!
//! # Protocol
//!
//! * [`Step::Yield`] suspends the computation with a [`Checkpoint`].
//! * [`Step::Done`] ends it. `Done(Some(value))` finishes with `value`; `Done(None)`
//!   means "exhausted", and the partial result of the last checkpoint becomes the final
//!   value.

use std::iter::Map;

/// A checkpoint emitted at a suspension point.
#[derive(Clone, Debug, PartialEq)]
pub struct Checkpoint<T> {
    progress: Option<f64>,
    partial: T,
}

impl<T> Checkpoint<T> {
    /// A checkpoint carrying only a partial result.
    pub const fn partial(partial: T) -> Self {
        Self {
            progress: None,
            partial,
        }
    }

    /// A checkpoint carrying a progress fraction (expected in `[0.0, 1.0]`) and a
    /// partial result.
    pub const fn with_progress(progress: f64, partial: T) -> Self {
        Self {
            progress: Some(progress),
            partial,
        }
    }

    /// Returns the progress fraction, if one was supplied.
    #[must_use]
    pub const fn progress(&self) -> Option<f64> {
        self.progress
    }

    /// Returns the partial result.
    #[must_use]
    pub const fn partial_result(&self) -> &T {
        &self.partial
    }

    /// Splits the checkpoint into its progress and partial result.
    pub fn into_parts(self) -> (Option<f64>, T) {
        (self.progress, self.partial)
    }
}

/// The outcome of one resumption.
#[derive(Clone, Debug, PartialEq)]
pub enum Step<T> {
    /// Suspend with a checkpoint.
    Yield(Checkpoint<T>),
    /// The work is finished.
    ///
    /// `None` selects the partial result of the last checkpoint as the final value.
    Done(Option<T>),
}

/// A unit of work that can be resumed until it completes.
pub trait Computation {
    /// The type of partial and final results.
    type Output;

    /// Runs the computation until its next checkpoint or until it finishes.
    ///
    /// `signal` is the multiplier to apply to the current reporting period so that the
    /// next interval between checkpoints matches the configured target. It may be
    /// `f64::INFINITY` when the last interval was too short to measure.
    fn resume(&mut self, signal: Option<f64>) -> Step<Self::Output>;
}

impl<T, F> Computation for F
where
    F: FnMut(Option<f64>) -> Step<T>,
{
    type Output = T;

    fn resume(&mut self, signal: Option<f64>) -> Step<T> {
        self(signal)
    }
}

/// Adapts an iterator of checkpoints into a [`Computation`] that ignores pacing signals.
///
/// The iterator's exhaustion is the computation's exhaustion, so the last checkpoint's
/// partial result becomes the final value.
#[derive(Clone, Debug)]
pub struct Checkpoints<I> {
    iter: I,
}

impl<I> Checkpoints<I> {
    /// Wraps `iter`.
    pub const fn new(iter: I) -> Self {
        Self { iter }
    }
}

impl<T, I> Computation for Checkpoints<I>
where
    I: Iterator<Item = Checkpoint<T>>,
{
    type Output = T;

    fn resume(&mut self, _signal: Option<f64>) -> Step<T> {
        self.iter.next().map_or(Step::Done(None), Step::Yield)
    }
}

/// Iterator of checkpoints built from bare partial results.
pub type Partials<I> =
    Checkpoints<Map<I, fn(<I as Iterator>::Item) -> Checkpoint<<I as Iterator>::Item>>>;

/// Extension trait turning iterators into [`Computation`]s.
pub trait IntoComputation: Iterator + Sized {
    /// Treats every item as a bare partial result.
    fn into_computation(self) -> Partials<Self>;
}

impl<I: Iterator> IntoComputation for I {
    fn into_computation(self) -> Partials<Self> {
        Checkpoints::new(self.map(Checkpoint::partial as fn(I::Item) -> Checkpoint<I::Item>))
    }
}

#[cfg(test)]
mod tests {
    use super::{Checkpoint, Checkpoints, Computation, IntoComputation as _, Step};

    /// Closure Computations
    /// A plain `FnMut` is a computation and sees every signal it is resumed with.
    #[test]
    fn test_closure_computation() {
        let mut seen = Vec::new();
        let mut n = 0;
        let mut computation = |signal: Option<f64>| {
            seen.push(signal);
            n += 1;
            if n <= 2 {
                Step::Yield(Checkpoint::partial(n))
            } else {
                Step::Done(None)
            }
        };

        assert_eq!(computation.resume(None), Step::Yield(Checkpoint::partial(1)));
        assert_eq!(
            computation.resume(Some(2.0)),
            Step::Yield(Checkpoint::partial(2))
        );
        assert_eq!(computation.resume(Some(0.5)), Step::Done(None));
        assert_eq!(seen, vec![None, Some(2.0), Some(0.5)]);
    }

    /// Iterator Adapter
    /// Iterators become computations that finish when the iterator is exhausted.
    #[test]
    fn test_iterator_adapter() {
        let mut computation = [10, 20].into_iter().into_computation();
        assert_eq!(computation.resume(None), Step::Yield(Checkpoint::partial(10)));
        assert_eq!(
            computation.resume(Some(1.0)),
            Step::Yield(Checkpoint::partial(20))
        );
        assert_eq!(computation.resume(None), Step::Done(None));

        let mut with_progress =
            Checkpoints::new([Checkpoint::with_progress(0.5, 'a')].into_iter());
        match with_progress.resume(None) {
            Step::Yield(checkpoint) => {
                assert_eq!(checkpoint.progress(), Some(0.5));
                assert_eq!(*checkpoint.partial_result(), 'a');
            }
            Step::Done(_) => panic!("expected a checkpoint"),
        }
    }
}
