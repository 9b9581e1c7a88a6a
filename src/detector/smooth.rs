//! Low-pass averaging ahead of peak detection.

use super::ring::Ring;
use crate::config::MIN_MA_LEN;

/// Rolling mean over the last `len` smoothed-SNR values.
///
/// A short window keeps the pipeline responsive; a long one trades latency
/// for smoothness. The window never goes below [`MIN_MA_LEN`] samples, the
/// minimum at which the averager still suppresses single-sample spikes.
pub(super) struct LowPassAverager {
    ring: Ring,
}

impl LowPassAverager {
    pub(super) fn new(len: usize) -> Self {
        Self {
            ring: Ring::with_capacity(len.max(MIN_MA_LEN)),
        }
    }

    /// Fold in one value and return the mean of the current window.
    pub(super) fn push(&mut self, value: f64) -> f64 {
        self.ring.push(value);
        self.ring.mean()
    }

    pub(super) fn reset(&mut self) {
        self.ring.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_partial_window() {
        let mut lp = LowPassAverager::new(4);
        assert!((lp.push(2.0) - 2.0).abs() < 1e-12);
        assert!((lp.push(4.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn window_length_is_clamped_to_the_minimum() {
        let mut lp = LowPassAverager::new(MIN_MA_LEN - 2);
        assert_eq!(lp.ring.capacity(), MIN_MA_LEN);
        lp.push(9.0);
        lp.push(0.0);
        lp.push(0.0);
        // With a true length-1 window this would already be 0.0.
        assert!((lp.push(0.0) - 0.0).abs() < 1e-12);
        assert!((lp.push(3.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn reset_empties_the_window() {
        let mut lp = LowPassAverager::new(3);
        lp.push(5.0);
        lp.push(5.0);
        lp.reset();
        assert!((lp.push(1.0) - 1.0).abs() < 1e-12);
    }
}
