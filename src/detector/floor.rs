//! Adaptive noise-floor tracking and SNR smoothing.

use crate::config::DetectorConfig;

/// Slow-moving estimate of the ambient silence level.
///
/// The floor rises very slowly toward louder samples but decays much faster
/// toward quieter ones, so it hugs silence without being dragged up by
/// transient breath sounds. Clamped to a minimum so later amplitude math
/// never works against a vanishing reference.
pub(super) struct NoiseFloorTracker {
    floor: f64,
    initial_floor: f64,
    rise_retain: f64,
    decay_retain: f64,
    min_floor: f64,
}

impl NoiseFloorTracker {
    pub(super) fn new(cfg: &DetectorConfig) -> Self {
        Self {
            floor: cfg.initial_floor,
            initial_floor: cfg.initial_floor,
            rise_retain: cfg.floor_rise_retain,
            decay_retain: cfg.floor_decay_retain,
            min_floor: cfg.min_floor,
        }
    }

    /// Fold one sample into the floor estimate and return the updated floor.
    pub(super) fn update(&mut self, sample: f64) -> f64 {
        let retain = if sample > self.floor {
            self.rise_retain
        } else {
            self.decay_retain
        };
        self.floor = self.floor * retain + sample * (1.0 - retain);
        if self.floor < self.min_floor {
            self.floor = self.min_floor;
        }
        self.floor
    }

    pub(super) fn current(&self) -> f64 {
        self.floor
    }

    pub(super) fn reset(&mut self) {
        self.floor = self.initial_floor;
    }
}

/// Exponential smoothing of the floor-subtracted signal.
///
/// Must run strictly after the floor update for the same sample.
pub(super) struct SnrSmoother {
    ema: f64,
    alpha: f64,
}

impl SnrSmoother {
    pub(super) fn new(alpha: f64) -> Self {
        Self { ema: 0.0, alpha }
    }

    pub(super) fn update(&mut self, sample: f64, floor: f64) -> f64 {
        let snr = (sample - floor).max(0.0);
        self.ema = self.alpha * snr + (1.0 - self.alpha) * self.ema;
        self.ema
    }

    pub(super) fn reset(&mut self) {
        self.ema = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> NoiseFloorTracker {
        NoiseFloorTracker::new(&DetectorConfig::default())
    }

    #[test]
    fn floor_decays_toward_silence_quickly() {
        let mut t = tracker();
        for _ in 0..600 {
            t.update(0.004);
        }
        assert!((t.current() - 0.004).abs() < 1e-3);
    }

    #[test]
    fn floor_rises_toward_sustained_input() {
        let mut t = tracker();
        for _ in 0..5_000 {
            t.update(0.05);
        }
        assert!((t.current() - 0.05).abs() < 1e-3);
    }

    #[test]
    fn floor_resists_loud_transients() {
        let mut t = tracker();
        let before = t.current();
        // A single loud sample should barely move the floor.
        t.update(0.8);
        assert!(t.current() - before < 0.001);
    }

    #[test]
    fn floor_never_drops_below_minimum() {
        let mut t = tracker();
        for _ in 0..5_000 {
            t.update(0.0);
        }
        assert_eq!(t.current(), DetectorConfig::default().min_floor);
    }

    #[test]
    fn smoother_clamps_negative_snr() {
        let mut s = SnrSmoother::new(0.3);
        let out = s.update(0.001, 0.01);
        assert_eq!(out, 0.0);
    }

    #[test]
    fn smoother_converges_on_constant_snr() {
        let mut s = SnrSmoother::new(0.3);
        let mut out = 0.0;
        for _ in 0..100 {
            out = s.update(0.05, 0.01);
        }
        assert!((out - 0.04).abs() < 1e-6);
    }
}
