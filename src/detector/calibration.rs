//! Session warm-up calibration and the post-calibration weak-sample gate.
//!
//! Before any sample reaches the adaptive pipeline, the first N raw samples
//! are averaged into a one-shot floor reference. Afterwards every raw sample
//! is checked against that reference: samples whose excess over the
//! calibrated floor is under a small threshold are reported too weak and
//! never reach the detector for that tick. This coarse gate is deliberately
//! separate from the adaptive floor tracker running inside the detector.

/// What the gate decided for one raw sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    /// Still accumulating the calibration window; `progress` is in [0, 1].
    Warming { progress: f64 },
    /// Calibrated, but this sample barely clears the ambient floor.
    TooWeak,
    /// Calibrated and loud enough to feed the pipeline.
    Pass,
}

/// Accumulates the warm-up window and gates samples once calibrated.
pub struct Calibrator {
    target: usize,
    count: usize,
    sum: f64,
    floor: Option<f64>,
    weak_threshold: f64,
}

impl Calibrator {
    pub fn new(target_samples: usize, weak_threshold: f64) -> Self {
        Self {
            target: target_samples.max(1),
            count: 0,
            sum: 0.0,
            floor: None,
            weak_threshold,
        }
    }

    /// Feed one raw sample; negative or non-finite values count as silence.
    pub fn observe(&mut self, sample: f64) -> GateDecision {
        let sample = if sample.is_finite() { sample.max(0.0) } else { 0.0 };
        match self.floor {
            None => {
                self.count += 1;
                self.sum += sample;
                if self.count >= self.target {
                    self.floor = Some(self.sum / self.target as f64);
                }
                GateDecision::Warming {
                    progress: self.progress(),
                }
            }
            Some(floor) => {
                if sample - floor < self.weak_threshold {
                    GateDecision::TooWeak
                } else {
                    GateDecision::Pass
                }
            }
        }
    }

    /// The calibrated floor, once the warm-up window completes.
    pub fn floor(&self) -> Option<f64> {
        self.floor
    }

    pub fn is_calibrated(&self) -> bool {
        self.floor.is_some()
    }

    /// Warm-up completion fraction in [0, 1].
    pub fn progress(&self) -> f64 {
        (self.count as f64 / self.target as f64).min(1.0)
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.sum = 0.0;
        self.floor = None;
    }
}
