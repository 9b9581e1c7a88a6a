//! Window-amplitude history and the low-amplitude gate.

use super::ring::Ring;
use crate::config::DetectorConfig;

/// Outcome of comparing the current window amplitude against its baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct AmplitudeGate {
    /// Amplitude has fallen well below the rolling baseline, the quieting
    /// expected as breathing settles toward sleep.
    pub(super) amp_low: bool,
    /// Amplitude is under the absolute floor; rate/CV must be treated as
    /// absent this sample to avoid inferring rhythm from near-silence.
    pub(super) silent: bool,
}

/// Rolling several-minute history of window amplitudes.
pub(super) struct AmplitudeBaseline {
    history: Ring,
    low_ratio: f64,
    min_amplitude: f64,
}

impl AmplitudeBaseline {
    pub(super) fn new(cfg: &DetectorConfig) -> Self {
        Self {
            history: Ring::with_capacity(cfg.amp_history_samples()),
            low_ratio: cfg.amp_low_ratio,
            min_amplitude: cfg.min_amplitude,
        }
    }

    /// Record one window amplitude and gate it against the baseline.
    pub(super) fn observe(&mut self, amplitude: f64) -> AmplitudeGate {
        self.history.push(amplitude);
        let baseline = if self.history.is_empty() {
            amplitude
        } else {
            self.history.mean()
        };
        AmplitudeGate {
            amp_low: amplitude <= baseline * self.low_ratio,
            silent: amplitude < self.min_amplitude,
        }
    }

    pub(super) fn reset(&mut self) {
        self.history.clear();
    }
}
