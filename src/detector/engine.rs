//! The breathing detector: one loudness sample in, one tagged outcome out.

use super::baseline::AmplitudeBaseline;
use super::floor::{NoiseFloorTracker, SnrSmoother};
use super::peaks::{find_peaks, rate_and_cv};
use super::ring::Ring;
use super::smooth::LowPassAverager;
use super::state::{SleepState, SleepStateMachine};
use crate::config::DetectorConfig;
use serde::Serialize;

/// Feature snapshot for one processed sample once the window is full.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowFeatures {
    /// Breathing rate in breaths/minute; absent when no qualifying rhythm
    /// was found or the window was too quiet to trust.
    pub rate_bpm: Option<f64>,
    /// Coefficient of variation of the inter-breath intervals; present only
    /// alongside a valid rate.
    pub variability: Option<f64>,
    /// Max minus min of the analysis window.
    pub amplitude: f64,
    /// Window amplitude has fallen well below its rolling baseline.
    pub amp_low: bool,
    /// Sleep state after evaluating this sample.
    pub state: SleepState,
}

/// Result of pushing one sample.
///
/// `Filling` and `Ready` are distinct on purpose: a window that has not yet
/// filled produces no features at all, while a full window may still report
/// absent rate/CV when nothing qualifies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PushOutcome {
    /// Analysis window still filling; no features yet.
    Filling { filled: usize, capacity: usize },
    /// Window full; features evaluated for this sample.
    Ready(WindowFeatures),
}

impl PushOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, PushOutcome::Ready(_))
    }
}

/// Most recent exported feature values, kept for display bindings and logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LastFeatures {
    pub rate_bpm: Option<f64>,
    pub variability: Option<f64>,
    pub amplitude: Option<f64>,
}

/// Streaming estimator owning every rolling buffer for one session.
///
/// All state is instance-local; concurrent sessions are simply independent
/// detectors. One `push` per sample, in arrival order; the caller serializes
/// delivery.
pub struct BreathingDetector {
    cfg: DetectorConfig,
    floor: NoiseFloorTracker,
    snr: SnrSmoother,
    lowpass: LowPassAverager,
    window: Ring,
    scratch: Vec<f64>,
    baseline: AmplitudeBaseline,
    machine: SleepStateMachine,
    last: LastFeatures,
}

impl BreathingDetector {
    pub fn new(cfg: DetectorConfig) -> Self {
        let window_samples = cfg.window_samples();
        Self {
            floor: NoiseFloorTracker::new(&cfg),
            snr: SnrSmoother::new(cfg.ema_alpha),
            lowpass: LowPassAverager::new(cfg.ma_len),
            window: Ring::with_capacity(window_samples),
            scratch: Vec::with_capacity(window_samples),
            baseline: AmplitudeBaseline::new(&cfg),
            machine: SleepStateMachine::new(&cfg),
            last: LastFeatures::default(),
            cfg,
        }
    }

    /// Process one loudness sample. Never fails: bad input is clamped and the
    /// two "no output" shapes are both ordinary outcomes.
    pub fn push(&mut self, rms: f64) -> PushOutcome {
        let rms = if rms.is_finite() { rms.max(0.0) } else { 0.0 };

        // Floor first, smoother strictly after, for the same sample.
        let floor = self.floor.update(rms);
        let ema_snr = self.snr.update(rms, floor);
        let ma = self.lowpass.push(ema_snr);

        self.window.push(ma);
        if !self.window.is_full() {
            self.last = LastFeatures::default();
            return PushOutcome::Filling {
                filled: self.window.len(),
                capacity: self.window.capacity(),
            };
        }

        self.window.copy_ordered_into(&mut self.scratch);
        let peaks = find_peaks(
            &self.scratch,
            self.cfg.min_prominence,
            self.cfg.refractory_samples,
        );
        let mut rate_cv = rate_and_cv(&peaks, self.cfg.sample_rate_hz);

        let (min, max) = self
            .scratch
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let amplitude = max - min;
        self.last.amplitude = Some(amplitude);

        let gate = self.baseline.observe(amplitude);

        // Pure silence: report ready but featureless, and leave the hold
        // accumulators untouched for this tick.
        if gate.silent {
            self.last.rate_bpm = None;
            self.last.variability = None;
            return PushOutcome::Ready(WindowFeatures {
                rate_bpm: None,
                variability: None,
                amplitude,
                amp_low: gate.amp_low,
                state: self.machine.state(),
            });
        }

        // Physiological plausibility band.
        if let Some((bpm, _)) = rate_cv {
            if bpm < self.cfg.rate_min_bpm || bpm > self.cfg.rate_max_bpm {
                rate_cv = None;
            }
        }
        let (rate_bpm, variability) = match rate_cv {
            Some((bpm, cv)) => (Some(bpm), Some(cv)),
            None => (None, None),
        };

        let inputs = self.machine.inputs(rate_bpm, variability, gate.amp_low);
        if let Some(next) = self.machine.step(inputs) {
            tracing::debug!(state = next.badge(), rate_bpm, "sleep state transition");
        }

        self.last.rate_bpm = rate_bpm;
        self.last.variability = variability;

        PushOutcome::Ready(WindowFeatures {
            rate_bpm,
            variability,
            amplitude,
            amp_low: gate.amp_low,
            state: self.machine.state(),
        })
    }

    pub fn state(&self) -> SleepState {
        self.machine.state()
    }

    pub fn last_features(&self) -> LastFeatures {
        self.last
    }

    /// Clear every buffer and accumulator and return to `Awake`.
    pub fn reset(&mut self) {
        self.floor.reset();
        self.snr.reset();
        self.lowpass.reset();
        self.window.clear();
        self.baseline.reset();
        self.machine.reset();
        self.last = LastFeatures::default();
    }
}

/// Run a pre-recorded loudness trace through a fresh detector.
///
/// Drives the exact per-sample path without a live capture source, for tests
/// and the replay CLI.
pub fn offline_replay(samples: &[f64], cfg: DetectorConfig) -> ReplayOutcome {
    let mut detector = BreathingDetector::new(cfg);
    let mut transitions = Vec::new();
    let mut ready_samples = 0usize;
    let mut state = detector.state();
    for (index, &rms) in samples.iter().enumerate() {
        if let PushOutcome::Ready(features) = detector.push(rms) {
            ready_samples += 1;
            if features.state != state {
                state = features.state;
                transitions.push((index, state));
            }
        }
    }
    ReplayOutcome {
        final_state: detector.state(),
        last: detector.last_features(),
        transitions,
        ready_samples,
    }
}

/// Summary of an [`offline_replay`] run.
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    pub final_state: SleepState,
    pub last: LastFeatures,
    /// Sample index and new state for every transition observed.
    pub transitions: Vec<(usize, SleepState)>,
    pub ready_samples: usize,
}
