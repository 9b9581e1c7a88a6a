//! Breathing detection pipeline.
//!
//! Loudness samples flow through an adaptive noise-floor tracker, an SNR
//! smoother, and a low-pass averager into a sliding analysis window. Each
//! sample triggers a full rescan of the window for significant breath peaks,
//! from which the inter-breath intervals yield a rate (bpm) and a regularity
//! score (coefficient of variation). An amplitude baseline gate and a
//! hysteresis state machine turn those features into Awake/Drowsy/Asleep.

mod baseline;
mod calibration;
mod engine;
mod floor;
mod meter;
mod peaks;
mod ring;
mod smooth;
mod state;
#[cfg(test)]
mod tests;

pub use calibration::{Calibrator, GateDecision};
pub use engine::{offline_replay, BreathingDetector, LastFeatures, PushOutcome, WindowFeatures};
pub use meter::rms_of;
pub use state::SleepState;
