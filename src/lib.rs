//! Streaming breathing-rate and sleep-depth estimation from microphone loudness.
//!
//! A capture source feeds scalar RMS loudness samples at ~10 Hz into a
//! [`SleepSession`]; the session calibrates against ambient noise, runs each
//! sample through the breathing detector, and exposes the inferred sleep state
//! (Awake / Drowsy / Asleep) plus a smoothed breathing rate and regularity
//! score to display and persistence collaborators.

pub mod config;
pub mod detector;
pub mod session;
pub mod sink;
pub mod telemetry;

pub use config::{AppConfig, DetectorConfig, SessionConfig};
pub use detector::{BreathingDetector, LastFeatures, PushOutcome, SleepState, WindowFeatures};
pub use session::{replay_trace, SessionSummary, SleepSession};
pub use sink::{BreathingLogRecord, DisplaySnapshot, FeatureSink, NullSink};
