//! Collaborator seams: persistence records and the display snapshot.
//!
//! The core never depends on a real store or UI. Persistence receives
//! [`BreathingLogRecord`]s through the [`FeatureSink`] trait on a dedicated
//! thread; failures are logged and swallowed so a slow or broken store can
//! never stall sample ingestion. Presentation polls a [`DisplaySnapshot`].

use crate::detector::SleepState;
use anyhow::Result;
use serde::Serialize;

/// Feature summary persisted roughly every ten seconds of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreathingLogRecord {
    /// Span the record covers, seconds.
    pub duration_sec: u32,
    /// Loudness cadence the span was sampled at.
    pub sample_rate_hz: u32,
    /// Smoothed breathing rate at the end of the span, if any.
    pub rate_bpm: Option<f64>,
    /// Regularity score alongside the rate, if any.
    pub variability: Option<f64>,
    /// Sleep state badge: "Awake", "Drowsy", or "Asleep".
    pub badge: &'static str,
}

/// Persistence collaborator. Implementations run on the session's sink
/// thread; errors are logged by the caller and never propagate further.
pub trait FeatureSink: Send {
    fn record(&mut self, record: &BreathingLogRecord) -> Result<()>;

    /// Called once when the session stops, after the last record.
    fn session_ended(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Sink that drops everything; the default when no store is attached.
pub struct NullSink;

impl FeatureSink for NullSink {
    fn record(&mut self, _record: &BreathingLogRecord) -> Result<()> {
        Ok(())
    }
}

/// Per-sample state exposed to the presentation side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplaySnapshot {
    /// Analysis window full and features evaluated at least once.
    pub ready: bool,
    pub state: SleepState,
    pub rate_bpm: Option<f64>,
    pub variability: Option<f64>,
    /// Short human-readable line for the session screen.
    pub status_hint: String,
}

impl Default for DisplaySnapshot {
    fn default() -> Self {
        Self {
            ready: false,
            state: SleepState::Awake,
            rate_bpm: None,
            variability: None,
            status_hint: "starting".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serializes_with_badge_string() {
        let record = BreathingLogRecord {
            duration_sec: 10,
            sample_rate_hz: 10,
            rate_bpm: Some(11.5),
            variability: Some(0.12),
            badge: SleepState::Drowsy.badge(),
        };
        let json = serde_json::to_string(&record).expect("serialize");
        assert!(json.contains("\"badge\":\"Drowsy\""));
        assert!(json.contains("\"duration_sec\":10"));
    }

    #[test]
    fn absent_features_serialize_as_null() {
        let record = BreathingLogRecord {
            duration_sec: 10,
            sample_rate_hz: 10,
            rate_bpm: None,
            variability: None,
            badge: SleepState::Awake.badge(),
        };
        let json = serde_json::to_string(&record).expect("serialize");
        assert!(json.contains("\"rate_bpm\":null"));
    }

    #[test]
    fn default_snapshot_is_not_ready_and_awake() {
        let snap = DisplaySnapshot::default();
        assert!(!snap.ready);
        assert_eq!(snap.state, SleepState::Awake);
        assert_eq!(snap.rate_bpm, None);
    }
}
