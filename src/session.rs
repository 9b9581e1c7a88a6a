//! Live sleep-session driver around the breathing detector.
//!
//! Capture pushes loudness samples into a bounded channel; a processing
//! thread owns the calibrator and detector and applies samples one at a time,
//! so detector state only ever has a single writer. Persistence records cross
//! to a dedicated sink thread over a second channel, keeping slow or failing
//! stores off the per-sample path entirely.

use crate::config::SessionConfig;
use crate::detector::{BreathingDetector, Calibrator, GateDecision, LastFeatures, PushOutcome, SleepState};
use crate::sink::{BreathingLogRecord, DisplaySnapshot, FeatureSink};
use anyhow::{anyhow, Result};
use crossbeam_channel::{bounded, unbounded, Sender, TrySendError};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

enum Ingest {
    Sample(f64),
    Reset,
}

enum SinkMessage {
    Record(BreathingLogRecord),
    Ended,
}

/// Counters and final feature values reported when a session stops or a
/// replay finishes.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub samples_seen: usize,
    /// Samples rejected at the ingestion queue because processing fell behind.
    pub samples_dropped: usize,
    /// Post-calibration samples gated out as too weak to analyze.
    pub samples_too_weak: usize,
    pub records_emitted: usize,
    pub sink_failures: usize,
    /// Whether the analysis window ever filled.
    pub ready: bool,
    pub final_state: SleepState,
    pub last: LastFeatures,
}

/// Calibration gate + detector + record cadence, shared by the live worker
/// and the offline replay path.
struct SessionPipeline {
    detector: BreathingDetector,
    calibrator: Calibrator,
    record_interval: usize,
    record_duration_sec: u32,
    sample_rate_hz: u32,
    ticks_since_record: usize,
    samples_seen: usize,
    samples_too_weak: usize,
    records_emitted: usize,
    ready: bool,
}

impl SessionPipeline {
    fn new(cfg: &SessionConfig) -> Self {
        let interval = cfg.record_interval_samples.max(1);
        Self {
            detector: BreathingDetector::new(cfg.detector.clone()),
            calibrator: Calibrator::new(cfg.calibration_samples, cfg.weak_snr_threshold),
            record_interval: interval,
            record_duration_sec: (interval as u32) / cfg.detector.sample_rate_hz.max(1),
            sample_rate_hz: cfg.detector.sample_rate_hz,
            ticks_since_record: 0,
            samples_seen: 0,
            samples_too_weak: 0,
            records_emitted: 0,
            ready: false,
        }
    }

    /// Apply one raw sample; returns the fresh display snapshot and a
    /// persistence record when the cadence boundary was crossed.
    fn on_sample(&mut self, rms: f64) -> (DisplaySnapshot, Option<BreathingLogRecord>) {
        self.samples_seen += 1;

        let decision = self.calibrator.observe(rms);
        let snapshot = match decision {
            GateDecision::Warming { progress } => DisplaySnapshot {
                ready: false,
                state: self.detector.state(),
                rate_bpm: None,
                variability: None,
                status_hint: format!("calibrating ({:.0}%)", progress * 100.0),
            },
            GateDecision::TooWeak => {
                self.samples_too_weak += 1;
                let last = self.detector.last_features();
                DisplaySnapshot {
                    ready: self.ready,
                    state: self.detector.state(),
                    rate_bpm: last.rate_bpm,
                    variability: last.variability,
                    status_hint: "too quiet".to_string(),
                }
            }
            GateDecision::Pass => {
                let outcome = self.detector.push(rms);
                if outcome.is_ready() {
                    self.ready = true;
                }
                let last = self.detector.last_features();
                let state = self.detector.state();
                DisplaySnapshot {
                    ready: outcome.is_ready(),
                    state,
                    rate_bpm: last.rate_bpm,
                    variability: last.variability,
                    status_hint: status_hint(&outcome, state),
                }
            }
        };

        // The record cadence starts once calibration completes; too-weak
        // ticks still advance it because session time keeps passing.
        let record = if self.calibrator.is_calibrated()
            && !matches!(decision, GateDecision::Warming { .. })
        {
            self.ticks_since_record += 1;
            if self.ticks_since_record >= self.record_interval {
                self.ticks_since_record = 0;
                self.records_emitted += 1;
                let last = self.detector.last_features();
                Some(BreathingLogRecord {
                    duration_sec: self.record_duration_sec,
                    sample_rate_hz: self.sample_rate_hz,
                    rate_bpm: last.rate_bpm,
                    variability: last.variability,
                    badge: self.detector.state().badge(),
                })
            } else {
                None
            }
        } else {
            None
        };

        (snapshot, record)
    }

    fn reset(&mut self) {
        self.detector.reset();
        self.calibrator.reset();
        self.ticks_since_record = 0;
        self.ready = false;
    }

    fn into_summary(self, samples_dropped: usize, sink_failures: usize) -> SessionSummary {
        SessionSummary {
            samples_seen: self.samples_seen,
            samples_dropped,
            samples_too_weak: self.samples_too_weak,
            records_emitted: self.records_emitted,
            sink_failures,
            ready: self.ready,
            final_state: self.detector.state(),
            last: self.detector.last_features(),
        }
    }
}

fn status_hint(outcome: &PushOutcome, state: SleepState) -> String {
    match state {
        SleepState::Asleep => "asleep".to_string(),
        SleepState::Drowsy => "drifting off".to_string(),
        SleepState::Awake => match outcome {
            PushOutcome::Filling { .. } => "listening".to_string(),
            PushOutcome::Ready(features) if features.rate_bpm.is_some() => {
                "breathing steady".to_string()
            }
            PushOutcome::Ready(_) => "listening".to_string(),
        },
    }
}

struct Running {
    ingest_tx: Sender<Ingest>,
    sink_tx: Sender<SinkMessage>,
    worker: thread::JoinHandle<SessionPipeline>,
    sink_worker: thread::JoinHandle<usize>,
    snapshot: Arc<Mutex<DisplaySnapshot>>,
    dropped: Arc<AtomicUsize>,
}

/// Owns one sleep session's threads and buffers.
///
/// `start` and `stop` are idempotent; starting twice is a no-op after the
/// first, stopping when not started returns `None`.
pub struct SleepSession {
    cfg: SessionConfig,
    inner: Option<Running>,
}

impl SleepSession {
    pub fn new(cfg: SessionConfig) -> Self {
        Self { cfg, inner: None }
    }

    pub fn is_running(&self) -> bool {
        self.inner.is_some()
    }

    /// Spin up the processing and sink threads. No-op when already running.
    pub fn start(&mut self, mut sink: Box<dyn FeatureSink>) -> Result<()> {
        if self.inner.is_some() {
            return Ok(());
        }

        let (ingest_tx, ingest_rx) = bounded::<Ingest>(self.cfg.queue_capacity.max(1));
        let (sink_tx, sink_rx) = unbounded::<SinkMessage>();
        let snapshot = Arc::new(Mutex::new(DisplaySnapshot::default()));
        let dropped = Arc::new(AtomicUsize::new(0));

        let mut pipeline = SessionPipeline::new(&self.cfg);
        let worker_snapshot = snapshot.clone();
        let worker_sink_tx = sink_tx.clone();
        let worker = thread::spawn(move || {
            // Draining the channel after the sender drops flushes any samples
            // still queued at stop time.
            for message in ingest_rx {
                match message {
                    Ingest::Sample(rms) => {
                        let (snap, record) = pipeline.on_sample(rms);
                        if let Ok(mut shared) = worker_snapshot.lock() {
                            *shared = snap;
                        }
                        if let Some(record) = record {
                            let _ = worker_sink_tx.send(SinkMessage::Record(record));
                        }
                    }
                    Ingest::Reset => {
                        pipeline.reset();
                        if let Ok(mut shared) = worker_snapshot.lock() {
                            *shared = DisplaySnapshot::default();
                        }
                    }
                }
            }
            pipeline
        });

        let sink_worker = thread::spawn(move || {
            let mut failures = 0usize;
            for message in sink_rx {
                let result = match message {
                    SinkMessage::Record(record) => sink.record(&record),
                    SinkMessage::Ended => sink.session_ended(),
                };
                if let Err(err) = result {
                    tracing::warn!(error = %err, "feature sink delivery failed");
                    failures += 1;
                }
            }
            failures
        });

        self.inner = Some(Running {
            ingest_tx,
            sink_tx,
            worker,
            sink_worker,
            snapshot,
            dropped,
        });
        tracing::info!("sleep session started");
        Ok(())
    }

    /// Offer one loudness sample to the session. Returns `false` when the
    /// session is stopped or the queue is full (the sample is dropped, never
    /// waited on; capture must not block).
    pub fn push(&self, rms: f64) -> bool {
        let Some(running) = &self.inner else {
            return false;
        };
        match running.ingest_tx.try_send(Ingest::Sample(rms)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                running.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Clear all detector and calibration state back to a fresh Awake
    /// session without stopping the threads.
    pub fn reset(&self) {
        if let Some(running) = &self.inner {
            let _ = running.ingest_tx.send(Ingest::Reset);
        }
    }

    /// Latest per-sample state for display. Default snapshot when stopped.
    pub fn snapshot(&self) -> DisplaySnapshot {
        match &self.inner {
            Some(running) => running
                .snapshot
                .lock()
                .map(|shared| shared.clone())
                .unwrap_or_default(),
            None => DisplaySnapshot::default(),
        }
    }

    /// Stop the session, flush the sink, and return the summary. `None` when
    /// the session was not running.
    pub fn stop(&mut self) -> Result<Option<SessionSummary>> {
        let Some(running) = self.inner.take() else {
            return Ok(None);
        };

        drop(running.ingest_tx);
        let pipeline = running
            .worker
            .join()
            .map_err(|_| anyhow!("session worker panicked"))?;

        let _ = running.sink_tx.send(SinkMessage::Ended);
        drop(running.sink_tx);
        let sink_failures = running
            .sink_worker
            .join()
            .map_err(|_| anyhow!("sink worker panicked"))?;

        let summary =
            pipeline.into_summary(running.dropped.load(Ordering::Relaxed), sink_failures);
        tracing::info!(
            samples = summary.samples_seen,
            records = summary.records_emitted,
            state = summary.final_state.badge(),
            "sleep session stopped"
        );
        Ok(Some(summary))
    }
}

impl Drop for SleepSession {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Run a pre-recorded loudness trace through the full session pipeline
/// synchronously: calibration gate, detector, and record cadence included.
pub fn replay_trace(
    samples: &[f64],
    cfg: &SessionConfig,
    sink: &mut dyn FeatureSink,
) -> SessionSummary {
    let mut pipeline = SessionPipeline::new(cfg);
    let mut sink_failures = 0usize;
    for &rms in samples {
        let (_, record) = pipeline.on_sample(rms);
        if let Some(record) = record {
            if let Err(err) = sink.record(&record) {
                tracing::warn!(error = %err, "feature sink delivery failed");
                sink_failures += 1;
            }
        }
    }
    if let Err(err) = sink.session_ended() {
        tracing::warn!(error = %err, "feature sink end marker failed");
        sink_failures += 1;
    }
    pipeline.into_summary(0, sink_failures)
}
