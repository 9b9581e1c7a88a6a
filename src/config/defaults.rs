//! Named defaults for the detector and session tunables.

/// Loudness sample cadence the defaults are tuned for (10 Hz ≈ one 100 ms
/// capture buffer per sample).
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 10;

/// Analysis window span in seconds.
pub const DEFAULT_WINDOW_SECS: u32 = 15;

/// Low-pass moving-average length in samples (~2 s at 10 Hz).
pub const DEFAULT_MA_LEN: usize = 20;

/// Shortest usable moving-average window.
pub const MIN_MA_LEN: usize = 3;

/// Minimum spacing between accepted peaks, in samples (1.0 s at 10 Hz).
pub const DEFAULT_REFRACTORY_SAMPLES: usize = 10;

/// Minimum height of a peak over both neighbors.
pub const DEFAULT_MIN_PROMINENCE: f64 = 0.0025;

/// Absolute window-amplitude floor; below it, rate/CV are invalidated.
pub const DEFAULT_MIN_AMPLITUDE: f64 = 0.008;

/// Starting value for the adaptive noise floor.
pub const DEFAULT_INITIAL_FLOOR: f64 = 0.01;

/// Fraction of the old floor retained per sample while rising (very slow).
pub const DEFAULT_FLOOR_RISE_RETAIN: f64 = 0.9990;

/// Fraction of the old floor retained per sample while decaying (slow).
pub const DEFAULT_FLOOR_DECAY_RETAIN: f64 = 0.990;

/// Hard minimum for the adaptive floor.
pub const DEFAULT_MIN_FLOOR: f64 = 0.0025;

/// EMA weight applied to each new SNR value.
pub const DEFAULT_EMA_ALPHA: f64 = 0.3;

/// Span of the window-amplitude baseline history.
pub const DEFAULT_AMP_HISTORY_SECS: u32 = 5 * 60;

/// Amplitude counts as "low" at or below this fraction of the baseline.
pub const DEFAULT_AMP_LOW_RATIO: f64 = 0.4;

/// Physiologically plausible breathing-rate band, breaths/minute.
pub const DEFAULT_RATE_MIN_BPM: f64 = 6.0;
pub const DEFAULT_RATE_MAX_BPM: f64 = 24.0;

/// Open band of resting breathing rates that counts toward drowsiness.
pub const DEFAULT_DROWSY_RATE_MIN_BPM: f64 = 9.0;
pub const DEFAULT_DROWSY_RATE_MAX_BPM: f64 = 14.0;

/// CV below this means steady breathing (asleep criterion).
pub const DEFAULT_CV_STEADY_MAX: f64 = 0.25;

/// CV below this means settling breathing (drowsy criterion).
pub const DEFAULT_CV_WEAK_MAX: f64 = 0.35;

/// Sustained qualification required before Awake → Drowsy.
pub const DEFAULT_DROWSY_HOLD_SECS: f64 = 20.0;

/// Sustained qualification required before Drowsy → Asleep.
pub const DEFAULT_ASLEEP_HOLD_SECS: f64 = 30.0;

/// Warm-up samples averaged into the calibrated floor (~12 s at 10 Hz).
pub const DEFAULT_CALIBRATION_SAMPLES: usize = 120;

/// Excess over the calibrated floor below which a sample is "too weak".
pub const DEFAULT_WEAK_SNR_THRESHOLD: f64 = 0.005;

/// Samples between persisted breathing records (~10 s at 10 Hz).
pub const DEFAULT_RECORD_INTERVAL_SAMPLES: usize = 100;

/// Capacity of the capture → processing channel.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;
