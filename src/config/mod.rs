//! Command-line parsing, detector tunables, and validation helpers.

mod defaults;
mod validation;

use clap::Parser;
use serde::Serialize;

pub use defaults::{
    DEFAULT_AMP_HISTORY_SECS, DEFAULT_AMP_LOW_RATIO, DEFAULT_ASLEEP_HOLD_SECS,
    DEFAULT_CALIBRATION_SAMPLES, DEFAULT_CV_STEADY_MAX, DEFAULT_CV_WEAK_MAX,
    DEFAULT_DROWSY_HOLD_SECS, DEFAULT_DROWSY_RATE_MAX_BPM, DEFAULT_DROWSY_RATE_MIN_BPM,
    DEFAULT_EMA_ALPHA, DEFAULT_FLOOR_DECAY_RETAIN, DEFAULT_FLOOR_RISE_RETAIN,
    DEFAULT_INITIAL_FLOOR, DEFAULT_MA_LEN, DEFAULT_MIN_AMPLITUDE, DEFAULT_MIN_FLOOR,
    DEFAULT_MIN_PROMINENCE, DEFAULT_QUEUE_CAPACITY, DEFAULT_RATE_MAX_BPM, DEFAULT_RATE_MIN_BPM,
    DEFAULT_RECORD_INTERVAL_SAMPLES, DEFAULT_REFRACTORY_SAMPLES, DEFAULT_SAMPLE_RATE_HZ,
    DEFAULT_WEAK_SNR_THRESHOLD, DEFAULT_WINDOW_SECS, MIN_MA_LEN,
};

/// CLI options for the SleepSense trace replay tool.
#[derive(Debug, Parser, Clone)]
#[command(about = "SleepSense breathing-rate and sleep-depth replay tool", author, version)]
pub struct AppConfig {
    /// Loudness trace file, one RMS value per line ('-' reads stdin)
    #[arg(long, default_value = "-")]
    pub trace: String,

    /// Emit each periodic breathing record as a JSON line
    #[arg(long = "records", default_value_t = false)]
    pub records: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long = "print-config", default_value_t = false)]
    pub print_config: bool,

    /// Loudness sample rate (Hz)
    #[arg(long = "sample-rate", default_value_t = DEFAULT_SAMPLE_RATE_HZ)]
    pub sample_rate: u32,

    /// Analysis window span (seconds)
    #[arg(long = "window-secs", default_value_t = DEFAULT_WINDOW_SECS)]
    pub window_secs: u32,

    /// Low-pass moving-average length (samples)
    #[arg(long = "ma-len", default_value_t = DEFAULT_MA_LEN)]
    pub ma_len: usize,

    /// Minimum spacing between accepted breath peaks (samples); defaults to
    /// one second of samples at the configured rate
    #[arg(long = "refractory-samples")]
    pub refractory_samples: Option<usize>,

    /// Warm-up samples averaged into the calibration floor
    #[arg(long = "calibration-samples", default_value_t = DEFAULT_CALIBRATION_SAMPLES)]
    pub calibration_samples: usize,

    /// Enable JSON trace logging
    #[arg(long = "logs", env = "SLEEPSENSE_LOGS", default_value_t = false)]
    pub logs: bool,
}

/// Tunable parameters for one breathing detector instance.
#[derive(Debug, Clone, Serialize)]
pub struct DetectorConfig {
    pub sample_rate_hz: u32,
    pub window_secs: u32,
    pub ma_len: usize,
    pub refractory_samples: usize,
    pub min_prominence: f64,
    pub min_amplitude: f64,
    pub initial_floor: f64,
    pub floor_rise_retain: f64,
    pub floor_decay_retain: f64,
    pub min_floor: f64,
    pub ema_alpha: f64,
    pub amp_history_secs: u32,
    pub amp_low_ratio: f64,
    pub rate_min_bpm: f64,
    pub rate_max_bpm: f64,
    pub drowsy_rate_min_bpm: f64,
    pub drowsy_rate_max_bpm: f64,
    pub cv_steady_max: f64,
    pub cv_weak_max: f64,
    pub drowsy_hold_secs: f64,
    pub asleep_hold_secs: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            window_secs: DEFAULT_WINDOW_SECS,
            ma_len: DEFAULT_MA_LEN,
            refractory_samples: DEFAULT_REFRACTORY_SAMPLES,
            min_prominence: DEFAULT_MIN_PROMINENCE,
            min_amplitude: DEFAULT_MIN_AMPLITUDE,
            initial_floor: DEFAULT_INITIAL_FLOOR,
            floor_rise_retain: DEFAULT_FLOOR_RISE_RETAIN,
            floor_decay_retain: DEFAULT_FLOOR_DECAY_RETAIN,
            min_floor: DEFAULT_MIN_FLOOR,
            ema_alpha: DEFAULT_EMA_ALPHA,
            amp_history_secs: DEFAULT_AMP_HISTORY_SECS,
            amp_low_ratio: DEFAULT_AMP_LOW_RATIO,
            rate_min_bpm: DEFAULT_RATE_MIN_BPM,
            rate_max_bpm: DEFAULT_RATE_MAX_BPM,
            drowsy_rate_min_bpm: DEFAULT_DROWSY_RATE_MIN_BPM,
            drowsy_rate_max_bpm: DEFAULT_DROWSY_RATE_MAX_BPM,
            cv_steady_max: DEFAULT_CV_STEADY_MAX,
            cv_weak_max: DEFAULT_CV_WEAK_MAX,
            drowsy_hold_secs: DEFAULT_DROWSY_HOLD_SECS,
            asleep_hold_secs: DEFAULT_ASLEEP_HOLD_SECS,
        }
    }
}

impl DetectorConfig {
    /// Analysis window capacity in samples.
    pub fn window_samples(&self) -> usize {
        (self.window_secs as usize) * (self.sample_rate_hz as usize)
    }

    /// Amplitude-history capacity in samples.
    pub fn amp_history_samples(&self) -> usize {
        (self.amp_history_secs as usize) * (self.sample_rate_hz as usize)
    }

    /// Seconds per sample tick.
    pub fn dt(&self) -> f64 {
        1.0 / f64::from(self.sample_rate_hz)
    }
}

/// Tunable parameters for the session driver wrapped around a detector.
#[derive(Debug, Clone, Serialize)]
pub struct SessionConfig {
    pub detector: DetectorConfig,
    pub calibration_samples: usize,
    pub weak_snr_threshold: f64,
    pub record_interval_samples: usize,
    pub queue_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            calibration_samples: DEFAULT_CALIBRATION_SAMPLES,
            weak_snr_threshold: DEFAULT_WEAK_SNR_THRESHOLD,
            record_interval_samples: DEFAULT_RECORD_INTERVAL_SAMPLES,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}
