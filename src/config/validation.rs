use super::{AppConfig, DetectorConfig, SessionConfig, MIN_MA_LEN};
use anyhow::{bail, Result};

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let config = <Self as clap::Parser>::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values against the ranges the pipeline can work with.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.sample_rate) {
            bail!(
                "--sample-rate must be between 1 and 100 Hz, got {}",
                self.sample_rate
            );
        }
        if !(5..=120).contains(&self.window_secs) {
            bail!(
                "--window-secs must be between 5 and 120, got {}",
                self.window_secs
            );
        }
        if !(MIN_MA_LEN..=200).contains(&self.ma_len) {
            bail!(
                "--ma-len must be between {MIN_MA_LEN} and 200, got {}",
                self.ma_len
            );
        }
        let window_samples = self.window_secs as usize * self.sample_rate as usize;
        let refractory = self.refractory();
        if refractory == 0 || refractory >= window_samples / 3 {
            // With fewer than three refractory spans per window, three
            // accepted peaks can never fit and no rate is ever produced.
            bail!(
                "--refractory-samples must be between 1 and {} for a {} s window at {} Hz, got {}",
                window_samples / 3 - 1,
                self.window_secs,
                self.sample_rate,
                refractory
            );
        }
        if self.calibration_samples == 0 || self.calibration_samples > 10_000 {
            bail!(
                "--calibration-samples must be between 1 and 10000, got {}",
                self.calibration_samples
            );
        }
        Ok(())
    }

    /// Effective peak refractory interval: the flag value, or one second of
    /// samples at the configured rate when the flag is absent.
    pub fn refractory(&self) -> usize {
        self.refractory_samples
            .unwrap_or(self.sample_rate as usize)
    }

    /// Snapshot the CLI-controlled detector tunables for downstream consumers.
    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            sample_rate_hz: self.sample_rate,
            window_secs: self.window_secs,
            ma_len: self.ma_len,
            refractory_samples: self.refractory(),
            ..DetectorConfig::default()
        }
    }

    /// Session tunables built on top of [`AppConfig::detector_config`].
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            detector: self.detector_config(),
            calibration_samples: self.calibration_samples,
            ..SessionConfig::default()
        }
    }
}
