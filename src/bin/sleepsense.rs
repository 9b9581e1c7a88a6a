//! SleepSense trace replay entrypoint.
//!
//! Reads a loudness trace (one RMS value per line, `#` comments and blank
//! lines skipped), drives it through the full session pipeline, and prints
//! the session summary as JSON. With `--records` each periodic breathing
//! record is also emitted as a JSON line as the replay crosses it.

use anyhow::{Context, Result};
use sleepsense::sink::{BreathingLogRecord, FeatureSink, NullSink};
use sleepsense::{replay_trace, telemetry, AppConfig};
use std::fs;
use std::io::{self, Read, Write};

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    telemetry::init_tracing(&config);

    let session_config = config.session_config();
    if config.print_config {
        println!("{}", serde_json::to_string_pretty(&session_config)?);
        return Ok(());
    }

    let samples = read_trace(&config.trace)?;
    tracing::info!(samples = samples.len(), trace = %config.trace, "replaying trace");

    let summary = if config.records {
        let mut sink = JsonLineSink;
        replay_trace(&samples, &session_config, &mut sink)
    } else {
        let mut sink = NullSink;
        replay_trace(&samples, &session_config, &mut sink)
    };

    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

fn read_trace(path: &str) -> Result<Vec<f64>> {
    let raw = if path == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("read trace from stdin")?;
        buf
    } else {
        fs::read_to_string(path).with_context(|| format!("read trace file {path}"))?
    };

    let mut samples = Vec::new();
    for (number, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let value: f64 = line
            .parse()
            .with_context(|| format!("trace line {}: not a number: {line:?}", number + 1))?;
        samples.push(value);
    }
    Ok(samples)
}

/// Writes each breathing record to stdout as one JSON line.
struct JsonLineSink;

impl FeatureSink for JsonLineSink {
    fn record(&mut self, record: &BreathingLogRecord) -> Result<()> {
        let mut stdout = io::stdout().lock();
        serde_json::to_writer(&mut stdout, record)?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}
