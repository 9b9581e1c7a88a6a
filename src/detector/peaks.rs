//! Peak detection and inter-breath-interval statistics.
//!
//! Operates on an ordered snapshot of the analysis window. A candidate peak
//! is a strict local maximum whose prominence over both neighbors meets a
//! minimum; candidates closer than the refractory interval to the previously
//! accepted peak are discarded, which caps the maximum representable rate and
//! suppresses double counting of noisy near-duplicate maxima.

/// Indices of accepted peaks within `window`, oldest first.
pub(super) fn find_peaks(window: &[f64], min_prominence: f64, refractory: usize) -> Vec<usize> {
    let mut peaks = Vec::new();
    let mut last_accepted: Option<usize> = None;
    for i in 1..window.len().saturating_sub(1) {
        if !(window[i] > window[i - 1] && window[i] > window[i + 1]) {
            continue;
        }
        let prominence = window[i] - window[i - 1].max(window[i + 1]);
        if prominence < min_prominence {
            continue;
        }
        match last_accepted {
            Some(prev) if i - prev < refractory => continue,
            _ => {
                peaks.push(i);
                last_accepted = Some(i);
            }
        }
    }
    peaks
}

/// Breathing rate (bpm) and coefficient of variation from accepted peaks.
///
/// Requires at least three peaks so the interval statistics rest on two or
/// more IBIs; returns `None` otherwise or when the mean interval degenerates.
pub(super) fn rate_and_cv(peaks: &[usize], sample_rate_hz: u32) -> Option<(f64, f64)> {
    if peaks.len() < 3 {
        return None;
    }
    let fs = f64::from(sample_rate_hz);
    let ibis: Vec<f64> = peaks.windows(2).map(|w| (w[1] - w[0]) as f64 / fs).collect();
    let mean: f64 = ibis.iter().sum::<f64>() / ibis.len() as f64;
    if mean <= 1e-6 {
        return None;
    }
    let variance: f64 = ibis.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / ibis.len() as f64;
    let stddev = variance.sqrt();
    Some((60.0 / mean, stddev / mean))
}
