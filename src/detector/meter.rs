//! Loudness measurement helper for integrators feeding raw PCM.

/// RMS loudness of a mono PCM frame, roughly in [0, 1] for full-scale input.
///
/// The pipeline consumes one of these per ~100 ms capture buffer.
pub fn rms_of(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let energy: f64 = samples
        .iter()
        .map(|&s| f64::from(s) * f64::from(s))
        .sum::<f64>()
        / samples.len() as f64;
    energy.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_frame_is_silent() {
        assert_eq!(rms_of(&[]), 0.0);
    }

    #[test]
    fn full_scale_square_wave_is_unity() {
        let frame = [1.0f32, -1.0, 1.0, -1.0];
        assert!((rms_of(&frame) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sine_rms_is_peak_over_sqrt_two() {
        let frame: Vec<f32> = (0..1_600)
            .map(|i| (i as f32 * std::f32::consts::PI * 2.0 / 160.0).sin() * 0.5)
            .collect();
        assert!((rms_of(&frame) - 0.5 / 2.0f64.sqrt()).abs() < 1e-3);
    }
}
