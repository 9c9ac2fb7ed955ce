use crate::alphabet::FREQUENCY_PLAN;
use crate::FADE_DURATION_S;
use std::f32::consts::PI;

/// Guard added to the normalization divisor so a silent buffer stays silent
const NORMALIZE_EPSILON: f32 = 1e-9;

/// Render one symbol as a dual-tone burst
///
/// The burst is `round(duration_s × sample_rate)` samples of
/// `0.5·sin(2π·f_low·t) + 0.5·sin(2π·f_high·t)` over the half-open interval
/// `[0, duration_s)`, with linear fades of `FADE_DURATION_S` at both edges,
/// rescaled so the largest absolute sample is 1.0.
///
/// A symbol outside the alphabet renders as silence of the same length so the
/// mixing schedule stays intact.
pub fn generate_tone(symbol: char, duration_s: f32, sample_rate: u32) -> Vec<f32> {
    let len = burst_length(duration_s, sample_rate);
    let Some((low_freq, high_freq)) = FREQUENCY_PLAN.frequencies_for(symbol) else {
        return vec![0.0; len];
    };

    let step = duration_s / len.max(1) as f32;
    let mut samples: Vec<f32> = (0..len)
        .map(|i| {
            let t = i as f32 * step;
            0.5 * (2.0 * PI * low_freq * t).sin() + 0.5 * (2.0 * PI * high_freq * t).sin()
        })
        .collect();

    apply_linear_fade(&mut samples, fade_length(sample_rate));

    let max_amp = samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs())) + NORMALIZE_EPSILON;
    for sample in samples.iter_mut() {
        *sample /= max_amp;
    }

    samples
}

/// Number of samples in a burst of the given duration
pub fn burst_length(duration_s: f32, sample_rate: u32) -> usize {
    (duration_s * sample_rate as f32).round() as usize
}

fn fade_length(sample_rate: u32) -> usize {
    (sample_rate as f32 * FADE_DURATION_S) as usize
}

/// Linear ramp 0→1 over the first `fade_len` samples and 1→0 over the last.
/// Buffers not longer than two fades are left untouched.
fn apply_linear_fade(samples: &mut [f32], fade_len: usize) {
    let len = samples.len();
    if fade_len == 0 || len <= 2 * fade_len {
        return;
    }

    let denom = (fade_len - 1).max(1) as f32;
    for i in 0..fade_len {
        let gain = i as f32 / denom;
        samples[i] *= gain;
        samples[len - 1 - i] *= gain;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goertzel_power(samples: &[f32], freq: f32, sample_rate: f32) -> f32 {
        let omega = 2.0 * PI * freq / sample_rate;
        let coeff = 2.0 * omega.cos();
        let (mut q1, mut q2) = (0.0f32, 0.0f32);
        for &sample in samples {
            let q0 = coeff * q1 - q2 + sample;
            q2 = q1;
            q1 = q0;
        }
        q1 * q1 + q2 * q2 - q1 * q2 * coeff
    }

    #[test]
    fn test_tone_length() {
        assert_eq!(generate_tone('A', 0.15, 96000).len(), 14400);
        assert_eq!(generate_tone('A', 0.2, 96000).len(), 19200);
        // 0.123 s × 44100 = 5424.3
        assert_eq!(generate_tone('A', 0.123, 44100).len(), 5424);
    }

    #[test]
    fn test_tone_normalized_to_unit_peak() {
        let samples = generate_tone('H', 0.15, 96000);
        let peak = samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
        assert!((peak - 1.0).abs() < 1e-5, "Peak should be 1.0, got {}", peak);
    }

    #[test]
    fn test_tone_edges_faded() {
        let samples = generate_tone('Q', 0.15, 96000);
        assert_eq!(samples[0], 0.0);
        assert_eq!(*samples.last().unwrap(), 0.0);
        // Still inside the 960-sample ramp
        let early_peak = samples[..96].iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
        assert!(early_peak < 0.15, "Fade-in too steep: {}", early_peak);
    }

    #[test]
    fn test_unknown_symbol_is_silent() {
        let samples = generate_tone('!', 0.15, 96000);
        assert_eq!(samples.len(), 14400);
        assert!(samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_tone_energy_at_plan_frequencies() {
        let sample_rate = 96000.0;
        let samples = generate_tone('H', 0.15, 96000);
        let low = goertzel_power(&samples, 21000.0, sample_rate);
        let high = goertzel_power(&samples, 25000.0, sample_rate);
        let off = goertzel_power(&samples, 22000.0, sample_rate);

        let ratio = low.min(high) / low.max(high);
        assert!(ratio > 0.9, "Tones should carry equal energy, ratio {}", ratio);
        assert!(off < low * 0.01, "Unexpected energy at 22 kHz");
    }

    #[test]
    fn test_short_buffer_skips_fade() {
        let mut samples = vec![1.0; 10];
        apply_linear_fade(&mut samples, 5);
        assert!(samples.iter().all(|&s| s == 1.0));

        let mut samples = vec![1.0; 11];
        apply_linear_fade(&mut samples, 5);
        assert_eq!(samples[0], 0.0);
        assert_eq!(samples[4], 1.0);
        assert_eq!(samples[10], 0.0);
    }
}
