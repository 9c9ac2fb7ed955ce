//! Zero-phase Butterworth band-pass filter
//!
//! The filter is designed from the analog Butterworth prototype, shifted to a
//! band-pass, mapped through the bilinear transform and stored as cascaded
//! second-order sections. `filtfilt` runs it forward then backward so the
//! output carries no group delay.

use crate::error::{CodecError, Result};
use rustfft::num_complex::Complex;
use std::f64::consts::PI;

/// Imaginary parts below this are treated as real poles
const REAL_POLE_EPSILON: f64 = 1e-12;

/// One biquad, `a[0]` normalized to 1
#[derive(Debug, Clone, Copy)]
struct Section {
    b: [f64; 3],
    a: [f64; 3],
}

impl Section {
    fn response(&self, z_inv: Complex<f64>) -> Complex<f64> {
        let z_inv2 = z_inv * z_inv;
        let num = z_inv * self.b[1] + z_inv2 * self.b[2] + self.b[0];
        let den = z_inv * self.a[1] + z_inv2 * self.a[2] + self.a[0];
        num / den
    }

    fn dc_gain(&self) -> f64 {
        (self.b[0] + self.b[1] + self.b[2]) / (self.a[0] + self.a[1] + self.a[2])
    }

    /// Run in place (direct form II transposed), starting from the steady
    /// state a constant input equal to `samples[0]` would leave behind.
    fn process(&self, samples: &mut [f64]) {
        let Some(&first) = samples.first() else {
            return;
        };
        let gain = self.dc_gain();
        let mut z1 = (gain - self.b[0]) * first;
        let mut z2 = (self.b[2] - self.a[2] * gain) * first;

        for sample in samples.iter_mut() {
            let x = *sample;
            let y = self.b[0] * x + z1;
            z1 = self.b[1] * x - self.a[1] * y + z2;
            z2 = self.b[2] * x - self.a[2] * y;
            *sample = y;
        }
    }
}

/// Butterworth band-pass between `lowcut` and `highcut`
#[derive(Debug, Clone)]
pub struct BandpassFilter {
    sections: Vec<Section>,
    lowcut: f32,
    highcut: f32,
    sample_rate: u32,
    order: usize,
}

impl BandpassFilter {
    /// Design a band-pass of the given prototype order (the digital filter
    /// has `2 × order` poles).
    ///
    /// Fails with `InvalidBand` unless `0 < lowcut < highcut < sample_rate / 2`.
    pub fn new(lowcut: f32, highcut: f32, sample_rate: u32, order: usize) -> Result<Self> {
        let nyquist = sample_rate as f32 / 2.0;
        if !(lowcut > 0.0 && lowcut < highcut && highcut < nyquist) {
            return Err(CodecError::InvalidBand {
                lowcut,
                highcut,
                nyquist,
            });
        }
        if order == 0 {
            return Err(CodecError::InvalidConfig("filter order must be at least 1".into()));
        }

        let fs = sample_rate as f64;
        let warp = |freq: f32| 2.0 * fs * (PI * freq as f64 / fs).tan();
        let w_low = warp(lowcut);
        let w_high = warp(highcut);
        let bandwidth = w_high - w_low;
        let center_sq = w_low * w_high;
        let fs2 = Complex::new(2.0 * fs, 0.0);

        // Analog prototype poles -> band-pass poles -> z-plane
        let mut upper = Vec::with_capacity(order);
        let mut real = Vec::new();
        for k in 0..order {
            let theta = PI * (2 * k + order + 1) as f64 / (2 * order) as f64;
            let half = Complex::from_polar(bandwidth / 2.0, theta);
            let root = (half * half - center_sq).sqrt();
            for s in [half + root, half - root] {
                let z = (fs2 + s) / (fs2 - s);
                if z.im > REAL_POLE_EPSILON {
                    upper.push(z);
                } else if z.im.abs() <= REAL_POLE_EPSILON {
                    real.push(z.re);
                }
            }
        }

        // Every section carries one zero at z = 1 and one at z = -1
        let mut sections: Vec<Section> = upper
            .iter()
            .map(|p| Section {
                b: [1.0, 0.0, -1.0],
                a: [1.0, -2.0 * p.re, p.norm_sqr()],
            })
            .collect();
        real.sort_by(|a, b| a.total_cmp(b));
        for pair in real.chunks(2) {
            let (p1, p2) = (pair[0], pair.get(1).copied().unwrap_or(0.0));
            sections.push(Section {
                b: [1.0, 0.0, -1.0],
                a: [1.0, -(p1 + p2), p1 * p2],
            });
        }

        // Unity gain at the band centre
        let center = 2.0 * (center_sq.sqrt() / (2.0 * fs)).atan();
        let z_inv = Complex::from_polar(1.0, -center);
        let response = sections
            .iter()
            .fold(Complex::new(1.0, 0.0), |acc, s| acc * s.response(z_inv));
        let scale = 1.0 / response.norm();
        if let Some(first) = sections.first_mut() {
            for coeff in first.b.iter_mut() {
                *coeff *= scale;
            }
        }

        Ok(Self {
            sections,
            lowcut,
            highcut,
            sample_rate,
            order,
        })
    }

    pub fn lowcut(&self) -> f32 {
        self.lowcut
    }

    pub fn highcut(&self) -> f32 {
        self.highcut
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Single-pass magnitude response at `freq_hz`
    pub fn magnitude_response(&self, freq_hz: f32) -> f32 {
        let omega = 2.0 * PI * freq_hz as f64 / self.sample_rate as f64;
        let z_inv = Complex::from_polar(1.0, -omega);
        self.sections
            .iter()
            .fold(Complex::new(1.0, 0.0), |acc, s| acc * s.response(z_inv))
            .norm() as f32
    }

    /// Forward-backward filtering with odd-reflection padding at both ends.
    ///
    /// The effective magnitude response is `magnitude_response²` and the
    /// phase response is zero.
    pub fn filtfilt(&self, samples: &[f32]) -> Vec<f32> {
        if samples.len() < 2 {
            return samples.to_vec();
        }

        let pad = (3 * (2 * self.sections.len() + 1)).min(samples.len() - 1);
        let mut extended = odd_extend(samples, pad);

        self.run(&mut extended);
        extended.reverse();
        self.run(&mut extended);
        extended.reverse();

        extended[pad..pad + samples.len()]
            .iter()
            .map(|&s| s as f32)
            .collect()
    }

    fn run(&self, samples: &mut [f64]) {
        for section in &self.sections {
            section.process(samples);
        }
    }
}

/// `[2·x0 - x[pad..1], x, 2·xN - x[N-2..N-1-pad]]`
fn odd_extend(samples: &[f32], pad: usize) -> Vec<f64> {
    let n = samples.len();
    let first = samples[0] as f64;
    let last = samples[n - 1] as f64;

    let mut extended = Vec::with_capacity(n + 2 * pad);
    extended.extend((1..=pad).rev().map(|i| 2.0 * first - samples[i] as f64));
    extended.extend(samples.iter().map(|&s| s as f64));
    extended.extend((1..=pad).map(|i| 2.0 * last - samples[n - 1 - i] as f64));
    extended
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI as PI32;

    fn sine(freq: f32, len: usize, sample_rate: u32) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI32 * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    fn rms(samples: &[f32]) -> f32 {
        (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
    }

    #[test]
    fn test_highcut_at_nyquist_rejected() {
        let result = BandpassFilter::new(20000.0, 48000.0, 96000, 3);
        assert!(matches!(result, Err(CodecError::InvalidBand { .. })));

        let result = BandpassFilter::new(20000.0, 27000.0, 48000, 3);
        assert!(matches!(result, Err(CodecError::InvalidBand { .. })));
    }

    #[test]
    fn test_inverted_band_rejected() {
        assert!(BandpassFilter::new(27000.0, 20000.0, 96000, 3).is_err());
        assert!(BandpassFilter::new(0.0, 20000.0, 96000, 3).is_err());
        assert!(BandpassFilter::new(20000.0, 27000.0, 96000, 0).is_err());
    }

    #[test]
    fn test_section_count_matches_order() {
        for order in 1..=6 {
            let filter = BandpassFilter::new(20000.0, 27000.0, 96000, order).unwrap();
            assert_eq!(filter.sections.len(), order);
        }
    }

    #[test]
    fn test_butterworth_magnitude_response() {
        let filter = BandpassFilter::new(20000.0, 27000.0, 96000, 3).unwrap();

        // Band edges sit at -3 dB
        let edge = filter.magnitude_response(20000.0);
        assert!((edge - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.01, "edge {}", edge);
        let edge = filter.magnitude_response(27000.0);
        assert!((edge - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.01, "edge {}", edge);

        // Flat passband
        assert!((filter.magnitude_response(23500.0) - 1.0).abs() < 0.001);
        let squared = filter.magnitude_response(21000.0).powi(2);
        assert!((squared - 0.8897).abs() < 0.01, "21 kHz {}", squared);

        // Audible band and upper stop band strongly attenuated
        assert!(filter.magnitude_response(5000.0) < 1e-3);
        assert!(filter.magnitude_response(44000.0) < 1e-2);
    }

    #[test]
    fn test_filtfilt_removes_audible_tone() {
        let filter = BandpassFilter::new(20000.0, 27000.0, 96000, 3).unwrap();
        let input = sine(1000.0, 19200, 96000);
        let output = filter.filtfilt(&input);
        assert_eq!(output.len(), input.len());
        assert!(rms(&output[1000..18200]) < 0.01 * rms(&input));
    }

    #[test]
    fn test_filtfilt_is_zero_phase() {
        let filter = BandpassFilter::new(20000.0, 27000.0, 96000, 3).unwrap();
        let input = sine(23500.0, 19200, 96000);
        let output = filter.filtfilt(&input);

        // In-band tone comes back unshifted and at full amplitude
        let max_diff = input[2000..17200]
            .iter()
            .zip(output[2000..17200].iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f32, f32::max);
        assert!(max_diff < 0.01, "max deviation {}", max_diff);
    }

    #[test]
    fn test_filtfilt_silence_stays_silent() {
        let filter = BandpassFilter::new(20000.0, 27000.0, 96000, 3).unwrap();
        let output = filter.filtfilt(&vec![0.0; 4800]);
        assert!(output.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_filtfilt_constant_offset_has_no_startup_transient() {
        let filter = BandpassFilter::new(20000.0, 27000.0, 96000, 3).unwrap();
        let output = filter.filtfilt(&vec![0.3; 4800]);
        let peak = output.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
        assert!(peak < 1e-4, "DC leaked through: {}", peak);
    }

    #[test]
    fn test_short_input_passthrough() {
        let filter = BandpassFilter::new(20000.0, 27000.0, 96000, 3).unwrap();
        assert_eq!(filter.filtfilt(&[0.5]), vec![0.5]);
        assert_eq!(filter.filtfilt(&[0.1, 0.2, 0.3]).len(), 3);
    }
}
