use crate::error::{CodecError, Result};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// A fixed-length, non-overlapping slice of the filtered signal
#[derive(Debug, Clone, Copy)]
pub struct AnalysisFrame<'a> {
    /// Offset of the first sample in the analyzed signal
    pub start: usize,
    pub timestamp_s: f32,
    pub samples: &'a [f32],
}

impl AnalysisFrame<'_> {
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()))
    }
}

/// Magnitude spectrum restricted to strictly positive frequencies
#[derive(Debug, Clone, Default)]
pub struct Spectrum {
    pub freqs: Vec<f32>,
    pub magnitudes: Vec<f32>,
}

impl Spectrum {
    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    pub fn max_magnitude(&self) -> f32 {
        self.magnitudes.iter().copied().fold(0.0f32, f32::max)
    }
}

/// Splits a signal into frames and computes Hann-windowed magnitude spectra
pub struct FrameAnalyzer {
    sample_rate: u32,
    frame_len: usize,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
}

impl FrameAnalyzer {
    pub fn new(sample_rate: u32, frame_duration_s: f32) -> Result<Self> {
        let frame_len = (sample_rate as f32 * frame_duration_s).round() as usize;
        if frame_len < 2 {
            return Err(CodecError::InvalidConfig(format!(
                "frame duration {} s is too short at {} Hz",
                frame_duration_s, sample_rate
            )));
        }

        let mut planner = FftPlanner::new();
        Ok(Self {
            sample_rate,
            frame_len,
            window: hann_window(frame_len),
            fft: planner.plan_fft_forward(frame_len),
        })
    }

    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    /// Consecutive full frames; a shorter trailing remainder is dropped
    pub fn frames<'a>(&self, signal: &'a [f32]) -> impl Iterator<Item = AnalysisFrame<'a>> + 'a {
        let frame_len = self.frame_len;
        let sample_rate = self.sample_rate as f32;
        signal
            .chunks_exact(frame_len)
            .enumerate()
            .map(move |(i, samples)| {
                let start = i * frame_len;
                AnalysisFrame {
                    start,
                    timestamp_s: start as f32 / sample_rate,
                    samples,
                }
            })
    }

    /// Windowed magnitude spectrum of one frame
    pub fn analyze(&self, samples: &[f32]) -> Spectrum {
        debug_assert_eq!(samples.len(), self.frame_len, "Frame length mismatch");

        let mut buffer: Vec<Complex<f32>> = samples
            .iter()
            .zip(self.window.iter())
            .map(|(&s, &w)| Complex::new(s * w, 0.0))
            .collect();
        self.fft.process(&mut buffer);

        positive_bins(&buffer, self.sample_rate)
    }
}

/// One-shot windowed spectrum of an arbitrary-length signal
pub fn magnitude_spectrum(samples: &[f32], sample_rate: u32) -> Spectrum {
    if samples.is_empty() {
        return Spectrum::default();
    }

    let window = hann_window(samples.len());
    let mut buffer: Vec<Complex<f32>> = samples
        .iter()
        .zip(window.iter())
        .map(|(&s, &w)| Complex::new(s * w, 0.0))
        .collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(buffer.len());
    fft.process(&mut buffer);

    positive_bins(&buffer, sample_rate)
}

/// Bins `1..=(n-1)/2`: DC, Nyquist and the negative mirror are dropped
fn positive_bins(buffer: &[Complex<f32>], sample_rate: u32) -> Spectrum {
    let n = buffer.len();
    let resolution = sample_rate as f32 / n as f32;
    let last = (n - 1) / 2;

    Spectrum {
        freqs: (1..=last).map(|k| k as f32 * resolution).collect(),
        magnitudes: buffer[1..=last].iter().map(|c| c.norm()).collect(),
    }
}

/// Symmetric Hann window, `0.5 - 0.5·cos(2πn / (N - 1))`
pub fn hann_window(len: usize) -> Vec<f32> {
    if len <= 1 {
        return vec![1.0; len];
    }
    let denom = (len - 1) as f32;
    (0..len)
        .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f32 / denom).cos())
        .collect()
}
