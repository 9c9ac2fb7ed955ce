//! Audio resampling for bringing host and recorded tracks to the codec rate
//! Uses linear interpolation; anti-aliasing is left to the caller

use crate::track::Track;

/// Resample audio to a target sample rate using linear interpolation
///
/// # Arguments
/// * `samples` - Input audio samples (single channel)
/// * `from_rate` - Current sample rate in Hz
/// * `to_rate` - Target sample rate in Hz
///
/// # Returns
/// `round(len × to_rate / from_rate)` samples at the target sample rate
pub fn resample_audio(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let new_length = (samples.len() as f64 * ratio).round() as usize;
    let mut resampled = Vec::with_capacity(new_length);

    for i in 0..new_length {
        let src_idx = i as f64 / ratio;
        let src_idx_floor = (src_idx.floor() as usize).min(samples.len() - 1);
        let src_idx_ceil = src_idx_floor + 1;
        let fraction = (src_idx - src_idx_floor as f64) as f32;

        let interpolated = if src_idx_ceil < samples.len() {
            samples[src_idx_floor] * (1.0 - fraction) + samples[src_idx_ceil] * fraction
        } else {
            samples[src_idx_floor]
        };

        resampled.push(interpolated);
    }

    resampled
}

/// Resample every channel of a track independently
pub fn resample_track(track: &Track, to_rate: u32) -> Track {
    if track.sample_rate == to_rate {
        return track.clone();
    }

    let channels: Vec<Vec<f32>> = (0..track.channels)
        .map(|c| resample_audio(&track.channel(c), track.sample_rate, to_rate))
        .collect();
    Track::from_channels(&channels, to_rate)
}
