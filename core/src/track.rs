/// Interleaved multi-channel audio buffer
///
/// Samples are stored frame by frame: `[L, R, L, R, ...]` for stereo.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub samples: Vec<f32>,
    pub channels: usize,
    pub sample_rate: u32,
}

impl Track {
    pub fn new(samples: Vec<f32>, channels: usize, sample_rate: u32) -> Self {
        assert!(channels > 0, "Track needs at least one channel");
        assert!(
            samples.len() % channels == 0,
            "Interleaved sample count must be a multiple of the channel count"
        );
        Self {
            samples,
            channels,
            sample_rate,
        }
    }

    pub fn from_mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self::new(samples, 1, sample_rate)
    }

    /// Silent mono track of the given duration
    pub fn silence(duration_s: f32, sample_rate: u32) -> Self {
        let len = (duration_s * sample_rate as f32).round() as usize;
        Self::from_mono(vec![0.0; len], sample_rate)
    }

    /// Number of sample frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    pub fn duration_s(&self) -> f32 {
        self.frames() as f32 / self.sample_rate as f32
    }

    /// Extract a single channel
    pub fn channel(&self, index: usize) -> Vec<f32> {
        self.samples
            .iter()
            .skip(index)
            .step_by(self.channels)
            .copied()
            .collect()
    }

    /// Build a track from per-channel buffers of equal length
    pub fn from_channels(channels: &[Vec<f32>], sample_rate: u32) -> Self {
        let count = channels.len();
        let frames = channels.first().map_or(0, |c| c.len());
        let mut samples = Vec::with_capacity(frames * count);
        for i in 0..frames {
            for channel in channels {
                samples.push(channel[i]);
            }
        }
        Self::new(samples, count.max(1), sample_rate)
    }

    /// Largest absolute sample value across all channels
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_extraction() {
        let track = Track::new(vec![0.1, -0.1, 0.2, -0.2, 0.3, -0.3], 2, 48000);
        assert_eq!(track.frames(), 3);
        assert_eq!(track.channel(0), vec![0.1, 0.2, 0.3]);
        assert_eq!(track.channel(1), vec![-0.1, -0.2, -0.3]);
    }

    #[test]
    fn test_from_channels_interleaves() {
        let track = Track::from_channels(&[vec![1.0, 2.0], vec![-1.0, -2.0]], 96000);
        assert_eq!(track.samples, vec![1.0, -1.0, 2.0, -2.0]);
        assert_eq!(track.channels, 2);
    }

    #[test]
    fn test_silence_and_peak() {
        let track = Track::silence(0.5, 96000);
        assert_eq!(track.frames(), 48000);
        assert_eq!(track.peak(), 0.0);
        assert!((track.duration_s() - 0.5).abs() < 1e-6);
    }

    #[test]
    #[should_panic]
    fn test_ragged_interleave_rejected() {
        Track::new(vec![0.0; 3], 2, 48000);
    }
}
