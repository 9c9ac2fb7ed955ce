use crate::alphabet::symbol_to_indices;
use crate::error::{CodecError, Result};
use crate::resample::resample_track;
use crate::tone::{burst_length, generate_tone};
use crate::track::Track;
use crate::{CHAR_DURATION_S, DEFAULT_MIX_AMPLITUDE, SAMPLE_RATE};
use log::{debug, info, warn};

/// What the encoder does with a character outside the 35-symbol alphabet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownSymbolPolicy {
    /// Emit a silent burst in its slot and keep going
    #[default]
    Silent,
    /// Refuse the whole message
    Strict,
}

#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Output sample rate; the host is resampled to it when needed
    pub sample_rate: u32,
    /// Duration of each dual-tone burst in seconds
    pub char_duration_s: f32,
    /// Gain applied to each burst before it is summed into the host (0..=1)
    pub amplitude: f32,
    pub unknown_symbol: UnknownSymbolPolicy,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            char_duration_s: CHAR_DURATION_S,
            amplitude: DEFAULT_MIX_AMPLITUDE,
            unknown_symbol: UnknownSymbolPolicy::Silent,
        }
    }
}

impl EncoderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(CodecError::InvalidConfig("sample rate must be positive".into()));
        }
        if !(self.char_duration_s > 0.0) || burst_length(self.char_duration_s, self.sample_rate) == 0 {
            return Err(CodecError::InvalidConfig(format!(
                "character duration {} s yields an empty burst",
                self.char_duration_s
            )));
        }
        if !(0.0..=1.0).contains(&self.amplitude) {
            return Err(CodecError::InvalidConfig(format!(
                "mixing amplitude {} outside 0..=1",
                self.amplitude
            )));
        }
        Ok(())
    }

    /// Samples per burst at the configured rate
    pub fn burst_samples(&self) -> usize {
        burst_length(self.char_duration_s, self.sample_rate)
    }
}

/// Maximum number of bursts of `burst_samples` that fit in a host of
/// `host_samples` frames with the even dispersal schedule, without overlap.
pub fn capacity(host_samples: usize, burst_samples: usize) -> usize {
    if burst_samples == 0 {
        return 0;
    }
    (host_samples / burst_samples).saturating_sub(1)
}

/// Carrier mixer: hides a message as dual-tone bursts inside a host track
///
/// Bursts are evenly dispersed: the host is split into `N + 1` equal segments
/// for `N` symbols and burst `i` is centred on the start of segment `i + 1`,
/// so nothing lands at the very start or end of the track.
pub struct Encoder {
    config: EncoderConfig,
}

impl Encoder {
    pub fn new(config: EncoderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Encode `message` into `host`, returning the mixed track at the
    /// configured sample rate. Whitespace is skipped; letters are uppercased.
    pub fn encode(&self, message: &str, host: &Track) -> Result<Track> {
        let mut mixed = if host.sample_rate != self.config.sample_rate {
            info!(
                "Resampling host from {} Hz to {} Hz",
                host.sample_rate, self.config.sample_rate
            );
            resample_track(host, self.config.sample_rate)
        } else {
            host.clone()
        };

        let bursts = self.synthesize_bursts(message)?;
        let burst_samples = self.config.burst_samples();
        let host_frames = mixed.frames();

        if bursts.len() > capacity(host_frames, burst_samples) {
            return Err(CodecError::CapacityOverflow {
                symbols: bursts.len(),
                host_samples: host_frames,
                burst_samples,
            });
        }

        let segment = host_frames / (bursts.len() + 1);
        let channels = mixed.channels;
        for (i, burst) in bursts.iter().enumerate() {
            let start = (i + 1) * segment - burst.len() / 2;
            debug!(
                "Burst {} at {:.3}s ({} samples)",
                i,
                start as f32 / self.config.sample_rate as f32,
                burst.len()
            );
            for (j, &value) in burst.iter().enumerate() {
                let frame = (start + j) * channels;
                for sample in &mut mixed.samples[frame..frame + channels] {
                    *sample += self.config.amplitude * value;
                }
            }
        }

        let peak = mixed.peak();
        if peak > 1.0 {
            debug!("Rescaling mix by 1/{:.4} to avoid clipping", peak);
            for sample in mixed.samples.iter_mut() {
                *sample /= peak;
            }
        }

        info!(
            "Encoded {} symbols into {:.2}s of audio at {} Hz",
            bursts.len(),
            mixed.duration_s(),
            mixed.sample_rate
        );
        Ok(mixed)
    }

    fn synthesize_bursts(&self, message: &str) -> Result<Vec<Vec<f32>>> {
        let mut bursts = Vec::new();
        for symbol in message.chars().filter(|c| !c.is_whitespace()) {
            let symbol = symbol.to_ascii_uppercase();
            if symbol_to_indices(symbol).is_err() {
                match self.config.unknown_symbol {
                    UnknownSymbolPolicy::Strict => return Err(CodecError::UnknownSymbol(symbol)),
                    UnknownSymbolPolicy::Silent => {
                        warn!("Symbol {:?} is not in the alphabet, leaving its slot silent", symbol)
                    }
                }
            }
            bursts.push(generate_tone(symbol, self.config.char_duration_s, self.config.sample_rate));
        }
        Ok(bursts)
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self {
            config: EncoderConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn energy(samples: &[f32]) -> f32 {
        samples.iter().map(|s| s * s).sum()
    }

    #[test]
    fn test_capacity() {
        assert_eq!(capacity(480000, 14400), 32);
        assert_eq!(capacity(14400, 14400), 0);
        assert_eq!(capacity(100, 14400), 0);
        assert_eq!(capacity(100, 0), 0);
    }

    #[test]
    fn test_encode_keeps_length_and_rate() {
        let encoder = Encoder::default();
        let host = Track::silence(5.0, SAMPLE_RATE);
        let mixed = encoder.encode("HI", &host).unwrap();
        assert_eq!(mixed.frames(), host.frames());
        assert_eq!(mixed.sample_rate, SAMPLE_RATE);
    }

    #[test]
    fn test_bursts_centred_on_segment_starts() {
        let encoder = Encoder::default();
        let host = Track::silence(3.0, SAMPLE_RATE);
        let mixed = encoder.encode("AB", &host).unwrap();

        // 288000 / 3 = 96000 per segment, bursts of 14400 centred at 96000 and 192000
        let samples = &mixed.samples;
        assert_eq!(energy(&samples[..96000 - 7200]), 0.0);
        assert!(energy(&samples[96000 - 7200..96000 + 7200]) > 0.0);
        assert_eq!(energy(&samples[96000 + 7200..192000 - 7200]), 0.0);
        assert!(energy(&samples[192000 - 7200..192000 + 7200]) > 0.0);
        assert_eq!(energy(&samples[192000 + 7200..]), 0.0);
    }

    #[test]
    fn test_amplitude_scales_bursts() {
        let config = EncoderConfig {
            amplitude: 0.25,
            ..Default::default()
        };
        let encoder = Encoder::new(config).unwrap();
        let mixed = encoder.encode("Z", &Track::silence(1.0, SAMPLE_RATE)).unwrap();
        assert!((mixed.peak() - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_whitespace_skipped() {
        let encoder = Encoder::default();
        let host = Track::silence(2.0, SAMPLE_RATE);
        let spaced = encoder.encode(" h  i\t", &host).unwrap();
        let plain = encoder.encode("HI", &host).unwrap();
        assert_eq!(spaced, plain);
    }

    #[test]
    fn test_clipping_normalized() {
        let host = Track::from_mono(vec![0.95; 96000], SAMPLE_RATE);
        let config = EncoderConfig {
            amplitude: 1.0,
            ..Default::default()
        };
        let mixed = Encoder::new(config).unwrap().encode("M", &host).unwrap();
        assert!((mixed.peak() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_stereo_host_broadcast() {
        let host = Track::new(vec![0.0; 2 * 96000], 2, SAMPLE_RATE);
        let mixed = Encoder::default().encode("K", &host).unwrap();
        assert_eq!(mixed.channels, 2);
        assert_eq!(mixed.channel(0), mixed.channel(1));
        assert!(energy(&mixed.channel(0)) > 0.0);
    }

    #[test]
    fn test_host_resampled_to_target_rate() {
        let host = Track::silence(2.0, 48000);
        let mixed = Encoder::default().encode("A", &host).unwrap();
        assert_eq!(mixed.sample_rate, SAMPLE_RATE);
        assert_eq!(mixed.frames(), 192000);
    }

    #[test]
    fn test_capacity_overflow() {
        let host = Track::silence(0.5, SAMPLE_RATE);
        match Encoder::default().encode("ABCDEFGH", &host) {
            Err(CodecError::CapacityOverflow { symbols, .. }) => assert_eq!(symbols, 8),
            other => panic!("Expected CapacityOverflow, got {:?}", other.map(|t| t.frames())),
        }
    }

    #[test]
    fn test_unknown_symbol_policies() {
        let host = Track::silence(2.0, SAMPLE_RATE);

        let lenient = Encoder::default().encode("A?B", &host).unwrap();
        // The '?' slot is silent: 4 segments of 48000, middle burst centred at 96000
        assert_eq!(energy(&lenient.samples[96000 - 7200..96000 + 7200]), 0.0);
        assert!(energy(&lenient.samples[48000 - 7200..48000 + 7200]) > 0.0);

        let strict = Encoder::new(EncoderConfig {
            unknown_symbol: UnknownSymbolPolicy::Strict,
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(
            strict.encode("A?B", &host),
            Err(CodecError::UnknownSymbol('?'))
        ));
    }

    #[test]
    fn test_invalid_config() {
        let bad_amp = EncoderConfig {
            amplitude: 1.5,
            ..Default::default()
        };
        assert!(Encoder::new(bad_amp).is_err());

        let bad_duration = EncoderConfig {
            char_duration_s: 0.0,
            ..Default::default()
        };
        assert!(Encoder::new(bad_duration).is_err());
    }
}
