use crate::alphabet::FREQUENCY_PLAN;
use crate::detection::{assemble_message, enforce_min_gap, filter_by_confidence, Detection};
use crate::error::{CodecError, Result};
use crate::filter::BandpassFilter;
use crate::matcher::{FrameOutcome, PeakMatcher};
use crate::resample::resample_audio;
use crate::spectrum::FrameAnalyzer;
use crate::track::Track;
use crate::{
    CONFIDENCE_CUTOFF_RATIO, DECODE_FILTER_ORDER, FRAME_DURATION_S, HIGHCUT_HZ, LOWCUT_HZ,
    MIN_SYMBOL_GAP_S, SAMPLE_RATE, SILENCE_THRESHOLD,
};
use log::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Rate the analysis runs at; tracks at other rates are resampled first
    pub sample_rate: u32,
    pub frame_duration_s: f32,
    pub lowcut: f32,
    pub highcut: f32,
    pub filter_order: usize,
    /// Frames whose peak absolute amplitude is below this are skipped
    pub silence_threshold: f32,
    pub min_gap_s: f32,
    /// Detections below this fraction of the mean confidence are dropped
    pub confidence_cutoff: f32,
    pub matcher: PeakMatcher,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            frame_duration_s: FRAME_DURATION_S,
            lowcut: LOWCUT_HZ,
            highcut: HIGHCUT_HZ,
            filter_order: DECODE_FILTER_ORDER,
            silence_threshold: SILENCE_THRESHOLD,
            min_gap_s: MIN_SYMBOL_GAP_S,
            confidence_cutoff: CONFIDENCE_CUTOFF_RATIO,
            matcher: PeakMatcher::default(),
        }
    }
}

impl DecoderConfig {
    /// Default configuration at a different analysis rate
    pub fn with_sample_rate(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(CodecError::InvalidConfig("sample rate must be positive".into()));
        }
        let nyquist = self.sample_rate as f32 / 2.0;
        if !(self.lowcut > 0.0 && self.lowcut < self.highcut && self.highcut < nyquist) {
            return Err(CodecError::InvalidBand {
                lowcut: self.lowcut,
                highcut: self.highcut,
                nyquist,
            });
        }
        self.matcher
            .plan
            .validate(self.lowcut, self.highcut, self.sample_rate)?;
        if !(self.min_gap_s >= 0.0) {
            return Err(CodecError::InvalidConfig(format!(
                "minimum symbol gap {} s must not be negative",
                self.min_gap_s
            )));
        }
        if self.matcher.min_peaks > self.matcher.max_peaks {
            return Err(CodecError::InvalidConfig(format!(
                "peak count range {}..={} is empty",
                self.matcher.min_peaks, self.matcher.max_peaks
            )));
        }
        Ok(())
    }
}

/// Recovers hidden messages from a recorded or transmitted track
///
/// Pipeline: zero-phase band-pass → fixed frames → Hann + FFT →
/// peak matching → minimum-gap pass → global confidence filter.
pub struct Decoder {
    config: DecoderConfig,
    filter: BandpassFilter,
    analyzer: FrameAnalyzer,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Result<Self> {
        config.validate()?;
        let filter = BandpassFilter::new(
            config.lowcut,
            config.highcut,
            config.sample_rate,
            config.filter_order,
        )?;
        let analyzer = FrameAnalyzer::new(config.sample_rate, config.frame_duration_s)?;
        Ok(Self {
            config,
            filter,
            analyzer,
        })
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode a mono signal already at the configured sample rate
    pub fn decode(&self, samples: &[f32]) -> String {
        assemble_message(&self.detect(samples))
    }

    /// Decode a track, resampling it to the analysis rate if needed.
    ///
    /// Only the first channel of a multi-channel track is analyzed.
    pub fn decode_track(&self, track: &Track) -> String {
        assemble_message(&self.detect_track(track))
    }

    pub fn detect_track(&self, track: &Track) -> Vec<Detection> {
        if track.channels > 1 {
            warn!(
                "Track has {} channels, analyzing the first one only",
                track.channels
            );
        }
        let mut samples = track.channel(0);
        if track.sample_rate != self.config.sample_rate {
            warn!(
                "Resampling from {} Hz to {} Hz",
                track.sample_rate, self.config.sample_rate
            );
            samples = resample_audio(&samples, track.sample_rate, self.config.sample_rate);
        }
        self.detect(&samples)
    }

    /// Confidence-filtered detections in timestamp order
    pub fn detect(&self, samples: &[f32]) -> Vec<Detection> {
        let outcomes = self.frame_outcomes(samples);
        let frame_count = outcomes.len();

        let hypotheses = outcomes.into_iter().filter_map(|(t, outcome)| match outcome {
            FrameOutcome::Hypothesis(h) => Some((t, h)),
            _ => None,
        });
        let accepted = enforce_min_gap(hypotheses, self.config.min_gap_s);
        let accepted_count = accepted.len();
        let detections = filter_by_confidence(accepted, self.config.confidence_cutoff);

        info!(
            "Decoded {} symbols from {} frames ({} dropped by confidence)",
            detections.len(),
            frame_count,
            accepted_count - detections.len()
        );
        detections
    }

    /// Per-frame outcomes with frame start times, before any cross-frame filtering
    pub fn frame_outcomes(&self, samples: &[f32]) -> Vec<(f32, FrameOutcome)> {
        let filtered = self.filter.filtfilt(samples);

        self.analyzer
            .frames(&filtered)
            .map(|frame| {
                let outcome = if frame.peak() < self.config.silence_threshold {
                    FrameOutcome::Silent
                } else {
                    let spectrum = self.analyzer.analyze(frame.samples);
                    self.config.matcher.evaluate(&spectrum)
                };
                if outcome != FrameOutcome::Silent {
                    debug!("Frame at {:.2}s: {:?}", frame.timestamp_s, outcome);
                }
                (frame.timestamp_s, outcome)
            })
            .collect()
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(DecoderConfig::default()).expect("default decoder configuration is valid")
    }
}
