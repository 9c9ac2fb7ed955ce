use crate::alphabet::{indices_to_symbol, FrequencyPlan, FREQUENCY_PLAN};
use crate::peaks::{find_peaks, PeakCriteria};
use crate::spectrum::Spectrum;
use crate::{
    MATCH_TOLERANCE_HZ, MAX_AMPLITUDE_RATIO, MAX_PEAKS, MIN_AMPLITUDE_RATIO, MIN_PEAKS,
    PEAK_HEIGHT_RATIO, PEAK_MIN_DISTANCE_BINS, PEAK_MIN_PROMINENCE,
};

/// A detected spectral peak in physical frequency units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralPeak {
    pub freq_hz: f32,
    /// Raw FFT magnitude
    pub amplitude: f32,
}

/// A peak that landed within tolerance of a plan frequency
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Row (low band) or column (high band) index
    pub index: usize,
    pub amplitude: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidates {
    pub low: Vec<Candidate>,
    pub high: Vec<Candidate>,
}

/// A frame that resolved to exactly one (row, col) pair with balanced tones
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hypothesis {
    pub row: usize,
    pub col: usize,
    pub symbol: char,
    /// `min(low, high) / max(low, high)`
    pub amplitude_ratio: f32,
    pub confidence: f32,
}

/// Per-frame result. Every variant except `Hypothesis` is a rejection.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Peak amplitude below the silence threshold, spectrum never computed
    Silent,
    /// Peak count outside the accepted range
    PeakCount(usize),
    /// Not exactly one low and one high candidate
    Ambiguous { low: usize, high: usize },
    /// The two tones differ too much in strength
    Unbalanced { ratio: f32 },
    Hypothesis(Hypothesis),
}

/// Matches spectral peaks against the frequency plan
#[derive(Debug, Clone)]
pub struct PeakMatcher {
    pub plan: FrequencyPlan,
    /// Peak height floor as a fraction of the frame's strongest bin
    pub height_ratio: f32,
    pub min_distance_bins: usize,
    pub min_prominence: f32,
    pub min_peaks: usize,
    pub max_peaks: usize,
    /// Strict: a peak matches when `|f - plan| < tolerance_hz`
    pub tolerance_hz: f32,
    pub min_ratio: f32,
    pub max_ratio: f32,
}

impl Default for PeakMatcher {
    fn default() -> Self {
        Self {
            plan: FREQUENCY_PLAN,
            height_ratio: PEAK_HEIGHT_RATIO,
            min_distance_bins: PEAK_MIN_DISTANCE_BINS,
            min_prominence: PEAK_MIN_PROMINENCE,
            min_peaks: MIN_PEAKS,
            max_peaks: MAX_PEAKS,
            tolerance_hz: MATCH_TOLERANCE_HZ,
            min_ratio: MIN_AMPLITUDE_RATIO,
            max_ratio: MAX_AMPLITUDE_RATIO,
        }
    }
}

impl PeakMatcher {
    /// Run peak picking and matching on one frame's spectrum
    pub fn evaluate(&self, spectrum: &Spectrum) -> FrameOutcome {
        let threshold = spectrum.max_magnitude() * self.height_ratio;
        let criteria = PeakCriteria {
            min_height: threshold,
            min_distance: self.min_distance_bins,
            min_prominence: self.min_prominence,
        };
        let peaks: Vec<SpectralPeak> = find_peaks(&spectrum.magnitudes, &criteria)
            .into_iter()
            .map(|p| SpectralPeak {
                freq_hz: spectrum.freqs[p.index],
                amplitude: p.height,
            })
            .collect();

        if !(self.min_peaks..=self.max_peaks).contains(&peaks.len()) {
            return FrameOutcome::PeakCount(peaks.len());
        }

        self.resolve(&self.match_candidates(&peaks), threshold)
    }

    /// Test every peak against every plan frequency. A peak may produce
    /// candidates in both bands; that only makes the frame ambiguous.
    pub fn match_candidates(&self, peaks: &[SpectralPeak]) -> Candidates {
        let mut candidates = Candidates::default();
        for peak in peaks {
            for (index, &freq) in self.plan.low.iter().enumerate() {
                if (peak.freq_hz - freq).abs() < self.tolerance_hz {
                    candidates.low.push(Candidate {
                        index,
                        amplitude: peak.amplitude,
                    });
                }
            }
            for (index, &freq) in self.plan.high.iter().enumerate() {
                if (peak.freq_hz - freq).abs() < self.tolerance_hz {
                    candidates.high.push(Candidate {
                        index,
                        amplitude: peak.amplitude,
                    });
                }
            }
        }
        candidates
    }

    /// Turn candidates into a hypothesis, or say why not.
    /// `threshold` is the absolute peak-height floor used for the frame.
    pub fn resolve(&self, candidates: &Candidates, threshold: f32) -> FrameOutcome {
        let (low, high) = match (candidates.low.as_slice(), candidates.high.as_slice()) {
            ([low], [high]) => (*low, *high),
            (low, high) => {
                return FrameOutcome::Ambiguous {
                    low: low.len(),
                    high: high.len(),
                }
            }
        };

        let weaker = low.amplitude.min(high.amplitude);
        let stronger = low.amplitude.max(high.amplitude);
        let ratio = weaker / stronger;
        if !(ratio >= self.min_ratio && ratio <= self.max_ratio) {
            return FrameOutcome::Unbalanced { ratio };
        }

        FrameOutcome::Hypothesis(Hypothesis {
            row: low.index,
            col: high.index,
            symbol: indices_to_symbol(low.index, high.index),
            amplitude_ratio: ratio,
            confidence: ratio * (weaker / threshold),
        })
    }
}
