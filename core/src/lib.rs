//! Ultrasonic data-hiding codec
//!
//! Embeds short alphanumeric messages as near-ultrasonic dual-tone bursts
//! (20.5-26 kHz) inside an audible carrier track, and recovers them with a
//! band-pass + windowed FFT peak matcher.

pub mod error;
pub mod alphabet;
pub mod track;
pub mod resample;
pub mod tone;
pub mod mixer;
pub mod filter;
pub mod spectrum;
pub mod peaks;
pub mod matcher;
pub mod detection;
pub mod decoder;

pub use alphabet::{indices_to_symbol, symbol_to_indices, FrequencyPlan, FREQUENCY_PLAN};
pub use decoder::{Decoder, DecoderConfig};
pub use detection::Detection;
pub use error::{CodecError, Result};
pub use filter::BandpassFilter;
pub use mixer::{capacity, Encoder, EncoderConfig, UnknownSymbolPolicy};
pub use resample::resample_audio;
pub use tone::generate_tone;
pub use track::Track;

// Signal configuration
pub const SAMPLE_RATE: u32 = 96000;
pub const CHAR_DURATION_S: f32 = 0.15;
pub const FADE_DURATION_S: f32 = 0.01;
pub const DEFAULT_MIX_AMPLITUDE: f32 = 0.1;

// Band isolation
pub const LOWCUT_HZ: f32 = 20000.0;
pub const HIGHCUT_HZ: f32 = 27000.0;
pub const DECODE_FILTER_ORDER: usize = 3;
pub const PLOT_FILTER_ORDER: usize = 5;

// Frame analysis
pub const FRAME_DURATION_S: f32 = 0.2;
pub const SILENCE_THRESHOLD: f32 = 0.005;

// Peak detection (relative to the frame's strongest bin)
pub const PEAK_HEIGHT_RATIO: f32 = 0.15;
pub const PEAK_MIN_DISTANCE_BINS: usize = 50;
pub const PEAK_MIN_PROMINENCE: f32 = 0.1;
pub const MIN_PEAKS: usize = 2;
pub const MAX_PEAKS: usize = 4;

// Matching and acceptance
pub const MATCH_TOLERANCE_HZ: f32 = 70.0;
pub const MIN_AMPLITUDE_RATIO: f32 = 0.5;
pub const MAX_AMPLITUDE_RATIO: f32 = 1.5;
pub const MIN_SYMBOL_GAP_S: f32 = 0.25;
pub const CONFIDENCE_CUTOFF_RATIO: f32 = 0.6;
