use hound::{SampleFormat, WavSpec};
use hushtone_core::Track;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WavError {
    #[error("WAV I/O failed: {0}")]
    Hound(#[from] hound::Error),

    #[error("Unsupported WAV sample format: {bits}-bit {format:?}")]
    UnsupportedFormat { bits: u16, format: SampleFormat },
}

/// Read a WAV file into an interleaved track, normalising integer PCM to -1..1
pub fn read_track(path: &Path) -> Result<Track, WavError> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let mut samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader.samples::<f32>().collect::<Result<_, _>>()?,
        (SampleFormat::Int, bits @ (8 | 16 | 24 | 32)) => {
            let scale = (1i64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
        (format, bits) => return Err(WavError::UnsupportedFormat { bits, format }),
    };

    // A truncated file can end mid-frame
    let channels = spec.channels as usize;
    samples.truncate(samples.len() - samples.len() % channels);

    log::debug!(
        "Read {}: {} Hz, {} channels, {}-bit {:?}, {} frames",
        path.display(),
        spec.sample_rate,
        spec.channels,
        spec.bits_per_sample,
        spec.sample_format,
        samples.len() / channels
    );
    Ok(Track::new(samples, channels, spec.sample_rate))
}

/// Write a track as 32-bit float PCM
pub fn write_track(path: &Path, track: &Track) -> Result<(), WavError> {
    let spec = WavSpec {
        channels: track.channels as u16,
        sample_rate: track.sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in &track.samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}
