mod plot;
mod wav;

use clap::{Parser, Subcommand};
use hushtone_core::alphabet::{FREQUENCY_PLAN, SYMBOL_MATRIX};
use hushtone_core::detection::assemble_message;
use hushtone_core::resample::resample_audio;
use hushtone_core::{
    capacity, Decoder, DecoderConfig, Encoder, EncoderConfig, UnknownSymbolPolicy,
    CHAR_DURATION_S, DEFAULT_MIX_AMPLITUDE, HIGHCUT_HZ, LOWCUT_HZ, SAMPLE_RATE,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "hushtone")]
#[command(about = "Hide short messages as near-ultrasonic tones inside audio files")]
struct Cli {
    /// Log per-frame decisions and burst placement
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a message into a host WAV file
    Encode {
        /// Message to hide (A-Z, 0-8; whitespace is skipped)
        message: String,

        /// Host WAV file
        #[arg(value_name = "INPUT.WAV")]
        input: PathBuf,

        /// Output WAV file (32-bit float)
        #[arg(short, long, default_value = "encoded_phrase_ultrasonic.wav")]
        output: PathBuf,

        /// Duration of each character burst in seconds
        #[arg(short = 'c', long, default_value_t = CHAR_DURATION_S)]
        char_dur: f32,

        /// Output sample rate; the host is resampled when it differs
        #[arg(short, long, default_value_t = SAMPLE_RATE)]
        sample_rate: u32,

        /// Gain of the ultrasonic bursts (0-1)
        #[arg(short = 'a', long, default_value_t = DEFAULT_MIX_AMPLITUDE)]
        amplitude: f32,

        /// Fail on characters outside the alphabet instead of leaving a silent slot
        #[arg(long)]
        strict: bool,
    },

    /// Decode a hidden message from a WAV file
    Decode {
        /// WAV file to decode
        #[arg(value_name = "INPUT.WAV")]
        input: PathBuf,

        /// Analysis sample rate; the recording is resampled when it differs
        #[arg(short, long, default_value_t = SAMPLE_RATE)]
        sample_rate: u32,

        /// Lower edge of the band-pass filter in Hz
        #[arg(long, default_value_t = LOWCUT_HZ)]
        lowcut: f32,

        /// Upper edge of the band-pass filter in Hz
        #[arg(long, default_value_t = HIGHCUT_HZ)]
        highcut: f32,

        /// Print detections as JSON instead of the plain message
        #[arg(long)]
        json: bool,
    },

    /// Show how many characters a host file can carry
    Capacity {
        /// Host WAV file
        #[arg(value_name = "INPUT.WAV")]
        input: PathBuf,

        #[arg(short = 'c', long, default_value_t = CHAR_DURATION_S)]
        char_dur: f32,

        #[arg(short, long, default_value_t = SAMPLE_RATE)]
        sample_rate: u32,
    },

    /// Write waveform and filtered-spectrum PNGs for a WAV file
    Plot {
        #[arg(value_name = "INPUT.WAV")]
        input: PathBuf,

        /// Directory the images are written to
        #[arg(long, default_value = "graphs")]
        out_dir: PathBuf,

        #[arg(short, long, default_value_t = SAMPLE_RATE)]
        sample_rate: u32,
    },

    /// Print the symbol table with each symbol's frequency pair
    Table,
}

#[derive(Serialize)]
struct DecodeReport {
    message: String,
    sample_rate: u32,
    detections: Vec<DetectionReport>,
}

#[derive(Serialize)]
struct DetectionReport {
    timestamp_s: f32,
    symbol: char,
    confidence: f32,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let result = match cli.command {
        Commands::Encode {
            message,
            input,
            output,
            char_dur,
            sample_rate,
            amplitude,
            strict,
        } => {
            let policy = if strict {
                UnknownSymbolPolicy::Strict
            } else {
                UnknownSymbolPolicy::Silent
            };
            let config = EncoderConfig {
                sample_rate,
                char_duration_s: char_dur,
                amplitude,
                unknown_symbol: policy,
            };
            encode_command(&message, &input, &output, config)
        }
        Commands::Decode {
            input,
            sample_rate,
            lowcut,
            highcut,
            json,
        } => {
            let config = DecoderConfig {
                lowcut,
                highcut,
                ..DecoderConfig::with_sample_rate(sample_rate)
            };
            decode_command(&input, config, json)
        }
        Commands::Capacity {
            input,
            char_dur,
            sample_rate,
        } => capacity_command(&input, char_dur, sample_rate),
        Commands::Plot {
            input,
            out_dir,
            sample_rate,
        } => plot_command(&input, &out_dir, sample_rate),
        Commands::Table => {
            table_command();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("[ERROR] {}", e);
        std::process::exit(1);
    }
}

fn encode_command(
    message: &str,
    input_path: &Path,
    output_path: &Path,
    config: EncoderConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let host = wav::read_track(input_path)?;
    println!(
        "Read host: {:.2}s, {} Hz, {} channel(s)",
        host.duration_s(),
        host.sample_rate,
        host.channels
    );

    let sample_rate = config.sample_rate;
    let encoder = Encoder::new(config)?;
    let mixed = encoder.encode(message, &host)?;

    wav::write_track(output_path, &mixed)?;
    println!(
        "[ENCODE] Message encoded in '{}' at {} Hz",
        output_path.display(),
        sample_rate
    );
    Ok(())
}

fn decode_command(
    input_path: &Path,
    config: DecoderConfig,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let sample_rate = config.sample_rate;
    let decoder = Decoder::new(config)?;

    if !json {
        println!("[OFFLINE DECODE] Reading '{}' ...", input_path.display());
    }
    let track = wav::read_track(input_path)?;
    let detections = decoder.detect_track(&track);
    let message = assemble_message(&detections);

    if json {
        let report = DecodeReport {
            message,
            sample_rate,
            detections: detections
                .iter()
                .map(|d| DetectionReport {
                    timestamp_s: d.timestamp_s,
                    symbol: d.symbol,
                    confidence: d.confidence,
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Decoded message: {}", message);
    }
    Ok(())
}

fn capacity_command(
    input_path: &Path,
    char_dur: f32,
    sample_rate: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = EncoderConfig {
        sample_rate,
        char_duration_s: char_dur,
        ..EncoderConfig::default()
    };
    config.validate()?;

    let host = wav::read_track(input_path)?;
    // Frame count after the encoder's resampling step
    let frames = (host.frames() as f64 * sample_rate as f64 / host.sample_rate as f64).round()
        as usize;
    let symbols = capacity(frames, config.burst_samples());

    println!(
        "[CAPACITY] {:.2}s host holds up to {} characters at {}s per character",
        host.duration_s(),
        symbols,
        char_dur
    );
    Ok(())
}

fn plot_command(
    input_path: &Path,
    out_dir: &Path,
    sample_rate: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let track = wav::read_track(input_path)?;
    let mut samples = track.channel(0);
    if track.sample_rate != sample_rate {
        log::warn!(
            "Resampling from {} Hz to {} Hz",
            track.sample_rate,
            sample_rate
        );
        samples = resample_audio(&samples, track.sample_rate, sample_rate);
    }

    std::fs::create_dir_all(out_dir)?;

    let signal_path = out_dir.join("signal.png");
    plot::save_waveform(&samples, &signal_path)?;
    println!("[GRAPH] {} generated.", signal_path.display());

    let spectrum_path = out_dir.join("decoding_fft.png");
    plot::save_filtered_spectrum(&samples, sample_rate, &spectrum_path)?;
    println!("[GRAPH] {} generated.", spectrum_path.display());
    Ok(())
}

fn table_command() {
    println!("Symbol  Row  Col  Low (Hz)  High (Hz)");
    for (row, symbols) in SYMBOL_MATRIX.iter().enumerate() {
        for (col, &symbol) in symbols.iter().enumerate() {
            if let Some((low, high)) = FREQUENCY_PLAN.pair(row, col) {
                println!(
                    "{:>6}  {:>3}  {:>3}  {:>8}  {:>9}",
                    symbol, row, col, low, high
                );
            }
        }
    }
}
