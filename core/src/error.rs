use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Highcut={highcut} Hz must lie above lowcut={lowcut} Hz and below Nyquist={nyquist} Hz")]
    InvalidBand {
        lowcut: f32,
        highcut: f32,
        nyquist: f32,
    },

    #[error("Unknown symbol {0:?}")]
    UnknownSymbol(char),

    #[error("Host track of {host_samples} samples cannot carry {symbols} bursts of {burst_samples} samples")]
    CapacityOverflow {
        symbols: usize,
        host_samples: usize,
        burst_samples: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, CodecError>;
