use crate::error::{CodecError, Result};

/// Symbol matrix: 7 rows (one per low tone) × 5 columns (one per high tone)
///
/// A symbol is transmitted as the pair `(LOW_FREQS[row], HIGH_FREQS[col])`.
pub const SYMBOL_MATRIX: [[char; 5]; 7] = [
    ['A', 'B', 'C', 'D', 'E'],
    ['F', 'G', 'H', 'I', 'J'],
    ['K', 'L', 'M', 'N', 'O'],
    ['P', 'Q', 'R', 'S', 'T'],
    ['U', 'V', 'W', 'X', 'Y'],
    ['Z', '0', '1', '2', '3'],
    ['4', '5', '6', '7', '8'],
];

/// Low band, one frequency per matrix row (500 Hz spacing)
pub const LOW_FREQS: [f32; 7] = [20500.0, 21000.0, 21500.0, 22000.0, 22500.0, 23000.0, 23500.0];

/// High band, one frequency per matrix column (500 Hz spacing)
pub const HIGH_FREQS: [f32; 5] = [24000.0, 24500.0, 25000.0, 25500.0, 26000.0];

/// Total number of symbols (7 × 5 = 35)
pub const NUM_SYMBOLS: usize = 35;

/// The fixed pair of frequency bands shared by encoder and decoder
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyPlan {
    pub low: &'static [f32],
    pub high: &'static [f32],
}

pub const FREQUENCY_PLAN: FrequencyPlan = FrequencyPlan {
    low: &LOW_FREQS,
    high: &HIGH_FREQS,
};

impl FrequencyPlan {
    /// Frequency pair for a (row, col) address
    pub fn pair(&self, row: usize, col: usize) -> Option<(f32, f32)> {
        Some((*self.low.get(row)?, *self.high.get(col)?))
    }

    /// Frequency pair for a symbol, `None` if it is outside the alphabet
    pub fn frequencies_for(&self, symbol: char) -> Option<(f32, f32)> {
        let (row, col) = symbol_to_indices(symbol).ok()?;
        self.pair(row, col)
    }

    /// Check that every plan frequency lies inside `lowcut..=highcut`
    /// and below the Nyquist frequency of `sample_rate`.
    pub fn validate(&self, lowcut: f32, highcut: f32, sample_rate: u32) -> Result<()> {
        let nyquist = sample_rate as f32 / 2.0;
        for &freq in self.low.iter().chain(self.high.iter()) {
            if freq < lowcut || freq > highcut {
                return Err(CodecError::InvalidConfig(format!(
                    "plan frequency {} Hz outside analysis band {}..{} Hz",
                    freq, lowcut, highcut
                )));
            }
            if freq >= nyquist {
                return Err(CodecError::InvalidConfig(format!(
                    "plan frequency {} Hz is not below Nyquist {} Hz",
                    freq, nyquist
                )));
            }
        }
        Ok(())
    }
}

/// Look up the matrix address of a symbol (case-insensitive)
pub fn symbol_to_indices(symbol: char) -> Result<(usize, usize)> {
    let upper = symbol.to_ascii_uppercase();
    for (row, symbols) in SYMBOL_MATRIX.iter().enumerate() {
        if let Some(col) = symbols.iter().position(|&s| s == upper) {
            return Ok((row, col));
        }
    }
    Err(CodecError::UnknownSymbol(symbol))
}

/// Symbol at a matrix address
///
/// # Panics
/// If `row >= 7` or `col >= 5`; detections only ever carry in-range indices.
pub fn indices_to_symbol(row: usize, col: usize) -> char {
    SYMBOL_MATRIX[row][col]
}
