use hushtone_core::alphabet::FREQUENCY_PLAN;
use hushtone_core::{
    symbol_to_indices, Decoder, DecoderConfig, Encoder, EncoderConfig, Track,
    UnknownSymbolPolicy,
};
use js_sys::{Array, Object, Reflect};
use wasm_bindgen::prelude::*;

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct WasmEncoder {
    inner: Encoder,
}

#[wasm_bindgen]
impl WasmEncoder {
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate: u32, char_duration: f32, amplitude: f32) -> Result<WasmEncoder, JsValue> {
        let config = EncoderConfig {
            sample_rate,
            char_duration_s: char_duration,
            amplitude,
            unknown_symbol: UnknownSymbolPolicy::Silent,
        };
        Encoder::new(config)
            .map(|inner| WasmEncoder { inner })
            .map_err(to_js_error)
    }

    /// Mix `message` into a mono host already at the encoder's sample rate.
    /// Takes a Float32Array and returns a Float32Array of the same length.
    #[wasm_bindgen]
    pub fn encode(&self, message: &str, host: &[f32]) -> Result<Vec<f32>, JsValue> {
        let host = Track::from_mono(host.to_vec(), self.inner.config().sample_rate);
        self.inner
            .encode(message, &host)
            .map(|mixed| mixed.samples)
            .map_err(to_js_error)
    }

    /// Largest message a host of `host_len` samples can carry
    #[wasm_bindgen]
    pub fn capacity(&self, host_len: usize) -> usize {
        hushtone_core::capacity(host_len, self.inner.config().burst_samples())
    }
}

#[wasm_bindgen]
pub struct WasmDecoder {
    inner: Decoder,
}

#[wasm_bindgen]
impl WasmDecoder {
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate: u32) -> Result<WasmDecoder, JsValue> {
        Decoder::new(DecoderConfig::with_sample_rate(sample_rate))
            .map(|inner| WasmDecoder { inner })
            .map_err(to_js_error)
    }

    /// Decode mono samples at the decoder's sample rate into the hidden message
    #[wasm_bindgen]
    pub fn decode(&self, samples: &[f32]) -> String {
        self.inner.decode(samples)
    }

    /// Detections as an array of `{ timestamp, symbol, confidence }` objects
    #[wasm_bindgen]
    pub fn detect(&self, samples: &[f32]) -> Result<Array, JsValue> {
        let detections = self.inner.detect(samples);
        let out = Array::new();
        for d in &detections {
            let entry = Object::new();
            Reflect::set(&entry, &"timestamp".into(), &d.timestamp_s.into())?;
            Reflect::set(&entry, &"symbol".into(), &d.symbol.to_string().into())?;
            Reflect::set(&entry, &"confidence".into(), &d.confidence.into())?;
            out.push(&entry);
        }
        Ok(out)
    }
}

/// `[low_hz, high_hz]` for a symbol, or an error for characters outside the alphabet
#[wasm_bindgen(js_name = symbolFrequencies)]
pub fn symbol_frequencies(symbol: char) -> Result<Vec<f32>, JsValue> {
    let (row, col) = symbol_to_indices(symbol).map_err(to_js_error)?;
    let (low, high) = FREQUENCY_PLAN
        .pair(row, col)
        .ok_or_else(|| JsValue::from_str("symbol outside the frequency plan"))?;
    Ok(vec![low, high])
}
