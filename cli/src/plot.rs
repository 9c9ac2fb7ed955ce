use hushtone_core::alphabet::FREQUENCY_PLAN;
use hushtone_core::spectrum::{magnitude_spectrum, Spectrum};
use hushtone_core::{BandpassFilter, HIGHCUT_HZ, LOWCUT_HZ, PLOT_FILTER_ORDER};
use image::{Rgb, RgbImage};
use std::error::Error;
use std::path::Path;

const WAVEFORM_SIZE: (u32, u32) = (1200, 400);
const SPECTRUM_SIZE: (u32, u32) = (1200, 600);

/// Visible frequency window of the spectrum plot
pub const SPECTRUM_VIEW_HZ: (f32, f32) = (19000.0, 28000.0);

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([190, 190, 190]);
const TRACE: Rgb<u8> = Rgb([31, 119, 180]);
const LOW_GUIDE: Rgb<u8> = Rgb([255, 220, 200]); // low tones (rows)
const HIGH_GUIDE: Rgb<u8> = Rgb([205, 235, 205]); // high tones (columns)

fn draw_vline(img: &mut RgbImage, x: u32, y0: u32, y1: u32, color: Rgb<u8>) {
    let (top, bottom) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
    for y in top..=bottom.min(img.height() - 1) {
        img.put_pixel(x, y, color);
    }
}

fn draw_hline(img: &mut RgbImage, y: u32, color: Rgb<u8>) {
    for x in 0..img.width() {
        img.put_pixel(x, y, color);
    }
}

/// Min/max envelope of a signal, one column per pixel, amplitude -1..1
pub fn render_waveform(samples: &[f32], width: u32, height: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
    let mid = height / 2;
    draw_hline(&mut img, mid, AXIS);

    if samples.is_empty() {
        return img;
    }

    let to_y = |v: f32| {
        let scaled = (1.0 - v.clamp(-1.0, 1.0)) * 0.5 * (height - 1) as f32;
        scaled.round() as u32
    };

    let per_column = samples.len() as f64 / width as f64;
    for x in 0..width {
        let start = (x as f64 * per_column) as usize;
        if start >= samples.len() {
            break;
        }
        let end = (((x + 1) as f64 * per_column) as usize).clamp(start + 1, samples.len());
        let bucket = &samples[start..end];
        let lo = bucket.iter().copied().fold(f32::INFINITY, f32::min);
        let hi = bucket.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        draw_vline(&mut img, x, to_y(hi), to_y(lo), TRACE);
    }

    img
}

/// Linear-magnitude spectrum over `view`, with guide lines at every plan tone
pub fn render_spectrum(spectrum: &Spectrum, view: (f32, f32), width: u32, height: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
    let (lo_hz, hi_hz) = view;
    let to_x = |f: f32| ((f - lo_hz) / (hi_hz - lo_hz) * (width - 1) as f32).round() as u32;

    for (freqs, color) in [(FREQUENCY_PLAN.low, LOW_GUIDE), (FREQUENCY_PLAN.high, HIGH_GUIDE)] {
        for &f in freqs {
            if f >= lo_hz && f <= hi_hz {
                draw_vline(&mut img, to_x(f), 0, height - 1, color);
            }
        }
    }
    draw_hline(&mut img, height - 1, AXIS);

    let mut columns = vec![0.0f32; width as usize];
    for (&f, &m) in spectrum.freqs.iter().zip(spectrum.magnitudes.iter()) {
        if f < lo_hz || f > hi_hz {
            continue;
        }
        let column = &mut columns[to_x(f) as usize];
        *column = column.max(m);
    }

    let peak = columns.iter().copied().fold(0.0f32, f32::max);
    if peak <= 0.0 {
        return img;
    }

    for (x, &m) in columns.iter().enumerate() {
        let bar = (m / peak * (height - 1) as f32).round() as u32;
        if bar > 0 {
            draw_vline(&mut img, x as u32, height - 1 - bar, height - 1, TRACE);
        }
    }

    img
}

pub fn save_waveform(samples: &[f32], path: &Path) -> Result<(), Box<dyn Error>> {
    let (width, height) = WAVEFORM_SIZE;
    render_waveform(samples, width, height).save(path)?;
    Ok(())
}

/// Band-pass the signal (20-27 kHz), then plot its whole-signal spectrum
pub fn save_filtered_spectrum(
    samples: &[f32],
    sample_rate: u32,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let filter = BandpassFilter::new(LOWCUT_HZ, HIGHCUT_HZ, sample_rate, PLOT_FILTER_ORDER)?;
    let spectrum = magnitude_spectrum(&filter.filtfilt(samples), sample_rate);

    let (width, height) = SPECTRUM_SIZE;
    render_spectrum(&spectrum, SPECTRUM_VIEW_HZ, width, height).save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_ink(img: &RgbImage, x: u32) -> u32 {
        (0..img.height())
            .filter(|&y| *img.get_pixel(x, y) == TRACE)
            .count() as u32
    }

    #[test]
    fn test_empty_waveform_is_axis_only() {
        let img = render_waveform(&[], 100, 50);
        assert_eq!(*img.get_pixel(10, 25), AXIS);
        assert_eq!(column_ink(&img, 10), 0);
    }

    #[test]
    fn test_waveform_envelope() {
        // Full-scale square wave fills every column top to bottom
        let samples: Vec<f32> = (0..1000).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let img = render_waveform(&samples, 100, 50);
        assert_eq!(column_ink(&img, 0), 50);
        assert_eq!(column_ink(&img, 99), 50);
    }

    #[test]
    fn test_spectrum_peak_lands_on_its_frequency() {
        let spectrum = Spectrum {
            freqs: vec![19500.0, 24000.0, 27500.0, 30000.0],
            magnitudes: vec![0.1, 2.0, 0.5, 10.0],
        };
        let img = render_spectrum(&spectrum, SPECTRUM_VIEW_HZ, 901, 100);

        // 24 kHz sits at x = 500 on a 1 px / 10 Hz axis
        assert_eq!(column_ink(&img, 500), 100);
        // Out-of-view bins do not set the scale
        assert!(column_ink(&img, 850) < 100);
        assert!(column_ink(&img, 850) > 0);
    }

    #[test]
    fn test_spectrum_guides_drawn() {
        let img = render_spectrum(&Spectrum::default(), SPECTRUM_VIEW_HZ, 901, 100);
        // 20.5 kHz row guide at x = 150
        assert_eq!(*img.get_pixel(150, 10), LOW_GUIDE);
        // 26 kHz column guide at x = 700
        assert_eq!(*img.get_pixel(700, 10), HIGH_GUIDE);
    }
}
