//! FFT Utilities for Hop Spectrum Verification
//!
//! Thin wrapper over `rustfft` providing the operations the spectral
//! verifier needs: forward FFT with pad/truncate to a fixed size, fftshift,
//! dB power conversion, peak-bin extraction, and the centered frequency
//! axis.
//!
//! ## Example
//!
//! ```rust
//! use gnss_hopper::fft_utils::{FftProcessor, fft_frequencies};
//! use num_complex::Complex64;
//!
//! // 64-sample tone at bin 8
//! let signal: Vec<Complex64> = (0..64)
//!     .map(|n| {
//!         let phase = 2.0 * std::f64::consts::PI * 8.0 * n as f64 / 64.0;
//!         Complex64::from_polar(1.0, phase)
//!     })
//!     .collect();
//!
//! let mut fft = FftProcessor::new(64);
//! let spectrum = FftProcessor::fft_shift(&fft.fft(&signal));
//! let power_db = FftProcessor::power_spectrum_db(&spectrum);
//! let peak = FftProcessor::find_peak(&power_db);
//!
//! let freqs = fft_frequencies(64, 64.0);
//! assert_eq!(freqs[peak], 8.0);
//! ```

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::fmt;
use std::sync::Arc;

use crate::types::IQSample;

/// Epsilon added to FFT magnitudes before the logarithm so that empty bins
/// produce a finite dB floor instead of -inf.
pub const LOG_EPSILON: f64 = 1e-12;

/// Forward-FFT processor with a reusable plan and scratch buffer.
pub struct FftProcessor {
    size: usize,
    fft: Arc<dyn Fft<f64>>,
    scratch: Vec<Complex64>,
}

impl fmt::Debug for FftProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftProcessor").field("size", &self.size).finish()
    }
}

impl FftProcessor {
    /// Plan a forward FFT of the given size (any size, not just powers of
    /// two — the native-length verification pass uses the full hop length).
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let scratch = vec![Complex64::default(); fft.get_inplace_scratch_len()];
        Self { size, fft, scratch }
    }

    /// The planned FFT size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Transform `input`, zero-padding or truncating to the planned size,
    /// and return the (unshifted) spectrum.
    pub fn fft(&mut self, input: &[IQSample]) -> Vec<Complex64> {
        let mut buffer: Vec<Complex64> = input.to_vec();
        buffer.resize(self.size, Complex64::default());
        self.fft.process_with_scratch(&mut buffer, &mut self.scratch);
        buffer
    }

    /// Move the zero-frequency bin to the center of the spectrum.
    pub fn fft_shift<T: Clone>(spectrum: &[T]) -> Vec<T> {
        let mid = spectrum.len().div_ceil(2);
        let mut shifted = Vec::with_capacity(spectrum.len());
        shifted.extend_from_slice(&spectrum[mid..]);
        shifted.extend_from_slice(&spectrum[..mid]);
        shifted
    }

    /// Convert a spectrum to dB power: `20·log10(|X| + ε)`.
    pub fn power_spectrum_db(spectrum: &[Complex64]) -> Vec<f64> {
        spectrum
            .iter()
            .map(|c| 20.0 * (c.norm() + LOG_EPSILON).log10())
            .collect()
    }

    /// Index of the maximum-power bin.
    pub fn find_peak(power_db: &[f64]) -> usize {
        let mut max_idx = 0;
        let mut max_db = f64::NEG_INFINITY;
        for (i, &db) in power_db.iter().enumerate() {
            if db > max_db {
                max_db = db;
                max_idx = i;
            }
        }
        max_idx
    }
}

/// Centered frequency axis for an `n`-point shifted spectrum.
///
/// Bin `i` maps to `(i - floor(n/2)) · sample_rate / n`, so the axis spans
/// `[-sample_rate/2, +sample_rate/2)`.
pub fn fft_frequencies(n: usize, sample_rate: f64) -> Vec<f64> {
    (0..n)
        .map(|i| (i as i64 - (n / 2) as i64) as f64 * sample_rate / n as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn tone(freq: f64, sample_rate: f64, n: usize) -> Vec<Complex64> {
        (0..n)
            .map(|i| {
                let t = i as f64 / sample_rate;
                Complex64::from_polar(1.0, 2.0 * PI * freq * t)
            })
            .collect()
    }

    #[test]
    fn test_tone_lands_on_expected_bin() {
        let n = 128;
        let signal = tone(10.0, 128.0, n);
        let mut fft = FftProcessor::new(n);
        let spectrum = FftProcessor::fft_shift(&fft.fft(&signal));
        let power = FftProcessor::power_spectrum_db(&spectrum);
        let peak = FftProcessor::find_peak(&power);
        assert_eq!(fft_frequencies(n, 128.0)[peak], 10.0);
    }

    #[test]
    fn test_negative_frequency_resolved() {
        let n = 256;
        let signal = tone(-32.0, 256.0, n);
        let mut fft = FftProcessor::new(n);
        let spectrum = FftProcessor::fft_shift(&fft.fft(&signal));
        let peak = FftProcessor::find_peak(&FftProcessor::power_spectrum_db(&spectrum));
        assert_eq!(fft_frequencies(n, 256.0)[peak], -32.0);
    }

    #[test]
    fn test_zero_padding_to_planned_size() {
        let mut fft = FftProcessor::new(64);
        let spectrum = fft.fft(&tone(8.0, 64.0, 40));
        assert_eq!(spectrum.len(), 64);
    }

    #[test]
    fn test_all_zero_input_has_finite_floor() {
        let mut fft = FftProcessor::new(32);
        let spectrum = fft.fft(&vec![Complex64::default(); 32]);
        for db in FftProcessor::power_spectrum_db(&spectrum) {
            assert!(db.is_finite());
            assert!(db <= 20.0 * LOG_EPSILON.log10() + 1e-6);
        }
    }

    #[test]
    fn test_fft_shift_even_and_odd() {
        assert_eq!(FftProcessor::fft_shift(&[0, 1, 2, 3]), vec![2, 3, 0, 1]);
        assert_eq!(FftProcessor::fft_shift(&[0, 1, 2, 3, 4]), vec![3, 4, 0, 1, 2]);
    }

    #[test]
    fn test_frequency_axis_spans_half_rate() {
        let freqs = fft_frequencies(8, 8000.0);
        assert_eq!(freqs[0], -4000.0);
        assert_eq!(freqs[4], 0.0);
        assert_eq!(freqs[7], 3000.0);
    }
}
