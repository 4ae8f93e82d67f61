//! Hop Spectrum Verification
//!
//! Batch analysis of a recorded complex stream that checks whether the
//! intended hop sequence actually appears in the data. The stream is cut
//! into consecutive hop-length windows and each window's dominant frequency
//! is estimated with an FFT, then compared against the frequency the
//! configured list predicts for that window index.
//!
//! Two extraction passes run over the same stream:
//!
//! - a fixed-size pass (default 2048 bins, truncate/zero-pad per window)
//!   producing uniform waterfall rows for display, and
//! - a native-length pass using each window's full sample count for maximum
//!   frequency resolution, which drives peak detection.
//!
//! The hop timeline is reconstructed here purely from stream position and
//! configuration so the analysis stays an independent cross-check of the
//! mixer rather than sharing its bookkeeping.
//!
//! ## Example
//!
//! ```rust
//! use gnss_hopper::analysis::{AnalysisConfig, HopAnalyzer};
//! use gnss_hopper::hopper::{FreqHopper, HopConfig};
//! use num_complex::Complex64;
//!
//! let config = HopConfig {
//!     sample_rate: 8000.0,
//!     hop_duration: 0.064,
//!     frequencies_mhz: vec![0.001, 0.002], // 1 kHz, 2 kHz
//! };
//! let mut hopper = FreqHopper::new(config).unwrap();
//! let stream = hopper.process(&vec![Complex64::new(1.0, 0.0); 1024]);
//!
//! let analyzer = HopAnalyzer::new(AnalysisConfig {
//!     sample_rate: 8000.0,
//!     hop_duration: 0.064,
//!     expected_mhz: vec![0.001, 0.002],
//!     ..Default::default()
//! });
//! let analysis = analyzer.analyze(&stream).unwrap();
//! assert_eq!(analysis.windows.len(), 2);
//! assert!((analysis.windows[0].peak_frequency_hz - 1000.0).abs() < 8000.0 / 512.0);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;

use crate::fft_utils::{fft_frequencies, FftProcessor};
use crate::file_io::read_cf32;
use crate::hopper::DEFAULT_GNSS_FREQS_MHZ;
use crate::types::{HopperError, HopperResult, IQSample};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the spectral verifier.
///
/// `sample_rate`, `hop_duration`, and `expected_mhz` must match what the
/// mixer was run with; the analyzer has no other channel to the mixer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Sample rate of the recorded stream, in Hz.
    pub sample_rate: f64,
    /// Hop duration used during mixing, in seconds.
    pub hop_duration: f64,
    /// Expected hop frequency list in MHz, cycled by window index.
    pub expected_mhz: Vec<f64>,
    /// FFT size for the fixed-size waterfall pass.
    pub fft_size: usize,
    /// Cap on waterfall rows (long captures stay cheap to render).
    pub max_waterfall_rows: usize,
    /// Number of leading windows whose full dB spectrum is retained.
    pub detail_windows: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: 2.048e6,
            hop_duration: 0.015,
            expected_mhz: DEFAULT_GNSS_FREQS_MHZ.to_vec(),
            fft_size: 2048,
            max_waterfall_rows: 100,
            detail_windows: 4,
        }
    }
}

impl AnalysisConfig {
    fn validate(&self) -> HopperResult<usize> {
        if !(self.sample_rate > 0.0) {
            return Err(HopperError::InvalidConfiguration(format!(
                "sample rate must be positive, got {} Hz",
                self.sample_rate
            )));
        }
        if !(self.hop_duration > 0.0) {
            return Err(HopperError::InvalidConfiguration(format!(
                "hop duration must be positive, got {} s",
                self.hop_duration
            )));
        }
        if self.expected_mhz.is_empty() {
            return Err(HopperError::InvalidConfiguration(
                "expected frequency list is empty".into(),
            ));
        }
        if self.fft_size < 1 {
            return Err(HopperError::InvalidConfiguration(
                "fft size must be at least 1".into(),
            ));
        }
        let samples_per_hop = (self.hop_duration * self.sample_rate) as usize;
        if samples_per_hop < 1 {
            return Err(HopperError::InvalidConfiguration(format!(
                "hop duration {} s covers less than one sample at {} Hz",
                self.hop_duration, self.sample_rate
            )));
        }
        Ok(samples_per_hop)
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Per-window verification result.
#[derive(Debug, Clone)]
pub struct SpectrumResult {
    /// Zero-based window index into the stream.
    pub window_index: usize,
    /// Number of samples in this window (the trailing window may be short).
    pub window_len: usize,
    /// Frequency of the maximum-power bin, in Hz relative to center.
    pub peak_frequency_hz: f64,
    /// Frequency the configured list predicts for this window, in Hz.
    pub expected_frequency_hz: f64,
    /// Full shifted dB spectrum, retained for the first few windows only.
    pub power_db: Option<Vec<f64>>,
}

/// Complete analysis of one recorded stream.
#[derive(Debug, Clone)]
pub struct HopAnalysis {
    /// Total samples in the stream.
    pub total_samples: usize,
    /// Window length derived from the configuration.
    pub samples_per_hop: usize,
    /// Sample rate the analysis assumed, in Hz.
    pub sample_rate: f64,
    /// Expected frequency list in MHz.
    pub expected_mhz: Vec<f64>,
    /// Per-window results, in stream order (includes a partial tail window).
    pub windows: Vec<SpectrumResult>,
    /// Fixed-size dB spectra, one row per window, for waterfall rendering.
    pub waterfall_db: Vec<Vec<f64>>,
    /// Centered frequency axis for the waterfall columns, in Hz.
    pub waterfall_freqs_hz: Vec<f64>,
}

impl HopAnalysis {
    /// Number of windows whose detected peak lies within `tolerance_hz` of
    /// the aliased image of its expected frequency.
    pub fn matching_windows(&self, tolerance_hz: f64) -> usize {
        self.windows
            .iter()
            .filter(|w| {
                let aliased = alias_to_baseband(w.expected_frequency_hz, self.sample_rate);
                (w.peak_frequency_hz - aliased).abs() <= tolerance_hz
            })
            .count()
    }
}

impl fmt::Display for HopAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Frequency hopping analysis")?;
        writeln!(f, "  total samples:   {}", self.total_samples)?;
        writeln!(f, "  samples per hop: {}", self.samples_per_hop)?;
        writeln!(f, "  windows:         {}", self.windows.len())?;
        writeln!(f, "  expected (MHz):  {:?}", self.expected_mhz)?;
        writeln!(f, "  first windows:")?;
        for w in self.windows.iter().take(4) {
            writeln!(
                f,
                "    window {:>3}: detected {:>10.4} MHz  expected {:>10.4} MHz",
                w.window_index,
                w.peak_frequency_hz / 1e6,
                w.expected_frequency_hz / 1e6,
            )?;
        }
        Ok(())
    }
}

/// Fold an RF frequency into the first Nyquist zone `[-fs/2, +fs/2)`.
///
/// Expected carriers far above the sample rate show up in the recording at
/// their aliased image; this maps an expected carrier onto the frequency the
/// FFT can actually report.
pub fn alias_to_baseband(freq_hz: f64, sample_rate: f64) -> f64 {
    let folded = freq_hz.rem_euclid(sample_rate);
    if folded >= sample_rate / 2.0 {
        folded - sample_rate
    } else {
        folded
    }
}

// ---------------------------------------------------------------------------
// HopAnalyzer
// ---------------------------------------------------------------------------

/// Batch spectral verifier for recorded hop streams.
#[derive(Debug, Clone)]
pub struct HopAnalyzer {
    config: AnalysisConfig,
}

impl HopAnalyzer {
    /// Create an analyzer. Configuration problems are reported by
    /// [`analyze`](Self::analyze).
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Analyze a cf32 file. A missing or unreadable file fails with
    /// [`HopperError::SourceUnavailable`] before any window is processed.
    pub fn analyze_file(&self, path: &Path) -> HopperResult<HopAnalysis> {
        let samples = read_cf32(path).map_err(|source| HopperError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        self.analyze(&samples)
    }

    /// Partition the stream into hop-length windows and verify each one.
    ///
    /// The trailing window may be shorter than a full hop; it is analyzed at
    /// its native length in the peak pass and zero-padded in the waterfall
    /// pass like every other window.
    pub fn analyze(&self, samples: &[IQSample]) -> HopperResult<HopAnalysis> {
        let samples_per_hop = self.config.validate()?;
        let expected_hz: Vec<f64> = self.config.expected_mhz.iter().map(|f| f * 1e6).collect();

        let mut windows = Vec::new();
        let mut waterfall_db = Vec::new();

        // Full windows share one plan; the partial tail gets its own.
        let mut native_fft = FftProcessor::new(samples_per_hop);
        let mut waterfall_fft = FftProcessor::new(self.config.fft_size);
        let waterfall_freqs_hz = fft_frequencies(self.config.fft_size, self.config.sample_rate);

        for (window_index, window) in samples.chunks(samples_per_hop).enumerate() {
            // Native-length pass: peak extraction at full resolution.
            if native_fft.size() != window.len() {
                native_fft = FftProcessor::new(window.len());
            }
            let spectrum = FftProcessor::fft_shift(&native_fft.fft(window));
            let power_db = FftProcessor::power_spectrum_db(&spectrum);
            let peak_bin = FftProcessor::find_peak(&power_db);
            let freqs = fft_frequencies(window.len(), self.config.sample_rate);
            let peak_frequency_hz = freqs[peak_bin];
            let expected_frequency_hz = expected_hz[window_index % expected_hz.len()];

            debug!(
                window = window_index,
                peak_mhz = peak_frequency_hz / 1e6,
                expected_mhz = expected_frequency_hz / 1e6,
                "window analyzed"
            );

            windows.push(SpectrumResult {
                window_index,
                window_len: window.len(),
                peak_frequency_hz,
                expected_frequency_hz,
                power_db: (window_index < self.config.detail_windows).then_some(power_db),
            });

            // Fixed-size pass: uniform rows for the waterfall display.
            if waterfall_db.len() < self.config.max_waterfall_rows {
                let row = FftProcessor::fft_shift(&waterfall_fft.fft(window));
                waterfall_db.push(FftProcessor::power_spectrum_db(&row));
            }
        }

        Ok(HopAnalysis {
            total_samples: samples.len(),
            samples_per_hop,
            sample_rate: self.config.sample_rate,
            expected_mhz: self.config.expected_mhz.clone(),
            windows,
            waterfall_db,
            waterfall_freqs_hz,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
