//! # GNSS Frequency Hopper
//!
//! Frequency-shifts a complex baseband stream by cycling a local oscillator
//! through a configured list of carrier frequencies at a fixed hop duration,
//! with phase continuity across hop boundaries, and verifies the recorded
//! output spectrally.
//!
//! ## Signal Flow
//!
//! ```text
//! TX:  tone/source → FreqHopper (hop schedule + phase-continuous LO) → cf32 file
//! RX:  cf32 file → HopAnalyzer (per-hop FFT, peak vs expected) → report/waterfall
//! ```
//!
//! The mixer and the verifier share only the data contract (sample stream,
//! hop duration, frequency list). The verifier rebuilds the hop timeline
//! from stream position alone, so it cross-checks the mixer instead of
//! trusting its counters.
//!
//! ## Example
//!
//! ```rust
//! use gnss_hopper::{AnalysisConfig, FreqHopper, HopAnalyzer, HopConfig, ToneSource};
//!
//! let config = HopConfig {
//!     sample_rate: 64_000.0,
//!     hop_duration: 0.008,
//!     frequencies_mhz: vec![0.004, 0.012], // 4 kHz, 12 kHz
//! };
//! let mut hopper = FreqHopper::new(config).unwrap();
//!
//! // Two full hops of a unit carrier
//! let input = ToneSource::new(0.0, 1.0, 64_000.0).generate(1024);
//! let stream = hopper.process(&input);
//! assert_eq!(hopper.hop_count(), 1);
//!
//! let analyzer = HopAnalyzer::new(AnalysisConfig {
//!     sample_rate: 64_000.0,
//!     hop_duration: 0.008,
//!     expected_mhz: vec![0.004, 0.012],
//!     ..Default::default()
//! });
//! let analysis = analyzer.analyze(&stream).unwrap();
//! assert!((analysis.windows[0].peak_frequency_hz - 4_000.0).abs() < 125.0);
//! assert!((analysis.windows[1].peak_frequency_hz - 12_000.0).abs() < 125.0);
//! ```

pub mod analysis;
pub mod fft_utils;
pub mod file_io;
pub mod hopper;
pub mod signal_source;
pub mod types;

pub use analysis::{alias_to_baseband, AnalysisConfig, HopAnalysis, HopAnalyzer, SpectrumResult};
pub use fft_utils::{fft_frequencies, FftProcessor};
pub use file_io::{read_cf32, write_cf32, Cf32Writer};
pub use hopper::{FreqHopper, HopConfig, HopStats, DEFAULT_GNSS_FREQS_MHZ};
pub use signal_source::ToneSource;
pub use types::{HopperError, HopperResult, IQBuffer, IQSample};
