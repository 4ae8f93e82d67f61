//! Core types for the frequency-hopping mixer and its spectral verifier
//!
//! All signal processing runs on complex I/Q samples. Internally samples are
//! `Complex64` for numerical headroom; single-precision (cf32) only appears
//! at the file boundary, see [`crate::file_io`].

use num_complex::Complex64;
use std::path::PathBuf;

/// A single complex I/Q sample.
pub type IQSample = Complex64;

/// A buffer of I/Q samples.
pub type IQBuffer = Vec<IQSample>;

/// Result type for hopper and analysis operations.
pub type HopperResult<T> = Result<T, HopperError>;

/// Errors raised by the hopper and the spectral verifier.
///
/// Configuration problems are rejected when the configuration is applied,
/// never mid-stream; per-sample processing is infallible. A missing or
/// unreadable sample file aborts the whole analysis before any window is
/// processed.
#[derive(Debug, thiserror::Error)]
pub enum HopperError {
    /// Malformed configuration: non-positive rate or duration, empty or
    /// non-positive frequency list, or a hop shorter than one sample.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The persisted sample stream could not be opened or read.
    #[error("sample source unavailable: {}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
