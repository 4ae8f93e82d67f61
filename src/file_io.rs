//! Raw cf32 Sample File I/O
//!
//! Persists complex sample streams as raw, headerless interleaved
//! little-endian `f32` pairs (8 bytes per sample, the GNU Radio / USRP
//! "cf32" convention). There is no framing: a reader recovers the sample
//! count as `file_size / 8`.
//!
//! ## Example
//!
//! ```rust
//! use gnss_hopper::file_io::{read_cf32, write_cf32};
//! use num_complex::Complex64;
//!
//! let samples = vec![Complex64::new(1.0, 0.0), Complex64::new(0.0, -1.0)];
//! let path = std::env::temp_dir().join("gnss_hopper_doc_io.cf32");
//! write_cf32(&path, &samples).unwrap();
//!
//! let read_back = read_cf32(&path).unwrap();
//! assert_eq!(read_back.len(), 2);
//! assert!((read_back[1].im + 1.0).abs() < 1e-6);
//! std::fs::remove_file(&path).ok();
//! ```

use num_complex::Complex64;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use crate::types::IQSample;

/// Bytes per cf32 sample (two little-endian `f32` values).
pub const BYTES_PER_SAMPLE: usize = 8;

/// Read an entire cf32 file into memory.
///
/// A trailing partial sample (file size not a multiple of 8) is ignored,
/// matching the length-from-file-size contract.
pub fn read_cf32(path: &Path) -> io::Result<Vec<IQSample>> {
    let mut bytes = Vec::new();
    File::open(path)?.read_to_end(&mut bytes)?;

    let num_samples = bytes.len() / BYTES_PER_SAMPLE;
    let mut samples = Vec::with_capacity(num_samples);
    for chunk in bytes.chunks_exact(BYTES_PER_SAMPLE) {
        let re = f32::from_le_bytes(chunk[0..4].try_into().unwrap()) as f64;
        let im = f32::from_le_bytes(chunk[4..8].try_into().unwrap()) as f64;
        samples.push(Complex64::new(re, im));
    }
    Ok(samples)
}

/// Write a complete sample buffer as a cf32 file.
pub fn write_cf32(path: &Path, samples: &[IQSample]) -> io::Result<()> {
    let mut writer = Cf32Writer::new(path)?;
    writer.write(samples)?;
    writer.close()
}

/// Buffered streaming cf32 file sink for the mixer output path.
pub struct Cf32Writer {
    writer: BufWriter<File>,
    samples_written: u64,
}

impl Cf32Writer {
    /// Create (or truncate) the file at `path`.
    pub fn new(path: &Path) -> io::Result<Self> {
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
            samples_written: 0,
        })
    }

    /// Append a batch of samples.
    pub fn write(&mut self, samples: &[IQSample]) -> io::Result<()> {
        for sample in samples {
            self.writer.write_all(&(sample.re as f32).to_le_bytes())?;
            self.writer.write_all(&(sample.im as f32).to_le_bytes())?;
        }
        self.samples_written += samples.len() as u64;
        Ok(())
    }

    /// Total samples written so far.
    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    /// Flush and close the file.
    pub fn close(mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("gnss_hopper_test_{}", name))
    }

    #[test]
    fn test_cf32_roundtrip() {
        let path = temp_path("roundtrip.cf32");
        let samples: Vec<IQSample> = (0..100)
            .map(|i| Complex64::new(i as f64 * 0.01, -(i as f64) * 0.02))
            .collect();

        write_cf32(&path, &samples).unwrap();
        let read_back = read_cf32(&path).unwrap();

        assert_eq!(read_back.len(), samples.len());
        for (a, b) in samples.iter().zip(&read_back) {
            // cf32 quantizes to f32 on disk
            assert!((a.re - b.re).abs() < 1e-6);
            assert!((a.im - b.im).abs() < 1e-6);
        }
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_streaming_writer_counts_samples() {
        let path = temp_path("streaming.cf32");
        let mut writer = Cf32Writer::new(&path).unwrap();
        writer.write(&vec![Complex64::new(1.0, 1.0); 30]).unwrap();
        writer.write(&vec![Complex64::new(2.0, 2.0); 12]).unwrap();
        assert_eq!(writer.samples_written(), 42);
        writer.close().unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert_eq!(metadata.len(), 42 * BYTES_PER_SAMPLE as u64);
        assert_eq!(read_cf32(&path).unwrap().len(), 42);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_trailing_partial_sample_ignored() {
        let path = temp_path("partial.cf32");
        write_cf32(&path, &[Complex64::new(1.0, 0.0)]).unwrap();
        // Append 3 stray bytes
        use std::io::Write as _;
        let mut f = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        f.write_all(&[0u8; 3]).unwrap();
        drop(f);

        assert_eq!(read_cf32(&path).unwrap().len(), 1);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_errors() {
        assert!(read_cf32(&temp_path("does_not_exist.cf32")).is_err());
    }
}
