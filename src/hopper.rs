//! Frequency-Hopping Mixer Block
//!
//! Frequency-shifts a complex baseband stream by cycling a local oscillator
//! (LO) through a fixed list of carrier frequencies at a fixed hop duration.
//! The LO phase is derived from the *global* sample counter, so it is a
//! single continuous function of elapsed time with no jump at hop
//! boundaries:
//!
//! ```text
//! out[n] = in[n] · exp(j·2π·f_active(n)·n/fs),   f_active cycles every hop
//! ```
//!
//! The block is a strict one-in-one-out streaming transform: it may be fed
//! arbitrarily sized batches and the output is identical to processing the
//! whole stream at once.
//!
//! ## Example
//!
//! ```rust
//! use gnss_hopper::hopper::{FreqHopper, HopConfig};
//! use num_complex::Complex64;
//!
//! let config = HopConfig {
//!     sample_rate: 2.048e6,
//!     hop_duration: 0.015,
//!     frequencies_mhz: vec![1575.42, 1602.0, 1227.6],
//! };
//! let mut hopper = FreqHopper::new(config).unwrap();
//!
//! let input = vec![Complex64::new(1.0, 0.0); 16];
//! let output = hopper.process(&input);
//! assert_eq!(output.len(), 16);
//! // At n = 0 the LO phase is zero, so the first sample passes through.
//! assert!((output[0] - input[0]).norm() < 1e-12);
//! ```

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

use crate::types::{HopperError, HopperResult, IQSample};

/// Default GNSS band centers (MHz): GLONASS L1, GPS L1, BeiDou B1,
/// GLONASS L2, GPS L2, Galileo E5b, GPS L5, Galileo E5.
pub const DEFAULT_GNSS_FREQS_MHZ: [f64; 8] = [
    1602.0, 1575.42, 1561.1, 1246.0, 1227.6, 1207.14, 1176.45, 1191.0,
];

// ---------------------------------------------------------------------------
// HopConfig
// ---------------------------------------------------------------------------

/// Configuration for the frequency-hopping mixer.
///
/// Frequencies are supplied in MHz and scaled to Hz at the block boundary.
/// The derived samples-per-hop count is `floor(hop_duration · sample_rate)`
/// and is recomputed whenever the rate or duration changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HopConfig {
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Dwell time per hop frequency, in seconds.
    pub hop_duration: f64,
    /// Hop frequency list in MHz, visited cyclically in order.
    pub frequencies_mhz: Vec<f64>,
}

impl Default for HopConfig {
    fn default() -> Self {
        Self {
            sample_rate: 2.048e6,
            hop_duration: 0.015,
            frequencies_mhz: DEFAULT_GNSS_FREQS_MHZ.to_vec(),
        }
    }
}

impl HopConfig {
    /// Validate the configuration and return the derived samples-per-hop.
    pub fn validate(&self) -> HopperResult<usize> {
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
        if self.frequencies_mhz.is_empty() {
            return Err(HopperError::InvalidConfiguration(
                "frequency list is empty".into(),
            ));
        }
        if let Some(&f) = self.frequencies_mhz.iter().find(|&&f| !(f > 0.0)) {
            return Err(HopperError::InvalidConfiguration(format!(
                "frequency list entries must be positive, got {} MHz",
                f
            )));
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

    /// Frequency list scaled to Hz.
    pub fn frequencies_hz(&self) -> Vec<f64> {
        self.frequencies_mhz.iter().map(|f| f * 1e6).collect()
    }
}

// ---------------------------------------------------------------------------
// HopStats
// ---------------------------------------------------------------------------

/// Runtime diagnostics for a [`FreqHopper`].
#[derive(Debug, Clone)]
pub struct HopStats {
    /// Number of hop transitions executed so far.
    pub hop_count: u64,
    /// Samples per hop derived from the current configuration.
    pub samples_per_hop: usize,
    /// Total samples processed since construction (never reset).
    pub total_samples: u64,
    /// Currently active hop frequency in Hz.
    pub current_frequency_hz: f64,
}

// ---------------------------------------------------------------------------
// FreqHopper
// ---------------------------------------------------------------------------

/// Frequency-hopping mixer: hop scheduler plus phase-continuous oscillator.
///
/// Owns all per-stream state (active frequency index, per-hop and global
/// sample counters). One instance serves exactly one stream; independent
/// streams need independent instances.
#[derive(Debug, Clone)]
pub struct FreqHopper {
    config: HopConfig,
    /// Frequency list in Hz (derived from `config.frequencies_mhz`).
    freqs_hz: Vec<f64>,
    /// Derived dwell length in samples.
    samples_per_hop: usize,
    /// Index into `freqs_hz` of the active hop frequency.
    current_index: usize,
    /// Samples processed within the current hop; resets on every transition.
    samples_into_hop: usize,
    /// Global sample counter; never resets. Drives the LO phase, which is
    /// what keeps the phase continuous across hop boundaries.
    total_samples: u64,
    /// Hop transitions executed (diagnostic only).
    hop_count: u64,
}

impl FreqHopper {
    /// Create a hopper from a validated configuration.
    ///
    /// Fails with [`HopperError::InvalidConfiguration`] for a non-positive
    /// rate or duration, an empty or non-positive frequency list, or a hop
    /// duration shorter than one sample period.
    pub fn new(config: HopConfig) -> HopperResult<Self> {
        let samples_per_hop = config.validate()?;
        let freqs_hz = config.frequencies_hz();
        debug!(
            sample_rate = config.sample_rate,
            hop_duration = config.hop_duration,
            samples_per_hop,
            num_frequencies = freqs_hz.len(),
            "frequency hopper initialized"
        );
        Ok(Self {
            config,
            freqs_hz,
            samples_per_hop,
            current_index: 0,
            samples_into_hop: 0,
            total_samples: 0,
            hop_count: 0,
        })
    }

    /// Mix a batch of samples with the hopping LO, returning a new buffer.
    ///
    /// Batch boundaries carry no meaning: any partitioning of a stream into
    /// consecutive `process` calls yields the same output as one call.
    pub fn process(&mut self, input: &[IQSample]) -> Vec<IQSample> {
        let mut output = Vec::with_capacity(input.len());
        for &sample in input {
            output.push(self.step(sample));
        }
        output
    }

    /// Host-buffer variant of [`process`](Self::process): mixes
    /// `min(input.len(), output.len())` samples into `output` and returns
    /// the number produced. Always one output per input consumed.
    pub fn work(&mut self, input: &[IQSample], output: &mut [IQSample]) -> usize {
        let n = input.len().min(output.len());
        for (out, &sample) in output[..n].iter_mut().zip(input) {
            *out = self.step(sample);
        }
        n
    }

    /// Process a single sample: advance the hop schedule if the dwell is
    /// complete, generate the LO from absolute elapsed time, and mix.
    fn step(&mut self, sample: IQSample) -> IQSample {
        if self.samples_into_hop >= self.samples_per_hop {
            self.current_index = (self.current_index + 1) % self.freqs_hz.len();
            self.samples_into_hop = 0;
            self.hop_count += 1;
            if self.hop_count <= 20 || self.hop_count % 100 == 0 {
                debug!(
                    hop = self.hop_count,
                    freq_mhz = self.config.frequencies_mhz[self.current_index],
                    "hop transition"
                );
            }
        }

        // LO phase from the global counter, not the per-hop counter.
        let freq_hz = self.freqs_hz[self.current_index];
        let t = self.total_samples as f64 / self.config.sample_rate;
        let lo = Complex64::from_polar(1.0, 2.0 * PI * freq_hz * t);

        self.samples_into_hop += 1;
        self.total_samples += 1;

        sample * lo
    }

    /// Update the sample rate and recompute samples-per-hop.
    ///
    /// Takes effect on the next processed sample.
    pub fn set_sample_rate(&mut self, sample_rate: f64) -> HopperResult<()> {
        let candidate = HopConfig {
            sample_rate,
            ..self.config.clone()
        };
        self.samples_per_hop = candidate.validate()?;
        self.config = candidate;
        debug!(sample_rate, samples_per_hop = self.samples_per_hop, "sample rate updated");
        Ok(())
    }

    /// Replace the frequency list (MHz) and restart the hop cycle at index 0.
    ///
    /// Already-emitted output is unaffected; the new list applies from the
    /// next processed sample.
    pub fn set_frequency_list(&mut self, frequencies_mhz: Vec<f64>) -> HopperResult<()> {
        let candidate = HopConfig {
            frequencies_mhz,
            ..self.config.clone()
        };
        self.samples_per_hop = candidate.validate()?;
        self.freqs_hz = candidate.frequencies_hz();
        self.config = candidate;
        self.current_index = 0;
        debug!(frequencies = ?self.config.frequencies_mhz, "frequency list updated");
        Ok(())
    }

    /// Update the hop duration (seconds) and recompute samples-per-hop.
    pub fn set_hop_duration(&mut self, hop_duration: f64) -> HopperResult<()> {
        let candidate = HopConfig {
            hop_duration,
            ..self.config.clone()
        };
        self.samples_per_hop = candidate.validate()?;
        self.config = candidate;
        debug!(hop_duration, samples_per_hop = self.samples_per_hop, "hop duration updated");
        Ok(())
    }

    /// Currently active hop frequency in Hz.
    pub fn current_frequency(&self) -> f64 {
        self.freqs_hz[self.current_index]
    }

    /// Number of hop transitions executed so far.
    pub fn hop_count(&self) -> u64 {
        self.hop_count
    }

    /// Dwell length in samples for the current configuration.
    pub fn samples_per_hop(&self) -> usize {
        self.samples_per_hop
    }

    /// Total samples processed since construction.
    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }

    /// The active configuration.
    pub fn config(&self) -> &HopConfig {
        &self.config
    }

    /// Gather runtime diagnostics.
    pub fn stats(&self) -> HopStats {
        HopStats {
            hop_count: self.hop_count,
            samples_per_hop: self.samples_per_hop,
            total_samples: self.total_samples,
            current_frequency_hz: self.current_frequency(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(freqs_mhz: &[f64], samples_per_hop: usize) -> HopConfig {
        // sample_rate 1000 Hz, duration chosen to land exactly on the
        // requested dwell length
        HopConfig {
            sample_rate: 1000.0,
            hop_duration: samples_per_hop as f64 / 1000.0,
            frequencies_mhz: freqs_mhz.to_vec(),
        }
    }

    fn ones(n: usize) -> Vec<IQSample> {
        vec![Complex64::new(1.0, 0.0); n]
    }

    #[test]
    fn test_rejects_zero_sample_rate() {
        let config = HopConfig {
            sample_rate: 0.0,
            ..HopConfig::default()
        };
        assert!(matches!(
            FreqHopper::new(config),
            Err(HopperError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_rejects_zero_hop_duration() {
        let config = HopConfig {
            hop_duration: 0.0,
            ..HopConfig::default()
        };
        assert!(matches!(
            FreqHopper::new(config),
            Err(HopperError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_rejects_empty_frequency_list() {
        let config = HopConfig {
            frequencies_mhz: vec![],
            ..HopConfig::default()
        };
        assert!(matches!(
            FreqHopper::new(config),
            Err(HopperError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_rejects_non_positive_frequency() {
        let config = HopConfig {
            frequencies_mhz: vec![1575.42, -1.0],
            ..HopConfig::default()
        };
        assert!(matches!(
            FreqHopper::new(config),
            Err(HopperError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_rejects_hop_shorter_than_one_sample() {
        let config = HopConfig {
            sample_rate: 10.0,
            hop_duration: 0.01, // 0.1 samples per hop
            frequencies_mhz: vec![1.0],
        };
        assert!(matches!(
            FreqHopper::new(config),
            Err(HopperError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_output_matches_lo_phase() {
        // Unit DC input makes the output equal to the LO itself.
        let config = small_config(&[0.0001], 1000); // 100 Hz at 1 kHz rate
        let mut hopper = FreqHopper::new(config).unwrap();
        let output = hopper.process(&ones(64));
        for (n, out) in output.iter().enumerate() {
            let phase = 2.0 * PI * 100.0 * n as f64 / 1000.0;
            let expected = Complex64::from_polar(1.0, phase);
            assert!(
                (out - expected).norm() < 1e-9,
                "sample {n}: expected {expected}, got {out}"
            );
        }
    }

    #[test]
    fn test_hop_boundary_schedule() {
        // Frequency index at absolute sample n must be floor(n/k) mod m.
        let freqs = [0.0001, 0.0002, 0.0003];
        let k = 5;
        let mut hopper = FreqHopper::new(small_config(&freqs, k)).unwrap();
        for n in 0..4 * freqs.len() * k {
            let _ = hopper.process(&ones(1));
            let expected = freqs[(n / k) % freqs.len()] * 1e6;
            assert!(
                (hopper.current_frequency() - expected).abs() < 1e-9,
                "sample {n}: expected {expected} Hz, got {}",
                hopper.current_frequency()
            );
        }
    }

    #[test]
    fn test_hop_count_increments() {
        let k = 4;
        let mut hopper = FreqHopper::new(small_config(&[0.001, 0.002], k)).unwrap();

        // The first dwell fills after k samples; the (k+1)-th triggers.
        let _ = hopper.process(&ones(k));
        assert_eq!(hopper.hop_count(), 0);
        let _ = hopper.process(&ones(1));
        assert_eq!(hopper.hop_count(), 1);

        let _ = hopper.process(&ones(k - 1));
        assert_eq!(hopper.hop_count(), 1);
        let _ = hopper.process(&ones(1));
        assert_eq!(hopper.hop_count(), 2);
    }

    #[test]
    fn test_streaming_composability() {
        let config = small_config(&[0.0007, 0.0011, 0.0003], 16);
        let input: Vec<IQSample> = (0..200)
            .map(|i| Complex64::new((i as f64 * 0.013).sin(), (i as f64 * 0.031).cos()))
            .collect();

        let mut one_shot = FreqHopper::new(config.clone()).unwrap();
        let reference = one_shot.process(&input);

        let mut batched = FreqHopper::new(config).unwrap();
        let mut produced = Vec::new();
        let mut pos = 0;
        // Deliberately ragged batch sizes, including empty batches.
        for size in [1usize, 7, 0, 3, 19, 2, 50, 1, 117] {
            let end = (pos + size).min(input.len());
            produced.extend(batched.process(&input[pos..end]));
            pos = end;
        }
        produced.extend(batched.process(&input[pos..]));

        assert_eq!(reference.len(), produced.len());
        for (n, (a, b)) in reference.iter().zip(&produced).enumerate() {
            assert_eq!(a, b, "batching changed sample {n}");
        }
    }

    #[test]
    fn test_phase_continuous_across_hop() {
        // First sample of the second hop must sit exactly on the continuous
        // oscillator at the new frequency, phase referenced to n = 0.
        let freqs = [0.0001, 0.00025];
        let k = 10;
        let mut hopper = FreqHopper::new(small_config(&freqs, k)).unwrap();
        let output = hopper.process(&ones(2 * k));

        let f2 = freqs[1] * 1e6;
        let expected = Complex64::from_polar(1.0, 2.0 * PI * f2 * k as f64 / 1000.0);
        assert!(
            (output[k] - expected).norm() < 1e-9,
            "phase discontinuity at hop boundary: expected {expected}, got {}",
            output[k]
        );
    }

    #[test]
    fn test_set_frequency_list_resets_index() {
        let k = 6;
        let mut hopper = FreqHopper::new(small_config(&[0.001, 0.002, 0.003], k)).unwrap();
        // Advance into the second hop.
        let before = hopper.process(&ones(k + 2));
        assert!((hopper.current_frequency() - 2000.0).abs() < 1e-9);

        hopper.set_frequency_list(vec![0.004, 0.005]).unwrap();
        assert!((hopper.current_frequency() - 4000.0).abs() < 1e-9);

        // Emitted samples are untouched and the new list applies from the
        // next absolute sample index.
        let n = before.len() as f64;
        let next = hopper.process(&ones(1))[0];
        let expected = Complex64::from_polar(1.0, 2.0 * PI * 4000.0 * n / 1000.0);
        assert!((next - expected).norm() < 1e-9);
    }

    #[test]
    fn test_setters_reject_invalid_values() {
        let mut hopper = FreqHopper::new(HopConfig::default()).unwrap();
        assert!(hopper.set_sample_rate(0.0).is_err());
        assert!(hopper.set_hop_duration(-1.0).is_err());
        assert!(hopper.set_frequency_list(vec![]).is_err());
        // Failed reconfiguration leaves the block usable.
        assert_eq!(hopper.process(&ones(4)).len(), 4);
    }

    #[test]
    fn test_work_reports_samples_produced() {
        let mut hopper = FreqHopper::new(HopConfig::default()).unwrap();
        let input = ones(32);
        let mut output = vec![Complex64::default(); 32];
        assert_eq!(hopper.work(&input, &mut output), 32);
        assert_eq!(hopper.total_samples(), 32);
    }

    #[test]
    fn test_single_frequency_list_keeps_hopping() {
        let k = 3;
        let mut hopper = FreqHopper::new(small_config(&[0.001], k)).unwrap();
        let _ = hopper.process(&ones(10));
        assert_eq!(hopper.hop_count(), 3);
        assert!((hopper.current_frequency() - 1000.0).abs() < 1e-9);
    }
}
