//! Complex Tone Source
//!
//! Phase-accumulator generator for a single complex exponential, used as the
//! test input for the hopper chain (the original flowgraph feeds the mixer a
//! 1 kHz tone). The accumulator wraps to keep precision over long runs.
//!
//! ## Example
//!
//! ```rust
//! use gnss_hopper::signal_source::ToneSource;
//!
//! let mut src = ToneSource::new(1000.0, 1.0, 48000.0);
//! let samples = src.generate(48);
//! assert_eq!(samples.len(), 48);
//! for s in &samples {
//!     assert!((s.norm() - 1.0).abs() < 1e-10);
//! }
//! ```

use num_complex::Complex64;
use std::f64::consts::PI;

use crate::types::IQSample;

/// Continuous-wave complex tone generator.
#[derive(Debug, Clone)]
pub struct ToneSource {
    frequency: f64,
    amplitude: f64,
    sample_rate: f64,
    phase: f64,
    phase_inc: f64,
}

impl ToneSource {
    /// Create a tone at `frequency` Hz with the given amplitude and rate.
    pub fn new(frequency: f64, amplitude: f64, sample_rate: f64) -> Self {
        Self {
            frequency,
            amplitude,
            sample_rate,
            phase: 0.0,
            phase_inc: 2.0 * PI * frequency / sample_rate,
        }
    }

    /// Generate one sample and advance the phase.
    pub fn step(&mut self) -> IQSample {
        let sample = Complex64::from_polar(self.amplitude, self.phase);
        self.phase += self.phase_inc;
        // Wrap to keep the accumulator small over long runs
        if self.phase > PI {
            self.phase -= 2.0 * PI;
        } else if self.phase < -PI {
            self.phase += 2.0 * PI;
        }
        sample
    }

    /// Generate a block of `n` samples.
    pub fn generate(&mut self, n: usize) -> Vec<IQSample> {
        (0..n).map(|_| self.step()).collect()
    }

    /// Tone frequency in Hz.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_phase_progression() {
        let mut src = ToneSource::new(100.0, 1.0, 1000.0);
        let samples = src.generate(20);
        for (n, s) in samples.iter().enumerate() {
            let expected = Complex64::from_polar(1.0, 2.0 * PI * 100.0 * n as f64 / 1000.0);
            assert!((s - expected).norm() < 1e-9, "sample {n}");
        }
    }

    #[test]
    fn test_generation_is_streaming() {
        let mut one_shot = ToneSource::new(250.0, 0.5, 8000.0);
        let reference = one_shot.generate(100);

        let mut batched = ToneSource::new(250.0, 0.5, 8000.0);
        let mut produced = batched.generate(33);
        produced.extend(batched.generate(67));

        for (a, b) in reference.iter().zip(&produced) {
            assert!((a - b).norm() < 1e-12);
        }
    }

    #[test]
    fn test_amplitude_applied() {
        let mut src = ToneSource::new(0.0, 2.5, 1000.0);
        let s = src.step();
        assert!((s.re - 2.5).abs() < 1e-12);
        assert!(s.im.abs() < 1e-12);
    }
}
