//! FFT engine using realfft for real-valued signals
//!
//! Plans are cached by the planner, so one engine serves every transform
//! length an estimator needs.

use crate::error::SpectralError;
use num_complex::Complex;
use realfft::RealFftPlanner;

/// FFT engine for real-valued signals of arbitrary length
pub struct FftEngine {
    /// Planner (caches plans per length)
    planner: RealFftPlanner<f64>,

    /// Reusable input buffer
    input_buffer: Vec<f64>,
}

impl Default for FftEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FftEngine {
    /// Create new FFT engine
    pub fn new() -> Self {
        Self {
            planner: RealFftPlanner::<f64>::new(),
            input_buffer: Vec::new(),
        }
    }

    /// One-sided spectrum X[k], k = 0..fft_size/2
    ///
    /// # Arguments
    /// * `signal` - Input signal (zero-padded or truncated to `fft_size`)
    /// * `fft_size` - Transform length
    pub fn forward(
        &mut self,
        signal: &[f64],
        fft_size: usize,
    ) -> Result<Vec<Complex<f64>>, SpectralError> {
        if fft_size == 0 {
            return Err(SpectralError::InsufficientSamples {
                required: 1,
                found: 0,
            });
        }

        let r2c = self.planner.plan_fft_forward(fft_size);

        // Copy signal to input buffer with zero-padding
        self.input_buffer.resize(fft_size, 0.0);
        let copy_len = signal.len().min(fft_size);
        self.input_buffer[..copy_len].copy_from_slice(&signal[..copy_len]);
        self.input_buffer[copy_len..].fill(0.0);

        let mut output = r2c.make_output_vec();
        r2c.process(&mut self.input_buffer, &mut output)
            .map_err(|e| SpectralError::Transform(e.to_string()))?;

        Ok(output)
    }
}

/// Number of one-sided bins for a real FFT (fft_size/2 + 1)
pub fn num_bins(fft_size: usize) -> usize {
    fft_size / 2 + 1
}

/// Frequency of bin `k` in Hz
pub fn bin_frequency(bin: usize, fft_size: usize, fs: f64) -> f64 {
    bin as f64 * fs / fft_size as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_fft_dc_signal() {
        let mut fft = FftEngine::new();

        // DC signal (constant), zero-padded to 1024
        let signal = vec![1.0; 100];
        let spectrum = fft.forward(&signal, 1024).unwrap();

        assert_eq!(spectrum.len(), 513);
        assert!((spectrum[0].re - 100.0).abs() < 1e-9);
        assert!(spectrum[0].im.abs() < 1e-9);
    }

    #[test]
    fn test_fft_sine_wave() {
        let mut fft = FftEngine::new();

        // Sine wave exactly on bin 50
        let signal: Vec<f64> = (0..1000)
            .map(|n| (2.0 * PI * 50.0 * n as f64 / 1000.0).sin())
            .collect();

        let power: Vec<f64> = fft
            .forward(&signal, 1000)
            .unwrap()
            .iter()
            .map(|c| c.norm_sqr())
            .collect();
        let (peak_bin, &peak) = power
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .unwrap();

        assert_eq!(peak_bin, 50);
        // |X| = N/2 for a unit sine on a bin
        assert!((peak - 250_000.0).abs() < 1e-3);
    }

    #[test]
    fn test_odd_length_and_reuse() {
        let mut fft = FftEngine::new();
        assert_eq!(fft.forward(&[1.0; 7], 7).unwrap().len(), 4);
        assert_eq!(fft.forward(&[1.0; 16], 16).unwrap().len(), 9);
        assert!(fft.forward(&[], 0).is_err());
    }

    #[test]
    fn test_bin_helpers() {
        assert_eq!(num_bins(1024), 513);
        assert!((bin_frequency(512, 1024, 48000.0) - 24000.0).abs() < 1e-10);
    }
}
