//! High-level spectral estimator
//!
//! Combines resampling, the FFT engine and Welch averaging into PSD,
//! frequency-weighted PSD, cross-PSD and coherence estimates.

use super::estimate::{CrossSpectralEstimate, SpectralEstimate};
use super::fft::FftEngine;
use super::welch::{
    welch_coherence, welch_csd, welch_psd, WelchConfig, CROSS_SEGMENTS, PSD_SEGMENTS,
};
use crate::error::SpectralError;
use crate::signal::{resample_to_uniform, Outcome, Sampling, Signal, UniformSignal};
use ndarray::Array1;
use num_complex::Complex;

/// Spectral estimation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// Single periodogram over the whole record
    #[default]
    DirectFft,

    /// Segment-averaged periodogram
    Welch,
}

/// Form of the direct-FFT cross spectrum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossForm {
    /// `conj(X_a) * X_b / (fs * N)`, consistent with the PSD scaling
    #[default]
    Conjugated,

    /// Raw `X_a * X_b` without conjugation or scaling, reproduces output
    /// of the older post-processing scripts
    Unconjugated,
}

/// Spectral estimator configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EstimatorConfig {
    /// Estimation method
    pub method: Method,

    /// Segmenting and windowing for [`Method::Welch`]
    pub welch: WelchConfig,

    /// Cross spectrum form for [`Method::DirectFft`]
    pub cross_form: CrossForm,
}

impl EstimatorConfig {
    pub fn with_method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }
}

/// Spectral estimator
///
/// Stateless apart from the FFT plan cache; every call is a pure function
/// of its inputs.
pub struct SpectralEstimator {
    config: EstimatorConfig,
    fft_engine: FftEngine,
}

impl Default for SpectralEstimator {
    fn default() -> Self {
        Self::new(EstimatorConfig::default())
    }
}

impl SpectralEstimator {
    /// Create new spectral estimator
    pub fn new(config: EstimatorConfig) -> Self {
        Self {
            config,
            fft_engine: FftEngine::new(),
        }
    }

    /// Get current configuration
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Update configuration
    pub fn update_config(&mut self, config: EstimatorConfig) {
        self.config = config;
    }

    /// Power spectral density of `signal` analysed at `target_fs`
    ///
    /// # Returns
    /// Frequencies (0 Hz excluded) and non-negative power, plus an
    /// accuracy warning when `target_fs` exceeds the data rate.
    pub fn psd(
        &mut self,
        signal: &Signal<'_>,
        target_fs: f64,
    ) -> Result<Outcome<SpectralEstimate>, SpectralError> {
        let method = self.config.method;
        resample_to_uniform(signal, target_fs)?.and_then(|x| self.uniform_psd(&x, method))
    }

    /// PSD multiplied pointwise by frequency
    pub fn frequency_weighted_psd(
        &mut self,
        signal: &Signal<'_>,
        target_fs: f64,
    ) -> Result<Outcome<SpectralEstimate>, SpectralError> {
        Ok(self.psd(signal, target_fs)?.map(SpectralEstimate::frequency_weighted))
    }

    /// Cross power spectral density of two signals on the same time base
    ///
    /// # Errors
    /// Different lengths or time bases are rejected before any computation.
    pub fn cross_psd(
        &mut self,
        a: &Signal<'_>,
        b: &Signal<'_>,
        target_fs: f64,
    ) -> Result<Outcome<CrossSpectralEstimate>, SpectralError> {
        let (xa, xb) = resample_pair(a, b, target_fs)?;
        let warning = xa.warning.or(xb.warning);
        let (xa, xb) = (xa.value, xb.value);
        let fs = xa.fs();

        let value = match self.config.method {
            Method::DirectFft => self.direct_cross(&xa, &xb, self.config.cross_form)?,
            Method::Welch => {
                let layout = self.config.welch.layout(xa.len(), CROSS_SEGMENTS)?;
                welch_csd(
                    &mut self.fft_engine,
                    xa.samples(),
                    xb.samples(),
                    fs,
                    layout,
                    &self.config.welch,
                )?
            }
        };

        Ok(Outcome { value, warning })
    }

    /// Magnitude-squared coherence of two signals on the same time base
    ///
    /// Values lie in [0, 1]; bins where an auto spectrum vanishes are 0.
    pub fn coherence(
        &mut self,
        a: &Signal<'_>,
        b: &Signal<'_>,
        target_fs: f64,
    ) -> Result<Outcome<SpectralEstimate>, SpectralError> {
        let (xa, xb) = resample_pair(a, b, target_fs)?;
        let warning = xa.warning.or(xb.warning);
        let (xa, xb) = (xa.value, xb.value);
        let fs = xa.fs();

        let value = match self.config.method {
            Method::DirectFft => {
                let cross = self.direct_cross(&xa, &xb, CrossForm::Conjugated)?;
                let pa = self.uniform_psd(&xa, Method::DirectFft)?;
                let pb = self.uniform_psd(&xb, Method::DirectFft)?;
                let power = cross
                    .value
                    .iter()
                    .zip(pa.power.iter().zip(&pb.power))
                    .map(|(c, (p1, p2))| {
                        let denom = p1 * p2;
                        if denom > 0.0 {
                            c.norm_sqr() / denom
                        } else {
                            0.0
                        }
                    })
                    .collect();
                SpectralEstimate {
                    frequency: cross.frequency,
                    power,
                }
            }
            Method::Welch => {
                let layout = self.config.welch.layout(xa.len(), CROSS_SEGMENTS)?;
                welch_coherence(
                    &mut self.fft_engine,
                    xa.samples(),
                    xb.samples(),
                    fs,
                    layout,
                    &self.config.welch,
                )?
            }
        };

        Ok(Outcome { value, warning })
    }

    fn uniform_psd(
        &mut self,
        x: &UniformSignal,
        method: Method,
    ) -> Result<SpectralEstimate, SpectralError> {
        let fs = x.fs();
        match method {
            Method::DirectFft => {
                let n = require_direct_len(x)?;
                let spectrum = self.fft_engine.forward(x.samples(), n)?;
                let scale = 1.0 / (fs * n as f64);
                let power: Vec<f64> = spectrum[1..].iter().map(|c| c.norm_sqr() * scale).collect();
                Ok(SpectralEstimate {
                    frequency: direct_frequencies(fs, n, power.len()),
                    power,
                })
            }
            Method::Welch => {
                let layout = self.config.welch.layout(x.len(), PSD_SEGMENTS)?;
                welch_psd(
                    &mut self.fft_engine,
                    x.samples(),
                    fs,
                    layout,
                    &self.config.welch,
                )
            }
        }
    }

    fn direct_cross(
        &mut self,
        xa: &UniformSignal,
        xb: &UniformSignal,
        form: CrossForm,
    ) -> Result<CrossSpectralEstimate, SpectralError> {
        let n = require_direct_len(xa)?;
        let fs = xa.fs();
        let sa = self.fft_engine.forward(xa.samples(), n)?;
        let sb = self.fft_engine.forward(xb.samples(), n)?;

        let value: Vec<Complex<f64>> = match form {
            CrossForm::Conjugated => {
                let scale = 1.0 / (fs * n as f64);
                sa[1..]
                    .iter()
                    .zip(&sb[1..])
                    .map(|(a, b)| a.conj() * b * scale)
                    .collect()
            }
            CrossForm::Unconjugated => sa[1..].iter().zip(&sb[1..]).map(|(a, b)| a * b).collect(),
        };

        Ok(CrossSpectralEstimate {
            frequency: direct_frequencies(fs, n, value.len()),
            value,
        })
    }
}

/// `linspace(fs/N, fs/2, bins)`, the direct-FFT axis without 0 Hz
fn direct_frequencies(fs: f64, n: usize, bins: usize) -> Vec<f64> {
    Array1::linspace(fs / n as f64, fs / 2.0, bins).to_vec()
}

fn require_direct_len(x: &UniformSignal) -> Result<usize, SpectralError> {
    if x.len() < 2 {
        return Err(SpectralError::InsufficientSamples {
            required: 2,
            found: x.len(),
        });
    }
    Ok(x.len())
}

fn same_time_base(a: Sampling<'_>, b: Sampling<'_>) -> bool {
    match (a, b) {
        (Sampling::Interval(da), Sampling::Interval(db)) => {
            (da - db).abs() <= 1e-12 * da.abs().max(db.abs())
        }
        (Sampling::Timestamps(ta), Sampling::Timestamps(tb)) => ta == tb,
        _ => false,
    }
}

fn resample_pair(
    a: &Signal<'_>,
    b: &Signal<'_>,
    target_fs: f64,
) -> Result<(Outcome<UniformSignal>, Outcome<UniformSignal>), SpectralError> {
    if a.len() != b.len() {
        return Err(SpectralError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    if !same_time_base(a.sampling(), b.sampling()) {
        return Err(SpectralError::SamplingMismatch);
    }
    Ok((resample_to_uniform(a, target_fs)?, resample_to_uniform(b, target_fs)?))
}

/// Power spectral density (see [`SpectralEstimator::psd`])
pub fn psd(
    signal: &Signal<'_>,
    target_fs: f64,
    method: Method,
) -> Result<Outcome<SpectralEstimate>, SpectralError> {
    SpectralEstimator::new(EstimatorConfig::with_method(method)).psd(signal, target_fs)
}

/// Frequency-weighted PSD `(f, f * psd(f))`
pub fn frequency_weighted_psd(
    signal: &Signal<'_>,
    target_fs: f64,
    method: Method,
) -> Result<Outcome<SpectralEstimate>, SpectralError> {
    SpectralEstimator::new(EstimatorConfig::with_method(method))
        .frequency_weighted_psd(signal, target_fs)
}

/// Cross power spectral density in the conjugated form
pub fn cross_psd(
    a: &Signal<'_>,
    b: &Signal<'_>,
    target_fs: f64,
    method: Method,
) -> Result<Outcome<CrossSpectralEstimate>, SpectralError> {
    SpectralEstimator::new(EstimatorConfig::with_method(method)).cross_psd(a, b, target_fs)
}

/// Magnitude-squared coherence
pub fn coherence(
    a: &Signal<'_>,
    b: &Signal<'_>,
    target_fs: f64,
    method: Method,
) -> Result<Outcome<SpectralEstimate>, SpectralError> {
    SpectralEstimator::new(EstimatorConfig::with_method(method)).coherence(a, b, target_fs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq_hz: f64, fs: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq_hz * i as f64 / fs).sin())
            .collect()
    }

    /// Deterministic broadband test signal
    fn noise(n: usize, seed: u64) -> Vec<f64> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                ((state >> 11) as f64 / (1u64 << 53) as f64) - 0.5
            })
            .collect()
    }

    #[test]
    fn test_direct_psd_peak() {
        let fs = 1000.0;
        let x = sine(100.0, fs, 2000);
        let outcome = psd(&Signal::uniform(&x, 1.0 / fs), fs, Method::DirectFft).unwrap();
        assert!(outcome.warning.is_none());

        let estimate = outcome.value;
        assert_eq!(estimate.len(), 1000);
        assert!((estimate.frequency[0] - 0.5).abs() < 1e-12);
        assert!((estimate.frequency[999] - 500.0).abs() < 1e-12);

        let (f_peak, p_peak) = estimate.peak().unwrap();
        assert!((f_peak - 100.0).abs() < 1e-9);
        // |X|^2 / (fs N) with |X| = N/2
        assert!((p_peak - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_frequency_axis_strictly_increasing() {
        let x = noise(777, 3);
        for method in [Method::DirectFft, Method::Welch] {
            let estimate = psd(&Signal::uniform(&x, 0.01), 100.0, method)
                .unwrap()
                .value;
            assert!(estimate.frequency[0] > 0.0);
            assert!(estimate.frequency.windows(2).all(|w| w[1] > w[0]));
            assert!(estimate.power.iter().all(|&p| p >= 0.0));
            assert_eq!(estimate.frequency.len(), estimate.power.len());
        }
    }

    #[test]
    fn test_frequency_weighted_identity() {
        let x = noise(512, 11);
        let signal = Signal::uniform(&x, 0.002);
        for method in [Method::DirectFft, Method::Welch] {
            let base = psd(&signal, 500.0, method).unwrap().value;
            let weighted = frequency_weighted_psd(&signal, 500.0, method).unwrap().value;
            assert_eq!(weighted.frequency, base.frequency);
            for ((w, p), f) in weighted.power.iter().zip(&base.power).zip(&base.frequency) {
                assert_eq!(*w, p * f);
            }
        }
    }

    #[test]
    fn test_cross_psd_length_mismatch() {
        let a = noise(100, 1);
        let b = noise(99, 2);
        for method in [Method::DirectFft, Method::Welch] {
            let err = cross_psd(
                &Signal::uniform(&a, 0.1),
                &Signal::uniform(&b, 0.1),
                10.0,
                method,
            )
            .unwrap_err();
            assert_eq!(err, SpectralError::LengthMismatch { left: 100, right: 99 });
        }
    }

    #[test]
    fn test_cross_psd_sampling_mismatch() {
        let a = noise(100, 1);
        let b = noise(100, 2);
        let err = cross_psd(
            &Signal::uniform(&a, 0.1),
            &Signal::uniform(&b, 0.2),
            5.0,
            Method::DirectFft,
        )
        .unwrap_err();
        assert_eq!(err, SpectralError::SamplingMismatch);
    }

    #[test]
    fn test_direct_cross_of_self_equals_psd() {
        let x = noise(256, 5);
        let signal = Signal::uniform(&x, 0.01);
        let auto = psd(&signal, 100.0, Method::DirectFft).unwrap().value;
        let cross = cross_psd(&signal, &signal, 100.0, Method::DirectFft).unwrap().value;

        assert_eq!(cross.frequency, auto.frequency);
        for (c, p) in cross.value.iter().zip(&auto.power) {
            assert!((c.re - p).abs() < 1e-12 * p.max(1.0));
            assert!(c.im.abs() < 1e-12);
        }
    }

    #[test]
    fn test_unconjugated_cross_form() {
        // Quarter-period shift: conjugated form keeps the phase, the legacy
        // product does not
        let fs = 64.0;
        let a = sine(4.0, fs, 64);
        let b: Vec<f64> = (0..64)
            .map(|i| (2.0 * PI * 4.0 * i as f64 / fs).cos())
            .collect();

        let mut conj = SpectralEstimator::default();
        let mut legacy = SpectralEstimator::new(EstimatorConfig {
            cross_form: CrossForm::Unconjugated,
            ..EstimatorConfig::default()
        });
        let sa = Signal::uniform(&a, 1.0 / fs);
        let sb = Signal::uniform(&b, 1.0 / fs);

        let c = conj.cross_psd(&sa, &sb, fs).unwrap().value;
        let l = legacy.cross_psd(&sa, &sb, fs).unwrap().value;

        // Bin 4 after dropping DC is index 3
        assert!((c.phase()[3] - PI / 2.0).abs() < 1e-9);
        assert!(l.value[3].norm() > 1.0);
        assert!((c.value[3].norm() - l.value[3].norm() / (fs * 64.0)).abs() < 1e-9);
    }

    #[test]
    fn test_self_coherence_is_one() {
        let x = noise(1200, 9);
        let signal = Signal::uniform(&x, 0.001);
        for method in [Method::DirectFft, Method::Welch] {
            let gamma = coherence(&signal, &signal, 1000.0, method).unwrap().value;
            assert!(!gamma.is_empty());
            for &g in &gamma.power {
                assert!((g - 1.0).abs() < 1e-9, "coherence {g} for {method:?}");
            }
        }
    }

    #[test]
    fn test_coherence_bounded_for_unrelated_signals() {
        let a = noise(1200, 21);
        let b = noise(1200, 42);
        let gamma = coherence(
            &Signal::uniform(&a, 0.001),
            &Signal::uniform(&b, 0.001),
            1000.0,
            Method::Welch,
        )
        .unwrap()
        .value;

        assert!(gamma.power.iter().all(|&g| (0.0..=1.0 + 1e-12).contains(&g)));
        let mean = gamma.power.iter().sum::<f64>() / gamma.len() as f64;
        assert!(mean < 0.5);
    }

    #[test]
    fn test_upsampling_request_warns() {
        let x = sine(1.0, 10.0, 100);
        let outcome = psd(&Signal::uniform(&x, 0.1), 20.0, Method::DirectFft).unwrap();
        assert!(outcome.warning.is_some());
        assert_eq!(outcome.value.len(), 50);
    }

    #[test]
    fn test_welch_needs_enough_samples() {
        let x = [1.0, 2.0, 3.0];
        assert!(matches!(
            psd(&Signal::uniform(&x, 1.0), 1.0, Method::Welch),
            Err(SpectralError::InsufficientSamples { .. })
        ));
    }
}
