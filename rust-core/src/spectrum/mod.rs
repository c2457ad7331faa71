//! Spectral estimation with FFT

pub mod analysis;
pub mod estimate;
pub mod fft;
pub mod welch;
pub mod windowing;
pub mod windows;

pub use analysis::{
    coherence, cross_psd, frequency_weighted_psd, psd, CrossForm, EstimatorConfig, Method,
    SpectralEstimator,
};
pub use estimate::{CrossSpectralEstimate, SpectralEstimate};
pub use fft::FftEngine;
pub use welch::WelchConfig;
pub use windowing::Detrend;
pub use windows::WindowType;
