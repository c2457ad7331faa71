//! CFD Spectra - Spectral Analysis of Simulation Probe Data
//!
//! PSD, frequency-weighted PSD, cross-PSD and coherence of irregularly
//! sampled flow signals, with boundary-layer helpers and probe table I/O.
//! Python bindings are built with the `python` feature.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod error;
pub mod flow;
pub mod io;
pub mod signal;
pub mod spectrum;

#[cfg(feature = "python")]
pub mod python_bindings;

pub use error::{SpectralError, TableError};
pub use signal::{resample_to_uniform, AccuracyWarning, Outcome, Sampling, Signal, UniformSignal};
pub use spectrum::{
    coherence, cross_psd, frequency_weighted_psd, psd, CrossSpectralEstimate, EstimatorConfig,
    Method, SpectralEstimate, SpectralEstimator,
};
