//! Python bindings for spectral estimation

use crate::error::SpectralError;
use crate::signal::{Outcome, Signal};
use crate::spectrum::{CrossForm, EstimatorConfig, Method, SpectralEstimator, WindowType};
use numpy::{Complex64, PyArray1, PyReadonlyArray1};
use pyo3::exceptions::{PyUserWarning, PyValueError};
use pyo3::prelude::*;

impl From<SpectralError> for PyErr {
    fn from(err: SpectralError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// Estimation method exposed to Python
#[pyclass(name = "Method")]
#[derive(Clone, Copy)]
pub enum PyMethod {
    DirectFft,
    Welch,
}

impl From<PyMethod> for Method {
    fn from(method: PyMethod) -> Self {
        match method {
            PyMethod::DirectFft => Method::DirectFft,
            PyMethod::Welch => Method::Welch,
        }
    }
}

/// Welch window type exposed to Python
#[pyclass(name = "WindowType")]
#[derive(Clone, Copy)]
pub enum PyWindowType {
    Hann,
    Hamming,
    Blackman,
    Rectangular,
}

impl From<PyWindowType> for WindowType {
    fn from(window: PyWindowType) -> Self {
        match window {
            PyWindowType::Hann => WindowType::Hann,
            PyWindowType::Hamming => WindowType::Hamming,
            PyWindowType::Blackman => WindowType::Blackman,
            PyWindowType::Rectangular => WindowType::Rectangular,
        }
    }
}

fn slice<'a>(array: &'a PyReadonlyArray1<'_, f64>) -> PyResult<&'a [f64]> {
    array
        .as_slice()
        .map_err(|_| PyValueError::new_err("array must be contiguous"))
}

/// Either `dt` or `timestamps`, not both
fn signal<'a>(
    samples: &'a [f64],
    dt: Option<f64>,
    timestamps: Option<&'a [f64]>,
) -> PyResult<Signal<'a>> {
    match (dt, timestamps) {
        (Some(dt), None) => Ok(Signal::uniform(samples, dt)),
        (None, Some(t)) => Ok(Signal::timestamped(samples, t)),
        _ => Err(PyValueError::new_err(
            "pass exactly one of dt or timestamps",
        )),
    }
}

/// Raise accuracy warnings through Python's warnings machinery
fn take_value<T>(py: Python<'_>, outcome: Outcome<T>) -> PyResult<T> {
    let (value, warning) = outcome.into_parts();
    if let Some(warning) = warning {
        PyErr::warn(py, py.get_type::<PyUserWarning>(), &warning.to_string(), 1)?;
    }
    Ok(value)
}

/// Spectral estimator exposed to Python
#[pyclass(name = "SpectralEstimator")]
pub struct PySpectralEstimator {
    estimator: SpectralEstimator,
}

#[pymethods]
impl PySpectralEstimator {
    /// Create a new spectral estimator
    ///
    /// Args:
    ///     method: Method.DirectFft or Method.Welch
    ///     window: Window applied to Welch segments
    ///     segment_len: Welch segment length (default: per-operation share of N)
    ///     overlap: Welch segment overlap
    ///     unconjugated_cross: Use the raw X_a * X_b direct cross spectrum
    #[new]
    #[pyo3(signature = (method=PyMethod::DirectFft, window=PyWindowType::Hann, segment_len=None, overlap=None, unconjugated_cross=false))]
    fn new(
        method: PyMethod,
        window: PyWindowType,
        segment_len: Option<usize>,
        overlap: Option<usize>,
        unconjugated_cross: bool,
    ) -> Self {
        let mut config = EstimatorConfig::with_method(method.into());
        config.welch.window = window.into();
        config.welch.segment_len = segment_len;
        config.welch.overlap = overlap;
        if unconjugated_cross {
            config.cross_form = CrossForm::Unconjugated;
        }

        Self {
            estimator: SpectralEstimator::new(config),
        }
    }

    /// Power spectral density
    ///
    /// Args:
    ///     samples: Signal values as numpy array
    ///     target_fs: Analysis sampling frequency
    ///     dt: Uniform sampling interval
    ///     timestamps: Sample times, ascending
    ///
    /// Returns:
    ///     (frequency, power) numpy arrays
    #[pyo3(signature = (samples, target_fs, dt=None, timestamps=None))]
    fn psd<'py>(
        &mut self,
        py: Python<'py>,
        samples: PyReadonlyArray1<f64>,
        target_fs: f64,
        dt: Option<f64>,
        timestamps: Option<PyReadonlyArray1<f64>>,
    ) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>)> {
        let t = timestamps.as_ref().map(slice).transpose()?;
        let sig = signal(slice(&samples)?, dt, t)?;
        let estimate = take_value(py, self.estimator.psd(&sig, target_fs)?)?;

        Ok((
            PyArray1::from_vec(py, estimate.frequency),
            PyArray1::from_vec(py, estimate.power),
        ))
    }

    /// Frequency-weighted PSD, f * psd(f)
    #[pyo3(signature = (samples, target_fs, dt=None, timestamps=None))]
    fn fw_psd<'py>(
        &mut self,
        py: Python<'py>,
        samples: PyReadonlyArray1<f64>,
        target_fs: f64,
        dt: Option<f64>,
        timestamps: Option<PyReadonlyArray1<f64>>,
    ) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>)> {
        let t = timestamps.as_ref().map(slice).transpose()?;
        let sig = signal(slice(&samples)?, dt, t)?;
        let estimate =
            take_value(py, self.estimator.frequency_weighted_psd(&sig, target_fs)?)?;

        Ok((
            PyArray1::from_vec(py, estimate.frequency),
            PyArray1::from_vec(py, estimate.power),
        ))
    }

    /// Cross power spectral density of two signals on one time base
    ///
    /// Returns:
    ///     (frequency, complex cross spectrum) numpy arrays
    #[pyo3(signature = (a, b, target_fs, dt=None, timestamps=None))]
    fn cross_psd<'py>(
        &mut self,
        py: Python<'py>,
        a: PyReadonlyArray1<f64>,
        b: PyReadonlyArray1<f64>,
        target_fs: f64,
        dt: Option<f64>,
        timestamps: Option<PyReadonlyArray1<f64>>,
    ) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<Complex64>)> {
        let t = timestamps.as_ref().map(slice).transpose()?;
        let sa = signal(slice(&a)?, dt, t)?;
        let sb = signal(slice(&b)?, dt, t)?;
        let estimate = take_value(py, self.estimator.cross_psd(&sa, &sb, target_fs)?)?;

        Ok((
            PyArray1::from_vec(py, estimate.frequency),
            PyArray1::from_vec(py, estimate.value),
        ))
    }

    /// Magnitude-squared coherence of two signals on one time base
    #[pyo3(signature = (a, b, target_fs, dt=None, timestamps=None))]
    fn coherence<'py>(
        &mut self,
        py: Python<'py>,
        a: PyReadonlyArray1<f64>,
        b: PyReadonlyArray1<f64>,
        target_fs: f64,
        dt: Option<f64>,
        timestamps: Option<PyReadonlyArray1<f64>>,
    ) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>)> {
        let t = timestamps.as_ref().map(slice).transpose()?;
        let sa = signal(slice(&a)?, dt, t)?;
        let sb = signal(slice(&b)?, dt, t)?;
        let estimate = take_value(py, self.estimator.coherence(&sa, &sb, target_fs)?)?;

        Ok((
            PyArray1::from_vec(py, estimate.frequency),
            PyArray1::from_vec(py, estimate.power),
        ))
    }

    /// Switch the estimation method
    fn set_method(&mut self, method: PyMethod) {
        let mut config = *self.estimator.config();
        config.method = method.into();
        self.estimator.update_config(config);
    }
}
