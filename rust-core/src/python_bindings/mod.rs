//! PyO3 bindings for Python integration

use pyo3::prelude::*;

mod spectrum_bindings;

/// Python module definition
#[pymodule]
fn cfd_spectra(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<spectrum_bindings::PySpectralEstimator>()?;
    m.add_class::<spectrum_bindings::PyMethod>()?;
    m.add_class::<spectrum_bindings::PyWindowType>()?;

    Ok(())
}
