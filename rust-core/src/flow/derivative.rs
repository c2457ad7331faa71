//! Finite-difference derivatives on non-uniform grids

use crate::error::SpectralError;

/// First derivative dv/dx, second order in the interior
///
/// Interior points use the three-point formula for unequal spacing; the
/// two end points fall back to one-sided first-order differences.
pub fn second_order_derivative(x: &[f64], v: &[f64]) -> Result<Vec<f64>, SpectralError> {
    if x.len() != v.len() {
        return Err(SpectralError::LengthMismatch {
            left: x.len(),
            right: v.len(),
        });
    }
    let n = x.len();
    if n < 2 {
        return Err(SpectralError::InsufficientSamples {
            required: 2,
            found: n,
        });
    }

    let mut dv = vec![0.0; n];
    dv[0] = (v[1] - v[0]) / (x[1] - x[0]);
    dv[n - 1] = (v[n - 1] - v[n - 2]) / (x[n - 1] - x[n - 2]);

    for i in 1..n - 1 {
        let h1 = x[i] - x[i - 1];
        let h2 = x[i + 1] - x[i];
        dv[i] = -h2 / (h1 * (h1 + h2)) * v[i - 1]
            + (h2 - h1) / (h1 * h2) * v[i]
            + h1 / (h2 * (h1 + h2)) * v[i + 1];
    }

    Ok(dv)
}

/// Local growth rate (dv/dx) / v
pub fn growth_rate(x: &[f64], v: &[f64]) -> Result<Vec<f64>, SpectralError> {
    let dv = second_order_derivative(x, v)?;
    Ok(dv.iter().zip(v).map(|(d, val)| d / val).collect())
}
