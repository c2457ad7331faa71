//! Time-series statistics for wall-pressure and probe signals

use super::check_ascending;
use crate::error::SpectralError;

/// Degrees-of-freedom convention for variance estimates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalization {
    /// Unbiased estimate (divide by n - 1)
    #[default]
    Sample,

    /// Population estimate (divide by n)
    Population,
}

impl Normalization {
    fn ddof(self) -> usize {
        match self {
            Normalization::Sample => 1,
            Normalization::Population => 0,
        }
    }
}

fn mean(x: &[f64]) -> f64 {
    x.iter().sum::<f64>() / x.len() as f64
}

/// Intermittency factor of a wall-pressure signal
///
/// Fraction of the time span during which the wall pressure exceeds
/// `mean(reference) + 3 * sigma`, where `reference` is the undisturbed
/// boundary-layer pressure and `sigma` its standard deviation. The
/// indicator function is integrated with the trapezoidal rule.
pub fn intermittency(
    sigma: f64,
    reference: &[f64],
    wall_pressure: &[f64],
    time: &[f64],
) -> Result<f64, SpectralError> {
    if reference.is_empty() {
        return Err(SpectralError::InsufficientSamples {
            required: 1,
            found: 0,
        });
    }
    if wall_pressure.len() != time.len() {
        return Err(SpectralError::LengthMismatch {
            left: wall_pressure.len(),
            right: time.len(),
        });
    }
    if time.len() < 2 {
        return Err(SpectralError::InsufficientSamples {
            required: 2,
            found: time.len(),
        });
    }
    check_ascending(time)?;

    let span = time[time.len() - 1] - time[0];
    if span <= 0.0 {
        return Err(SpectralError::InvalidInterval(span));
    }

    let threshold = mean(reference) + 3.0 * sigma;
    let indicator: Vec<f64> = wall_pressure
        .iter()
        .map(|&p| if p > threshold { 1.0 } else { 0.0 })
        .collect();

    let area: f64 = indicator
        .windows(2)
        .zip(time.windows(2))
        .map(|(s, t)| 0.5 * (s[0] + s[1]) * (t[1] - t[0]))
        .sum();

    Ok(area / span)
}

/// Skewness (third standardized moment, population deviation)
///
/// A constant signal has zero deviation and yields NaN.
pub fn skewness(x: &[f64]) -> Result<f64, SpectralError> {
    if x.len() < 2 {
        return Err(SpectralError::InsufficientSamples {
            required: 2,
            found: x.len(),
        });
    }
    let n = x.len() as f64;
    let m = mean(x);
    let var = x.iter().map(|&v| (v - m).powi(2)).sum::<f64>() / n;
    let third = x.iter().map(|&v| (v - m).powi(3)).sum::<f64>() / n;
    Ok(third / var.powf(1.5))
}

/// Pearson correlation coefficient of two equally long series
pub fn correlate(x: &[f64], y: &[f64], norm: Normalization) -> Result<f64, SpectralError> {
    if x.len() != y.len() {
        return Err(SpectralError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    let ddof = norm.ddof();
    if x.len() <= ddof + 1 {
        return Err(SpectralError::InsufficientSamples {
            required: ddof + 2,
            found: x.len(),
        });
    }

    let denom = (x.len() - ddof) as f64;
    let (mx, my) = (mean(x), mean(y));
    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (&a, &b) in x.iter().zip(y) {
        let (da, db) = (a - mx, b - my);
        sxx += da * da;
        syy += db * db;
        sxy += da * db;
    }

    let sigma_x = (sxx / denom).sqrt();
    let sigma_y = (syy / denom).sqrt();
    Ok(sxy / denom / sigma_x / sigma_y)
}

/// Correlation of `x` and `y` with `y` lagged by `delay` time units
///
/// The lag is `floor(|delay| / dt)` samples. A positive delay pairs
/// `x[i]` with `y[i + lag]`, a negative one pairs `x[i + lag]` with `y[i]`.
pub fn delay_correlate(
    x: &[f64],
    y: &[f64],
    dt: f64,
    delay: f64,
    norm: Normalization,
) -> Result<f64, SpectralError> {
    if x.len() != y.len() {
        return Err(SpectralError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    if !(dt.is_finite() && dt > 0.0) {
        return Err(SpectralError::InvalidInterval(dt));
    }

    let lag = (delay.abs() / dt).floor() as usize;
    if lag == 0 {
        return correlate(x, y, norm);
    }
    if lag >= x.len() {
        return Err(SpectralError::InsufficientSamples {
            required: lag + 2,
            found: x.len(),
        });
    }

    let n = x.len();
    if delay < 0.0 {
        correlate(&x[lag..], &y[..n - lag], norm)
    } else {
        correlate(&x[..n - lag], &y[lag..], norm)
    }
}
