//! Time-domain signal model, resampling and statistics

pub mod resample;
pub mod statistics;

pub use resample::{resample_to_uniform, UniformSignal};
pub use statistics::{correlate, delay_correlate, intermittency, skewness, Normalization};

use crate::error::SpectralError;
use std::fmt;

/// How the samples of a [`Signal`] are placed in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sampling<'a> {
    /// Uniform sampling interval in time units
    Interval(f64),

    /// Explicit, non-decreasing timestamps (one per sample)
    Timestamps(&'a [f64]),
}

/// A scalar time series borrowed from the caller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signal<'a> {
    samples: &'a [f64],
    sampling: Sampling<'a>,
}

impl<'a> Signal<'a> {
    /// Signal sampled every `dt` time units
    pub fn uniform(samples: &'a [f64], dt: f64) -> Self {
        Self {
            samples,
            sampling: Sampling::Interval(dt),
        }
    }

    /// Signal with one timestamp per sample
    pub fn timestamped(samples: &'a [f64], timestamps: &'a [f64]) -> Self {
        Self {
            samples,
            sampling: Sampling::Timestamps(timestamps),
        }
    }

    pub fn samples(&self) -> &'a [f64] {
        self.samples
    }

    pub fn sampling(&self) -> Sampling<'a> {
        self.sampling
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Check the structural invariants of the signal
    ///
    /// At least two samples, a positive finite interval, or timestamps of
    /// matching length in ascending order with a non-zero span.
    pub fn validate(&self) -> Result<(), SpectralError> {
        let n = self.samples.len();
        if n < 2 {
            return Err(SpectralError::InsufficientSamples {
                required: 2,
                found: n,
            });
        }

        match self.sampling {
            Sampling::Interval(dt) => {
                if !(dt.is_finite() && dt > 0.0) {
                    return Err(SpectralError::InvalidInterval(dt));
                }
            }
            Sampling::Timestamps(t) => {
                if t.len() != n {
                    return Err(SpectralError::LengthMismatch {
                        left: n,
                        right: t.len(),
                    });
                }
                check_ascending(t)?;
                let span = t[n - 1] - t[0];
                if span <= 0.0 {
                    return Err(SpectralError::InvalidInterval(span));
                }
            }
        }

        Ok(())
    }

    /// Sampling rate the data actually carries
    ///
    /// For timestamped signals this is the mean rate over the full span.
    /// Only meaningful on a validated signal.
    pub fn native_rate(&self) -> f64 {
        match self.sampling {
            Sampling::Interval(dt) => 1.0 / dt,
            Sampling::Timestamps(t) => {
                let n = t.len();
                (n - 1) as f64 / (t[n - 1] - t[0])
            }
        }
    }

    /// Time span covered by the samples
    pub fn span(&self) -> f64 {
        match self.sampling {
            Sampling::Interval(dt) => self.samples.len().saturating_sub(1) as f64 * dt,
            Sampling::Timestamps(t) => match (t.first(), t.last()) {
                (Some(first), Some(last)) => last - first,
                _ => 0.0,
            },
        }
    }
}

/// Fail on the first timestamp that is NaN or smaller than its predecessor
pub(crate) fn check_ascending(t: &[f64]) -> Result<(), SpectralError> {
    if let Some(index) = t.iter().position(|v| !v.is_finite()) {
        return Err(SpectralError::TimestampsNotAscending { index });
    }
    match t.windows(2).position(|w| w[1] < w[0]) {
        Some(i) => Err(SpectralError::TimestampsNotAscending { index: i + 1 }),
        None => Ok(()),
    }
}

/// Raised when the requested analysis frequency exceeds what the data supports
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccuracyWarning {
    /// Target sampling frequency requested by the caller
    pub requested_fs: f64,

    /// Sampling frequency the input actually provides
    pub native_fs: f64,
}

impl fmt::Display for AccuracyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PSD results are not accurate due to too few snapshots \
             (requested {} Hz, data provides {:.6} Hz)",
            self.requested_fs, self.native_fs
        )
    }
}

/// A computed value together with an optional accuracy warning
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub value: T,
    pub warning: Option<AccuracyWarning>,
}

impl<T> Outcome<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    pub fn warned(value: T, warning: AccuracyWarning) -> Self {
        Self {
            value,
            warning: Some(warning),
        }
    }

    /// Transform the value, keeping the warning
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            warning: self.warning,
        }
    }

    /// Transform the value with a fallible step, keeping the warning
    pub fn and_then<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Outcome<U>, E> {
        Ok(Outcome {
            value: f(self.value)?,
            warning: self.warning,
        })
    }

    pub fn into_parts(self) -> (T, Option<AccuracyWarning>) {
        (self.value, self.warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_short_signal() {
        let samples = [1.0];
        let err = Signal::uniform(&samples, 0.1).validate().unwrap_err();
        assert_eq!(
            err,
            SpectralError::InsufficientSamples {
                required: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_validate_rejects_bad_interval() {
        let samples = [1.0, 2.0, 3.0];
        assert!(matches!(
            Signal::uniform(&samples, 0.0).validate(),
            Err(SpectralError::InvalidInterval(_))
        ));
        assert!(matches!(
            Signal::uniform(&samples, f64::NAN).validate(),
            Err(SpectralError::InvalidInterval(_))
        ));
    }

    #[test]
    fn test_validate_timestamps() {
        let samples = [1.0, 2.0, 3.0, 4.0];

        let descending = [0.0, 0.2, 0.1, 0.3];
        assert_eq!(
            Signal::timestamped(&samples, &descending).validate(),
            Err(SpectralError::TimestampsNotAscending { index: 2 })
        );

        let short = [0.0, 0.1, 0.2];
        assert_eq!(
            Signal::timestamped(&samples, &short).validate(),
            Err(SpectralError::LengthMismatch { left: 4, right: 3 })
        );

        // Repeated timestamps are allowed as long as time moves forward overall
        let repeated = [0.0, 0.1, 0.1, 0.3];
        assert!(Signal::timestamped(&samples, &repeated).validate().is_ok());
    }

    #[test]
    fn test_native_rate() {
        let samples = [0.0; 11];
        assert!((Signal::uniform(&samples, 0.02).native_rate() - 50.0).abs() < 1e-9);

        let t: Vec<f64> = (0..11).map(|i| 2.0 + i as f64 * 0.1).collect();
        let signal = Signal::timestamped(&samples, &t);
        assert!((signal.native_rate() - 10.0).abs() < 1e-9);
        assert!((signal.span() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_outcome_map_keeps_warning() {
        let warning = AccuracyWarning {
            requested_fs: 100.0,
            native_fs: 50.0,
        };
        let outcome = Outcome::warned(2, warning).map(|v| v * 3);
        assert_eq!(outcome.value, 6);
        assert_eq!(outcome.warning, Some(warning));
        assert!(warning.to_string().contains("too few snapshots"));
    }
}
