//! Uniform-rate resampling of scalar signals
//!
//! Every spectral estimate runs on a mean-removed signal on a uniform grid
//! at the requested analysis frequency. This module decides whether that
//! needs interpolation and performs it.

use super::{AccuracyWarning, Outcome, Sampling, Signal};
use crate::error::SpectralError;
use ndarray::Array1;

/// Relative tolerance when comparing sampling rates
///
/// `1.0 / dt` rarely reproduces the requested frequency bit for bit.
const RATE_TOLERANCE: f64 = 1e-9;

/// Largest grid, as a multiple of the input sample count
pub const MAX_GRID_FACTOR: usize = 1024;

/// Mean-removed signal on a uniform grid
#[derive(Debug, Clone, PartialEq)]
pub struct UniformSignal {
    samples: Vec<f64>,
    fs: f64,
}

impl UniformSignal {
    /// Samples spaced `1 / fs` apart
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Sampling frequency of the grid
    pub fn fs(&self) -> f64 {
        self.fs
    }

    /// Effective sample count used downstream
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Bring a signal onto a uniform grid at `target_fs`
///
/// # Policy
/// * `target_fs` above the native rate: the mean-removed samples are used
///   as they are and an [`AccuracyWarning`] is attached.
/// * `target_fs` equal to the native rate: mean removal only.
/// * `target_fs` below the native rate: linear interpolation of the
///   mean-removed samples onto `round(span * target_fs) + 1` points spanning
///   the original first to last sample time.
///
/// Timestamped signals are always interpolated onto the grid; they warn
/// when the grid needs more points than the input provides.
///
/// # Errors
/// Fails on an invalid signal or a non-positive `target_fs`. A rate
/// mismatch is never an error.
pub fn resample_to_uniform(
    signal: &Signal<'_>,
    target_fs: f64,
) -> Result<Outcome<UniformSignal>, SpectralError> {
    if !(target_fs.is_finite() && target_fs > 0.0) {
        return Err(SpectralError::InvalidSamplingRate(target_fs));
    }
    signal.validate()?;

    let native_fs = signal.native_rate();
    let centered = remove_mean(signal.samples());

    match signal.sampling() {
        Sampling::Interval(dt) => {
            if same_rate(target_fs, native_fs) {
                log::debug!("resample: native rate {native_fs} Hz, mean removal only");
                return Ok(Outcome::clean(UniformSignal {
                    samples: centered,
                    fs: target_fs,
                }));
            }

            if target_fs > native_fs {
                log::debug!(
                    "resample: {target_fs} Hz requested from {native_fs} Hz data, using samples as-is"
                );
                return Ok(Outcome::warned(
                    UniformSignal {
                        samples: centered,
                        fs: target_fs,
                    },
                    AccuracyWarning {
                        requested_fs: target_fs,
                        native_fs,
                    },
                ));
            }

            let times: Vec<f64> = (0..centered.len()).map(|i| i as f64 * dt).collect();
            let span = signal.span();
            let count = grid_count(span, target_fs, centered.len())?;
            let grid = Array1::linspace(0.0, span, count).to_vec();
            log::debug!(
                "resample: {} samples at {native_fs} Hz -> {} samples at {target_fs} Hz",
                centered.len(),
                grid.len()
            );

            Ok(Outcome::clean(UniformSignal {
                samples: interp(&grid, &times, &centered),
                fs: target_fs,
            }))
        }

        Sampling::Timestamps(t) => {
            let n = t.len();
            let span = signal.span();
            let count = grid_count(span, target_fs, n)?;
            let grid = Array1::linspace(t[0], t[n - 1], count).to_vec();
            log::debug!(
                "resample: {n} timestamped samples over {span} -> {count} samples at {target_fs} Hz"
            );

            let resampled = UniformSignal {
                samples: interp(&grid, t, &centered),
                fs: target_fs,
            };

            if count > n {
                Ok(Outcome::warned(
                    resampled,
                    AccuracyWarning {
                        requested_fs: target_fs,
                        native_fs,
                    },
                ))
            } else {
                Ok(Outcome::clean(resampled))
            }
        }
    }
}

fn same_rate(a: f64, b: f64) -> bool {
    (a - b).abs() <= RATE_TOLERANCE * a.abs().max(b.abs())
}

/// `round(span * fs) + 1`, bounded by `MAX_GRID_FACTOR * n`
fn grid_count(span: f64, fs: f64, n: usize) -> Result<usize, SpectralError> {
    let limit = n.saturating_mul(MAX_GRID_FACTOR);
    let intervals = (span * fs).round();
    if !intervals.is_finite() || intervals >= limit as f64 {
        return Err(SpectralError::GridTooLarge {
            requested_fs: fs,
            limit,
        });
    }
    (intervals as usize)
        .checked_add(1)
        .ok_or(SpectralError::GridTooLarge {
            requested_fs: fs,
            limit,
        })
}

/// Subtract the arithmetic mean
pub fn remove_mean(samples: &[f64]) -> Vec<f64> {
    if samples.is_empty() {
        return Vec::new();
    }
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    samples.iter().map(|&v| v - mean).collect()
}

/// Piecewise-linear interpolation of `(xp, fp)` at the points `x`
///
/// `xp` must be non-decreasing. Queries outside the range take the edge
/// value. With repeated abscissae the right-most sample wins.
pub fn interp(x: &[f64], xp: &[f64], fp: &[f64]) -> Vec<f64> {
    let n = xp.len().min(fp.len());
    if n == 0 {
        return vec![0.0; x.len()];
    }

    x.iter()
        .map(|&xq| {
            // First index with xp[i] > xq
            let i = xp[..n].partition_point(|&v| v <= xq);
            if i == 0 {
                fp[0]
            } else if i == n {
                fp[n - 1]
            } else {
                let (x0, x1) = (xp[i - 1], xp[i]);
                let (y0, y1) = (fp[i - 1], fp[i]);
                y0 + (y1 - y0) * (xq - x0) / (x1 - x0)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_native_rate_is_identity() {
        let samples: Vec<f64> = (0..64).map(|n| 3.0 + (0.3 * n as f64).sin()).collect();
        let signal = Signal::uniform(&samples, 0.001);

        let outcome = resample_to_uniform(&signal, 1000.0).unwrap();
        assert!(outcome.warning.is_none());

        let expected = remove_mean(&samples);
        assert_eq!(outcome.value.len(), samples.len());
        assert_eq!(outcome.value.samples(), expected.as_slice());
    }

    #[test]
    fn test_upsampling_warns_and_keeps_samples() {
        let samples: Vec<f64> = (0..32).map(|n| n as f64).collect();
        let signal = Signal::uniform(&samples, 0.1);

        let outcome = resample_to_uniform(&signal, 50.0).unwrap();
        let warning = outcome.warning.expect("expected accuracy warning");
        assert_eq!(warning.requested_fs, 50.0);
        assert!((warning.native_fs - 10.0).abs() < 1e-9);

        assert_eq!(outcome.value.len(), 32);
        assert_eq!(outcome.value.fs(), 50.0);
    }

    #[test]
    fn test_downsampling_interpolates() {
        // 1 s of a 2 Hz sine at 1000 Hz, reduced to 100 Hz
        let samples: Vec<f64> = (0..=1000)
            .map(|n| (2.0 * PI * 2.0 * n as f64 / 1000.0).sin())
            .collect();
        let signal = Signal::uniform(&samples, 0.001);

        let outcome = resample_to_uniform(&signal, 100.0).unwrap();
        assert!(outcome.warning.is_none());
        assert_eq!(outcome.value.len(), 101);

        // Grid points coincide with every tenth original sample
        let expected = remove_mean(&samples);
        for (k, &v) in outcome.value.samples().iter().enumerate() {
            assert!((v - expected[k * 10]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_timestamped_grid() {
        let t = [0.0, 0.1, 0.25, 0.3, 0.5];
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        let signal = Signal::timestamped(&v, &t);

        let outcome = resample_to_uniform(&signal, 4.0).unwrap();
        assert!(outcome.warning.is_none());
        // span 0.5 s at 4 Hz -> 3 points
        assert_eq!(outcome.value.len(), 3);

        let dense = resample_to_uniform(&signal, 100.0).unwrap();
        assert!(dense.warning.is_some());
        assert_eq!(dense.value.len(), 51);
    }

    #[test]
    fn test_invalid_target_rate() {
        let samples = [0.0, 1.0, 2.0];
        let signal = Signal::uniform(&samples, 0.1);
        assert_eq!(
            resample_to_uniform(&signal, 0.0),
            Err(SpectralError::InvalidSamplingRate(0.0))
        );
    }

    #[test]
    fn test_interp_edges_and_repeats() {
        let xp = [0.0, 1.0, 1.0, 2.0];
        let fp = [0.0, 1.0, 3.0, 5.0];
        let y = interp(&[-1.0, 0.5, 1.0, 1.5, 3.0], &xp, &fp);
        assert_eq!(y, vec![0.0, 0.5, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_excessive_rate_is_rejected() {
        let t = [0.0, 1.0, 2.0];
        let v = [1.0, 2.0, 3.0];
        let signal = Signal::timestamped(&v, &t);

        for fs in [1e300, f64::MAX, 1e9] {
            assert_eq!(
                resample_to_uniform(&signal, fs),
                Err(SpectralError::GridTooLarge {
                    requested_fs: fs,
                    limit: 3 * MAX_GRID_FACTOR,
                })
            );
        }

        // Inside the cap the grid is built and warned about
        let outcome = resample_to_uniform(&signal, 500.0).unwrap();
        assert!(outcome.warning.is_some());
        assert_eq!(outcome.value.len(), 1001);
    }

    #[test]
    fn test_grid_ends_on_last_timestamp() {
        let t = [0.5, 0.75, 1.5];
        let v = [0.0, 3.0, 6.0];
        let outcome = resample_to_uniform(&Signal::timestamped(&v, &t), 2.0).unwrap();
        // mean 3 removed, grid 0.5, 1.0, 1.5
        let samples = outcome.value.samples();
        assert_eq!(samples.len(), 3);
        assert!((samples[0] + 3.0).abs() < 1e-12);
        assert!((samples[1] - 1.0).abs() < 1e-12);
        assert!((samples[2] - 3.0).abs() < 1e-12);
    }
}
