//! Welch segment averaging
//!
//! Splits a uniform signal into overlapping segments, detrends and windows
//! each one, zero-pads to the FFT length and averages the one-sided
//! density-scaled (cross) periodograms.

use super::estimate::{CrossSpectralEstimate, SpectralEstimate};
use super::fft::{bin_frequency, num_bins, FftEngine};
use super::windowing::{Detrend, SegmentWindow};
use super::windows::WindowType;
use crate::error::SpectralError;
use num_complex::Complex;

/// Welch estimator options
///
/// Unset segment length and overlap fall back to the per-operation
/// defaults ([`AutoSegments`]).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WelchConfig {
    /// Samples per segment
    pub segment_len: Option<usize>,

    /// Samples shared by consecutive segments
    pub overlap: Option<usize>,

    /// Window applied to every segment
    pub window: WindowType,

    /// Trend removed from every segment
    pub detrend: Detrend,
}

/// Default segmentation as fractions of the signal length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoSegments {
    /// Segment length is `n / segment_divisor`
    pub segment_divisor: usize,

    /// Overlap is `segment_len / overlap_divisor`
    pub overlap_divisor: usize,
}

/// PSD: quarter-length segments, 50% overlap
pub const PSD_SEGMENTS: AutoSegments = AutoSegments {
    segment_divisor: 4,
    overlap_divisor: 2,
};

/// Cross spectra and coherence: sixth-length segments, 25% overlap
pub const CROSS_SEGMENTS: AutoSegments = AutoSegments {
    segment_divisor: 6,
    overlap_divisor: 4,
};

/// Resolved segmentation for a signal of known length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentLayout {
    pub segment_len: usize,
    pub overlap: usize,
    pub nfft: usize,
}

impl WelchConfig {
    /// Resolve the segmentation for `n` samples; the FFT length is `n`
    pub fn layout(&self, n: usize, auto: AutoSegments) -> Result<SegmentLayout, SpectralError> {
        let segment_len = self.segment_len.unwrap_or(n / auto.segment_divisor);
        if segment_len == 0 && self.segment_len.is_none() {
            return Err(SpectralError::InsufficientSamples {
                required: auto.segment_divisor,
                found: n,
            });
        }
        let overlap = self
            .overlap
            .unwrap_or(segment_len / auto.overlap_divisor);

        let layout = SegmentLayout {
            segment_len,
            overlap,
            nfft: n,
        };
        if segment_len == 0 || segment_len > n || overlap >= segment_len {
            return Err(SpectralError::InvalidSegment {
                segment_len,
                overlap,
                nfft: n,
            });
        }
        Ok(layout)
    }
}

impl SegmentLayout {
    /// Start index of every full segment
    pub fn starts(&self, n: usize) -> Vec<usize> {
        if n < self.segment_len {
            return Vec::new();
        }
        let step = self.segment_len - self.overlap;
        let count = (n - self.overlap) / step;
        (0..count).map(|k| k * step).collect()
    }
}

/// Shared segment loop state
struct Segmenter<'a> {
    engine: &'a mut FftEngine,
    layout: SegmentLayout,
    window: SegmentWindow,
    detrend: Detrend,
    buffer: Vec<f64>,
}

impl<'a> Segmenter<'a> {
    fn new(engine: &'a mut FftEngine, layout: SegmentLayout, config: &WelchConfig) -> Self {
        Self {
            engine,
            layout,
            window: SegmentWindow::new(config.window, layout.segment_len),
            detrend: config.detrend,
            buffer: vec![0.0; layout.nfft],
        }
    }

    fn spectrum(&mut self, x: &[f64], start: usize) -> Result<Vec<Complex<f64>>, SpectralError> {
        let segment = &x[start..start + self.layout.segment_len];
        self.window.prepare(segment, self.detrend, &mut self.buffer);
        self.engine.forward(&self.buffer, self.layout.nfft)
    }
}

/// One-sided density scale per bin: `1 / (fs * sum(w^2) * segments)`
///
/// Doubled everywhere except DC and (for even FFT lengths) Nyquist.
fn density_scales(nfft: usize, power_sum: f64, fs: f64, segments: usize) -> Vec<f64> {
    let base = 1.0 / (fs * power_sum * segments as f64);
    (0..num_bins(nfft))
        .map(|k| {
            if k == 0 || (nfft % 2 == 0 && k == nfft / 2) {
                base
            } else {
                2.0 * base
            }
        })
        .collect()
}

/// Bin frequencies without the zero bin
fn positive_frequencies(nfft: usize, fs: f64) -> Vec<f64> {
    (1..num_bins(nfft))
        .map(|k| bin_frequency(k, nfft, fs))
        .collect()
}

/// Welch power spectral density, zero-frequency bin dropped
pub fn welch_psd(
    engine: &mut FftEngine,
    x: &[f64],
    fs: f64,
    layout: SegmentLayout,
    config: &WelchConfig,
) -> Result<SpectralEstimate, SpectralError> {
    let starts = layout.starts(x.len());
    log::debug!(
        "welch: {} segments of {} samples (overlap {}, nfft {})",
        starts.len(),
        layout.segment_len,
        layout.overlap,
        layout.nfft
    );

    let mut seg = Segmenter::new(engine, layout, config);
    let mut accum = vec![0.0; num_bins(layout.nfft)];
    for &start in &starts {
        let spec = seg.spectrum(x, start)?;
        for (a, c) in accum.iter_mut().zip(&spec) {
            *a += c.norm_sqr();
        }
    }

    let scales = density_scales(layout.nfft, seg.window.power_sum(), fs, starts.len());
    Ok(SpectralEstimate {
        frequency: positive_frequencies(layout.nfft, fs),
        power: accum
            .iter()
            .zip(&scales)
            .skip(1)
            .map(|(a, s)| a * s)
            .collect(),
    })
}

/// Welch cross spectral density `conj(X) * Y`, zero-frequency bin dropped
pub fn welch_csd(
    engine: &mut FftEngine,
    x: &[f64],
    y: &[f64],
    fs: f64,
    layout: SegmentLayout,
    config: &WelchConfig,
) -> Result<CrossSpectralEstimate, SpectralError> {
    let accum = accumulate_cross(engine, x, y, layout, config)?;
    let scales = density_scales(layout.nfft, accum.power_sum, fs, accum.segments);

    Ok(CrossSpectralEstimate {
        frequency: positive_frequencies(layout.nfft, fs),
        value: accum
            .pxy
            .iter()
            .zip(&scales)
            .skip(1)
            .map(|(a, s)| *a * *s)
            .collect(),
    })
}

/// Welch magnitude-squared coherence `|Pxy|^2 / (Pxx * Pyy)`
///
/// All three spectra share one segmentation. Bins where either auto
/// spectrum vanishes report zero.
pub fn welch_coherence(
    engine: &mut FftEngine,
    x: &[f64],
    y: &[f64],
    fs: f64,
    layout: SegmentLayout,
    config: &WelchConfig,
) -> Result<SpectralEstimate, SpectralError> {
    let accum = accumulate_cross(engine, x, y, layout, config)?;

    // Scale factors cancel in the ratio
    let power = (1..accum.pxy.len())
        .map(|k| {
            let denom = accum.pxx[k] * accum.pyy[k];
            if denom > 0.0 {
                accum.pxy[k].norm_sqr() / denom
            } else {
                0.0
            }
        })
        .collect();

    Ok(SpectralEstimate {
        frequency: positive_frequencies(layout.nfft, fs),
        power,
    })
}

struct CrossAccumulator {
    pxx: Vec<f64>,
    pyy: Vec<f64>,
    pxy: Vec<Complex<f64>>,
    segments: usize,
    power_sum: f64,
}

fn accumulate_cross(
    engine: &mut FftEngine,
    x: &[f64],
    y: &[f64],
    layout: SegmentLayout,
    config: &WelchConfig,
) -> Result<CrossAccumulator, SpectralError> {
    if x.len() != y.len() {
        return Err(SpectralError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }

    let starts = layout.starts(x.len());
    log::debug!(
        "welch cross: {} segments of {} samples (overlap {}, nfft {})",
        starts.len(),
        layout.segment_len,
        layout.overlap,
        layout.nfft
    );

    let mut seg = Segmenter::new(engine, layout, config);
    let bins = num_bins(layout.nfft);
    let mut acc = CrossAccumulator {
        pxx: vec![0.0; bins],
        pyy: vec![0.0; bins],
        pxy: vec![Complex::new(0.0, 0.0); bins],
        segments: starts.len(),
        power_sum: seg.window.power_sum(),
    };

    for &start in &starts {
        let sx = seg.spectrum(x, start)?;
        let sy = seg.spectrum(y, start)?;
        for k in 0..bins {
            acc.pxx[k] += sx[k].norm_sqr();
            acc.pyy[k] += sy[k].norm_sqr();
            acc.pxy[k] += sx[k].conj() * sy[k];
        }
    }

    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_layout_defaults() {
        let config = WelchConfig::default();
        let psd = config.layout(1000, PSD_SEGMENTS).unwrap();
        assert_eq!((psd.segment_len, psd.overlap, psd.nfft), (250, 125, 1000));
        assert_eq!(psd.starts(1000).len(), 7);

        let cross = config.layout(1200, CROSS_SEGMENTS).unwrap();
        assert_eq!((cross.segment_len, cross.overlap), (200, 50));
    }

    #[test]
    fn test_layout_rejects_bad_overlap() {
        let config = WelchConfig {
            segment_len: Some(100),
            overlap: Some(100),
            ..WelchConfig::default()
        };
        assert!(matches!(
            config.layout(1000, PSD_SEGMENTS),
            Err(SpectralError::InvalidSegment { .. })
        ));

        assert!(matches!(
            WelchConfig::default().layout(3, PSD_SEGMENTS),
            Err(SpectralError::InsufficientSamples { .. })
        ));
    }

    #[test]
    fn test_welch_sine_peak_and_power() {
        let fs = 1000.0;
        let n = 4000;
        let signal: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * 125.0 * i as f64 / fs).sin())
            .collect();

        let config = WelchConfig::default();
        let layout = config.layout(n, PSD_SEGMENTS).unwrap();
        let mut engine = FftEngine::new();
        let estimate = welch_psd(&mut engine, &signal, fs, layout, &config).unwrap();

        assert_eq!(estimate.len(), n / 2);
        assert!(estimate.frequency[0] > 0.0);
        let (f_peak, _) = estimate.peak().unwrap();
        assert!((f_peak - 125.0).abs() < 0.5);

        // Unit sine carries variance 0.5
        assert!((estimate.band_power() - 0.5).abs() < 0.02);
        assert!(estimate.power.iter().all(|&p| p >= 0.0));
    }

    #[test]
    fn test_welch_csd_of_identical_signals_is_real() {
        let x: Vec<f64> = (0..600).map(|i| ((i * 37) % 17) as f64 - 8.0).collect();
        let config = WelchConfig::default();
        let layout = config.layout(x.len(), CROSS_SEGMENTS).unwrap();
        let mut engine = FftEngine::new();

        let cross = welch_csd(&mut engine, &x, &x, 1.0, layout, &config).unwrap();
        let auto = welch_psd(&mut engine, &x, 1.0, layout, &config).unwrap();
        for (c, p) in cross.value.iter().zip(&auto.power) {
            assert!(c.im.abs() < 1e-9);
            assert!((c.re - p).abs() < 1e-9 * p.abs().max(1.0));
        }
    }
}
