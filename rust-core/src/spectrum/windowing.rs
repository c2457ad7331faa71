//! Segment preparation for windowed periodograms
//!
//! Detrends and windows a time-domain segment before its FFT

use super::windows::{generate_window, WindowType};

/// Per-segment trend removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Detrend {
    /// Leave the segment untouched
    None,

    /// Subtract the segment mean
    #[default]
    Constant,
}

/// Precomputed window with its power normalization
#[derive(Debug, Clone)]
pub struct SegmentWindow {
    coefficients: Vec<f64>,
    power_sum: f64,
}

impl SegmentWindow {
    /// Periodic window of the given length
    pub fn new(window_type: WindowType, length: usize) -> Self {
        let coefficients = generate_window(window_type, length);
        let power_sum = coefficients.iter().map(|&w| w * w).sum();
        Self {
            coefficients,
            power_sum,
        }
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Sum of squared coefficients (density scaling denominator)
    pub fn power_sum(&self) -> f64 {
        self.power_sum
    }

    /// Detrend `segment` and apply the window, writing into `out`
    ///
    /// `out` must be at least as long as the window; the tail beyond the
    /// window is zero-filled for FFT padding.
    pub fn prepare(&self, segment: &[f64], detrend: Detrend, out: &mut [f64]) {
        let len = self.coefficients.len().min(segment.len());
        let offset = match detrend {
            Detrend::None => 0.0,
            Detrend::Constant if len > 0 => segment[..len].iter().sum::<f64>() / len as f64,
            Detrend::Constant => 0.0,
        };

        for ((o, &s), &w) in out.iter_mut().zip(&segment[..len]).zip(&self.coefficients) {
            *o = (s - offset) * w;
        }
        out[len..].fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_constant_detrend() {
        let window = SegmentWindow::new(WindowType::Rectangular, 4);
        let mut out = vec![9.0; 6];
        window.prepare(&[1.0, 2.0, 3.0, 6.0], Detrend::Constant, &mut out);
        assert_eq!(out, vec![-2.0, -1.0, 0.0, 3.0, 0.0, 0.0]);
    }

    #[test]
    fn test_prepare_without_detrend() {
        let window = SegmentWindow::new(WindowType::Hann, 4);
        let mut out = vec![0.0; 4];
        window.prepare(&[2.0; 4], Detrend::None, &mut out);
        let expected = [0.0, 1.0, 2.0, 1.0];
        for (a, b) in out.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_power_sum() {
        let rect = SegmentWindow::new(WindowType::Rectangular, 100);
        let hann = SegmentWindow::new(WindowType::Hann, 100);

        assert!((rect.power_sum() - 100.0).abs() < 1e-12);
        // Periodic Hann has mean square 3/8
        assert!((hann.power_sum() - 37.5).abs() < 1e-9);
    }
}
