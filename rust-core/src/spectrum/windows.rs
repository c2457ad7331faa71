//! Window functions for segment-averaged spectral estimates

use std::f64::consts::PI;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowType {
    /// Hann window: w[n] = 0.5 - 0.5*cos(2πn/L)
    /// Default for Welch estimates
    #[default]
    Hann,

    /// Hamming window: w[n] = 0.54 - 0.46*cos(2πn/L)
    Hamming,

    /// Blackman window: w[n] = 0.42 - 0.5*cos(2πn/L) + 0.08*cos(4πn/L)
    Blackman,

    /// Rectangular window (no windowing)
    Rectangular,
}

impl WindowType {
    /// Parse a window name as accepted on the command line
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "hann" | "hanning" => Some(WindowType::Hann),
            "hamming" => Some(WindowType::Hamming),
            "blackman" => Some(WindowType::Blackman),
            "rectangular" | "boxcar" | "none" => Some(WindowType::Rectangular),
            _ => None,
        }
    }
}

/// Generate periodic window coefficients (L = M)
///
/// # Arguments
/// * `window_type` - Type of window function
/// * `length` - Number of samples (M)
///
/// # Returns
/// Vector of window coefficients w[n] for n = 0..M-1
pub fn generate_window(window_type: WindowType, length: usize) -> Vec<f64> {
    if length == 0 {
        return Vec::new();
    }
    if length == 1 {
        return vec![1.0];
    }

    let l = length as f64;

    (0..length)
        .map(|n| {
            let angle = 2.0 * PI * n as f64 / l;
            match window_type {
                WindowType::Hann => 0.5 - 0.5 * angle.cos(),
                WindowType::Hamming => 0.54 - 0.46 * angle.cos(),
                WindowType::Blackman => 0.42 - 0.5 * angle.cos() + 0.08 * (2.0 * angle).cos(),
                WindowType::Rectangular => 1.0,
            }
        })
        .collect()
}
