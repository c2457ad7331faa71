//! Frequency-domain result types

use num_complex::Complex;

/// Real-valued spectrum: strictly increasing frequencies without 0 Hz
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpectralEstimate {
    /// Frequency axis in Hz
    pub frequency: Vec<f64>,

    /// Power (or coherence) per frequency
    pub power: Vec<f64>,
}

impl SpectralEstimate {
    pub fn len(&self) -> usize {
        self.frequency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }

    /// Frequency and value of the largest bin
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.power
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_nan())
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, &p)| (self.frequency[i], p))
    }

    /// Rectangle-rule integral of the power over the frequency axis
    pub fn band_power(&self) -> f64 {
        let df = match self.frequency.as_slice() {
            [] => return 0.0,
            [f] => *f,
            [f0, f1, ..] => f1 - f0,
        };
        self.power.iter().sum::<f64>() * df
    }

    /// Pointwise `power * frequency`
    pub fn frequency_weighted(self) -> Self {
        let power = self
            .power
            .iter()
            .zip(&self.frequency)
            .map(|(p, f)| p * f)
            .collect();
        Self {
            frequency: self.frequency,
            power,
        }
    }
}

/// Complex cross spectrum carrying phase
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CrossSpectralEstimate {
    /// Frequency axis in Hz
    pub frequency: Vec<f64>,

    /// Cross-spectral value per frequency
    pub value: Vec<Complex<f64>>,
}

impl CrossSpectralEstimate {
    pub fn len(&self) -> usize {
        self.frequency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }

    /// |S_ab| per frequency
    pub fn magnitude(&self) -> Vec<f64> {
        self.value.iter().map(|c| c.norm()).collect()
    }

    /// Phase of S_ab in radians
    pub fn phase(&self) -> Vec<f64> {
        self.value.iter().map(|c| c.arg()).collect()
    }
}
