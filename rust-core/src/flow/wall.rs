//! Boundary-layer wall scaling
//!
//! All quantities are nondimensional. Profiles start at the wall: index 0
//! is the wall point and index 1 the first cell off the wall, which is
//! where wall shear, density and viscosity are sampled.

use crate::error::SpectralError;

/// Von Kármán constant of the standard log law
pub const KARMAN: f64 = 0.41;

/// Additive constant of the standard log law
pub const LOG_LAW_INTERCEPT: f64 = 5.2;

/// Velocity profile in wall units
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WallProfile {
    pub y_plus: Vec<f64>,
    pub u_plus: Vec<f64>,
}

/// Nondimensional dynamic viscosity from a power law, mu = T^0.75 / Re
pub fn viscosity(re_delta: f64, temperature: f64) -> f64 {
    temperature.powf(0.75) / re_delta
}

/// Skin-friction coefficient Cf = 2 mu du/dy
pub fn skin_friction(mu: f64, du: f64, dy: f64) -> f64 {
    2.0 * mu * du / dy
}

/// Reference laws of the wall
///
/// # Returns
/// Viscous sublayer `u+ = y+` over `y+ in [1, 15)` and log layer
/// `u+ = ln(y+)/0.41 + 5.2` over `y+ in [3, 1000)`, both with step 0.1.
pub fn standard_wall_law() -> (WallProfile, WallProfile) {
    let viscous_y = arange(1.0, 15.0, 0.1);
    let log_y = arange(3.0, 1000.0, 0.1);

    let viscous = WallProfile {
        u_plus: viscous_y.clone(),
        y_plus: viscous_y,
    };
    let log = WallProfile {
        u_plus: log_y
            .iter()
            .map(|&y| y.ln() / KARMAN + LOG_LAW_INTERCEPT)
            .collect(),
        y_plus: log_y,
    };

    (viscous, log)
}

/// Half-open range `[start, stop)` with a fixed step
fn arange(start: f64, stop: f64, step: f64) -> Vec<f64> {
    // Guard against (stop - start) / step landing just above an integer
    let count = ((stop - start) / step - 1e-9).ceil().max(0.0) as usize;
    (0..count).map(|i| start + i as f64 * step).collect()
}

fn check_profile(wall_dist: &[f64], u: &[f64], rho: &[f64], mu: &[f64]) -> Result<(), SpectralError> {
    let n = wall_dist.len();
    for other in [u.len(), rho.len(), mu.len()] {
        if other != n {
            return Err(SpectralError::LengthMismatch { left: n, right: other });
        }
    }
    if n < 2 {
        return Err(SpectralError::InsufficientSamples {
            required: 2,
            found: n,
        });
    }
    Ok(())
}

/// Friction velocity u_tau = sqrt(|tau_w / rho_w|)
///
/// The wall shear is taken from the first off-wall point:
/// `tau_w = mu[1] * u[1] / y[1]`.
pub fn friction_velocity(
    wall_dist: &[f64],
    u: &[f64],
    rho: &[f64],
    mu: &[f64],
) -> Result<f64, SpectralError> {
    check_profile(wall_dist, u, rho, mu)?;
    let tau_wall = mu[1] * u[1] / wall_dist[1];
    Ok((tau_wall / rho[1]).abs().sqrt())
}

/// Van Driest transformed velocity profile
///
/// `u+_vd = (1/u_tau) * integral(rho/rho_w du)` against
/// `y+ = u_tau * y * rho_w / mu_w`, for comparison with the
/// incompressible law of the wall.
///
/// # Errors
/// Wall distance must be ascending; all columns must have equal length.
pub fn van_driest(
    wall_dist: &[f64],
    u: &[f64],
    rho: &[f64],
    mu: &[f64],
) -> Result<WallProfile, SpectralError> {
    check_profile(wall_dist, u, rho, mu)?;
    if let Some(i) = wall_dist.windows(2).position(|w| w[1] < w[0]) {
        return Err(SpectralError::WallDistanceNotAscending { index: i + 1 });
    }

    let u_tau = friction_velocity(wall_dist, u, rho, mu)?;
    let (rho_wall, mu_wall) = (rho[1], mu[1]);

    let mut u_plus = Vec::with_capacity(u.len());
    let mut integral = 0.0;
    u_plus.push(0.0);
    for i in 1..u.len() {
        let ratio = 0.5 * (rho[i - 1] + rho[i]) / rho_wall;
        integral += ratio * (u[i] - u[i - 1]);
        u_plus.push(integral / u_tau);
    }

    let y_plus = wall_dist
        .iter()
        .map(|&y| u_tau * y * rho_wall / mu_wall)
        .collect();

    Ok(WallProfile { y_plus, u_plus })
}
