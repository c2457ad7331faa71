//! Boundary-layer diagnostics

pub mod derivative;
pub mod wall;

pub use derivative::{growth_rate, second_order_derivative};
pub use wall::{
    friction_velocity, skin_friction, standard_wall_law, van_driest, viscosity, WallProfile,
};
