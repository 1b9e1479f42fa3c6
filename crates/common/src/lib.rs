//! Shared types and small math glue used across the viewer crates.

pub mod transform;
pub mod types;

pub use transform::{
    deg_to_rad, fuzzy_is_null, normal_matrix, viewport_matrix, DEG_TO_RAD, FUZZY_EPSILON,
};
pub use types::{Velocity, ViewportSize};
