//! Coordinate field transformations and plane evaluation

pub mod plane;
mod transforms;

pub use plane::{evaluate_iso_scalar, evaluate_visibility, Plane, VISIBILITY_THRESHOLD};
pub use transforms::{
    transform_coordinates, transform_coordinates_with,
    AffineTransform, TransformSpec, TransformSummary,
};
