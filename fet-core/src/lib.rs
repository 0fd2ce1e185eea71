//! Helpers for finite element coordinate fields: field and node creation,
//! plane iso-scalar and visibility evaluation, and affine transformation of
//! nodal coordinates including their derivatives.

pub mod coordinate;
pub mod error;
pub mod field;

pub use coordinate::{
    transform_coordinates, transform_coordinates_with, AffineTransform, Plane, TransformSpec,
    TransformSummary,
};
pub use error::{FetError, Result, StoreError, TransformError};
pub use field::{
    ChangeScope, CoordinateSystem, DerivativeKind, FieldId, FieldInfo, FieldKind, FieldStore,
    MemoryFieldStore, NodeId,
};
