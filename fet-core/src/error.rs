use thiserror::Error;

use crate::field::{CoordinateSystem, DerivativeKind, FieldId, NodeId};

/// Common errors across the field tools
#[derive(Error, Debug)]
pub enum FetError {
    #[error("Coordinate transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("Field store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("Field has invalid number of components: {0} (must be 2 or 3)")]
    InvalidDimension(usize),

    #[error("Invalid matrix shape: expected {expected}x{expected}, found {rows}x{columns}")]
    InvalidMatrixShape {
        expected: usize,
        rows: usize,
        columns: usize,
    },

    #[error("Invalid offset size: expected {expected}, found {found}")]
    InvalidOffsetShape { expected: usize, found: usize },

    #[error("Field is not rectangular cartesian: {0:?}")]
    UnsupportedCoordinateSystem(CoordinateSystem),

    #[error("Field '{0}' is not a nodal finite element field")]
    NotANodalField(String),

    #[error("Unknown field: {0}")]
    UnknownField(FieldId),

    #[error("Matrix is singular")]
    SingularMatrix,

    #[error("Failed to get/set {0} nodal parameter(s)")]
    SomeValuesUnset(usize),
}

impl TransformError {
    /// True if the error was raised before any parameter was touched
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, TransformError::SomeValuesUnset(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Unknown field: {0}")]
    UnknownField(FieldId),

    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("Field {field} is not defined at node {node}")]
    FieldNotDefined { field: FieldId, node: NodeId },

    #[error("Version {version} of {kind:?} is not defined (node has {available})")]
    VersionOutOfRange {
        kind: DerivativeKind,
        version: usize,
        available: usize,
    },

    #[error("Expected {expected} components, found {found}")]
    ComponentMismatch { expected: usize, found: usize },

    #[error("Field {0} has no nodal parameters")]
    NotNodal(FieldId),
}

pub type Result<T> = std::result::Result<T, FetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_error_display() {
        let err = TransformError::InvalidDimension(4);
        assert_eq!(
            err.to_string(),
            "Field has invalid number of components: 4 (must be 2 or 3)"
        );

        let err = TransformError::InvalidMatrixShape {
            expected: 3,
            rows: 2,
            columns: 2,
        };
        assert_eq!(err.to_string(), "Invalid matrix shape: expected 3x3, found 2x2");

        let err = TransformError::InvalidOffsetShape {
            expected: 3,
            found: 2,
        };
        assert_eq!(err.to_string(), "Invalid offset size: expected 3, found 2");

        let err = TransformError::SomeValuesUnset(2);
        assert_eq!(err.to_string(), "Failed to get/set 2 nodal parameter(s)");
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::ComponentMismatch {
            expected: 3,
            found: 2,
        };
        assert_eq!(err.to_string(), "Expected 3 components, found 2");

        let err = StoreError::UnknownNode(NodeId(7));
        assert_eq!(err.to_string(), "Unknown node: 7");
    }

    #[test]
    fn test_recoverable() {
        assert!(TransformError::InvalidDimension(1).is_recoverable());
        assert!(TransformError::NotANodalField("f".to_string()).is_recoverable());
        assert!(!TransformError::SomeValuesUnset(1).is_recoverable());
    }

    #[test]
    fn test_fet_error_from_transform_error() {
        let err: FetError = TransformError::SingularMatrix.into();
        assert!(matches!(err, FetError::Transform(_)));
    }

    #[test]
    fn test_fet_error_from_store_error() {
        let err: FetError = StoreError::UnknownField(FieldId(3)).into();
        assert!(matches!(err, FetError::Store(_)));
        assert_eq!(err.to_string(), "Field store error: Unknown field: 3");
    }

    #[test]
    fn test_fet_error_invalid_input() {
        let err = FetError::InvalidInput("empty name".to_string());
        assert_eq!(err.to_string(), "Invalid input: empty name");
    }
}
