use nalgebra::Vector3;
use tracing::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::TransformError;
use crate::field::{DerivativeKind, FieldId, FieldStore, NodeId};

/// Points closer than this to the far side of the plane still count as visible
pub const VISIBILITY_THRESHOLD: f64 = 0.1;

/// Plane through `point` with normal `normal` (not required to be unit length)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub point: Vector3<f64>,
}

impl Plane {
    pub fn new(normal: Vector3<f64>, point: Vector3<f64>) -> Self {
        Self { normal, point }
    }

    /// Plane equation value `x·n − p·n`; zero on the plane
    pub fn iso_scalar(&self, x: &Vector3<f64>) -> f64 {
        x.dot(&self.normal) - self.point.dot(&self.normal)
    }

    /// Visible when `(x − p)·n` is below [`VISIBILITY_THRESHOLD`]
    pub fn is_visible(&self, x: &Vector3<f64>) -> bool {
        (x - self.point).dot(&self.normal) < VISIBILITY_THRESHOLD
    }
}

/// Iso-scalar value at every node that has a value for `field`
pub fn evaluate_iso_scalar<S: FieldStore + ?Sized>(
    store: &S,
    field: FieldId,
    plane: &Plane,
    time: f64,
) -> Result<Vec<(NodeId, f64)>, TransformError> {
    Ok(sample_positions(store, field, time)?
        .into_iter()
        .map(|(node, x)| (node, plane.iso_scalar(&x)))
        .collect())
}

/// Visibility flag at every node that has a value for `field`
pub fn evaluate_visibility<S: FieldStore + ?Sized>(
    store: &S,
    field: FieldId,
    plane: &Plane,
    time: f64,
) -> Result<Vec<(NodeId, bool)>, TransformError> {
    Ok(sample_positions(store, field, time)?
        .into_iter()
        .map(|(node, x)| (node, plane.is_visible(&x)))
        .collect())
}

// 2-component coordinates lie in the z = 0 plane
fn sample_positions<S: FieldStore + ?Sized>(
    store: &S,
    field: FieldId,
    time: f64,
) -> Result<Vec<(NodeId, Vector3<f64>)>, TransformError> {
    let info = store
        .field_info(field)
        .ok_or(TransformError::UnknownField(field))?;
    if !matches!(info.components, 2 | 3) {
        return Err(TransformError::InvalidDimension(info.components));
    }
    if !info.is_nodal() {
        return Err(TransformError::NotANodalField(info.name));
    }

    let mut positions = Vec::new();
    for node in store.nodes() {
        if store.number_of_versions(field, node, DerivativeKind::Value) == 0 {
            continue;
        }
        match store.node_parameters(field, node, DerivativeKind::Value, 1, time) {
            Ok(values) if values.len() == info.components => {
                let z = values.get(2).copied().unwrap_or(0.0);
                positions.push((node, Vector3::new(values[0], values[1], z)));
            }
            Ok(values) => {
                warn!(node = %node, found = values.len(), "node value has wrong length");
            }
            Err(err) => {
                warn!(node = %node, error = %err, "failed to get node value");
            }
        }
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::MemoryFieldStore;

    fn z_plane() -> Plane {
        Plane::new(Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 0.0, 1.0))
    }

    #[test]
    fn test_iso_scalar_is_signed_distance_for_unit_normal() {
        let plane = z_plane();
        assert!((plane.iso_scalar(&Vector3::new(5.0, -3.0, 1.0))).abs() < 1e-12);
        assert!((plane.iso_scalar(&Vector3::new(0.0, 0.0, 3.0)) - 2.0).abs() < 1e-12);
        assert!((plane.iso_scalar(&Vector3::new(0.0, 0.0, 0.0)) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_iso_scalar_scales_with_normal() {
        let plane = Plane::new(Vector3::new(0.0, 0.0, 2.0), Vector3::zeros());
        assert!((plane.iso_scalar(&Vector3::new(0.0, 0.0, 1.5)) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_visibility_threshold() {
        let plane = z_plane();
        assert!(plane.is_visible(&Vector3::new(0.0, 0.0, 0.0)));
        assert!(plane.is_visible(&Vector3::new(0.0, 0.0, 1.05)));
        assert!(!plane.is_visible(&Vector3::new(0.0, 0.0, 1.1)));
        assert!(!plane.is_visible(&Vector3::new(0.0, 0.0, 2.0)));
    }

    #[test]
    fn test_evaluate_over_nodes() {
        let mut store = MemoryFieldStore::new();
        let field = store.create_finite_element_field().unwrap();
        let nodes = store
            .create_nodes(field, &[[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0, 2.0]])
            .unwrap();

        let iso = evaluate_iso_scalar(&store, field, &z_plane(), 0.0).unwrap();
        assert_eq!(iso.len(), 3);
        assert_eq!(iso[0].0, nodes[0]);
        assert!((iso[0].1 + 1.0).abs() < 1e-12);
        assert!(iso[1].1.abs() < 1e-12);
        assert!((iso[2].1 - 1.0).abs() < 1e-12);

        let visible = evaluate_visibility(&store, field, &z_plane(), 0.0).unwrap();
        assert_eq!(
            visible,
            vec![(nodes[0], true), (nodes[1], true), (nodes[2], false)]
        );
    }

    #[test]
    fn test_two_component_field_embedded_at_z_zero() {
        let mut store = MemoryFieldStore::new();
        let field = store.create_coordinate_field("xy", 2).unwrap();
        store.create_nodes(field, &[[1.0, 2.0]]).unwrap();

        let plane = Plane::new(Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.5, 0.0, 0.0));
        let iso = evaluate_iso_scalar(&store, field, &plane, 0.0).unwrap();
        assert!((iso[0].1 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_nodes_without_field_are_skipped() {
        let mut store = MemoryFieldStore::new();
        let a = store.create_finite_element_field().unwrap();
        let b = store.create_coordinate_field("other", 3).unwrap();
        store.create_nodes(a, &[[0.0, 0.0, 0.0]]).unwrap();
        let on_b = store.create_nodes(b, &[[0.0, 0.0, 5.0]]).unwrap();

        let iso = evaluate_iso_scalar(&store, b, &z_plane(), 0.0).unwrap();
        assert_eq!(iso.len(), 1);
        assert_eq!(iso[0].0, on_b[0]);
    }

    #[test]
    fn test_rejects_bad_fields() {
        let mut store = MemoryFieldStore::new();
        let scalar = store.create_coordinate_field("s", 1).unwrap();
        let derived = store.define_derived_field("d", 3);

        assert_eq!(
            evaluate_iso_scalar(&store, scalar, &z_plane(), 0.0),
            Err(TransformError::InvalidDimension(1))
        );
        assert_eq!(
            evaluate_visibility(&store, derived, &z_plane(), 0.0),
            Err(TransformError::NotANodalField("d".to_string()))
        );
        assert_eq!(
            evaluate_visibility(&store, FieldId(9), &z_plane(), 0.0),
            Err(TransformError::UnknownField(FieldId(9)))
        );
    }
}
