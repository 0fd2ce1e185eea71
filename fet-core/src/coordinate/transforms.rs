use nalgebra::{DMatrix, DVector};
use tracing::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::TransformError;
use crate::field::{ChangeScope, CoordinateSystem, DerivativeKind, FieldId, FieldInfo, FieldStore};

/// Linear map plus translation applied to nodal coordinates
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "TransformSpec", into = "TransformSpec")
)]
pub struct AffineTransform {
    rotation_scale: DMatrix<f64>,
    offset: DVector<f64>,
}

/// Row-major matrix and offset, the shape transforms take in configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransformSpec {
    pub rotation_scale: Vec<Vec<f64>>,
    pub offset: Vec<f64>,
}

/// Counts from a completed transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransformSummary {
    pub nodes: usize,
    pub parameters: usize,
}

impl AffineTransform {
    /// Build from matrix rows and an offset; the row count fixes the dimension
    pub fn new<R: AsRef<[f64]>>(rotation_scale: &[R], offset: &[f64]) -> Result<Self, TransformError> {
        let ncomp = rotation_scale.len();
        check_dimension(ncomp)?;
        check_shape(ncomp, rotation_scale, offset)?;
        Ok(Self::from_rows(ncomp, rotation_scale, offset))
    }

    pub fn identity(ncomp: usize) -> Result<Self, TransformError> {
        check_dimension(ncomp)?;
        Ok(Self {
            rotation_scale: DMatrix::identity(ncomp, ncomp),
            offset: DVector::zeros(ncomp),
        })
    }

    /// Pure translation
    pub fn translation(offset: &[f64]) -> Result<Self, TransformError> {
        let ncomp = offset.len();
        check_dimension(ncomp)?;
        Ok(Self {
            rotation_scale: DMatrix::identity(ncomp, ncomp),
            offset: DVector::from_column_slice(offset),
        })
    }

    /// Counter-clockwise rotation about the z axis, angle in radians
    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            rotation_scale: DMatrix::from_row_slice(3, 3, &[c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0]),
            offset: DVector::zeros(3),
        }
    }

    /// Replace the offset, keeping the linear part
    pub fn with_offset(mut self, offset: &[f64]) -> Result<Self, TransformError> {
        if offset.len() != self.dimension() {
            return Err(TransformError::InvalidOffsetShape {
                expected: self.dimension(),
                found: offset.len(),
            });
        }
        self.offset = DVector::from_column_slice(offset);
        Ok(self)
    }

    pub fn dimension(&self) -> usize {
        self.offset.len()
    }

    pub fn rotation_scale(&self) -> &DMatrix<f64> {
        &self.rotation_scale
    }

    pub fn offset(&self) -> &DVector<f64> {
        &self.offset
    }

    /// Exact inverse: x = R⁻¹·x' − R⁻¹·t
    pub fn inverse(&self) -> Result<Self, TransformError> {
        let inv = self
            .rotation_scale
            .clone()
            .try_inverse()
            .ok_or(TransformError::SingularMatrix)?;
        let offset = -(&inv * &self.offset);
        Ok(Self {
            rotation_scale: inv,
            offset,
        })
    }

    /// Apply `self` first, then `next`
    pub fn then(&self, next: &AffineTransform) -> Result<Self, TransformError> {
        if next.dimension() != self.dimension() {
            return Err(TransformError::InvalidMatrixShape {
                expected: self.dimension(),
                rows: next.dimension(),
                columns: next.dimension(),
            });
        }
        Ok(Self {
            rotation_scale: &next.rotation_scale * &self.rotation_scale,
            offset: &next.rotation_scale * &self.offset + &next.offset,
        })
    }

    /// Transform one nodal parameter vector. Only values are translated;
    /// derivatives get the linear part alone. None if the length is wrong.
    pub fn apply(&self, kind: DerivativeKind, values: &[f64]) -> Option<Vec<f64>> {
        if values.len() != self.dimension() {
            return None;
        }
        let mut out = &self.rotation_scale * DVector::from_column_slice(values);
        if kind.is_value() {
            out += &self.offset;
        }
        Some(out.as_slice().to_vec())
    }

    fn from_rows<R: AsRef<[f64]>>(ncomp: usize, rows: &[R], offset: &[f64]) -> Self {
        Self {
            rotation_scale: DMatrix::from_fn(ncomp, ncomp, |i, j| rows[i].as_ref()[j]),
            offset: DVector::from_column_slice(offset),
        }
    }
}

impl TryFrom<TransformSpec> for AffineTransform {
    type Error = TransformError;

    fn try_from(spec: TransformSpec) -> Result<Self, TransformError> {
        AffineTransform::new(&spec.rotation_scale, &spec.offset)
    }
}

impl From<AffineTransform> for TransformSpec {
    fn from(transform: AffineTransform) -> Self {
        let n = transform.dimension();
        Self {
            rotation_scale: (0..n)
                .map(|i| (0..n).map(|j| transform.rotation_scale[(i, j)]).collect())
                .collect(),
            offset: transform.offset.as_slice().to_vec(),
        }
    }
}

/// Transform a coordinate field's nodal parameters in place.
///
/// The matrix must be `ncomp x ncomp` and the offset `ncomp` long, where
/// `ncomp` is the field's component count (2 or 3). Only nodal rectangular
/// cartesian fields are accepted. Every version of every derivative kind at
/// every node is multiplied by the matrix; values additionally get the
/// offset. Read/write failures don't stop the pass and are reported together
/// as [`TransformError::SomeValuesUnset`] at the end.
pub fn transform_coordinates<S, R>(
    store: &mut S,
    field: FieldId,
    rotation_scale: &[R],
    offset: &[f64],
    time: f64,
) -> Result<TransformSummary, TransformError>
where
    S: FieldStore + ?Sized,
    R: AsRef<[f64]>,
{
    let info = coordinate_field_info(store, field)?;
    let ncomp = info.components;
    if let Err(err) = check_shape(ncomp, rotation_scale, offset) {
        warn!(field = %field, error = %err, "rejected transform");
        return Err(err);
    }
    check_nodal_cartesian(field, &info)?;

    let transform = AffineTransform::from_rows(ncomp, rotation_scale, offset);
    apply_to_nodes(store, field, &transform, time)
}

/// Same as [`transform_coordinates`] with a prebuilt transform
pub fn transform_coordinates_with<S>(
    store: &mut S,
    field: FieldId,
    transform: &AffineTransform,
    time: f64,
) -> Result<TransformSummary, TransformError>
where
    S: FieldStore + ?Sized,
{
    let info = coordinate_field_info(store, field)?;
    if transform.dimension() != info.components {
        warn!(field = %field, "transform dimension does not match field");
        return Err(TransformError::InvalidMatrixShape {
            expected: info.components,
            rows: transform.dimension(),
            columns: transform.dimension(),
        });
    }
    check_nodal_cartesian(field, &info)?;

    apply_to_nodes(store, field, transform, time)
}

fn apply_to_nodes<S>(
    store: &mut S,
    field: FieldId,
    transform: &AffineTransform,
    time: f64,
) -> Result<TransformSummary, TransformError>
where
    S: FieldStore + ?Sized,
{
    let mut summary = TransformSummary::default();
    let mut failures = 0;

    let mut scope = ChangeScope::begin(store);
    for node in scope.nodes() {
        summary.nodes += 1;
        for kind in DerivativeKind::ALL {
            let versions = scope.number_of_versions(field, node, kind);
            for version in 1..=versions {
                let values = match scope.node_parameters(field, node, kind, version, time) {
                    Ok(values) => values,
                    Err(err) => {
                        warn!(node = %node, kind = kind.label(), version, error = %err, "failed to get nodal parameters");
                        failures += 1;
                        continue;
                    }
                };
                let Some(new_values) = transform.apply(kind, &values) else {
                    warn!(node = %node, kind = kind.label(), version, found = values.len(), "nodal parameters have wrong length");
                    failures += 1;
                    continue;
                };
                match scope.set_node_parameters(field, node, kind, version, time, &new_values) {
                    Ok(()) => summary.parameters += 1,
                    Err(err) => {
                        warn!(node = %node, kind = kind.label(), version, error = %err, "failed to set nodal parameters");
                        failures += 1;
                    }
                }
            }
        }
    }
    drop(scope);

    if failures > 0 {
        warn!(field = %field, failures, "failed to get/set some values");
        return Err(TransformError::SomeValuesUnset(failures));
    }
    debug!(field = %field, nodes = summary.nodes, parameters = summary.parameters, "transformed coordinates");
    Ok(summary)
}

fn coordinate_field_info<S: FieldStore + ?Sized>(
    store: &S,
    field: FieldId,
) -> Result<FieldInfo, TransformError> {
    let Some(info) = store.field_info(field) else {
        warn!(field = %field, "unknown field");
        return Err(TransformError::UnknownField(field));
    };
    if let Err(err) = check_dimension(info.components) {
        warn!(field = %field, components = info.components, "field has invalid number of components");
        return Err(err);
    }
    Ok(info)
}

fn check_nodal_cartesian(field: FieldId, info: &FieldInfo) -> Result<(), TransformError> {
    if info.coordinate_system != CoordinateSystem::RectangularCartesian {
        warn!(field = %field, system = ?info.coordinate_system, "field is not rectangular cartesian");
        return Err(TransformError::UnsupportedCoordinateSystem(info.coordinate_system));
    }
    if !info.is_nodal() {
        warn!(field = %field, "field is not finite element field type");
        return Err(TransformError::NotANodalField(info.name.clone()));
    }
    Ok(())
}

fn check_dimension(ncomp: usize) -> Result<(), TransformError> {
    match ncomp {
        2 | 3 => Ok(()),
        _ => Err(TransformError::InvalidDimension(ncomp)),
    }
}

fn check_shape<R: AsRef<[f64]>>(
    ncomp: usize,
    rows: &[R],
    offset: &[f64],
) -> Result<(), TransformError> {
    let bad_row = rows.iter().map(|r| r.as_ref().len()).find(|&len| len != ncomp);
    if rows.len() != ncomp || bad_row.is_some() {
        let columns = bad_row.unwrap_or(ncomp);
        return Err(TransformError::InvalidMatrixShape {
            expected: ncomp,
            rows: rows.len(),
            columns,
        });
    }
    if offset.len() != ncomp {
        return Err(TransformError::InvalidOffsetShape {
            expected: ncomp,
            found: offset.len(),
        });
    }
    Ok(())
}
