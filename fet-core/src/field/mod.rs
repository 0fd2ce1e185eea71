//! Geometric field store abstraction

mod derivative;
pub mod memory;

pub use derivative::DerivativeKind;
pub use memory::MemoryFieldStore;

use std::fmt;
use std::ops::{Deref, DerefMut};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Handle to a field owned by a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub usize);

/// Node identifier, unique within a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coordinate system a field's components are expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CoordinateSystem {
    #[default]
    RectangularCartesian,
    CylindricalPolar,
    SphericalPolar,
    ProlateSpheroidal,
    OblateSpheroidal,
    Fibre,
}

/// How a field obtains its values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Finite element field with parameters stored at nodes
    Nodal,
    /// Computed from other fields; has no parameters of its own
    Derived,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub name: String,
    pub components: usize,
    pub coordinate_system: CoordinateSystem,
    pub kind: FieldKind,
    pub is_coordinate: bool,
    pub managed: bool,
}

impl FieldInfo {
    /// Nodal rectangular cartesian coordinate field
    pub fn coordinates(name: &str, components: usize) -> Self {
        Self {
            name: name.to_string(),
            components,
            coordinate_system: CoordinateSystem::RectangularCartesian,
            kind: FieldKind::Nodal,
            is_coordinate: true,
            managed: true,
        }
    }

    pub fn derived(name: &str, components: usize) -> Self {
        Self {
            name: name.to_string(),
            components,
            coordinate_system: CoordinateSystem::RectangularCartesian,
            kind: FieldKind::Derived,
            is_coordinate: false,
            managed: true,
        }
    }

    pub fn with_coordinate_system(mut self, coordinate_system: CoordinateSystem) -> Self {
        self.coordinate_system = coordinate_system;
        self
    }

    pub fn is_nodal(&self) -> bool {
        self.kind == FieldKind::Nodal
    }
}

/// Capability interface over a finite element field store.
///
/// Versions are 1-indexed. `time` selects the sample for time-varying
/// parameters; stores without time variation may ignore it.
pub trait FieldStore {
    /// Describe a field, or None if the handle is unknown
    fn field_info(&self, field: FieldId) -> Option<FieldInfo>;

    /// All nodes in the store, each exactly once
    fn nodes(&self) -> Vec<NodeId>;

    /// Number of versions stored for a derivative kind; 0 if undefined
    fn number_of_versions(&self, field: FieldId, node: NodeId, kind: DerivativeKind) -> usize;

    fn node_parameters(
        &self,
        field: FieldId,
        node: NodeId,
        kind: DerivativeKind,
        version: usize,
        time: f64,
    ) -> Result<Vec<f64>, StoreError>;

    fn set_node_parameters(
        &mut self,
        field: FieldId,
        node: NodeId,
        kind: DerivativeKind,
        version: usize,
        time: f64,
        values: &[f64],
    ) -> Result<(), StoreError>;

    /// Defer dependent field updates until the matching `end_change`
    fn begin_change(&mut self);

    fn end_change(&mut self);
}

/// Batched change scope; ends the change when dropped
pub struct ChangeScope<'a, S: FieldStore + ?Sized> {
    store: &'a mut S,
}

impl<'a, S: FieldStore + ?Sized> ChangeScope<'a, S> {
    pub fn begin(store: &'a mut S) -> Self {
        store.begin_change();
        Self { store }
    }
}

impl<S: FieldStore + ?Sized> Deref for ChangeScope<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.store
    }
}

impl<S: FieldStore + ?Sized> DerefMut for ChangeScope<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.store
    }
}

impl<S: FieldStore + ?Sized> Drop for ChangeScope<'_, S> {
    fn drop(&mut self) {
        self.store.end_change();
    }
}
