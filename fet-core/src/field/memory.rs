use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use super::{ChangeScope, DerivativeKind, FieldId, FieldInfo, FieldStore, NodeId};
use crate::error::{FetError, Result, StoreError};

/// Name given to the default coordinate field
pub const DEFAULT_COORDINATE_FIELD: &str = "coordinates";

/// Versions of every derivative kind for one field at one node
#[derive(Debug, Clone, Default)]
struct NodeParameters {
    versions: [Vec<Vec<f64>>; DerivativeKind::COUNT],
}

/// In-process field store holding time-invariant nodal parameters.
///
/// Writes made outside a change scope notify immediately; writes made inside
/// one are reported as a single notification when the outermost scope ends.
#[derive(Debug, Default)]
pub struct MemoryFieldStore {
    fields: Vec<FieldInfo>,
    nodes: BTreeMap<NodeId, HashMap<FieldId, NodeParameters>>,
    change_depth: usize,
    pending_writes: usize,
    notifications: usize,
}

impl MemoryFieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field and return its handle
    pub fn define_field(&mut self, info: FieldInfo) -> FieldId {
        let id = FieldId(self.fields.len());
        debug!(field = %id, name = %info.name, components = info.components, "defined field");
        self.fields.push(info);
        id
    }

    /// Create the managed 3-component rectangular cartesian field `coordinates`
    pub fn create_finite_element_field(&mut self) -> Result<FieldId> {
        self.create_coordinate_field(DEFAULT_COORDINATE_FIELD, 3)
    }

    /// Create a nodal rectangular cartesian coordinate field
    pub fn create_coordinate_field(&mut self, name: &str, components: usize) -> Result<FieldId> {
        if name.is_empty() {
            return Err(FetError::InvalidInput("field name is empty".to_string()));
        }
        if components == 0 {
            return Err(FetError::InvalidInput(format!(
                "field '{}' must have at least one component",
                name
            )));
        }
        if self.field_by_name(name).is_some() {
            return Err(FetError::InvalidInput(format!("field '{}' already exists", name)));
        }

        let mut scope = ChangeScope::begin(self);
        Ok(scope.define_field(FieldInfo::coordinates(name, components)))
    }

    /// Register a computed field that has no nodal parameters
    pub fn define_derived_field(&mut self, name: &str, components: usize) -> FieldId {
        self.define_field(FieldInfo::derived(name, components))
    }

    pub fn field_by_name(&self, name: &str) -> Option<FieldId> {
        self.fields
            .iter()
            .position(|info| info.name == name)
            .map(FieldId)
    }

    /// Create one node per coordinate tuple, each with a single value version.
    ///
    /// Stops at the first tuple whose length does not match the field; nodes
    /// created before it are kept.
    pub fn create_nodes<C: AsRef<[f64]>>(
        &mut self,
        field: FieldId,
        coordinates: &[C],
    ) -> Result<Vec<NodeId>> {
        let info = self.nodal_field(field)?;
        let mut scope = ChangeScope::begin(self);
        let mut created = Vec::with_capacity(coordinates.len());

        for coordinate in coordinates {
            let values = coordinate.as_ref();
            if values.len() != info.components {
                return Err(StoreError::ComponentMismatch {
                    expected: info.components,
                    found: values.len(),
                }
                .into());
            }

            let node = scope.next_node_id();
            let mut parameters = NodeParameters::default();
            parameters.versions[DerivativeKind::Value.index()].push(values.to_vec());
            scope.nodes.entry(node).or_default().insert(field, parameters);
            scope.pending_writes += 1;
            created.push(node);
        }

        debug!(field = %field, count = created.len(), "created nodes");
        Ok(created)
    }

    /// Define `versions` zero-initialised versions of a derivative kind at a node,
    /// replacing any existing versions of that kind
    pub fn define_node_derivative(
        &mut self,
        node: NodeId,
        field: FieldId,
        kind: DerivativeKind,
        versions: usize,
    ) -> Result<()> {
        let info = self.nodal_field(field)?;
        let fields = self.nodes.get_mut(&node).ok_or(StoreError::UnknownNode(node))?;
        let parameters = fields.entry(field).or_default();
        parameters.versions[kind.index()] = vec![vec![0.0; info.components]; versions];

        self.pending_writes += 1;
        self.notify();
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_changing(&self) -> bool {
        self.change_depth > 0
    }

    /// Number of change notifications sent to dependents so far
    pub fn change_notifications(&self) -> usize {
        self.notifications
    }

    fn nodal_field(&self, field: FieldId) -> std::result::Result<FieldInfo, StoreError> {
        let info = self
            .fields
            .get(field.0)
            .ok_or(StoreError::UnknownField(field))?;
        if !info.is_nodal() {
            return Err(StoreError::NotNodal(field));
        }
        Ok(info.clone())
    }

    fn next_node_id(&self) -> NodeId {
        self.nodes
            .keys()
            .next_back()
            .map_or(NodeId(1), |last| NodeId(last.0 + 1))
    }

    fn parameters(
        &self,
        field: FieldId,
        node: NodeId,
    ) -> std::result::Result<&NodeParameters, StoreError> {
        self.nodes
            .get(&node)
            .ok_or(StoreError::UnknownNode(node))?
            .get(&field)
            .ok_or(StoreError::FieldNotDefined { field, node })
    }

    fn notify(&mut self) {
        if self.change_depth == 0 {
            self.notifications += 1;
            self.pending_writes = 0;
        }
    }
}

impl FieldStore for MemoryFieldStore {
    fn field_info(&self, field: FieldId) -> Option<FieldInfo> {
        self.fields.get(field.0).cloned()
    }

    fn nodes(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    fn number_of_versions(&self, field: FieldId, node: NodeId, kind: DerivativeKind) -> usize {
        self.parameters(field, node)
            .map_or(0, |p| p.versions[kind.index()].len())
    }

    fn node_parameters(
        &self,
        field: FieldId,
        node: NodeId,
        kind: DerivativeKind,
        version: usize,
        _time: f64,
    ) -> std::result::Result<Vec<f64>, StoreError> {
        let versions = &self.parameters(field, node)?.versions[kind.index()];
        version
            .checked_sub(1)
            .and_then(|i| versions.get(i))
            .cloned()
            .ok_or(StoreError::VersionOutOfRange {
                kind,
                version,
                available: versions.len(),
            })
    }

    fn set_node_parameters(
        &mut self,
        field: FieldId,
        node: NodeId,
        kind: DerivativeKind,
        version: usize,
        _time: f64,
        values: &[f64],
    ) -> std::result::Result<(), StoreError> {
        let components = self
            .fields
            .get(field.0)
            .ok_or(StoreError::UnknownField(field))?
            .components;
        if values.len() != components {
            return Err(StoreError::ComponentMismatch {
                expected: components,
                found: values.len(),
            });
        }

        let versions = &mut self
            .nodes
            .get_mut(&node)
            .ok_or(StoreError::UnknownNode(node))?
            .get_mut(&field)
            .ok_or(StoreError::FieldNotDefined { field, node })?
            .versions[kind.index()];
        let available = versions.len();
        let slot = version
            .checked_sub(1)
            .and_then(|i| versions.get_mut(i))
            .ok_or(StoreError::VersionOutOfRange {
                kind,
                version,
                available,
            })?;
        slot.copy_from_slice(values);

        self.pending_writes += 1;
        self.notify();
        Ok(())
    }

    fn begin_change(&mut self) {
        self.change_depth += 1;
    }

    fn end_change(&mut self) {
        if self.change_depth == 0 {
            return;
        }
        self.change_depth -= 1;
        if self.change_depth == 0 && self.pending_writes > 0 {
            self.notify();
        }
    }
}
