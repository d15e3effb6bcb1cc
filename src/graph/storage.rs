//! storage.rs
//! Dense columnar node arena. Dependencies are stored CSR-style, in
//! parameter declaration order.

use super::node::NodeKind;
use crate::catalog::TypeKey;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    kinds: Vec<NodeKind>,
    types: Vec<TypeKey>,
    valid: Vec<bool>,

    // Dependencies (CSR). `labels_flat` runs parallel to `deps_flat`.
    deps_flat: Vec<NodeId>,
    labels_flat: Vec<String>,
    deps_ranges: Vec<(u32, u32)>,
}

impl NodeStore {
    pub fn new() -> Self { Self::default() }
    pub fn count(&self) -> usize { self.kinds.len() }

    /// Appends a node. Every dependency must already be in the store, so
    /// validity is settled on insertion.
    pub fn push_node(&mut self, ty: TypeKey, kind: NodeKind, deps: &[(String, NodeId)]) -> NodeId {
        let id = NodeId::new(self.kinds.len());

        // 1. Validity: not an error, and every dependency valid
        let valid = !kind.is_error() && deps.iter().all(|(_, d)| self.valid[d.index()]);

        // 2. Dependencies (CSR append)
        let start = self.deps_flat.len() as u32;
        for (label, dep) in deps {
            self.deps_flat.push(*dep);
            self.labels_flat.push(label.clone());
        }
        self.deps_ranges.push((start, deps.len() as u32));

        // 3. Columns
        self.kinds.push(kind);
        self.types.push(ty);
        self.valid.push(valid);

        id
    }

    #[inline(always)]
    pub fn dependencies(&self, id: NodeId) -> &[NodeId] {
        let (start, count) = self.deps_ranges[id.index()];
        &self.deps_flat[start as usize..(start + count) as usize]
    }

    /// Parameter names of each dependency edge; empty for unnamed edges.
    pub fn dependency_labels(&self, id: NodeId) -> &[String] {
        let (start, count) = self.deps_ranges[id.index()];
        &self.labels_flat[start as usize..(start + count) as usize]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind { &self.kinds[id.index()] }
    pub fn type_of(&self, id: NodeId) -> TypeKey { self.types[id.index()] }
    pub fn is_valid(&self, id: NodeId) -> bool { self.valid[id.index()] }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.count()).map(NodeId::new)
    }
}
