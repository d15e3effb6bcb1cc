//! The resolved function graph: node arena, node variants and the resolution algorithm.
pub mod builder;
pub mod error;
pub mod node;
pub mod storage;
pub mod topology;

pub use builder::GraphBuilder;
pub use error::ResolutionError;
pub use node::{ArgumentSource, Decoration, IdentityDecorator, NodeDecorator, NodeKind, NodeView};
pub use storage::{NodeId, NodeStore};

/// A node arena with a designated root.
#[derive(Debug, Clone)]
pub struct FunctionGraph {
    pub(crate) store: NodeStore,
    pub(crate) root: NodeId,
}

impl FunctionGraph {
    pub fn root(&self) -> NodeId { self.root }
    pub fn store(&self) -> &NodeStore { &self.store }
    pub fn node_count(&self) -> usize { self.store.count() }
    pub fn is_valid(&self) -> bool { self.store.is_valid(self.root) }

    /// Error nodes reachable from the root, in build order.
    pub fn error_nodes(&self) -> Vec<NodeId> {
        topology::build_order(&self.store, self.root)
            .into_iter()
            .filter(|id| self.store.kind(*id).is_error())
            .collect()
    }
}
