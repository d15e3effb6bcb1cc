use crate::graph::{topology, FunctionGraph, NodeId, ResolutionError};
use crate::metadata::{FunctionMetadata, MetadataSummary};
use serde::Serialize;

/// Serializable summary of a resolved model.
#[derive(Debug, Clone, Serialize)]
pub struct ModelReport {
    pub function: MetadataSummary,
    pub valid: bool,
    pub root: NodeId,
    pub nodes: Vec<NodeReport>,
    pub errors: Vec<ErrorReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeReport {
    pub id: NodeId,
    pub type_name: String,
    pub description: String,
    pub valid: bool,
    pub dependencies: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    pub node: NodeId,
    pub type_name: String,
    pub error: ResolutionError,
}

impl ModelReport {
    pub fn new(metadata: &FunctionMetadata, graph: &FunctionGraph) -> Self {
        let store = graph.store();
        let nodes = topology::build_order(store, graph.root())
            .into_iter()
            .map(|id| NodeReport {
                id,
                type_name: store.type_of(id).short_name(),
                description: store.kind(id).describe(store.type_of(id)),
                valid: store.is_valid(id),
                dependencies: store.dependencies(id).to_vec(),
            })
            .collect();

        Self {
            function: MetadataSummary::from(metadata),
            valid: graph.is_valid(),
            root: graph.root(),
            nodes,
            errors: error_reports(graph),
        }
    }
}

pub fn error_reports(graph: &FunctionGraph) -> Vec<ErrorReport> {
    let store = graph.store();
    graph
        .error_nodes()
        .into_iter()
        .filter_map(|node| {
            let error = store.kind(node).error()?.clone();
            Some(ErrorReport {
                node,
                type_name: store.type_of(node).short_name(),
                error,
            })
        })
        .collect()
}
