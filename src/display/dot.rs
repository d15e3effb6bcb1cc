use crate::graph::{topology, FunctionGraph, NodeId};
use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Graphviz rendering of the nodes reachable from the root. Edges point from
/// a consumer to the node supplying its parameter, labelled with the parameter name.
pub fn format_dot(graph: &FunctionGraph) -> String {
    let store = graph.store();
    let mut dot: DiGraph<String, String> = DiGraph::new();
    let mut index: HashMap<NodeId, NodeIndex> = HashMap::new();

    let order = topology::build_order(store, graph.root());
    for &node in &order {
        let kind = store.kind(node);
        let description = kind.describe(store.type_of(node));
        let label = if kind.is_error() { format!("ERROR {}", description) } else { description };
        index.insert(node, dot.add_node(label));
    }
    for &node in &order {
        for (dep, label) in store.dependencies(node).iter().zip(store.dependency_labels(node)) {
            if let (Some(&from), Some(&to)) = (index.get(&node), index.get(dep)) {
                dot.add_edge(from, to, label.clone());
            }
        }
    }

    format!("{}", Dot::new(&dot)).replacen("digraph {", "digraph FunctionGraph {", 1)
}
