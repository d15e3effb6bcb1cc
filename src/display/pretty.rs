use crate::graph::{FunctionGraph, NodeId};
use crate::metadata::FunctionMetadata;
use std::fmt::Write;

/// Marks the lines of error nodes.
pub const ERROR_MARKER: &str = "->";
const NO_MARKER: &str = "  ";

/// Renders the graph as an indented tree, one line per node, parent before
/// children. Only error nodes themselves are marked, not their ancestors.
pub fn format_tree(metadata: &FunctionMetadata, graph: &FunctionGraph) -> String {
    let mut printer = TreePrinter {
        graph,
        output: String::new(),
    };
    let _ = writeln!(printer.output, "{}", metadata);
    printer.print_node(graph.root(), "", "");
    printer.output
}

struct TreePrinter<'a> {
    graph: &'a FunctionGraph,
    output: String,
}

impl<'a> TreePrinter<'a> {
    fn print_node(&mut self, node: NodeId, prefix: &str, label: &str) {
        let store = self.graph.store();
        let kind = store.kind(node);
        let marker = if kind.is_error() { ERROR_MARKER } else { NO_MARKER };
        let label = if label.is_empty() { String::new() } else { format!("{}: ", label) };
        let _ = writeln!(self.output, "{}{}{}{}", marker, prefix, label, kind.describe(store.type_of(node)));

        let children = store.dependencies(node);
        let labels = store.dependency_labels(node);
        let stem = child_stem(prefix);
        for (i, (&child, child_label)) in children.iter().zip(labels).enumerate() {
            let connector = if i == children.len() - 1 { "`-- " } else { "|-- " };
            self.print_node(child, &format!("{}{}", stem, connector), child_label);
        }
    }
}

fn child_stem(prefix: &str) -> String {
    prefix.replace("`-- ", "    ").replace("|-- ", "|   ")
}
