use super::storage::{NodeId, NodeStore};

/// Post-order DFS from `root`: every dependency appears before its consumer,
/// and a node reachable through several parents appears once.
///
/// The store is append-only with dependencies pushed first, so it cannot hold
/// a cycle.
pub fn build_order(store: &NodeStore, root: NodeId) -> Vec<NodeId> {
    let mut order = Vec::with_capacity(store.count());
    let mut state = vec![VisitState::None; store.count()];
    visit(root, store, &mut state, &mut order);
    order
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    None,
    Visited,
}

fn visit(node: NodeId, store: &NodeStore, state: &mut [VisitState], order: &mut Vec<NodeId>) {
    let idx = node.index();
    if state[idx] == VisitState::Visited {
        return;
    }
    state[idx] = VisitState::Visited;

    for &dep in store.dependencies(node) {
        visit(dep, store, state, order);
    }
    order.push(node);
}
