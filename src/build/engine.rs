//! Instantiates a resolved graph, dependencies first.
use super::components::ComponentMap;
use super::context::{BuildFailure, ConstructionContext, ConstructionError};
use crate::catalog::{Arguments, BoxError, TypeKey, Upcast, Value};
use crate::graph::{topology, FunctionGraph, NodeId, NodeKind};
use smallvec::SmallVec;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{trace, warn};

type DependencyValues = SmallVec<[Value; 4]>;

pub(crate) struct Instantiator<'a> {
    graph: &'a FunctionGraph,
    components: &'a ComponentMap,
}

impl<'a> Instantiator<'a> {
    pub fn new(graph: &'a FunctionGraph, components: &'a ComponentMap) -> Self {
        Self { graph, components }
    }

    /// Builds every node reachable from the root into `ctx` and returns the
    /// root's value. A failing node only stops the nodes that depend on it.
    pub fn run(&self, ctx: &mut ConstructionContext) -> Result<Value, ConstructionError> {
        let store = &self.graph.store;
        ctx.begin(store.count());

        for node in topology::build_order(store, self.graph.root) {
            let result = self.evaluate_node(node, ctx);
            match &result {
                Ok(_) => trace!(node = node.0, "built node"),
                // Only the originating failure is reported
                Err(ConstructionError::UpstreamFailed { .. }) => {}
                Err(error) => {
                    warn!(node = node.0, node_type = %store.type_of(node), %error, "node failed to build");
                    ctx.record_failure(BuildFailure {
                        node,
                        type_name: store.type_of(node).short_name(),
                        error: error.clone(),
                    });
                }
            }
            ctx.insert(node, result);
        }

        match ctx.get(self.graph.root) {
            Some(result) => result.clone(),
            None => Err(ConstructionError::Unresolved {
                type_name: store.type_of(self.graph.root).short_name(),
                message: "root was not visited".into(),
            }),
        }
    }

    fn evaluate_node(&self, node: NodeId, ctx: &ConstructionContext) -> Result<Value, ConstructionError> {
        let store = &self.graph.store;
        let ty = store.type_of(node);

        match store.kind(node) {
            NodeKind::Parameter { argument, .. } => Ok(argument.value().clone()),
            NodeKind::Infrastructure => self
                .components
                .get(ty)
                .cloned()
                .ok_or_else(|| ConstructionError::UnresolvedInfrastructure { type_name: ty.short_name() }),
            NodeKind::Class { implementation, constructor, cast } => {
                let values = self.dependency_values(node, ctx)?;
                let args = Arguments::new(constructor.parameters(), values.into_vec());
                let value = invoke(*implementation, || constructor.invoke(&args))?;
                apply_cast(value, ty, cast.as_ref())
            }
            NodeKind::Provider { provider, constructor, provide, cast, .. } => {
                let values = self.dependency_values(node, ctx)?;
                let args = Arguments::new(constructor.parameters(), values.into_vec());
                let instance = invoke(*provider, || constructor.invoke(&args))?;
                let product = invoke(*provider, || provide(&instance))?;
                apply_cast(product, ty, cast.as_ref())
            }
            NodeKind::Decorated { decoration, .. } => {
                let inner = self.dependency_values(node, ctx)?.into_iter().next().ok_or_else(|| {
                    ConstructionError::Unresolved {
                        type_name: ty.short_name(),
                        message: "decorated node has no inner node".into(),
                    }
                })?;
                invoke(ty, || decoration(inner))
            }
            NodeKind::Error { error, .. } => Err(ConstructionError::Unresolved {
                type_name: ty.short_name(),
                message: error.to_string(),
            }),
        }
    }

    fn dependency_values(&self, node: NodeId, ctx: &ConstructionContext) -> Result<DependencyValues, ConstructionError> {
        let store = &self.graph.store;
        store
            .dependencies(node)
            .iter()
            .map(|dep| match ctx.get(*dep) {
                Some(Ok(value)) => Ok(value.clone()),
                _ => Err(ConstructionError::UpstreamFailed {
                    type_name: store.type_of(node).short_name(),
                    dependency: store.type_of(*dep).short_name(),
                }),
            })
            .collect()
    }
}

/// Runs user code, turning both returned errors and panics into node failures.
fn invoke<F>(implementation: TypeKey, f: F) -> Result<Value, ConstructionError>
where
    F: FnOnce() -> Result<Value, BoxError>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(ConstructionError::Constructor {
            implementation: implementation.short_name(),
            message: error.to_string(),
        }),
        Err(payload) => Err(ConstructionError::Panicked {
            implementation: implementation.short_name(),
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn apply_cast(value: Value, ty: TypeKey, cast: Option<&Upcast>) -> Result<Value, ConstructionError> {
    if value.type_key() == ty {
        return Ok(value);
    }
    cast.and_then(|c| c(&value)).ok_or_else(|| ConstructionError::CastFailed {
        expected: ty.short_name(),
        actual: value.type_key().short_name(),
    })
}
