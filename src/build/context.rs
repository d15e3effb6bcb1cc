use crate::catalog::Value;
use crate::graph::NodeId;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConstructionError {
    #[error("constructor of '{implementation}' failed: {message}")]
    Constructor { implementation: String, message: String },
    #[error("constructor of '{implementation}' panicked: {message}")]
    Panicked { implementation: String, message: String },
    #[error("infrastructure component '{type_name}' is not in the component map")]
    UnresolvedInfrastructure { type_name: String },
    #[error("'{type_name}' not built: dependency '{dependency}' failed")]
    UpstreamFailed { type_name: String, dependency: String },
    #[error("no argument named '{parameter}'")]
    MissingArgument { parameter: String },
    #[error("argument '{parameter}' is a '{actual}', expected '{expected}'")]
    ArgumentType { parameter: String, expected: String, actual: String },
    #[error("value of type '{actual}' cannot be used as '{expected}'")]
    CastFailed { expected: String, actual: String },
    #[error("'{type_name}' was not built: {message}")]
    Unresolved { type_name: String, message: String },
}

/// A node that failed to build, with the cause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildFailure {
    pub node: NodeId,
    pub type_name: String,
    pub error: ConstructionError,
}

/// Per-build ledger of node values. Each node is built at most once per build.
#[derive(Debug, Default)]
pub struct ConstructionContext {
    values: Vec<Option<Result<Value, ConstructionError>>>,
    failures: Vec<BuildFailure>,
}

impl ConstructionContext {
    pub fn new() -> Self { Self::default() }

    /// Clears state left by a previous build and sizes the ledger.
    pub(crate) fn begin(&mut self, size: usize) {
        self.values.clear();
        self.values.resize(size, None);
        self.failures.clear();
    }

    pub fn get(&self, node_id: NodeId) -> Option<&Result<Value, ConstructionError>> {
        self.values.get(node_id.index())?.as_ref()
    }

    pub fn is_built(&self, node_id: NodeId) -> bool {
        self.get(node_id).is_some()
    }

    pub fn insert(&mut self, node_id: NodeId, value: Result<Value, ConstructionError>) {
        let idx = node_id.index();
        if idx >= self.values.len() {
            self.values.resize(idx + 1, None);
        }
        self.values[idx] = Some(value);
    }

    pub(crate) fn record_failure(&mut self, failure: BuildFailure) {
        self.failures.push(failure);
    }

    pub fn failures(&self) -> &[BuildFailure] {
        &self.failures
    }

    pub fn take_failures(&mut self) -> Vec<BuildFailure> {
        std::mem::take(&mut self.failures)
    }
}
