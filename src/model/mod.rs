//! `GraphModel`: a function's metadata paired with its resolved graph.

pub mod resolver;

pub use resolver::{resolve, Resolver};

use crate::build::engine::Instantiator;
use crate::build::{BuildFailure, ComponentMap, ConstructionContext};
use crate::catalog::{TypeKey, Value};
use crate::display::{dot, pretty, report, ErrorReport, ModelReport};
use crate::graph::{FunctionGraph, NodeId, NodeKind};
use crate::metadata::FunctionMetadata;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("function model for '{output}' is invalid ({} error node(s))", .errors.len())]
    InvalidModel { output: String, errors: Vec<ErrorReport> },
    #[error("root node produces '{root}' but the function is declared on '{declared}'")]
    RootTypeMismatch { declared: String, root: String },
    #[error("building '{output}' failed ({} node failure(s))", .failures.len())]
    BuildFailed { output: String, failures: Vec<BuildFailure> },
    #[error("receiver is a '{actual}', expected '{expected}'")]
    ReceiverType { expected: String, actual: String },
}

#[derive(Debug, Clone)]
pub struct GraphModel {
    metadata: FunctionMetadata,
    graph: FunctionGraph,
}

impl GraphModel {
    /// Pairs `metadata` with a graph resolved for its declaring type.
    pub fn new(metadata: FunctionMetadata, graph: FunctionGraph) -> Result<Self, ModelError> {
        let root = graph.store().type_of(graph.root());
        if root != metadata.declaring_type() {
            return Err(ModelError::RootTypeMismatch {
                declared: metadata.declaring_type().short_name(),
                root: root.short_name(),
            });
        }
        Ok(Self { metadata, graph })
    }

    pub fn metadata(&self) -> &FunctionMetadata { &self.metadata }
    pub fn graph(&self) -> &FunctionGraph { &self.graph }
    pub fn root(&self) -> NodeId { self.graph.root() }
    pub fn is_valid(&self) -> bool { self.graph.is_valid() }

    pub fn kind(&self, id: NodeId) -> &NodeKind { self.graph.store().kind(id) }
    pub fn dependencies(&self, id: NodeId) -> &[NodeId] { self.graph.store().dependencies(id) }
    pub fn node_type(&self, id: NodeId) -> TypeKey { self.graph.store().type_of(id) }

    /// Every error node reachable from the root.
    pub fn errors(&self) -> Vec<ErrorReport> {
        report::error_reports(&self.graph)
    }

    pub fn pretty_print(&self) -> String {
        pretty::format_tree(&self.metadata, &self.graph)
    }

    pub fn report(&self) -> ModelReport {
        ModelReport::new(&self.metadata, &self.graph)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.report())
    }

    pub fn to_dot(&self) -> String {
        dot::format_dot(&self.graph)
    }

    /// Instantiates the graph. Invalid models are rejected without building
    /// anything; otherwise node failures are collected in the result.
    pub fn build(&self, ctx: &mut ConstructionContext, components: &ComponentMap) -> Result<BuildResult, ModelError> {
        let output = self.metadata.output_name().to_string();
        if !self.is_valid() {
            let errors = self.errors();
            warn!(output = %output, errors = errors.len(), "refusing to build invalid function model");
            return Err(ModelError::InvalidModel { output, errors });
        }

        let receiver = Instantiator::new(&self.graph, components).run(ctx);
        let failures = ctx.take_failures();
        info!(output = %output, built = receiver.is_ok(), failures = failures.len(), "built function model");

        Ok(BuildResult {
            output,
            receiver: receiver.ok(),
            failures,
        })
    }
}

/// The outcome of [`GraphModel::build`].
#[derive(Debug, Clone)]
pub struct BuildResult {
    output: String,
    receiver: Option<Value>,
    failures: Vec<BuildFailure>,
}

impl BuildResult {
    pub fn is_success(&self) -> bool {
        self.receiver.is_some() && self.failures.is_empty()
    }

    pub fn receiver(&self) -> Option<&Value> {
        self.receiver.as_ref()
    }

    pub fn failures(&self) -> &[BuildFailure] {
        &self.failures
    }

    /// The built receiver as `T`.
    pub fn receiver_as<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, ModelError> {
        let receiver = self.receiver.as_ref().ok_or_else(|| ModelError::BuildFailed {
            output: self.output.clone(),
            failures: self.failures.clone(),
        })?;
        receiver.downcast::<T>().ok_or_else(|| ModelError::ReceiverType {
            expected: TypeKey::of::<T>().short_name(),
            actual: receiver.type_key().short_name(),
        })
    }

    pub fn into_receiver(self) -> Result<Value, ModelError> {
        let output = self.output;
        let failures = self.failures;
        self.receiver.ok_or(ModelError::BuildFailed { output, failures })
    }
}
