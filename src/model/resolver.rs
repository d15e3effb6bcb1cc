use super::{GraphModel, ModelError};
use crate::build::{ComponentMap, ConstructionContext};
use crate::catalog::{Catalog, TypeKey};
use crate::config::{Configuration, ResolverSettings};
use crate::convert::ArgumentConverter;
use crate::graph::{FunctionGraph, GraphBuilder, IdentityDecorator, NodeDecorator};
use crate::metadata::FunctionMetadata;
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Resolves `metadata` under `config` with default settings.
pub fn resolve(
    catalog: &Catalog,
    metadata: FunctionMetadata,
    config: &Configuration,
    infrastructure: &HashSet<TypeKey>,
    node_decorator: &dyn NodeDecorator,
    converter: Option<&dyn ArgumentConverter>,
) -> GraphModel {
    let settings = ResolverSettings::default();
    let graph = GraphBuilder::new(catalog, infrastructure, node_decorator, converter, &settings)
        .resolve(metadata.declaring_type(), config);
    GraphModel { metadata, graph }
}

/// Shared resolution inputs: the catalog plus everything that stays fixed
/// across requests.
#[derive(Clone)]
pub struct Resolver {
    catalog: Arc<Catalog>,
    infrastructure: HashSet<TypeKey>,
    node_decorator: Arc<dyn NodeDecorator>,
    converter: Option<Arc<dyn ArgumentConverter>>,
    settings: ResolverSettings,
}

impl Resolver {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            infrastructure: HashSet::new(),
            node_decorator: Arc::new(IdentityDecorator),
            converter: None,
            settings: ResolverSettings::default(),
        }
    }

    pub fn with_infrastructure(mut self, types: HashSet<TypeKey>) -> Self {
        self.infrastructure = types;
        self
    }

    pub fn with_node_decorator(mut self, decorator: impl NodeDecorator + 'static) -> Self {
        self.node_decorator = Arc::new(decorator);
        self
    }

    pub fn with_converter(mut self, converter: impl ArgumentConverter + 'static) -> Self {
        self.converter = Some(Arc::new(converter));
        self
    }

    pub fn with_settings(mut self, settings: ResolverSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    pub fn resolve(&self, metadata: &FunctionMetadata, config: &Configuration) -> GraphModel {
        let graph = self.resolve_with(metadata.declaring_type(), config, &self.infrastructure);
        GraphModel {
            metadata: metadata.clone(),
            graph,
        }
    }

    pub fn resolve_graph(&self, target: TypeKey, config: &Configuration) -> FunctionGraph {
        self.resolve_with(target, config, &self.infrastructure)
    }

    /// Resolves independent requests in parallel; results keep request order.
    pub fn resolve_all(&self, requests: &[(FunctionMetadata, Configuration)]) -> Vec<GraphModel> {
        debug!(requests = requests.len(), "resolving function models");
        requests
            .par_iter()
            .map(|(metadata, config)| self.resolve(metadata, config))
            .collect()
    }

    /// Resolves `T` and builds it in one step. Types in `components` count as
    /// infrastructure in addition to the resolver's own.
    pub fn build_function<T: ?Sized + Send + Sync + 'static>(
        &self,
        config: &Configuration,
        components: &ComponentMap,
    ) -> Result<Arc<T>, ModelError> {
        let target = TypeKey::of::<T>();
        let mut infrastructure = self.infrastructure.clone();
        infrastructure.extend(components.component_types());

        let model = GraphModel {
            metadata: FunctionMetadata::for_type(target, "build", target.short_name()),
            graph: self.resolve_with(target, config, &infrastructure),
        };
        let result = model.build(&mut ConstructionContext::new(), components)?;
        result.receiver_as::<T>()
    }

    fn resolve_with(&self, target: TypeKey, config: &Configuration, infrastructure: &HashSet<TypeKey>) -> FunctionGraph {
        GraphBuilder::new(
            &self.catalog,
            infrastructure,
            self.node_decorator.as_ref(),
            self.converter.as_deref(),
            &self.settings,
        )
        .resolve(target, config)
    }
}
