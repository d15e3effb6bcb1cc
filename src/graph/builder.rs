//! Resolution of a target type into a node graph.
//!
//! Every defect becomes an error node in place, so one pass reports all of
//! them. Nodes for the same (type, configuration layer) are shared.

use super::error::ResolutionError;
use super::node::{ArgumentSource, NodeDecorator, NodeKind, NodeView};
use super::storage::{NodeId, NodeStore};
use super::FunctionGraph;
use crate::catalog::{
    Argument, Catalog, ComponentDescriptor, ConstructorDescriptor, ConstructorSelection, Parameter, TypeKey,
};
use crate::config::{Configuration, ResolverSettings};
use crate::convert::ArgumentConverter;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, trace, warn};

type Dependencies = SmallVec<[(String, NodeId); 4]>;

/// The parameter of a config-level decorator that receives the wrapped value.
struct Delegate {
    ty: TypeKey,
    layer: Configuration,
}

pub struct GraphBuilder<'a> {
    catalog: &'a Catalog,
    infrastructure: &'a HashSet<TypeKey>,
    node_decorator: &'a dyn NodeDecorator,
    converter: Option<&'a dyn ArgumentConverter>,
    settings: &'a ResolverSettings,

    store: NodeStore,
    shared: HashMap<(TypeKey, usize), NodeId>,
    resolving: Vec<(TypeKey, usize)>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(
        catalog: &'a Catalog,
        infrastructure: &'a HashSet<TypeKey>,
        node_decorator: &'a dyn NodeDecorator,
        converter: Option<&'a dyn ArgumentConverter>,
        settings: &'a ResolverSettings,
    ) -> Self {
        Self {
            catalog,
            infrastructure,
            node_decorator,
            converter,
            settings,
            store: NodeStore::new(),
            shared: HashMap::new(),
            resolving: Vec::new(),
        }
    }

    /// Resolves `target` under `config` and returns the finished graph.
    pub fn resolve(mut self, target: TypeKey, config: &Configuration) -> FunctionGraph {
        debug!(target = %target, "resolving function graph");
        let root = self.resolve_type(target, config);
        let valid = self.store.is_valid(root);
        debug!(target = %target, nodes = self.store.count(), valid, "resolved function graph");
        FunctionGraph { store: self.store, root }
    }

    fn resolve_type(&mut self, ty: TypeKey, config: &Configuration) -> NodeId {
        let key = (ty, config.layer_id());
        if self.settings.share_nodes {
            if let Some(&id) = self.shared.get(&key) {
                return id;
            }
        }

        if let Some(start) = self.resolving.iter().position(|k| *k == key) {
            let path: Vec<String> = self.resolving[start..]
                .iter()
                .map(|(t, _)| t.short_name())
                .chain(std::iter::once(ty.short_name()))
                .collect();
            let error = ResolutionError::CyclicDependency { path: path.join(" -> ") };
            return self.error(ty, error, None);
        }
        if self.resolving.len() >= self.settings.max_depth {
            let error = ResolutionError::DepthLimitExceeded {
                required: ty.short_name(),
                max_depth: self.settings.max_depth,
            };
            return self.error(ty, error, None);
        }

        self.resolving.push(key);
        let id = self.resolve_function(ty, config);
        self.resolving.pop();

        let id = self.apply_node_decorator(id);
        if self.settings.share_nodes {
            self.shared.insert(key, id);
        }
        id
    }

    fn resolve_function(&mut self, ty: TypeKey, config: &Configuration) -> NodeId {
        // 1. Config-level decorator: its delegate resolves one layer in
        if let Some((decorator, inner)) = config.decoration_for(ty) {
            let delegate = Delegate { ty, layer: inner.clone() };
            return self.resolve_implementation(ty, decorator, config, Some(delegate));
        }

        // 2. Explicit binding, else the type itself when registered
        let implementation = match config.implementation_for(ty) {
            Some(implementation) => implementation,
            None if self.catalog.contains(ty) => ty,
            None => {
                let error = ResolutionError::NoImplementation { required: ty.short_name() };
                return self.error(ty, error, None);
            }
        };
        self.resolve_implementation(ty, implementation, config, None)
    }

    fn resolve_implementation(
        &mut self,
        required: TypeKey,
        implementation: TypeKey,
        config: &Configuration,
        delegate: Option<Delegate>,
    ) -> NodeId {
        let catalog = self.catalog;
        let invalid = || ResolutionError::InvalidImplementation {
            required: required.short_name(),
            implementation: implementation.short_name(),
        };

        let component = match catalog.get(implementation) {
            Some(component) => component,
            None => return self.error(required, invalid(), None),
        };

        if !component.implements(required) {
            // A binding may point at a provider of the required type
            let provides = component
                .provider()
                .map_or(false, |p| catalog.satisfies(p.product(), required));
            if provides {
                return self.resolve_provider(required, component, config);
            }
            return self.error(required, invalid(), None);
        }

        // 3. Constructor eligibility, falling back to a registered provider
        match component.select_constructor() {
            ConstructorSelection::Selected(constructor) => {
                let deps = self.resolve_parameters(implementation, &constructor, config, delegate);
                let cast = if implementation == required {
                    None
                } else {
                    component.upcast(required).cloned()
                };
                let kind = NodeKind::Class { implementation, constructor, cast };
                self.push(required, kind, &deps)
            }
            ConstructorSelection::NoneAccessible => match catalog.provider_for(implementation) {
                Some(provider) => self.resolve_provider(required, provider, config),
                None => self.ambiguous(required, implementation, 0),
            },
            ConstructorSelection::Ambiguous(candidates) => self.ambiguous(required, implementation, candidates),
        }
    }

    fn resolve_provider(&mut self, required: TypeKey, provider: &ComponentDescriptor, config: &Configuration) -> NodeId {
        let provider_type = provider.type_key();
        let descriptor = match provider.provider() {
            Some(descriptor) => descriptor.clone(),
            None => {
                let error = ResolutionError::InvalidImplementation {
                    required: required.short_name(),
                    implementation: provider_type.short_name(),
                };
                return self.error(required, error, None);
            }
        };

        match provider.select_constructor() {
            ConstructorSelection::Selected(constructor) => {
                let deps = self.resolve_parameters(provider_type, &constructor, config, None);
                let product = descriptor.product();
                let cast = if product == required {
                    None
                } else {
                    self.catalog.get(product).and_then(|c| c.upcast(required)).cloned()
                };
                let kind = NodeKind::Provider {
                    provider: provider_type,
                    product,
                    constructor,
                    provide: descriptor.provide_fn().clone(),
                    cast,
                };
                self.push(required, kind, &deps)
            }
            ConstructorSelection::NoneAccessible => self.ambiguous(required, provider_type, 0),
            ConstructorSelection::Ambiguous(candidates) => self.ambiguous(required, provider_type, candidates),
        }
    }

    fn resolve_parameters(
        &mut self,
        implementation: TypeKey,
        constructor: &Arc<ConstructorDescriptor>,
        config: &Configuration,
        mut delegate: Option<Delegate>,
    ) -> Dependencies {
        constructor
            .parameters()
            .iter()
            .map(|param| {
                let id = self.resolve_parameter(implementation, param, config, &mut delegate);
                (param.name().to_string(), id)
            })
            .collect()
    }

    /// 4. Parameter sources, highest precedence first.
    fn resolve_parameter(
        &mut self,
        implementation: TypeKey,
        param: &Parameter,
        config: &Configuration,
        delegate: &mut Option<Delegate>,
    ) -> NodeId {
        let ty = param.type_key();

        if let Some(argument) = config.argument(implementation, param.name()) {
            return self.resolve_argument(param, argument);
        }
        if self.infrastructure.contains(&ty) {
            return self.push(ty, NodeKind::Infrastructure, &[]);
        }
        if self.catalog.is_config_object(ty) {
            let error = ResolutionError::MissingConfig {
                parameter: param.name().to_string(),
                type_name: ty.short_name(),
            };
            return self.error(ty, error, None);
        }
        // Only the first parameter of the delegate type receives the wrapped value
        if delegate.as_ref().map_or(false, |d| d.ty == ty) {
            if let Some(d) = delegate.take() {
                return self.resolve_type(ty, &d.layer);
            }
        }
        if self.is_resolvable(ty, config) {
            return self.resolve_type(ty, config);
        }
        if let Some(default) = param.default_value() {
            let kind = NodeKind::Parameter {
                name: param.name().to_string(),
                argument: default.clone(),
                source: ArgumentSource::Default,
            };
            return self.push(ty, kind, &[]);
        }

        let error = ResolutionError::MissingArgument {
            parameter: param.name().to_string(),
            type_name: ty.short_name(),
        };
        self.error(ty, error, None)
    }

    fn resolve_argument(&mut self, param: &Parameter, argument: &Argument) -> NodeId {
        let ty = param.type_key();
        let name = param.name().to_string();

        if let Some(value) = self.catalog.upcast(argument.value(), ty) {
            let kind = NodeKind::Parameter {
                name,
                argument: Argument::from_value(value, argument.display()),
                source: ArgumentSource::Literal,
            };
            return self.push(ty, kind, &[]);
        }

        let converter = self.converter.filter(|c| c.is_convertible(ty));
        if let (Some(text), Some(converter)) = (argument.as_text(), converter) {
            return match converter.convert(ty, &text) {
                Ok(value) => {
                    let kind = NodeKind::Parameter {
                        name,
                        argument: Argument::from_value(value, argument.display()),
                        source: ArgumentSource::Converted,
                    };
                    self.push(ty, kind, &[])
                }
                Err(source) => {
                    let error = ResolutionError::ArgumentConversion {
                        parameter: name,
                        text: text.to_string(),
                        source,
                    };
                    self.error(ty, error, Some(argument.clone()))
                }
            };
        }

        let error = ResolutionError::IncompatibleArgumentType {
            parameter: name,
            expected: ty.short_name(),
            actual: argument.type_key().short_name(),
            display: argument.display().to_string(),
        };
        self.error(ty, error, Some(argument.clone()))
    }

    fn is_resolvable(&self, ty: TypeKey, config: &Configuration) -> bool {
        self.catalog.contains(ty) || config.implementation_for(ty).is_some() || config.decoration_for(ty).is_some()
    }

    /// 5. Global node decorator, applied to class and provider nodes only.
    fn apply_node_decorator(&mut self, id: NodeId) -> NodeId {
        let kind = self.store.kind(id);
        if !kind.is_function() {
            return id;
        }
        let ty = self.store.type_of(id);
        let view = NodeView { id, ty, kind };
        match self.node_decorator.decorate(view) {
            Some(decoration) => {
                let kind = NodeKind::Decorated {
                    label: decoration.label,
                    decoration: decoration.decorate,
                };
                self.push(ty, kind, &[(String::new(), id)])
            }
            None => id,
        }
    }

    fn ambiguous(&mut self, required: TypeKey, implementation: TypeKey, candidates: usize) -> NodeId {
        let error = ResolutionError::AmbiguousConstructor {
            implementation: implementation.short_name(),
            candidates,
        };
        self.error(required, error, None)
    }

    fn error(&mut self, ty: TypeKey, error: ResolutionError, argument: Option<Argument>) -> NodeId {
        warn!(node_type = %ty, %error, "unresolvable node");
        self.push(ty, NodeKind::Error { error, argument }, &[])
    }

    fn push(&mut self, ty: TypeKey, kind: NodeKind, deps: &[(String, NodeId)]) -> NodeId {
        let id = self.store.push_node(ty, kind, deps);
        trace!(node = id.0, node_type = %ty, valid = self.store.is_valid(id), "resolved node");
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{ConversionError, DefaultArgumentConverter};
    use crate::graph::IdentityDecorator;
    use crate::testing::{self, *};

    fn resolve_with(
        target: TypeKey,
        config: &Configuration,
        infrastructure: &HashSet<TypeKey>,
        converter: Option<&dyn ArgumentConverter>,
        settings: &ResolverSettings,
    ) -> FunctionGraph {
        let catalog = testing::catalog();
        GraphBuilder::new(&catalog, infrastructure, &IdentityDecorator, converter, settings).resolve(target, config)
    }

    fn resolve(target: TypeKey, config: &Configuration) -> FunctionGraph {
        resolve_with(target, config, &HashSet::new(), None, &ResolverSettings::default())
    }

    fn root_deps(graph: &FunctionGraph) -> Vec<&NodeKind> {
        graph.store.dependencies(graph.root).iter().map(|d| graph.store.kind(*d)).collect()
    }

    #[test]
    fn test_bound_implementation() {
        let config = Configuration::builder().implementation::<dyn TestFn, BasicImpl>().build();
        let graph = resolve(TypeKey::of::<dyn TestFn>(), &config);

        assert!(graph.is_valid());
        assert_eq!(graph.store.type_of(graph.root), TypeKey::of::<dyn TestFn>());
        match graph.store.kind(graph.root) {
            NodeKind::Class { implementation, cast, .. } => {
                assert_eq!(*implementation, TypeKey::of::<BasicImpl>());
                assert!(cast.is_some());
            }
            other => panic!("unexpected root {:?}", other),
        }
    }

    #[test]
    fn test_unbound_interface_has_no_implementation() {
        let graph = resolve(TypeKey::of::<dyn TestFn>(), &Configuration::empty());
        assert!(!graph.is_valid());
        assert!(matches!(
            graph.store.kind(graph.root).error(),
            Some(ResolutionError::NoImplementation { .. })
        ));
    }

    #[test]
    fn test_implementation_of_wrong_type_is_invalid() {
        let config = Configuration::builder().implementation::<dyn NumberFormat, BasicImpl>().build();
        let graph = resolve(TypeKey::of::<dyn NumberFormat>(), &config);
        assert!(matches!(
            graph.store.kind(graph.root).error(),
            Some(ResolutionError::InvalidImplementation { .. })
        ));

        let config = Configuration::builder().implementation::<dyn NumberFormat, Unregistered>().build();
        let graph = resolve(TypeKey::of::<dyn NumberFormat>(), &config);
        assert!(matches!(
            graph.store.kind(graph.root).error(),
            Some(ResolutionError::InvalidImplementation { implementation, .. }) if implementation == "Unregistered"
        ));
    }

    #[test]
    fn test_missing_and_incompatible_arguments() {
        let graph = resolve(TypeKey::of::<WithArg>(), &Configuration::empty());
        assert!(!graph.is_valid());
        assert!(matches!(root_deps(&graph)[0].error(), Some(ResolutionError::MissingArgument { .. })));

        let config = Configuration::builder()
            .argument::<WithArg>("arg", Argument::new(123_i32))
            .build();
        let graph = resolve(TypeKey::of::<WithArg>(), &config);
        match root_deps(&graph)[0] {
            NodeKind::Error { error: ResolutionError::IncompatibleArgumentType { actual, display, .. }, argument } => {
                assert_eq!(actual, "i32");
                assert_eq!(display, "123");
                assert!(argument.is_some());
            }
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_missing_config_object() {
        let graph = resolve(TypeKey::of::<UsesConfigArg>(), &Configuration::empty());
        assert!(!graph.is_valid());
        assert!(matches!(root_deps(&graph)[0].error(), Some(ResolutionError::MissingConfig { .. })));

        let config = Configuration::builder()
            .argument::<UsesConfigArg>("config_arg", Argument::new(ConfigArg))
            .build();
        assert!(resolve(TypeKey::of::<UsesConfigArg>(), &config).is_valid());
    }

    #[test]
    fn test_infrastructure_parameter() {
        let config = Configuration::builder().implementation::<dyn TestFn, InfrastructureImpl>().build();
        let infrastructure: HashSet<TypeKey> = [TypeKey::of::<String>()].into_iter().collect();

        let graph = resolve_with(TypeKey::of::<dyn TestFn>(), &config, &infrastructure, None, &ResolverSettings::default());
        assert!(graph.is_valid());
        assert!(matches!(root_deps(&graph)[0], NodeKind::Infrastructure));

        // declared nowhere
        assert!(!resolve(TypeKey::of::<dyn TestFn>(), &config).is_valid());
    }

    #[test]
    fn test_conversion_errors_keep_raw_text() {
        let config = Configuration::builder()
            .argument::<ConvertArgs>("integers", Argument::text("1, 2, A"))
            .argument::<ConvertArgs>("date", Argument::text("2011-03-08-foo"))
            .build();
        let converter = DefaultArgumentConverter::new();
        let graph = resolve_with(
            TypeKey::of::<ConvertArgs>(),
            &config,
            &HashSet::new(),
            Some(&converter),
            &ResolverSettings::default(),
        );

        assert!(!graph.is_valid());
        let texts: Vec<&str> = root_deps(&graph)
            .into_iter()
            .map(|kind| match kind.error() {
                Some(ResolutionError::ArgumentConversion { text, source: ConversionError::Invalid { .. }, .. }) => {
                    text.as_str()
                }
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(texts, vec!["1, 2, A", "2011-03-08-foo"]);
    }

    #[test]
    fn test_text_without_converter_is_incompatible() {
        let config = Configuration::builder()
            .argument::<ConvertArgs>("integers", Argument::text("1, 2, 3"))
            .argument::<ConvertArgs>("date", Argument::text("2011-03-08"))
            .build();
        let graph = resolve(TypeKey::of::<ConvertArgs>(), &config);
        assert!(root_deps(&graph)
            .iter()
            .all(|k| matches!(k.error(), Some(ResolutionError::IncompatibleArgumentType { .. }))));
    }

    #[test]
    fn test_constructor_rules() {
        let graph = resolve(TypeKey::of::<NoSuitableConstructor>(), &Configuration::empty());
        assert!(matches!(
            graph.store.kind(graph.root).error(),
            Some(ResolutionError::AmbiguousConstructor { candidates: 2, .. })
        ));

        // private constructor, registered provider found through the catalog
        let graph = resolve(TypeKey::of::<PrivateConstructor>(), &Configuration::empty());
        assert!(matches!(graph.store.kind(graph.root), NodeKind::Provider { .. }));
    }

    #[test]
    fn test_private_constructor_without_provider() {
        let catalog = Catalog::builder().register(testing::private_constructor()).build();
        let config = Configuration::builder()
            .argument::<PrivateConstructor>("name", Argument::text("the name"))
            .build();
        let graph = GraphBuilder::new(
            &catalog,
            &HashSet::new(),
            &IdentityDecorator,
            None,
            &ResolverSettings::default(),
        )
        .resolve(TypeKey::of::<PrivateConstructor>(), &config);

        assert!(!graph.is_valid());
        assert!(matches!(
            graph.store.kind(graph.root).error(),
            Some(ResolutionError::AmbiguousConstructor { candidates: 0, .. })
        ));
    }

    #[test]
    fn test_decorator_delegates_resolve_in_inner_layers() {
        let catalog = testing::catalog();
        let config = Configuration::builder()
            .implementation::<dyn NumberFormat, Plain>()
            .build()
            .decorated_with::<Increment>(&catalog)
            .unwrap()
            .decorated_with::<Doubling>(&catalog)
            .unwrap();
        let graph = resolve(TypeKey::of::<dyn NumberFormat>(), &config);
        assert!(graph.is_valid());

        let mut chain = Vec::new();
        let mut node = graph.root;
        loop {
            match graph.store.kind(node) {
                NodeKind::Class { implementation, .. } => chain.push(implementation.short_name()),
                other => panic!("unexpected {:?}", other),
            }
            match graph.store.dependencies(node).first() {
                Some(next) => node = *next,
                None => break,
            }
        }
        assert_eq!(chain, vec!["Doubling", "Increment", "Plain"]);
    }

    #[test]
    fn test_shared_nodes_and_idempotence() {
        let graph = resolve(TypeKey::of::<SharesConcrete>(), &Configuration::empty());
        let deps = graph.store.dependencies(graph.root);
        assert_eq!(deps[0], deps[1]);

        let settings = ResolverSettings { share_nodes: false, ..ResolverSettings::default() };
        let unshared = resolve_with(TypeKey::of::<SharesConcrete>(), &Configuration::empty(), &HashSet::new(), None, &settings);
        let deps = unshared.store.dependencies(unshared.root);
        assert_ne!(deps[0], deps[1]);

        let again = resolve(TypeKey::of::<SharesConcrete>(), &Configuration::empty());
        assert_eq!(graph.node_count(), again.node_count());
        assert_eq!(format!("{:?}", graph.store), format!("{:?}", again.store));
    }

    #[test]
    fn test_cycles_and_depth_are_reported() {
        let graph = resolve(TypeKey::of::<CycleA>(), &Configuration::empty());
        assert!(!graph.is_valid());
        let errors: Vec<_> = graph.error_nodes().into_iter().map(|id| graph.store.kind(id).error().cloned()).collect();
        assert_eq!(
            errors,
            vec![Some(ResolutionError::CyclicDependency { path: "CycleA -> CycleB -> CycleA".into() })]
        );

        let settings = ResolverSettings { max_depth: 1, ..ResolverSettings::default() };
        let config = Configuration::builder()
            .implementation::<dyn TestFn, CallsOtherFn>()
            .implementation::<dyn CollaboratorFn, Collaborator>()
            .build();
        let graph = resolve_with(TypeKey::of::<dyn TestFn>(), &config, &HashSet::new(), None, &settings);
        assert!(matches!(
            graph.store.kind(graph.store.dependencies(graph.root)[0]).error(),
            Some(ResolutionError::DepthLimitExceeded { max_depth: 1, .. })
        ));
    }
}
