//! Fixture components shared by the unit tests.

use crate::catalog::{Catalog, Component, Constructor, TypeKey};
use crate::graph::{Decoration, NodeDecorator, NodeView};
use crate::metadata::FunctionMetadata;
use chrono::NaiveDate;
use std::sync::Arc;

pub const INFRASTRUCTURE_COMPONENT: &str = "some pretend infrastructure";

pub trait TestFn: Send + Sync {
    fn foo(&self) -> Vec<String>;
}

pub fn metadata() -> FunctionMetadata {
    FunctionMetadata::new::<dyn TestFn>("foo", "Foo")
}

pub struct BasicImpl;

impl TestFn for BasicImpl {
    fn foo(&self) -> Vec<String> {
        vec!["foo".to_string()]
    }
}

pub struct InfrastructureImpl {
    pub infrastructure_component: Arc<String>,
}

impl TestFn for InfrastructureImpl {
    fn foo(&self) -> Vec<String> {
        vec![self.infrastructure_component.to_string()]
    }
}

pub trait CollaboratorFn: Send + Sync {
    fn name(&self) -> &'static str;
}

pub struct CallsOtherFn {
    pub collaborator: Arc<dyn CollaboratorFn>,
}

impl TestFn for CallsOtherFn {
    fn foo(&self) -> Vec<String> {
        vec![self.collaborator.name().to_string()]
    }
}

pub struct Collaborator;

impl CollaboratorFn for Collaborator {
    fn name(&self) -> &'static str {
        "collaborator"
    }
}

/// Takes a parameter nothing can supply.
pub struct BrokenCollaborator;

impl CollaboratorFn for BrokenCollaborator {
    fn name(&self) -> &'static str {
        "broken"
    }
}

/// Never registered in the catalog.
pub struct Unregistered;

pub struct Concrete1 {
    pub concrete: Arc<Concrete2>,
}

pub struct Concrete2;

pub struct SharesConcrete {
    pub first: Arc<Concrete2>,
    pub second: Arc<Concrete2>,
}

/// Only constructible through `PrivateConstructorProvider`.
pub struct PrivateConstructor {
    name: String,
}

impl PrivateConstructor {
    fn build(name: &str) -> Self {
        Self { name: name.to_string() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

pub struct PrivateConstructorProvider {
    provider_name: Arc<String>,
}

pub struct NoSuitableConstructor;

pub trait NumberFormat: Send + Sync {
    fn format(&self, d: i32) -> String;
}

pub struct Plain;

impl NumberFormat for Plain {
    fn format(&self, d: i32) -> String {
        d.to_string()
    }
}

pub struct Doubling {
    delegate: Arc<dyn NumberFormat>,
}

impl NumberFormat for Doubling {
    fn format(&self, d: i32) -> String {
        self.delegate.format(2 * d)
    }
}

pub struct Increment {
    delegate: Arc<dyn NumberFormat>,
}

impl NumberFormat for Increment {
    fn format(&self, d: i32) -> String {
        self.delegate.format(d + 1)
    }
}

/// Two public constructors, so it cannot be chosen as a decorator.
pub struct Padding {
    delegate: Arc<dyn NumberFormat>,
    width: usize,
}

impl NumberFormat for Padding {
    fn format(&self, d: i32) -> String {
        format!("{:>width$}", self.delegate.format(d), width = self.width)
    }
}

pub struct WithArg {
    pub arg: Arc<String>,
}

pub struct UsesConfigArg {
    pub config_arg: Arc<ConfigArg>,
}

#[derive(Debug)]
pub struct ConfigArg;

pub struct ConvertArgs {
    pub integers: Arc<Vec<i32>>,
    pub date: Arc<NaiveDate>,
}

pub struct WithDefault {
    pub scale: Arc<f64>,
}

pub struct CycleA;
pub struct CycleB;

pub struct Failing;
pub struct Panicking;

pub struct DependsOnFailing;

/// Node decorator wrapping every `TestFn` so its output is prefixed with "decorated".
pub struct Tagging;

struct TaggedFn(Arc<dyn TestFn>);

impl TestFn for TaggedFn {
    fn foo(&self) -> Vec<String> {
        std::iter::once("decorated".to_string()).chain(self.0.foo()).collect()
    }
}

impl NodeDecorator for Tagging {
    fn decorate(&self, node: NodeView<'_>) -> Option<Decoration> {
        if node.ty != TypeKey::of::<dyn TestFn>() {
            return None;
        }
        Some(Decoration::new::<dyn TestFn, _>("tagged", |inner| {
            let tagged: Arc<dyn TestFn> = Arc::new(TaggedFn(inner));
            Ok(tagged)
        }))
    }
}

pub fn private_constructor() -> Component<PrivateConstructor> {
    Component::new().constructor(
        Constructor::new(|args| Ok(PrivateConstructor::build(args.get::<String>("name")?.as_str())))
            .param::<String>("name")
            .private(),
    )
}

pub fn catalog() -> Catalog {
    Catalog::builder()
        .register(
            Component::<BasicImpl>::new()
                .constructor(Constructor::new(|_| Ok(BasicImpl)))
                .implements::<dyn TestFn>(|this| this),
        )
        .register(
            Component::<InfrastructureImpl>::new()
                .constructor(
                    Constructor::new(|args| {
                        Ok(InfrastructureImpl {
                            infrastructure_component: args.get("infrastructure_component")?,
                        })
                    })
                    .param::<String>("infrastructure_component"),
                )
                .implements::<dyn TestFn>(|this| this),
        )
        .register(
            Component::<CallsOtherFn>::new()
                .constructor(
                    Constructor::new(|args| Ok(CallsOtherFn { collaborator: args.get("collaborator")? }))
                        .param::<dyn CollaboratorFn>("collaborator"),
                )
                .implements::<dyn TestFn>(|this| this),
        )
        .register(
            Component::<Collaborator>::new()
                .constructor(Constructor::new(|_| Ok(Collaborator)))
                .implements::<dyn CollaboratorFn>(|this| this),
        )
        .register(
            Component::<BrokenCollaborator>::new()
                .constructor(Constructor::new(|_| Ok(BrokenCollaborator)).param::<Unregistered>("unsatisfied"))
                .implements::<dyn CollaboratorFn>(|this| this),
        )
        .register(Component::<Concrete1>::new().constructor(
            Constructor::new(|args| Ok(Concrete1 { concrete: args.get("concrete")? })).param::<Concrete2>("concrete"),
        ))
        .register(Component::<Concrete2>::new().constructor(Constructor::new(|_| Ok(Concrete2))))
        .register(
            Component::<SharesConcrete>::new().constructor(
                Constructor::new(|args| {
                    Ok(SharesConcrete {
                        first: args.get("first")?,
                        second: args.get("second")?,
                    })
                })
                .param::<Concrete2>("first")
                .param::<Concrete2>("second"),
            ),
        )
        .register(private_constructor())
        .register(
            Component::<PrivateConstructorProvider>::new()
                .constructor(
                    Constructor::new(|args| {
                        Ok(PrivateConstructorProvider {
                            provider_name: args.get("provider_name")?,
                        })
                    })
                    .param::<String>("provider_name"),
                )
                .provides::<PrivateConstructor, _>(|p| Ok(Arc::new(PrivateConstructor::build(&p.provider_name)))),
        )
        .register(
            Component::<NoSuitableConstructor>::new()
                .constructor(Constructor::new(|_| Ok(NoSuitableConstructor)))
                .constructor(Constructor::new(|_| Ok(NoSuitableConstructor)).param::<String>("ignored")),
        )
        .register(
            Component::<Plain>::new()
                .constructor(Constructor::new(|_| Ok(Plain)))
                .implements::<dyn NumberFormat>(|this| this),
        )
        .register(
            Component::<Doubling>::new()
                .constructor(
                    Constructor::new(|args| Ok(Doubling { delegate: args.get("delegate")? }))
                        .param::<dyn NumberFormat>("delegate"),
                )
                .implements::<dyn NumberFormat>(|this| this),
        )
        .register(
            Component::<Increment>::new()
                .constructor(
                    Constructor::new(|args| Ok(Increment { delegate: args.get("fn")? })).param::<dyn NumberFormat>("fn"),
                )
                .implements::<dyn NumberFormat>(|this| this),
        )
        .register(
            Component::<Padding>::new()
                .constructor(
                    Constructor::new(|args| Ok(Padding { delegate: args.get("delegate")?, width: 8 }))
                        .param::<dyn NumberFormat>("delegate"),
                )
                .constructor(
                    Constructor::new(|args| {
                        Ok(Padding {
                            delegate: args.get("delegate")?,
                            width: *args.get::<usize>("width")?,
                        })
                    })
                    .param::<dyn NumberFormat>("delegate")
                    .param::<usize>("width"),
                )
                .implements::<dyn NumberFormat>(|this| this),
        )
        .register(
            Component::<WithArg>::new()
                .constructor(Constructor::new(|args| Ok(WithArg { arg: args.get("arg")? })).param::<String>("arg"))
                .config_object(),
        )
        .register(
            Component::<UsesConfigArg>::new().constructor(
                Constructor::new(|args| Ok(UsesConfigArg { config_arg: args.get("config_arg")? }))
                    .param::<ConfigArg>("config_arg"),
            ),
        )
        .register(Component::<ConfigArg>::new().config_object())
        .register(
            Component::<ConvertArgs>::new().constructor(
                Constructor::new(|args| {
                    Ok(ConvertArgs {
                        integers: args.get("integers")?,
                        date: args.get("date")?,
                    })
                })
                .param::<Vec<i32>>("integers")
                .param::<NaiveDate>("date"),
            ),
        )
        .register(
            Component::<WithDefault>::new().constructor(
                Constructor::new(|args| Ok(WithDefault { scale: args.get("scale")? })).param_or::<f64>("scale", 1.0),
            ),
        )
        .register(Component::<CycleA>::new().constructor(Constructor::new(|_| Ok(CycleA)).param::<CycleB>("b")))
        .register(Component::<CycleB>::new().constructor(Constructor::new(|_| Ok(CycleB)).param::<CycleA>("a")))
        .register(Component::<Failing>::new().constructor(Constructor::new(|_| Err("market data unavailable".into()))))
        .register(Component::<Panicking>::new().constructor(Constructor::new(|_| -> Result<Panicking, _> {
            panic!("curve bootstrap diverged")
        })))
        .register(
            Component::<DependsOnFailing>::new().constructor(
                Constructor::new(|_| Ok(DependsOnFailing))
                    .param::<Concrete1>("concrete")
                    .param::<Failing>("failing")
                    .param::<Panicking>("panicking"),
            ),
        )
        .build()
}
