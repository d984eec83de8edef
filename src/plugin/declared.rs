//! Plain-data implementations of the plugin traits.
//!
//! Used by the manifest loader and by code that registers plugins in-process.

use std::sync::Arc;

use super::{AssistantClass, Describable, Factory, Operation, PluginModule};

type Constructor = Arc<dyn Fn() -> anyhow::Result<Box<dyn Describable>> + Send + Sync>;

/// Attribute values carried by a constructed instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceAttributes {
    pub name: Option<String>,
    pub version: Option<String>,
}

impl InstanceAttributes {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            version: Some(version.into()),
        }
    }
}

impl Describable for InstanceAttributes {
    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    fn version(&self) -> Option<String> {
        self.version.clone()
    }
}

/// A class described by its name, constructor and operations.
#[derive(Clone)]
pub struct DeclaredClass {
    name: String,
    constructor: Constructor,
    operations: Vec<Operation>,
}

impl DeclaredClass {
    /// A class whose instances always carry `attributes`.
    pub fn new(name: impl Into<String>, attributes: InstanceAttributes) -> Self {
        Self::with_constructor(name, move || {
            Ok(Box::new(attributes.clone()) as Box<dyn Describable>)
        })
    }

    pub fn with_constructor<F>(name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> anyhow::Result<Box<dyn Describable>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            constructor: Arc::new(constructor),
            operations: Vec::new(),
        }
    }

    pub fn operation(mut self, op: Operation) -> Self {
        self.operations.push(op);
        self
    }
}

impl AssistantClass for DeclaredClass {
    fn name(&self) -> &str {
        &self.name
    }

    fn instantiate(&self) -> anyhow::Result<Box<dyn Describable>> {
        (self.constructor)()
    }

    fn operations(&self) -> Vec<Operation> {
        self.operations.clone()
    }
}

/// A module assembled from factories and classes.
#[derive(Clone)]
pub struct DeclaredModule {
    id: String,
    factories: Vec<Factory>,
    classes: Vec<Arc<dyn AssistantClass>>,
}

impl DeclaredModule {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            factories: Vec::new(),
            classes: Vec::new(),
        }
    }

    pub fn factory(mut self, factory: Factory) -> Self {
        self.factories.push(factory);
        self
    }

    pub fn class<C: AssistantClass + 'static>(mut self, class: C) -> Self {
        self.classes.push(Arc::new(class));
        self
    }
}

impl PluginModule for DeclaredModule {
    fn id(&self) -> &str {
        &self.id
    }

    fn factories(&self) -> Vec<Factory> {
        self.factories.clone()
    }

    fn classes(&self) -> Vec<Arc<dyn AssistantClass>> {
        self.classes.clone()
    }
}
