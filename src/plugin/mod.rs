//! Plugin capability contract.
//!
//! A plugin module is anything implementing [`PluginModule`]: it exports
//! named zero-argument factories and companion classes. Classes expose
//! operations with declared signatures so arity can be inspected without
//! invoking them.
//!
//! Every call into plugin code goes through [`guarded`], which turns both
//! returned errors and panics into a [`PluginFailure`]. Nothing raised by a
//! plugin escapes the check that invoked it.

mod declared;
mod discover;
mod invoke;
mod manifest;
mod registry;

pub use declared::{DeclaredClass, DeclaredModule, InstanceAttributes};
pub use discover::Discoverer;
pub use invoke::{guarded, Invocation, PluginFailure};
pub use manifest::ManifestLoader;
pub use registry::Registry;

use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// A zero-argument callable supplied by a plugin.
pub type Callable = Arc<dyn Fn() -> anyhow::Result<Value> + Send + Sync>;

/// Capability every plugin instance must provide.
pub trait Describable: Send {
    fn name(&self) -> Option<String>;
    fn version(&self) -> Option<String>;
}

/// A companion class exported by a plugin module.
pub trait AssistantClass: Send + Sync {
    /// Class name as exported by the module.
    fn name(&self) -> &str;

    /// Construct an instance with no arguments.
    fn instantiate(&self) -> anyhow::Result<Box<dyn Describable>>;

    /// All operations declared on the class, public or not.
    fn operations(&self) -> Vec<Operation>;
}

/// A loaded plugin module.
pub trait PluginModule: Send + Sync {
    fn id(&self) -> &str;
    fn factories(&self) -> Vec<Factory>;
    fn classes(&self) -> Vec<Arc<dyn AssistantClass>>;
}

/// Resolves a discovered module identifier into a loaded module.
pub trait PluginSource: Send + Sync {
    fn load(&self, id: &str) -> anyhow::Result<Arc<dyn PluginModule>>;
}

/// A named, zero-argument factory export.
#[derive(Clone)]
pub struct Factory {
    pub name: String,
    call: Callable,
}

impl Factory {
    pub fn new<F>(name: impl Into<String>, call: F) -> Self
    where
        F: Fn() -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            call: Arc::new(call),
        }
    }

    /// Invoke the factory inside a failure-tolerant probe.
    pub fn call(&self) -> Result<Value, PluginFailure> {
        guarded(|| (self.call)())
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory").field("name", &self.name).finish()
    }
}

/// Whether an operation is invoked on the class or on an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    Class,
    Instance,
}

/// A declared operation parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub required: bool,
}

impl Param {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
        }
    }
}

/// An operation declared on an assistant class.
#[derive(Clone)]
pub struct Operation {
    pub name: String,
    pub receiver: Receiver,
    pub params: Vec<Param>,
    call: Callable,
}

impl Operation {
    /// A class-level operation taking no parameters.
    pub fn class_level<F>(name: impl Into<String>, call: F) -> Self
    where
        F: Fn() -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            receiver: Receiver::Class,
            params: Vec::new(),
            call: Arc::new(call),
        }
    }

    /// An instance-level operation. These are never probed.
    pub fn instance_level<F>(name: impl Into<String>, call: F) -> Self
    where
        F: Fn() -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            receiver: Receiver::Instance,
            ..Self::class_level(name, call)
        }
    }

    pub fn with_params(mut self, params: Vec<Param>) -> Self {
        self.params = params;
        self
    }

    /// Private operations are prefixed with an underscore.
    pub fn is_public(&self) -> bool {
        !self.name.starts_with('_')
    }

    pub fn is_class_level(&self) -> bool {
        self.receiver == Receiver::Class
    }

    /// Names of parameters that must be supplied by the caller.
    pub fn required_params(&self) -> Vec<&str> {
        self.params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Invoke with no arguments.
    ///
    /// Arity is checked from the declared signature first: an operation with
    /// required parameters is `Skipped` without being called.
    pub fn invoke(&self) -> Invocation {
        let required = self.required_params();
        if !required.is_empty() {
            return Invocation::Skipped(format!(
                "requires arguments: {}",
                required.join(", ")
            ));
        }
        match guarded(|| (self.call)()) {
            Ok(value) => Invocation::Success(value),
            Err(failure) => Invocation::Errored(failure),
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("receiver", &self.receiver)
            .field("params", &self.params)
            .finish()
    }
}
