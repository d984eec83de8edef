//! In-process plugin registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{PluginModule, PluginSource};

/// Plugins registered by module identifier.
///
/// Importing a module from the registry is a lookup; an unknown identifier
/// is an import failure for that plugin only.
#[derive(Default, Clone)]
pub struct Registry {
    modules: BTreeMap<String, Arc<dyn PluginModule>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module under its own identifier, replacing any previous one.
    pub fn register<M: PluginModule + 'static>(&mut self, module: M) {
        self.modules.insert(module.id().to_string(), Arc::new(module));
    }

    /// Registered identifiers in lexicographic order.
    pub fn ids(&self) -> Vec<String> {
        self.modules.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl PluginSource for Registry {
    fn load(&self, id: &str) -> anyhow::Result<Arc<dyn PluginModule>> {
        self.modules
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no plugin registered as {:?}", id))
    }
}
