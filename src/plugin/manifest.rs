//! YAML plugin manifests.
//!
//! A manifest declares a plugin's factories, classes, instance attributes
//! and class operations as data. Declared failures (`raises`) stand in for
//! plugin code that throws, so a manifest can describe a broken plugin as
//! faithfully as a working one.
//!
//! ```yaml
//! factories:
//!   - name: create_enhanced_demo_assistant
//!     returns:
//!       name: Demo
//!       assistant_class: { $class: EnhancedDemoAssistant }
//! classes:
//!   - name: EnhancedDemoAssistant
//!     attributes: { name: Demo, version: "1.0" }
//!     operations:
//!       - name: get_examples
//!         returns: { basic: "def f():\n    return 1" }
//!       - name: lookup
//!         params: [{ name: topic }]
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{
    DeclaredClass, DeclaredModule, Describable, Factory, InstanceAttributes, Operation, Param,
    PluginModule, PluginSource,
};
use crate::value::{Mapping, Value};

/// Extensions tried, in order, when resolving a module identifier.
const MANIFEST_EXTENSIONS: &[&str] = &["yaml", "yml"];

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    #[serde(default)]
    factories: Vec<FactoryEntry>,
    #[serde(default)]
    classes: Vec<ClassEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FactoryEntry {
    name: String,
    #[serde(default)]
    returns: Option<Value>,
    #[serde(default)]
    raises: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClassEntry {
    name: String,
    #[serde(default)]
    attributes: Mapping,
    #[serde(default)]
    raises: Option<String>,
    #[serde(default)]
    operations: Vec<OperationEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OperationEntry {
    name: String,
    /// Class-level (default) or instance-level.
    #[serde(default = "default_true", rename = "static")]
    class_level: bool,
    #[serde(default)]
    params: Vec<ParamEntry>,
    #[serde(default)]
    returns: Option<Value>,
    #[serde(default)]
    raises: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParamEntry {
    name: String,
    #[serde(default = "default_true")]
    required: bool,
}

fn default_true() -> bool {
    true
}

/// Build a callable that either returns `returns` or fails with `raises`.
fn declared_call(
    returns: Option<Value>,
    raises: Option<String>,
) -> impl Fn() -> anyhow::Result<Value> + Send + Sync + 'static {
    move || match &raises {
        Some(message) => Err(anyhow::anyhow!("{}", message)),
        None => Ok(returns.clone().unwrap_or(Value::Null)),
    }
}

impl ClassEntry {
    fn into_class(self) -> DeclaredClass {
        let attributes = InstanceAttributes {
            name: self.attributes.get("name").map(Value::to_string),
            version: self.attributes.get("version").map(Value::to_string),
        };
        let raises = self.raises;
        let mut class = DeclaredClass::with_constructor(self.name, move || match &raises {
            Some(message) => Err(anyhow::anyhow!("{}", message)),
            None => Ok(Box::new(attributes.clone()) as Box<dyn Describable>),
        });

        for entry in self.operations {
            let call = declared_call(entry.returns, entry.raises);
            let op = if entry.class_level {
                Operation::class_level(entry.name, call)
            } else {
                Operation::instance_level(entry.name, call)
            };
            let params = entry
                .params
                .into_iter()
                .map(|p| Param {
                    name: p.name,
                    required: p.required,
                })
                .collect();
            class = class.operation(op.with_params(params));
        }
        class
    }
}

/// Loads plugin modules from manifest files in a directory.
#[derive(Debug, Clone)]
pub struct ManifestLoader {
    dir: PathBuf,
}

impl ManifestLoader {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Parse a single manifest file. The module identifier is the file stem.
    pub fn load_file(path: &Path) -> anyhow::Result<DeclaredModule> {
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow::anyhow!("invalid manifest file name {}", path.display()))?;
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading manifest {}", path.display()))?;
        Self::parse(id, &content).with_context(|| format!("parsing manifest {}", path.display()))
    }

    /// Parse manifest text for the module `id`.
    pub fn parse(id: &str, content: &str) -> anyhow::Result<DeclaredModule> {
        let manifest: Manifest = serde_yaml::from_str(content)?;

        let mut module = DeclaredModule::new(id);
        for entry in manifest.factories {
            module = module.factory(Factory::new(
                entry.name,
                declared_call(entry.returns, entry.raises),
            ));
        }
        for entry in manifest.classes {
            module = module.class(entry.into_class());
        }
        Ok(module)
    }

    fn resolve(&self, id: &str) -> Option<PathBuf> {
        MANIFEST_EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{}.{}", id, ext)))
            .find(|p| p.is_file())
    }
}

impl PluginSource for ManifestLoader {
    fn load(&self, id: &str) -> anyhow::Result<Arc<dyn PluginModule>> {
        let path = self
            .resolve(id)
            .ok_or_else(|| anyhow::anyhow!("no manifest for {:?} in {}", id, self.dir.display()))?;
        Ok(Arc::new(Self::load_file(&path)?))
    }
}
