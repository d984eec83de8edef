//! assistcheck - validation harness for assistant plugins.
//!
//! A plugin is a module exporting a factory that returns a descriptor
//! mapping and a companion class whose class-level operations return
//! reference data. assistcheck loads each discovered plugin, checks the
//! descriptor against the required contract, instantiates the class, probes
//! its public surface, syntax-checks code examples found in what the surface
//! returns, and aggregates everything into a report.
//!
//! # Architecture
//!
//! - `plugin`: capability traits, failure-tolerant invocation, plugin
//!   sources (in-process registry, YAML manifests) and discovery
//! - `check`: validation stages, result types and the runner
//! - `syntax`: tree-sitter syntax checkers behind a language registry
//! - `report`: JSON, HTML and terminal renderers
//! - `config`: YAML configuration schema
//!
//! Misbehaving plugins never abort a run: every plugin call is guarded and
//! problems become `ERROR` or `FAILED` results. Only framework problems
//! (configuration, discovery, writing reports) surface as
//! [`FrameworkError`].

pub mod check;
pub mod cli;
pub mod config;
pub mod error;
pub mod plugin;
pub mod report;
pub mod syntax;
pub mod value;

pub use check::{AssistantSuite, Counts, FullReport, Runner, Status, TestResult};
pub use config::Config;
pub use error::FrameworkError;
pub use plugin::{
    AssistantClass, Discoverer, ManifestLoader, PluginModule, PluginSource, Registry,
};
pub use syntax::{init as init_checkers, SyntaxChecker, SyntaxVerdict};
pub use value::Value;
