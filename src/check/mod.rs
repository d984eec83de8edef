//! Plugin validation stages and their results.

mod class;
mod contract;
mod runner;
mod snippets;
mod surface;
mod types;

pub use class::validate_class;
pub use contract::{check_descriptor, validate_factory, Descriptor, FACTORY_CHECK, REQUIRED_KEYS};
pub use runner::{Runner, Stage, IMPORT_CHECK, SNIPPETS_CHECK};
pub use snippets::{
    extract_snippets, join_path, KeywordClassifier, Snippet, SnippetClassifier, CODE_INDICATORS,
};
pub use surface::{probe_surface, SurfaceOutput};
pub use types::{AssistantSuite, Counts, FullReport, Status, SuiteBuilder, TestResult};
