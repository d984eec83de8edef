//! Validation runner that orchestrates all stages for each plugin.

use std::time::Instant;

use rayon::prelude::*;

use crate::config::Config;
use crate::plugin::{guarded, PluginSource};
use crate::syntax::{self, SyntaxChecker, SyntaxVerdict};
use crate::value::Value;

use super::{
    extract_snippets, join_path, probe_surface, validate_class, validate_factory, AssistantSuite,
    FullReport, KeywordClassifier, SnippetClassifier, SuiteBuilder, SurfaceOutput, TestResult,
};

/// Check name used when a plugin cannot be loaded.
pub const IMPORT_CHECK: &str = "module import";
/// Check name used when no snippet could be validated.
pub const SNIPPETS_CHECK: &str = "code examples";

/// Per-plugin lifecycle. Stages only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Importing,
    ContractValidation,
    ClassValidation,
    SurfaceProbing,
    SnippetValidation,
    Finalized,
}

fn advance(module: &str, stage: &mut Stage, next: Stage) {
    debug_assert!(next > *stage, "stage {:?} after {:?}", next, stage);
    tracing::trace!(module, from = ?stage, to = ?next, "stage");
    *stage = next;
}

/// Executes every validation stage against a set of plugins.
pub struct Runner<'a> {
    source: &'a dyn PluginSource,
    config: &'a Config,
    classifier: Box<dyn SnippetClassifier>,
    checker: Option<Box<dyn SyntaxChecker>>,
}

impl<'a> Runner<'a> {
    /// Create a runner loading plugins from `source`.
    ///
    /// The snippet classifier is the keyword classifier extended with the
    /// configured indicators; the syntax checker is the one registered for
    /// the configured language, if any.
    pub fn new(source: &'a dyn PluginSource, config: &'a Config) -> Self {
        let classifier =
            KeywordClassifier::new().extend(config.extra_code_indicators.iter().cloned());
        Self {
            source,
            config,
            classifier: Box::new(classifier),
            checker: syntax::for_language(&config.language),
        }
    }

    /// Replace the snippet classifier.
    pub fn classifier(mut self, classifier: Box<dyn SnippetClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Replace the syntax checker. `None` skips snippet validation.
    pub fn checker(mut self, checker: Option<Box<dyn SyntaxChecker>>) -> Self {
        self.checker = checker;
        self
    }

    /// Validate every plugin and aggregate the suites in the given order.
    pub fn run(&self, ids: &[String]) -> FullReport {
        let started = Instant::now();
        let suites: Vec<AssistantSuite> = if self.config.parallel {
            ids.par_iter().map(|id| self.run_plugin(id)).collect()
        } else {
            ids.iter().map(|id| self.run_plugin(id)).collect()
        };
        FullReport::new(suites, started.elapsed())
    }

    /// Validate a single plugin. Never fails: problems become results.
    pub fn run_plugin(&self, id: &str) -> AssistantSuite {
        let mut suite = SuiteBuilder::new(id);
        let mut stage = Stage::Importing;

        let started = Instant::now();
        let module = match guarded(|| self.source.load(id)) {
            Ok(module) => module,
            Err(failure) => {
                tracing::warn!(module = id, error = %failure.message, "plugin import failed");
                suite.push(
                    TestResult::error(IMPORT_CHECK, format!("cannot import {}: {}", id, failure.message))
                        .with_detail("trace", failure.trace)
                        .with_duration(started.elapsed()),
                );
                advance(id, &mut stage, Stage::Finalized);
                return suite.finish();
            }
        };

        advance(id, &mut stage, Stage::ContractValidation);
        if let Some(descriptor) = validate_factory(module.as_ref(), self.config, &mut suite) {
            if let Some(name) = descriptor.get("name").and_then(Value::as_text) {
                suite.set_assistant_name(name);
            }
        }

        advance(id, &mut stage, Stage::ClassValidation);
        let class = validate_class(module.as_ref(), self.config, &mut suite);

        advance(id, &mut stage, Stage::SurfaceProbing);
        let outputs = match &class {
            Some(class) => probe_surface(class.as_ref(), &mut suite),
            None => {
                suite.push(TestResult::skipped(
                    "surface operations",
                    "no companion class to probe",
                ));
                Vec::new()
            }
        };

        advance(id, &mut stage, Stage::SnippetValidation);
        self.validate_snippets(&outputs, &mut suite);

        advance(id, &mut stage, Stage::Finalized);
        let suite = suite.finish();
        tracing::info!(
            module = id,
            assistant = suite.assistant_name(),
            total = suite.counts().total_tests,
            failed = suite.counts().failed,
            errors = suite.counts().errors,
            "plugin validated"
        );
        suite
    }

    fn validate_snippets(&self, outputs: &[SurfaceOutput], suite: &mut SuiteBuilder) {
        let snippets: Vec<_> = outputs
            .iter()
            .flat_map(|output| {
                extract_snippets(
                    &output.value,
                    self.classifier.as_ref(),
                    self.config.min_snippet_length,
                )
                .into_iter()
                .map(move |s| (join_path(&output.operation, &s.path), s.text))
            })
            .collect();

        if snippets.is_empty() {
            suite.push(TestResult::skipped(SNIPPETS_CHECK, "no code examples found"));
            return;
        }

        let Some(checker) = self.checker.as_deref() else {
            suite.push(
                TestResult::skipped(
                    SNIPPETS_CHECK,
                    format!("no syntax checker available for {}", self.config.language),
                )
                .with_detail("snippets", snippets.len()),
            );
            return;
        };

        for (path, text) in snippets {
            let name = format!("snippet: {}", path);
            if checker.is_foreign(&text) {
                suite.push(TestResult::skipped(
                    name,
                    format!("not {} code", checker.language()),
                ));
                continue;
            }

            let started = Instant::now();
            let verdict = guarded(|| Ok(checker.check(&text)))
                .unwrap_or_else(|failure| SyntaxVerdict::invalid(failure.message));
            let elapsed = started.elapsed();

            let result = if verdict.valid {
                TestResult::passed(name, format!("valid {} syntax", checker.language()))
            } else {
                let error = verdict.error.unwrap_or_else(|| "invalid syntax".to_string());
                TestResult::failed(name, format!("invalid {} syntax: {}", checker.language(), error))
                    .with_detail("snippet", text)
                    .with_detail("error", error)
            };
            suite.push(result.with_duration(elapsed));
        }
    }
}
