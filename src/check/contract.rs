//! Factory contract checks.
//!
//! Locates the module's factory by export-name prefix, invokes it, and checks
//! the returned descriptor against the required-field contract.

use std::time::Instant;

use crate::config::Config;
use crate::plugin::{PluginFailure, PluginModule};
use crate::value::{Mapping, Value, ValueKind};

use super::{SuiteBuilder, TestResult};

/// Keys every factory descriptor must carry.
pub const REQUIRED_KEYS: &[&str] = &[
    "name",
    "version",
    "system_prompt",
    "assistant_class",
    "domain",
    "tags",
];

/// Check name used for factory discovery results.
pub const FACTORY_CHECK: &str = "factory callable";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expected {
    Text,
    TextSequence,
}

impl Expected {
    fn describe(&self) -> &'static str {
        match self {
            Expected::Text => "text",
            Expected::TextSequence => "a sequence of text",
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            Expected::Text => value.kind() == ValueKind::Text,
            Expected::TextSequence => value
                .as_seq()
                .map(|items| items.iter().all(|v| v.kind() == ValueKind::Text))
                .unwrap_or(false),
        }
    }
}

const TYPE_CHECKS: &[(&str, Expected)] = &[
    ("name", Expected::Text),
    ("version", Expected::Text),
    ("system_prompt", Expected::Text),
    ("domain", Expected::Text),
    ("tags", Expected::TextSequence),
];

/// A descriptor returned by the accepted factory.
pub type Descriptor = Mapping;

/// Find and invoke the module's factory, then validate its descriptor.
///
/// Returns the descriptor when a factory was accepted.
pub fn validate_factory(
    module: &dyn PluginModule,
    config: &Config,
    suite: &mut SuiteBuilder,
) -> Option<Descriptor> {
    let prefix = config.factory_prefix.as_str();
    let candidates: Vec<_> = module
        .factories()
        .into_iter()
        .filter(|f| f.name.starts_with(prefix))
        .collect();

    let mut first_failure: Option<(String, PluginFailure)> = None;
    let mut accepted = None;

    for factory in &candidates {
        let started = Instant::now();
        match factory.call() {
            Ok(Value::Map(descriptor)) if descriptor.contains_key("name") => {
                accepted = Some((factory.name.clone(), descriptor, started.elapsed()));
                break;
            }
            Ok(other) => {
                tracing::debug!(
                    factory = %factory.name,
                    kind = %other.kind(),
                    "factory candidate rejected"
                );
            }
            Err(failure) => {
                if first_failure.is_none() {
                    first_failure = Some((factory.name.clone(), failure));
                }
            }
        }
    }

    let Some((factory_name, descriptor, elapsed)) = accepted else {
        match first_failure {
            Some((name, failure)) => suite.push(
                TestResult::error(
                    FACTORY_CHECK,
                    format!("factory {} raised: {}", name, failure.message),
                )
                .with_detail("factory", name)
                .with_detail("trace", failure.trace),
            ),
            None => suite.push(
                TestResult::failed(
                    FACTORY_CHECK,
                    format!(
                        "no callable named {}* returning a mapping with a 'name' key",
                        prefix
                    ),
                )
                .with_detail(
                    "candidates",
                    candidates.iter().map(|f| f.name.clone()).collect::<Vec<_>>(),
                ),
            ),
        }
        return None;
    };

    suite.push(
        TestResult::passed(FACTORY_CHECK, format!("found factory {}", factory_name))
            .with_detail("factory", factory_name)
            .with_duration(elapsed),
    );

    check_descriptor(&descriptor, config, suite);
    Some(descriptor)
}

/// Run the field checks on an accepted descriptor.
pub fn check_descriptor(descriptor: &Descriptor, config: &Config, suite: &mut SuiteBuilder) {
    check_required_keys(descriptor, suite);

    for (key, expected) in TYPE_CHECKS {
        let Some(value) = descriptor.get(*key) else {
            continue;
        };
        let name = format!("type: {}", key);
        if expected.matches(value) {
            suite.push(TestResult::passed(
                name,
                format!("{} is {}", key, expected.describe()),
            ));
        } else {
            suite.push(
                TestResult::failed(
                    name,
                    format!(
                        "{} should be {}, got {}",
                        key,
                        expected.describe(),
                        value.kind()
                    ),
                )
                .with_detail("actual", value.kind().as_str()),
            );
        }
    }

    if let Some(value) = descriptor.get("assistant_class") {
        check_class_field(value, suite);
    }

    if let Some(prompt) = descriptor.get("system_prompt").and_then(Value::as_text) {
        check_prompt_length(prompt, config.min_prompt_length, suite);
    }

    if let Some(tags) = descriptor.get("tags").and_then(Value::as_seq) {
        check_tags(tags, suite);
    }
}

fn check_required_keys(descriptor: &Descriptor, suite: &mut SuiteBuilder) {
    let missing: Vec<&str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|k| !descriptor.contains_key(*k))
        .collect();

    if missing.is_empty() {
        suite.push(
            TestResult::passed(
                "required keys",
                format!("all required keys present: {}", REQUIRED_KEYS.join(", ")),
            )
            .with_detail("present", REQUIRED_KEYS.to_vec()),
        );
    } else {
        suite.push(
            TestResult::failed(
                "required keys",
                format!("missing required keys: {}", missing.join(", ")),
            )
            .with_detail("missing", missing),
        );
    }
}

fn check_class_field(value: &Value, suite: &mut SuiteBuilder) {
    match value {
        Value::Class(name) => suite.push(TestResult::passed(
            "assistant_class",
            format!("assistant_class references class {}", name),
        )),
        other => suite.push(TestResult::failed(
            "assistant_class",
            format!("assistant_class must be a class, got {}", other.kind()),
        )),
    }
}

fn check_prompt_length(prompt: &str, min: usize, suite: &mut SuiteBuilder) {
    let length = prompt.chars().count();
    if length >= min {
        suite.push(
            TestResult::passed(
                "system_prompt length",
                format!("system_prompt has {} characters", length),
            )
            .with_detail("length", length),
        );
    } else {
        suite.push(
            TestResult::failed(
                "system_prompt length",
                format!(
                    "system_prompt has {} characters, expected at least {}",
                    length, min
                ),
            )
            .with_detail("length", length)
            .with_detail("minimum", min),
        );
    }
}

fn check_tags(tags: &[Value], suite: &mut SuiteBuilder) {
    let invalid: Vec<usize> = tags
        .iter()
        .enumerate()
        .filter(|(_, tag)| tag.as_text().map_or(true, str::is_empty))
        .map(|(i, _)| i)
        .collect();

    if invalid.is_empty() {
        suite.push(TestResult::passed(
            "tags",
            format!("{} valid tags", tags.len()),
        ));
    } else {
        suite.push(
            TestResult::failed(
                "tags",
                format!("{} of {} tags are empty or not text", invalid.len(), tags.len()),
            )
            .with_detail("invalid_indices", invalid),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::Status;
    use crate::plugin::{DeclaredModule, Factory};

    fn good_descriptor() -> Value {
        Value::map([
            ("name", Value::from("Tax Assistant")),
            ("version", Value::from("2.1.0")),
            ("system_prompt", Value::from("You are a tax assistant. ".repeat(6))),
            ("assistant_class", Value::class("EnhancedTaxAssistant")),
            ("domain", Value::from("finance")),
            ("tags", Value::texts(&["tax", "finance"])),
        ])
    }

    fn run(module: DeclaredModule) -> (Option<Descriptor>, SuiteBuilder) {
        let mut suite = SuiteBuilder::new(module.id().to_string());
        let descriptor = validate_factory(&module, &Config::default(), &mut suite);
        (descriptor, suite)
    }

    fn statuses(suite: &SuiteBuilder) -> Vec<(String, Status)> {
        suite
            .results()
            .iter()
            .map(|r| (r.name.clone(), r.status))
            .collect()
    }

    #[test]
    fn test_valid_factory_passes_everything() {
        let module = DeclaredModule::new("m")
            .factory(Factory::new("create_enhanced_tax_assistant", || Ok(good_descriptor())));
        let (descriptor, suite) = run(module);

        assert!(descriptor.is_some());
        assert_eq!(suite.counts().passed, suite.counts().total_tests);
        // factory + keys + 5 types + class + prompt + tags
        assert_eq!(suite.counts().total_tests, 10);
    }

    #[test]
    fn test_no_factory_is_single_failure() {
        let module = DeclaredModule::new("m")
            .factory(Factory::new("build_assistant", || Ok(good_descriptor())));
        let (descriptor, suite) = run(module);

        assert!(descriptor.is_none());
        assert_eq!(statuses(&suite), vec![(FACTORY_CHECK.to_string(), Status::Failed)]);
        assert!(suite.results()[0].message.contains("create_enhanced_"));
        assert!(suite.results()[0].message.contains("'name'"));
    }

    #[test]
    fn test_raising_factory_is_single_error() {
        let module = DeclaredModule::new("m")
            .factory(Factory::new("create_enhanced_x", || anyhow::bail!("knowledge base missing")));
        let (descriptor, suite) = run(module);

        assert!(descriptor.is_none());
        assert_eq!(statuses(&suite), vec![(FACTORY_CHECK.to_string(), Status::Error)]);
        let result = &suite.results()[0];
        assert!(result.message.contains("knowledge base missing"));
        assert!(result.details.contains_key("trace"));
    }

    #[test]
    fn test_panicking_factory_is_error() {
        let module = DeclaredModule::new("m")
            .factory(Factory::new("create_enhanced_x", || panic!("index out of range")));
        let (_, suite) = run(module);

        assert_eq!(suite.results()[0].status, Status::Error);
    }

    #[test]
    fn test_first_qualifying_factory_wins() {
        let module = DeclaredModule::new("m")
            .factory(Factory::new("create_enhanced_helper", || Ok(Value::texts(&["not a map"]))))
            .factory(Factory::new("create_enhanced_broken", || anyhow::bail!("boom")))
            .factory(Factory::new("create_enhanced_real", || Ok(good_descriptor())));
        let (descriptor, suite) = run(module);

        assert!(descriptor.is_some());
        assert_eq!(suite.results()[0].status, Status::Passed);
        assert_eq!(
            suite.results()[0].details.get("factory"),
            Some(&serde_json::json!("create_enhanced_real"))
        );
        assert_eq!(suite.counts().errors, 0);
    }

    #[test]
    fn test_name_only_descriptor_lists_five_missing_keys() {
        let module = DeclaredModule::new("m").factory(Factory::new("create_enhanced_x", || {
            Ok(Value::map([("name", Value::from("X"))]))
        }));
        let (_, suite) = run(module);

        let keys = suite
            .results()
            .iter()
            .find(|r| r.name == "required keys")
            .unwrap();
        assert_eq!(keys.status, Status::Failed);
        assert_eq!(
            keys.details.get("missing"),
            Some(&serde_json::json!([
                "version",
                "system_prompt",
                "assistant_class",
                "domain",
                "tags"
            ]))
        );
    }

    #[test]
    fn test_type_checks_are_independent() {
        let mut descriptor = good_descriptor();
        if let Value::Map(m) = &mut descriptor {
            m.insert("version".into(), Value::Float(2.0));
            m.insert("tags".into(), Value::from("tax"));
        }
        let module = DeclaredModule::new("m")
            .factory(Factory::new("create_enhanced_x", move || Ok(descriptor.clone())));
        let (_, suite) = run(module);
        let results = statuses(&suite);

        assert!(results.contains(&("type: name".to_string(), Status::Passed)));
        assert!(results.contains(&("type: version".to_string(), Status::Failed)));
        assert!(results.contains(&("type: domain".to_string(), Status::Passed)));
        assert!(results.contains(&("type: tags".to_string(), Status::Failed)));
        // tags validity needs a sequence, so it is not reported
        assert!(!results.iter().any(|(n, _)| n == "tags"));
    }

    #[test]
    fn test_class_instance_and_short_prompt_and_empty_tag() {
        let mut descriptor = good_descriptor();
        if let Value::Map(m) = &mut descriptor {
            m.insert("assistant_class".into(), Value::map([("name", Value::from("x"))]));
            m.insert("system_prompt".into(), Value::from("Too short."));
            m.insert("tags".into(), Value::texts(&["ok", ""]));
        }
        let module = DeclaredModule::new("m")
            .factory(Factory::new("create_enhanced_x", move || Ok(descriptor.clone())));
        let (_, suite) = run(module);
        let find = |name: &str| suite.results().iter().find(|r| r.name == name).unwrap();

        assert_eq!(find("assistant_class").status, Status::Failed);
        let prompt = find("system_prompt length");
        assert_eq!(prompt.status, Status::Failed);
        assert!(prompt.message.contains("10 characters"));
        let tags = find("tags");
        assert_eq!(tags.status, Status::Failed);
        assert_eq!(tags.details.get("invalid_indices"), Some(&serde_json::json!([1])));
    }

    #[test]
    fn test_tags_only_reject_empty_or_non_text() {
        let mut descriptor = good_descriptor();
        if let Value::Map(m) = &mut descriptor {
            m.insert(
                "tags".into(),
                Value::Seq(vec![Value::from(" "), Value::from("tax"), Value::Int(3)]),
            );
        }
        let module = DeclaredModule::new("m")
            .factory(Factory::new("create_enhanced_x", move || Ok(descriptor.clone())));
        let (_, suite) = run(module);

        let tags = suite.results().iter().find(|r| r.name == "tags").unwrap();
        assert_eq!(tags.status, Status::Failed);
        assert_eq!(tags.details.get("invalid_indices"), Some(&serde_json::json!([2])));
    }
}
