//! Companion class discovery and instantiation.

use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::plugin::{guarded, AssistantClass, PluginFailure, PluginModule};

use super::{SuiteBuilder, TestResult};

/// Attributes read from a fresh instance.
type Probe = Result<(Option<String>, Option<String>), PluginFailure>;

fn probe(class: &dyn AssistantClass) -> Probe {
    guarded(|| {
        let instance = class.instantiate()?;
        Ok((instance.name(), instance.version()))
    })
}

fn is_capable(probe: &Probe) -> bool {
    matches!(probe, Ok((Some(_), Some(_))))
}

/// Locate, instantiate and check the module's companion class.
///
/// Candidates are classes whose name starts with the configured prefix. The
/// first whose instance exposes both `name` and `version` is selected; when
/// none does, the first candidate is checked so its problems get reported.
pub fn validate_class(
    module: &dyn PluginModule,
    config: &Config,
    suite: &mut SuiteBuilder,
) -> Option<Arc<dyn AssistantClass>> {
    let candidates: Vec<_> = module
        .classes()
        .into_iter()
        .filter(|c| c.name().starts_with(config.class_prefix.as_str()))
        .collect();

    let mut fallback = None;
    let mut selected = None;
    for class in candidates {
        let started = Instant::now();
        let outcome = probe(class.as_ref());
        let elapsed = started.elapsed();
        if is_capable(&outcome) {
            selected = Some((class, outcome, elapsed));
            break;
        }
        if fallback.is_none() {
            fallback = Some((class, outcome, elapsed));
        }
    }

    let Some((class, outcome, elapsed)) = selected.or(fallback) else {
        suite.push(TestResult::failed(
            "class discovery",
            format!(
                "no candidate class found (expected a class named {}*)",
                config.class_prefix
            ),
        ));
        return None;
    };

    suite.push(
        TestResult::passed("class discovery", format!("found class {}", class.name()))
            .with_detail("class", class.name()),
    );

    match outcome {
        Ok((name, version)) => {
            suite.push(
                TestResult::passed(
                    "class instantiation",
                    format!("{} instantiated without arguments", class.name()),
                )
                .with_duration(elapsed),
            );
            check_attribute("name", name, suite);
            check_attribute("version", version, suite);
        }
        Err(failure) => {
            suite.push(
                TestResult::error(
                    "class instantiation",
                    format!("{} raised: {}", class.name(), failure.message),
                )
                .with_detail("trace", failure.trace)
                .with_duration(elapsed),
            );
        }
    }

    Some(class)
}

fn check_attribute(attribute: &str, value: Option<String>, suite: &mut SuiteBuilder) {
    let name = format!("attribute: {}", attribute);
    match value {
        Some(value) => suite.push(
            TestResult::passed(name, format!("{} = {:?}", attribute, value))
                .with_detail("value", value),
        ),
        None => suite.push(TestResult::failed(
            name,
            format!("instance has no {} attribute", attribute),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::Status;
    use crate::plugin::{DeclaredClass, DeclaredModule, Describable, InstanceAttributes};

    fn run(module: DeclaredModule) -> (Option<String>, SuiteBuilder) {
        let mut suite = SuiteBuilder::new("m");
        let class = validate_class(&module, &Config::default(), &mut suite);
        (class.map(|c| c.name().to_string()), suite)
    }

    fn status_of(suite: &SuiteBuilder, name: &str) -> Status {
        suite.results().iter().find(|r| r.name == name).unwrap().status
    }

    #[test]
    fn test_valid_class() {
        let module = DeclaredModule::new("m").class(DeclaredClass::new(
            "EnhancedLegalAssistant",
            InstanceAttributes::new("Legal", "1.0"),
        ));
        let (class, suite) = run(module);

        assert_eq!(class.as_deref(), Some("EnhancedLegalAssistant"));
        assert_eq!(suite.counts().total_tests, 4);
        assert_eq!(suite.counts().passed, 4);
        let name = suite.results().iter().find(|r| r.name == "attribute: name").unwrap();
        assert_eq!(name.details.get("value"), Some(&serde_json::json!("Legal")));
    }

    #[test]
    fn test_no_candidate_class() {
        let module = DeclaredModule::new("m").class(DeclaredClass::new(
            "LegalHelper",
            InstanceAttributes::new("Legal", "1.0"),
        ));
        let (class, suite) = run(module);

        assert!(class.is_none());
        assert_eq!(suite.counts().total_tests, 1);
        assert_eq!(status_of(&suite, "class discovery"), Status::Failed);
    }

    #[test]
    fn test_constructor_error() {
        let module = DeclaredModule::new("m").class(DeclaredClass::with_constructor(
            "EnhancedBroken",
            || anyhow::bail!("missing knowledge file"),
        ));
        let (class, suite) = run(module);

        assert!(class.is_some());
        assert_eq!(status_of(&suite, "class instantiation"), Status::Error);
        assert_eq!(suite.counts().errors, 1);
        assert!(!suite.results().iter().any(|r| r.name.starts_with("attribute")));
    }

    #[test]
    fn test_missing_version_attribute() {
        let attributes = InstanceAttributes {
            name: Some("Legal".to_string()),
            version: None,
        };
        let module = DeclaredModule::new("m").class(DeclaredClass::new("EnhancedLegal", attributes));
        let (_, suite) = run(module);

        assert_eq!(status_of(&suite, "attribute: name"), Status::Passed);
        assert_eq!(status_of(&suite, "attribute: version"), Status::Failed);
    }

    #[test]
    fn test_capable_candidate_preferred() {
        let module = DeclaredModule::new("m")
            .class(DeclaredClass::with_constructor("EnhancedBase", || {
                Ok(Box::new(InstanceAttributes::default()) as Box<dyn Describable>)
            }))
            .class(DeclaredClass::new(
                "EnhancedTaxAssistant",
                InstanceAttributes::new("Tax", "3.0"),
            ));
        let (class, suite) = run(module);

        assert_eq!(class.as_deref(), Some("EnhancedTaxAssistant"));
        assert_eq!(suite.counts().failed, 0);
    }
}
