//! Integration tests for the full validation pipeline.
//!
//! These tests discover and validate the manifests under
//! `testdata/assistants` and check the resulting suites.

use std::path::PathBuf;

use assistcheck::check::{AssistantSuite, Runner, Status};
use assistcheck::plugin::{Discoverer, ManifestLoader};
use assistcheck::{syntax, Config, FullReport};

fn plugins_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join("assistants")
}

fn setup() {
    syntax::init();
}

fn config() -> Config {
    Config {
        plugin_dir: plugins_path(),
        ..Config::default()
    }
}

/// Discover and validate every plugin in testdata.
fn run_all(config: &Config) -> FullReport {
    setup();

    let ids = Discoverer::new(&config.file_pattern, &config.excluded_files)
        .expect("default pattern should compile")
        .discover(&config.plugin_dir)
        .expect("testdata should be scannable");
    let loader = ManifestLoader::new(&config.plugin_dir);
    Runner::new(&loader, config).run(&ids)
}

fn suite<'a>(report: &'a FullReport, module: &str) -> &'a AssistantSuite {
    report
        .suites()
        .iter()
        .find(|s| s.module_name() == module)
        .unwrap_or_else(|| panic!("no suite for {}", module))
}

fn status(suite: &AssistantSuite, check: &str) -> Status {
    suite
        .result(check)
        .unwrap_or_else(|| panic!("{} has no result named {:?}", suite.module_name(), check))
        .status
}

#[test]
fn test_discovery_order_and_denylist() {
    let report = run_all(&config());
    let modules: Vec<_> = report.suites().iter().map(|s| s.module_name()).collect();

    assert_eq!(
        modules,
        vec![
            "enhanced_broken_assistant",
            "enhanced_legal_assistant",
            "enhanced_tax_assistant",
        ]
    );
}

#[test]
fn test_unparseable_manifest_is_import_error() {
    let report = run_all(&config());
    let broken = suite(&report, "enhanced_broken_assistant");

    assert_eq!(broken.counts().total_tests, 1);
    assert_eq!(status(broken, "module import"), Status::Error);
    assert_eq!(broken.assistant_name(), "enhanced_broken_assistant");

    // the other plugins still ran
    assert!(suite(&report, "enhanced_legal_assistant").counts().total_tests > 1);
}

#[test]
fn test_valid_plugin_has_no_problems() {
    let report = run_all(&config());
    let legal = suite(&report, "enhanced_legal_assistant");

    assert_eq!(legal.assistant_name(), "Legal Assistant");
    assert!(!legal.has_problems(), "unexpected problems: {:?}", legal.results());
    assert_eq!(status(legal, "required keys"), Status::Passed);
    assert_eq!(status(legal, "assistant_class"), Status::Passed);
    assert_eq!(status(legal, "attribute: version"), Status::Passed);
    assert_eq!(status(legal, "operation: search"), Status::Skipped);
    assert!(legal.result("operation: _load_index").is_none());
    assert!(legal.result("operation: respond").is_none());
}

#[cfg(feature = "tree-sitter")]
#[test]
fn test_snippet_validation() {
    let report = run_all(&config());
    let legal = suite(&report, "enhanced_legal_assistant");

    assert_eq!(status(legal, "snippet: get_examples.contract_review"), Status::Passed);
    assert_eq!(status(legal, "snippet: get_examples.citation[0]"), Status::Passed);
    assert_eq!(status(legal, "snippet: get_setup.install"), Status::Skipped);

    let tax = suite(&report, "enhanced_tax_assistant");
    let deduction = tax.result("snippet: get_examples.deduction").unwrap();
    assert_eq!(deduction.status, Status::Failed);
    assert!(deduction.details.contains_key("snippet"));
    assert!(deduction.details["error"]
        .as_str()
        .unwrap()
        .starts_with("line "));
}

#[test]
fn test_contract_violations_reported() {
    let report = run_all(&config());
    let tax = suite(&report, "enhanced_tax_assistant");

    let keys = tax.result("required keys").unwrap();
    assert_eq!(keys.status, Status::Failed);
    assert_eq!(keys.details["missing"], serde_json::json!(["domain"]));

    assert_eq!(status(tax, "type: name"), Status::Passed);
    assert_eq!(status(tax, "type: version"), Status::Failed);
    assert!(tax.result("type: domain").is_none());
    assert_eq!(status(tax, "assistant_class"), Status::Failed);
    assert_eq!(status(tax, "system_prompt length"), Status::Failed);
    assert_eq!(status(tax, "tags"), Status::Failed);
    assert_eq!(status(tax, "attribute: version"), Status::Failed);
    assert_eq!(status(tax, "operation: get_rates"), Status::Failed);
    assert_eq!(status(tax, "operation: get_forms"), Status::Error);
}

#[test]
fn test_aggregate_invariants() {
    let report = run_all(&config());
    let counts = report.counts();

    assert!(counts.is_consistent());
    assert_eq!(
        counts.total_tests,
        report
            .suites()
            .iter()
            .map(|s| s.counts().total_tests)
            .sum::<usize>()
    );
    for s in report.suites() {
        assert!(s.counts().is_consistent());
        assert!(s.success_rate() >= 0.0 && s.success_rate() <= 100.0);
    }
    assert!(report.has_problems());
}

#[test]
fn test_parallel_matches_sequential() {
    let sequential = run_all(&config());
    let parallel = run_all(&Config {
        parallel: true,
        ..config()
    });

    let shape = |report: &FullReport| {
        report
            .suites()
            .iter()
            .map(|s| {
                s.results()
                    .iter()
                    .map(|r| (r.name.clone(), r.status))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(shape(&sequential), shape(&parallel));
}

#[test]
fn test_missing_plugin_dir_is_framework_error() {
    let config = Config {
        plugin_dir: plugins_path().join("does-not-exist"),
        ..Config::default()
    };
    let result = Discoverer::new(&config.file_pattern, &config.excluded_files)
        .unwrap()
        .discover(&config.plugin_dir);

    assert!(matches!(
        result,
        Err(assistcheck::FrameworkError::PluginDir(_))
    ));
}
