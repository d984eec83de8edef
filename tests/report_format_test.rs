//! Tests for the persisted report formats.
//!
//! Runs the pipeline over testdata, writes the reports to a scratch
//! directory and checks their structure.

use std::path::PathBuf;

use assistcheck::check::Runner;
use assistcheck::plugin::{Discoverer, ManifestLoader};
use assistcheck::report::{self, HTML_REPORT, JSON_REPORT};
use assistcheck::{syntax, Config, FullReport};
use tempfile::TempDir;

fn run_testdata() -> FullReport {
    syntax::init();

    let config = Config {
        plugin_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("testdata")
            .join("assistants"),
        ..Config::default()
    };
    let ids = Discoverer::new(&config.file_pattern, &config.excluded_files)
        .unwrap()
        .discover(&config.plugin_dir)
        .unwrap();
    let loader = ManifestLoader::new(&config.plugin_dir);
    Runner::new(&loader, &config).run(&ids)
}

#[test]
fn test_json_report_structure() {
    let temp = TempDir::new().unwrap();
    let report = run_testdata();
    let paths = report::write_reports(&report, temp.path()).unwrap();

    assert_eq!(paths.json, temp.path().join(JSON_REPORT));
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&paths.json).unwrap()).unwrap();

    assert_eq!(json["total_tests"], report.counts().total_tests);
    assert_eq!(json["suites"].as_array().unwrap().len(), 3);

    let suites = json["suites"].as_array().unwrap();
    assert_eq!(suites[0]["module_name"], "enhanced_broken_assistant");
    assert_eq!(suites[1]["assistant_name"], "Legal Assistant");
    assert_eq!(suites[0]["results"][0]["name"], "module import");
    assert_eq!(suites[0]["results"][0]["status"], "ERROR");

    // every status is one of the four upper-case names
    for suite in suites {
        for result in suite["results"].as_array().unwrap() {
            let status = result["status"].as_str().unwrap();
            assert!(["PASSED", "FAILED", "SKIPPED", "ERROR"].contains(&status));
        }
    }
}

#[test]
fn test_html_report_structure() {
    let temp = TempDir::new().unwrap();
    let report = run_testdata();
    let paths = report::write_reports(&report, &temp.path().join("reports")).unwrap();

    assert_eq!(paths.html, temp.path().join("reports").join(HTML_REPORT));
    let html = std::fs::read_to_string(&paths.html).unwrap();

    assert!(html.contains("<table class=\"sortable\">"));
    assert_eq!(html.matches("<details").count(), 3);
    assert!(html.contains("Legal Assistant"));
    assert!(html.contains("class=\"has-failures\""));
    assert!(html.contains("class=\"all-clear\""));
    assert!(html.contains("forms database unavailable"));
}

#[test]
fn test_empty_plugin_dir_report() {
    let temp = TempDir::new().unwrap();
    let empty = temp.path().join("assistants");
    std::fs::create_dir(&empty).unwrap();

    let config = Config {
        plugin_dir: empty,
        ..Config::default()
    };
    let ids = Discoverer::new(&config.file_pattern, &config.excluded_files)
        .unwrap()
        .discover(&config.plugin_dir)
        .unwrap();
    assert!(ids.is_empty());

    let loader = ManifestLoader::new(&config.plugin_dir);
    let report = Runner::new(&loader, &config).run(&ids);
    assert_eq!(report.counts().total_tests, 0);
    assert_eq!(report.success_rate(), 0.0);
    assert!(!report.has_problems());

    let paths = report::write_reports(&report, &temp.path().join("out")).unwrap();
    assert!(paths.json.is_file());
    assert!(paths.html.is_file());
}
