//! Core types for validation results.

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use std::time::{Duration, Instant};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Passed,
    Failed,
    Skipped,
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Passed => "PASSED",
            Status::Failed => "FAILED",
            Status::Skipped => "SKIPPED",
            Status::Error => "ERROR",
        }
    }

    /// Failed and errored checks make a run unsuccessful.
    pub fn is_problem(&self) -> bool {
        matches!(self, Status::Failed | Status::Error)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PASSED" => Ok(Status::Passed),
            "FAILED" => Ok(Status::Failed),
            "SKIPPED" => Ok(Status::Skipped),
            "ERROR" => Ok(Status::Error),
            _ => Err(format!("unknown status: {}", s)),
        }
    }
}

/// One atomic check outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub status: Status,
    pub message: String,
    /// Seconds spent in the check, when measured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl TestResult {
    pub fn new(name: impl Into<String>, status: Status, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            message: message.into(),
            duration: None,
            details: serde_json::Map::new(),
        }
    }

    pub fn passed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, Status::Passed, message)
    }

    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, Status::Failed, message)
    }

    pub fn skipped(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, Status::Skipped, message)
    }

    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, Status::Error, message)
    }

    /// Attach a detail entry.
    pub fn with_detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    pub fn with_duration(mut self, elapsed: Duration) -> Self {
        self.duration = Some(elapsed.as_secs_f64());
        self
    }
}

/// Per-status tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub skipped: usize,
}

impl Counts {
    pub fn record(&mut self, status: Status) {
        self.total_tests += 1;
        match status {
            Status::Passed => self.passed += 1,
            Status::Failed => self.failed += 1,
            Status::Skipped => self.skipped += 1,
            Status::Error => self.errors += 1,
        }
    }

    /// Tally a sequence of results.
    pub fn of(results: &[TestResult]) -> Self {
        let mut counts = Self::default();
        for r in results {
            counts.record(r.status);
        }
        counts
    }

    /// Whether `total_tests` equals the sum of the status counts.
    pub fn is_consistent(&self) -> bool {
        self.total_tests == self.passed + self.failed + self.errors + self.skipped
    }

    /// Passed over total, as a percentage. Zero when there are no tests.
    pub fn success_rate(&self) -> f64 {
        if self.total_tests == 0 {
            return 0.0;
        }
        self.passed as f64 / self.total_tests as f64 * 100.0
    }

    pub fn has_problems(&self) -> bool {
        self.failed + self.errors > 0
    }
}

impl AddAssign for Counts {
    fn add_assign(&mut self, other: Counts) {
        self.total_tests += other.total_tests;
        self.passed += other.passed;
        self.failed += other.failed;
        self.errors += other.errors;
        self.skipped += other.skipped;
    }
}

/// Accumulates results for one plugin until it is finished.
#[derive(Debug)]
pub struct SuiteBuilder {
    assistant_name: String,
    module_name: String,
    results: Vec<TestResult>,
    counts: Counts,
    started: Instant,
}

impl SuiteBuilder {
    /// Start a suite. The display name defaults to the module identifier.
    pub fn new(module_name: impl Into<String>) -> Self {
        let module_name = module_name.into();
        Self {
            assistant_name: module_name.clone(),
            module_name,
            results: Vec::new(),
            counts: Counts::default(),
            started: Instant::now(),
        }
    }

    pub fn assistant_name(&self) -> &str {
        &self.assistant_name
    }

    pub fn set_assistant_name(&mut self, name: impl Into<String>) {
        self.assistant_name = name.into();
    }

    pub fn push(&mut self, result: TestResult) {
        tracing::debug!(
            module = %self.module_name,
            check = %result.name,
            status = %result.status,
            "{}",
            result.message
        );
        self.counts.record(result.status);
        self.results.push(result);
    }

    pub fn counts(&self) -> Counts {
        self.counts
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    /// Freeze the suite, computing counts and elapsed time.
    pub fn finish(self) -> AssistantSuite {
        let counts = Counts::of(&self.results);
        debug_assert_eq!(counts, self.counts);
        AssistantSuite {
            assistant_name: self.assistant_name,
            module_name: self.module_name,
            success_rate: counts.success_rate(),
            duration: self.started.elapsed().as_secs_f64(),
            counts,
            results: self.results,
        }
    }
}

/// The finished results for one plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantSuite {
    assistant_name: String,
    module_name: String,
    #[serde(flatten)]
    counts: Counts,
    success_rate: f64,
    /// Seconds
    duration: f64,
    results: Vec<TestResult>,
}

impl AssistantSuite {
    pub fn assistant_name(&self) -> &str {
        &self.assistant_name
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn counts(&self) -> Counts {
        self.counts
    }

    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    /// Find the first result with the given check name.
    pub fn result(&self, name: &str) -> Option<&TestResult> {
        self.results.iter().find(|r| r.name == name)
    }

    pub fn has_problems(&self) -> bool {
        self.counts.has_problems()
    }
}

/// Aggregate of all suites for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullReport {
    timestamp: String,
    #[serde(flatten)]
    counts: Counts,
    success_rate: f64,
    /// Seconds
    duration: f64,
    suites: Vec<AssistantSuite>,
}

impl FullReport {
    /// Build a report from finished suites, preserving their order.
    pub fn new(suites: Vec<AssistantSuite>, elapsed: Duration) -> Self {
        let mut counts = Counts::default();
        for suite in &suites {
            counts += suite.counts();
        }
        debug_assert!(counts.is_consistent());
        debug_assert_eq!(
            counts.total_tests,
            suites.iter().map(|s| s.counts().total_tests).sum::<usize>()
        );

        Self {
            timestamp: now_rfc3339(),
            success_rate: counts.success_rate(),
            duration: elapsed.as_secs_f64(),
            counts,
            suites,
        }
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn counts(&self) -> Counts {
        self.counts
    }

    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn suites(&self) -> &[AssistantSuite] {
        &self.suites
    }

    /// True when any check failed or errored.
    pub fn has_problems(&self) -> bool {
        self.counts.has_problems()
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string())
}
