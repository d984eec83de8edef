//! Static surface probing.
//!
//! Invokes every public class-level operation with no arguments and
//! classifies the result shape. Content is not validated here; the values
//! are handed back for snippet extraction.

use std::time::Instant;

use crate::plugin::{AssistantClass, Invocation};
use crate::value::Value;

use super::{SuiteBuilder, TestResult};

/// How many names or keys are echoed in a message.
const PREVIEW_LEN: usize = 5;

/// Output of a successful surface operation.
#[derive(Debug, Clone)]
pub struct SurfaceOutput {
    pub operation: String,
    pub value: Value,
}

fn preview(names: &[String]) -> String {
    let mut shown = names.iter().take(PREVIEW_LEN).cloned().collect::<Vec<_>>().join(", ");
    if names.len() > PREVIEW_LEN {
        shown.push_str(", ...");
    }
    shown
}

/// Probe the class's public class-level operations.
pub fn probe_surface(class: &dyn AssistantClass, suite: &mut SuiteBuilder) -> Vec<SurfaceOutput> {
    let mut operations: Vec<_> = class
        .operations()
        .into_iter()
        .filter(|op| op.is_class_level() && op.is_public())
        .collect();
    operations.sort_by(|a, b| a.name.cmp(&b.name));

    if operations.is_empty() {
        suite.push(TestResult::skipped(
            "surface operations",
            format!("{} has no public class-level operations", class.name()),
        ));
        return Vec::new();
    }

    let names: Vec<String> = operations.iter().map(|op| op.name.clone()).collect();
    suite.push(
        TestResult::passed(
            "surface operations",
            format!("{} public class-level operations: {}", names.len(), preview(&names)),
        )
        .with_detail("count", names.len()),
    );

    let mut outputs = Vec::new();
    for op in operations {
        let check = format!("operation: {}", op.name);
        let started = Instant::now();
        let invocation = op.invoke();
        let elapsed = started.elapsed();

        let result = match invocation {
            Invocation::Success(Value::Null) => {
                TestResult::failed(check, format!("{} returned no value", op.name))
            }
            Invocation::Success(value) => {
                let result = match &value {
                    Value::Map(m) => {
                        let keys: Vec<String> = m.keys().cloned().collect();
                        TestResult::passed(
                            check,
                            format!("returned mapping with {} keys: {}", keys.len(), preview(&keys)),
                        )
                        .with_detail("keys", keys.into_iter().take(PREVIEW_LEN).collect::<Vec<_>>())
                    }
                    Value::Seq(items) => TestResult::passed(
                        check,
                        format!("returned sequence with {} items", items.len()),
                    ),
                    other => TestResult::passed(check, format!("returned {}", other.kind())),
                };
                outputs.push(SurfaceOutput {
                    operation: op.name.clone(),
                    value,
                });
                result
            }
            Invocation::Skipped(reason) => TestResult::skipped(check, reason),
            Invocation::Errored(failure) => {
                TestResult::error(check, format!("{} raised: {}", op.name, failure.message))
                    .with_detail("trace", failure.trace)
            }
        };
        suite.push(result.with_duration(elapsed));
    }

    outputs
}
