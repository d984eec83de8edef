//! Failure-tolerant invocation of plugin-supplied code.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::value::Value;

/// A plugin call that did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginFailure {
    /// Short message suitable for a report line.
    pub message: String,
    /// Full error chain (and backtrace, when captured).
    pub trace: String,
}

/// Tagged outcome of probing a surface operation.
#[derive(Debug, Clone)]
pub enum Invocation {
    Success(Value),
    /// The operation is outside the zero-argument contract.
    Skipped(String),
    Errored(PluginFailure),
}

/// Run plugin code, converting errors and panics into a `PluginFailure`.
pub fn guarded<T, F>(f: F) -> Result<T, PluginFailure>
where
    F: FnOnce() -> anyhow::Result<T>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(PluginFailure {
            message: err.to_string(),
            trace: format!("{:?}", err),
        }),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            Err(PluginFailure {
                trace: format!("panicked: {}", message),
                message: format!("panicked: {}", message),
            })
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
