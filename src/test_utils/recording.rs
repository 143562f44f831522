use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::ErrorCode;
use crate::ErrorReport;
use crate::ErrorReporter;
use crate::FieldDescriptor;
use crate::FieldSummary;
use crate::WatchCall;

/// Ordered log of calls made by test callbacks
#[derive(Debug, Clone, Default)]
pub(crate) struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(
        &self,
        entry: impl Into<String>,
    ) {
        self.entries.lock().push(entry.into());
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub(crate) fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Listener that logs `{tag}:{new}` on every call
    pub(crate) fn listener(
        &self,
        tag: &str,
    ) -> impl Fn(WatchCall) -> Value + Send + Sync + 'static {
        let log = self.clone();
        let tag = tag.to_string();
        move |call: WatchCall| {
            let new = call.arg(0).cloned().unwrap_or(Value::Null);
            log.push(format!("{tag}:{new}"));
            Value::Null
        }
    }

    /// Expression hook that logs the field's tag on every run
    pub(crate) fn runner(
        &self,
        tag: &str,
    ) -> impl Fn(&Value) + Send + Sync + 'static {
        let log = self.clone();
        let tag = tag.to_string();
        move |_model: &Value| log.push(tag.clone())
    }
}

/// Reporter that remembers every report it built
#[derive(Debug, Default)]
pub(crate) struct RecordingReporter {
    reports: Mutex<Vec<ErrorReport>>,
}

impl RecordingReporter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reports(&self) -> Vec<ErrorReport> {
        self.reports.lock().clone()
    }

    fn record(
        &self,
        report: ErrorReport,
    ) -> ErrorReport {
        self.reports.lock().push(report.clone());
        report
    }
}

impl ErrorReporter for RecordingReporter {
    fn field_error(
        &self,
        code: ErrorCode,
        message: &str,
        field: &FieldDescriptor,
    ) -> ErrorReport {
        self.record(ErrorReport {
            code,
            message: message.to_string(),
            field: Some(FieldSummary::from(field)),
        })
    }

    fn form_error(
        &self,
        code: ErrorCode,
        message: &str,
        field: Option<&FieldDescriptor>,
    ) -> ErrorReport {
        self.record(ErrorReport {
            code,
            message: message.to_string(),
            field: field.map(FieldSummary::from),
        })
    }
}
