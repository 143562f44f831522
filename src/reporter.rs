//! Error construction capability injected into the form engine.

use crate::ErrorCode;
use crate::ErrorReport;
use crate::FieldDescriptor;
use crate::FieldSummary;
use crate::ReportingConfig;

/// Builds structured error reports.
///
/// The engine decides *which* error happened and supplies the raw message;
/// implementations own the final, user facing wording.
pub trait ErrorReporter: Send + Sync {
    /// Error concerning one specific field
    fn field_error(
        &self,
        code: ErrorCode,
        message: &str,
        field: &FieldDescriptor,
    ) -> ErrorReport;

    /// Error concerning the form as a whole, optionally pointing at a field
    fn form_error(
        &self,
        code: ErrorCode,
        message: &str,
        field: Option<&FieldDescriptor>,
    ) -> ErrorReport;
}

/// Prefixes every message, e.g. `Formly Error: All field watchers must have a listener`.
#[derive(Debug, Clone)]
pub struct DefaultErrorReporter {
    prefix: String,
}

impl DefaultErrorReporter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn from_config(config: &ReportingConfig) -> Self {
        Self::new(config.error_prefix.clone())
    }

    fn format(
        &self,
        message: &str,
    ) -> String {
        if self.prefix.is_empty() {
            message.to_string()
        } else {
            format!("{}: {}", self.prefix, message)
        }
    }
}

impl Default for DefaultErrorReporter {
    fn default() -> Self {
        Self::from_config(&ReportingConfig::default())
    }
}

impl ErrorReporter for DefaultErrorReporter {
    fn field_error(
        &self,
        code: ErrorCode,
        message: &str,
        field: &FieldDescriptor,
    ) -> ErrorReport {
        ErrorReport {
            code,
            message: self.format(message),
            field: Some(FieldSummary::from(field)),
        }
    }

    fn form_error(
        &self,
        code: ErrorCode,
        message: &str,
        field: Option<&FieldDescriptor>,
    ) -> ErrorReport {
        ErrorReport {
            code,
            message: self.format(message),
            field: field.map(FieldSummary::from),
        }
    }
}
