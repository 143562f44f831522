//! Form Engine Error Hierarchy
//!
//! Configuration mistakes in form or field declarations surface as
//! [`UsageError`]s, failures of the change-detection runtime as
//! [`DigestError`]s. Everything is reported synchronously at construction or
//! digest time; nothing is retried.

use std::fmt;

use config::ConfigError;

use crate::FieldSummary;
use crate::StopWatching;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed form attributes or field declarations
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// Change-detection runtime failures
    #[error(transparent)]
    Digest(#[from] DigestError),

    /// Engine configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Field schema could not be decoded
    #[error("Field decoding failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Broken internal invariants
    #[error("Fatal error: {0}")]
    Fatal(String),
}

impl Error {
    /// Stable error code of usage errors, `None` for every other kind
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Error::Usage(e) => Some(e.report().code),
            _ => None,
        }
    }
}

/// Stable, taggable identifiers for usage errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A field declares attributes outside the recognized set
    DisallowedFieldProperties,
    /// A watcher spec omits its listener
    MissingWatcherListener,
    /// Legacy form attributes (`result`, custom `name`)
    DeprecatedFormAttribute,
    /// The form was set up without a usable model
    ModelRequired,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DisallowedFieldProperties => {
                "you-have-specified-field-properties-that-are-not-allowed"
            }
            ErrorCode::MissingWatcherListener => "all-field-watchers-must-have-a-listener",
            ErrorCode::DeprecatedFormAttribute => "deprecated-form-attribute",
            ErrorCode::ModelRequired => "form-model-required",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error payload built by an [`crate::ErrorReporter`].
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReport {
    pub code: ErrorCode,
    /// Fully formatted, user facing message
    pub message: String,
    /// The offending field, if the error concerns one
    pub field: Option<FieldSummary>,
}

impl fmt::Display for ErrorReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{} ({})", self.message, field),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    /// A field declares attributes outside the recognized set
    #[error("{report}")]
    SchemaViolation {
        report: ErrorReport,
        /// Disallowed attribute names, in declaration order
        attributes: Vec<String>,
    },

    /// A watcher spec has no listener
    #[error("{report}")]
    MissingListener {
        report: ErrorReport,
        /// Watchers of earlier fields that stay subscribed; stopping them is
        /// up to the caller
        subscribed: Vec<StopWatching>,
    },

    /// Legacy form attribute used by the host
    #[error("{report}")]
    DeprecatedUsage { report: ErrorReport },

    /// Model absent or falsy at setup
    #[error("{report}")]
    MissingModel { report: ErrorReport },
}

impl UsageError {
    pub fn report(&self) -> &ErrorReport {
        match self {
            UsageError::SchemaViolation { report, .. }
            | UsageError::MissingListener { report, .. }
            | UsageError::DeprecatedUsage { report }
            | UsageError::MissingModel { report } => report,
        }
    }

    /// Subscriptions left behind by a failed registration
    pub fn subscribed(&self) -> &[StopWatching] {
        match self {
            UsageError::MissingListener { subscribed, .. } => subscribed,
            _ => &[],
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    /// Path expression could not be parsed
    #[error("Invalid watch expression `{expression}`: {reason}")]
    InvalidExpression { expression: String, reason: String },

    /// The model kept changing across too many passes
    #[error("Model did not settle after {limit} digest iterations")]
    IterationLimit { limit: usize },

    /// `run` was re-entered from inside a listener
    #[error("Digest already in progress")]
    InProgress,
}
