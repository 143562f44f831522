use tracing::debug;

use crate::ErrorCode;
use crate::ErrorReporter;
use crate::FieldDescriptor;
use crate::Result;
use crate::UsageError;

/// Rejects the whole form at the first field declaring attributes outside
/// the recognized set.
pub fn validate_schema(
    fields: &[FieldDescriptor],
    reporter: &dyn ErrorReporter,
) -> Result<()> {
    for field in fields {
        let extra: Vec<String> = field.unrecognized_attributes().map(str::to_string).collect();
        if extra.is_empty() {
            continue;
        }

        debug!(?extra, key = ?field.key, "Field declares disallowed attributes");
        let message = format!(
            "You have specified field properties that are not allowed: \"{}\"",
            extra.join(", ")
        );
        let report = reporter.form_error(ErrorCode::DisallowedFieldProperties, &message, Some(field));
        return Err(UsageError::SchemaViolation {
            report,
            attributes: extra,
        }
        .into());
    }
    Ok(())
}
