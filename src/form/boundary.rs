//! Checks the hosting component runs before handing a form to the engine.

use std::collections::BTreeMap;

use crate::constants::DEFAULT_FORM_NAME;
use crate::ErrorCode;
use crate::ErrorReporter;
use crate::Result;
use crate::SharedModel;
use crate::UsageError;

/// Attributes the host declared on the form element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormAttributes {
    attributes: BTreeMap<String, String>,
}

impl FormAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.attributes.contains_key(name)
    }
}

/// Rejects legacy attributes and a missing or falsy model.
pub fn check_form_attributes(
    attributes: &FormAttributes,
    model: Option<&SharedModel>,
    reporter: &dyn ErrorReporter,
) -> Result<()> {
    if attributes.contains("result") {
        let report = reporter.form_error(
            ErrorCode::DeprecatedFormAttribute,
            "The \"result\" attribute on a form is no longer valid. Use \"model\" instead",
            None,
        );
        return Err(UsageError::DeprecatedUsage { report }.into());
    }

    if attributes.get("name").is_some_and(|name| name != DEFAULT_FORM_NAME) {
        let report = reporter.form_error(
            ErrorCode::DeprecatedFormAttribute,
            "The \"name\" attribute on a form is no longer valid. Use \"form\" instead",
            None,
        );
        return Err(UsageError::DeprecatedUsage { report }.into());
    }

    if !model.is_some_and(SharedModel::is_truthy) {
        let report = reporter.form_error(
            ErrorCode::ModelRequired,
            "The \"model\" attribute is required on a form.",
            None,
        );
        return Err(UsageError::MissingModel { report }.into());
    }

    Ok(())
}
