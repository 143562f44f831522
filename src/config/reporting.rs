use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_ERROR_PREFIX;
use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReportingConfig {
    /// Prepended to every usage error message; empty disables the prefix
    #[serde(default = "default_error_prefix")]
    pub error_prefix: String,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            error_prefix: default_error_prefix(),
        }
    }
}

impl ReportingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.error_prefix.contains('\n') {
            return Err(Error::Config(ConfigError::Message(
                "reporting.error_prefix must be a single line".into(),
            )));
        }
        Ok(())
    }
}

fn default_error_prefix() -> String {
    DEFAULT_ERROR_PREFIX.to_string()
}
