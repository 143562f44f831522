use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_FIRST_FORM_ID;
use crate::constants::DEFAULT_FORM_ID_PREFIX;
use crate::constants::DEFAULT_LABEL_PREFIX;
use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FormConfig {
    /// Prefix of generated form ids, `{id_prefix}_{n}`
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,

    /// First number handed out by the form id counter
    #[serde(default = "default_first_id")]
    pub first_id: u64,

    /// Prefix of the debug labels attached to wrapped watch functions
    #[serde(default = "default_label_prefix")]
    pub label_prefix: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            id_prefix: default_id_prefix(),
            first_id: default_first_id(),
            label_prefix: default_label_prefix(),
        }
    }
}

impl FormConfig {
    /// Form ids end up as element ids, so the prefix must be a single token.
    pub fn validate(&self) -> Result<()> {
        if self.id_prefix.is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "form.id_prefix must not be empty".into(),
            )));
        }

        if self.id_prefix.chars().any(char::is_whitespace) {
            return Err(Error::Config(ConfigError::Message(format!(
                "form.id_prefix '{}' must not contain whitespace",
                self.id_prefix
            ))));
        }

        Ok(())
    }
}

fn default_id_prefix() -> String {
    DEFAULT_FORM_ID_PREFIX.to_string()
}

const fn default_first_id() -> u64 {
    DEFAULT_FIRST_FORM_ID
}

fn default_label_prefix() -> String {
    DEFAULT_LABEL_PREFIX.to_string()
}
