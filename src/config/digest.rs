use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

use crate::constants::DEFAULT_MAX_DIGEST_ITERATIONS;
use crate::Error;
use crate::Result;

/// Parameters of the built-in change-detection runtime
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DigestConfig {
    /// Follow-up passes a digest may run after its first one
    ///
    /// A listener that keeps mutating the model it watches would otherwise
    /// loop forever. When the last allowed follow-up pass still observes a
    /// change the digest fails with `DigestError::IterationLimit`.
    ///
    /// **Default**: 10
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
        }
    }
}

impl DigestConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(Error::Config(ConfigError::Message(
                "digest.max_iterations must be greater than 0".into(),
            )));
        }

        if self.max_iterations > 1000 {
            warn!(
                "digest.max_iterations ({}) is very large; runaway listeners will take long to detect",
                self.max_iterations
            );
        }

        Ok(())
    }
}

const fn default_max_iterations() -> usize {
    DEFAULT_MAX_DIGEST_ITERATIONS
}
