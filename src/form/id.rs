use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

#[cfg(test)]
use mockall::automock;

use crate::FormConfig;

/// Hands out form ids; injected so ids stay out of global state.
#[cfg_attr(test, automock)]
pub trait FormIdSource: Send + Sync {
    fn next_id(&self) -> String;
}

/// `{prefix}_1`, `{prefix}_2`, ...
#[derive(Debug)]
pub struct SequentialFormIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialFormIds {
    pub fn new(
        prefix: impl Into<String>,
        first: u64,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(first),
        }
    }

    pub fn from_config(config: &FormConfig) -> Self {
        Self::new(config.id_prefix.clone(), config.first_id)
    }
}

impl Default for SequentialFormIds {
    fn default() -> Self {
        Self::from_config(&FormConfig::default())
    }
}

impl FormIdSource for SequentialFormIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}_{}", self.prefix, n)
    }
}
