use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Number;

/// Identity of a field within one form.
///
/// Declared keys are usually names; fields without one fall back to their
/// position in the field list. Any other scalar a host declares is kept
/// as-is so it survives key resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldKey {
    Index(u64),
    Name(String),
    /// Negative or fractional numbers
    Number(Number),
    Flag(bool),
}

impl FieldKey {
    /// `0`, `0.0`, `false` and the empty name do not count as a declared key
    pub fn is_falsy(&self) -> bool {
        match self {
            FieldKey::Index(index) => *index == 0,
            FieldKey::Name(name) => name.is_empty(),
            FieldKey::Number(number) => number.as_f64().map_or(true, |n| n == 0.0),
            FieldKey::Flag(flag) => !flag,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            FieldKey::Name(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            FieldKey::Index(index) => write!(f, "{index}"),
            FieldKey::Name(name) => f.write_str(name),
            FieldKey::Number(number) => write!(f, "{number}"),
            FieldKey::Flag(flag) => write!(f, "{flag}"),
        }
    }
}

impl From<&str> for FieldKey {
    fn from(name: &str) -> Self {
        FieldKey::Name(name.to_string())
    }
}

impl From<String> for FieldKey {
    fn from(name: String) -> Self {
        FieldKey::Name(name)
    }
}

impl From<u64> for FieldKey {
    fn from(index: u64) -> Self {
        FieldKey::Index(index)
    }
}

impl From<usize> for FieldKey {
    fn from(index: usize) -> Self {
        FieldKey::Index(index as u64)
    }
}

impl From<bool> for FieldKey {
    fn from(flag: bool) -> Self {
        FieldKey::Flag(flag)
    }
}
