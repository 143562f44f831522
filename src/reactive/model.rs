use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

/// The externally owned form model.
///
/// Clones are handles onto the same value tree. The form engine only keeps
/// a back-reference; mutation discipline is the host's business.
#[derive(Debug, Clone, Default)]
pub struct SharedModel {
    inner: Arc<RwLock<Value>>,
}

impl SharedModel {
    pub fn new(value: Value) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
        }
    }

    /// Provides read access to the model
    pub fn read<R>(
        &self,
        f: impl FnOnce(&Value) -> R,
    ) -> R {
        let guard = self.inner.read();
        f(&guard)
    }

    /// Provides write access to the model
    pub fn update<R>(
        &self,
        f: impl FnOnce(&mut Value) -> R,
    ) -> R {
        let mut guard = self.inner.write();
        f(&mut guard)
    }

    pub fn snapshot(&self) -> Value {
        self.inner.read().clone()
    }

    pub fn is_truthy(&self) -> bool {
        self.read(is_truthy)
    }

    pub fn ptr_eq(
        &self,
        other: &SharedModel,
    ) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl From<Value> for SharedModel {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

/// `null`, `false`, `0` and `""` are falsy; containers never are.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
