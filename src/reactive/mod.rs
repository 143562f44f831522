//! Change-detection seam between the form engine and its host runtime.
//!
//! The engine never polls the model itself. It hands watch expressions and
//! listeners to a [`ChangeDetector`] and keeps the returned [`StopWatching`]
//! handles. [`Digest`] is the built-in dirty-checking implementation:
//!
//! ```text
//!  host mutates model ──► Digest::run()
//!                            │  pass over watchers in subscription order
//!                            ▼
//!                  evaluate expression against model
//!                            │  changed (or first evaluation)?
//!                            ▼
//!                  listener(new, old, model)
//!                            │  any change in this pass?
//!                            └──► run another pass (bounded)
//! ```

mod digest;
mod model;
mod path;
mod stop;
pub use digest::*;
pub use model::*;
pub use path::*;
pub use stop::*;

#[cfg(test)]
mod path_test;

use std::fmt;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::Result;

/// Function in the runtime's own calling convention: native arguments in, value out.
pub type NativeFn = dyn Fn(Vec<Value>) -> Value + Send + Sync;

/// A runtime-callable function tagged with a human-readable debug label.
#[derive(Clone)]
pub struct NativeCallback {
    label: String,
    func: Arc<NativeFn>,
}

impl NativeCallback {
    pub fn new<F>(
        label: impl Into<String>,
        func: F,
    ) -> Self
    where
        F: Fn(Vec<Value>) -> Value + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            func: Arc::new(func),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn call(
        &self,
        args: Vec<Value>,
    ) -> Value {
        (self.func)(args)
    }
}

impl fmt::Debug for NativeCallback {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_tuple("NativeCallback").field(&self.label).finish()
    }
}

/// Expression as handed to the runtime.
#[derive(Debug, Clone)]
pub enum WatchExpression {
    /// Path resolved by the runtime against the model, e.g. `model['email']`
    Path(String),
    /// Called with `[model]`
    Function(NativeCallback),
}

/// Listener as handed to the runtime.
#[derive(Debug, Clone)]
pub enum WatchListener {
    /// Called with `[new, old, model]`
    Function(NativeCallback),
    /// Not callable; the runtime tracks the expression but calls nothing
    Value(Value),
}

/// Subscription mode of a watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WatchType {
    /// Fires when the watched value changes
    #[default]
    #[serde(rename = "$watch", alias = "watch")]
    Watch,
    /// Fires when the watched collection changes one level deep
    #[serde(rename = "$watchCollection", alias = "watchCollection")]
    WatchCollection,
}

/// Host change-detection runtime.
#[cfg_attr(test, automock)]
pub trait ChangeDetector: Send + Sync {
    /// Registers a watcher and returns its unsubscribe capability.
    ///
    /// Watchers fire in the order they were subscribed.
    fn subscribe(
        &self,
        expression: WatchExpression,
        listener: WatchListener,
        watch_type: WatchType,
        deep: bool,
    ) -> Result<StopWatching>;
}
