use std::sync::Arc;

use serde_json::Value;

use crate::Expression;
use crate::FieldDescriptor;
use crate::Listener;
use crate::ModelPath;
use crate::NativeCallback;
use crate::WatchCall;
use crate::WatchExpression;
use crate::WatchListener;

/// Adapts field-aware watch functions to the runtime's calling convention.
///
/// A wrapped function receives `(field, ...native args, stop handle)`.
/// Paths and non-callable listeners pass through unchanged.
#[derive(Debug, Clone)]
pub struct ExpressionWrapper {
    label_prefix: String,
}

impl ExpressionWrapper {
    pub fn new(label_prefix: impl Into<String>) -> Self {
        Self {
            label_prefix: label_prefix.into(),
        }
    }

    /// Runtime expression of `field.watcher[watcher_index]`.
    ///
    /// Without a declared expression, or with an empty path, the field's own
    /// model slot is watched.
    pub fn expression(
        &self,
        field: &Arc<FieldDescriptor>,
        watcher_index: usize,
    ) -> WatchExpression {
        let declared = field
            .watcher
            .get(watcher_index)
            .and_then(|spec| spec.expression.clone());

        match declared {
            Some(Expression::Path(path)) if !path.is_empty() => WatchExpression::Path(path),
            Some(Expression::Function(original)) => {
                let label = self.label("Watch Expression", field);
                let field = Arc::clone(field);
                WatchExpression::Function(NativeCallback::new(label, move |args| {
                    original(modify_args(&field, watcher_index, args))
                }))
            }
            Some(Expression::Path(_)) | None => {
                WatchExpression::Path(ModelPath::for_key(&key_of(field)))
            }
        }
    }

    /// Runtime listener of `field.watcher[watcher_index]`.
    pub fn listener(
        &self,
        field: &Arc<FieldDescriptor>,
        watcher_index: usize,
    ) -> WatchListener {
        let declared = field
            .watcher
            .get(watcher_index)
            .and_then(|spec| spec.listener.clone());

        match declared {
            Some(Listener::Function(original)) => {
                let label = self.label("Watch Listener", field);
                let field = Arc::clone(field);
                WatchListener::Function(NativeCallback::new(label, move |args| {
                    original(modify_args(&field, watcher_index, args))
                }))
            }
            Some(Listener::Value(value)) => WatchListener::Value(value),
            None => WatchListener::Value(Value::Null),
        }
    }

    fn label(
        &self,
        what: &str,
        field: &FieldDescriptor,
    ) -> String {
        format!("{} {} for field for {}", self.label_prefix, what, key_of(field))
    }
}

/// Prepends the field and appends the watcher's stop handle, as of call time.
pub fn modify_args(
    field: &Arc<FieldDescriptor>,
    watcher_index: usize,
    native: Vec<Value>,
) -> WatchCall {
    let stop_watching = field
        .watcher
        .get(watcher_index)
        .and_then(|spec| spec.stop_watching().cloned());

    WatchCall {
        field: Arc::clone(field),
        args: native,
        stop_watching,
    }
}

fn key_of(field: &FieldDescriptor) -> String {
    field.key.as_ref().map(ToString::to_string).unwrap_or_default()
}
