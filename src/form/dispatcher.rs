use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use crate::constants::MODEL_ROOT;
use crate::ChangeDetector;
use crate::FieldList;
use crate::NativeCallback;
use crate::Result;
use crate::StopWatching;
use crate::WatchExpression;
use crate::WatchListener;
use crate::WatchType;

/// Deep-watches the whole model and re-runs every field's expressions on change.
///
/// Fields without an expression hook are skipped. The returned handle is the
/// only subscription this installs.
pub fn install_model_dispatcher(
    detector: &dyn ChangeDetector,
    fields: &FieldList,
    label_prefix: &str,
) -> Result<StopWatching> {
    let fields = Arc::clone(fields);
    let label = format!("{label_prefix} Model Dispatcher");

    let listener = NativeCallback::new(label, move |args: Vec<Value>| {
        let model = args.into_iter().next().unwrap_or(Value::Null);
        let mut ran = 0;
        for field in fields.iter() {
            if field.run_expressions(&model) {
                ran += 1;
            }
        }
        trace!(fields = fields.len(), ran, "Model change dispatched");
        Value::Null
    });

    detector.subscribe(
        WatchExpression::Path(MODEL_ROOT.to_string()),
        WatchListener::Function(listener),
        WatchType::Watch,
        true,
    )
}
