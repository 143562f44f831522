use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde_json::json;
use serde_json::Value;

use crate::Digest;
use crate::DigestConfig;
use crate::FieldDescriptor;
use crate::SharedModel;
use crate::StopWatching;

pub(crate) fn input_field(key: &str) -> FieldDescriptor {
    FieldDescriptor::new().with_key(key).with_type("input")
}

pub(crate) fn unkeyed_field(field_type: &str) -> FieldDescriptor {
    FieldDescriptor::new().with_type(field_type)
}

pub(crate) fn digest_with(model: Value) -> (SharedModel, Digest) {
    let model = SharedModel::new(model);
    let digest = Digest::new(model.clone());
    (model, digest)
}

pub(crate) fn digest_with_limit(
    model: Value,
    max_iterations: usize,
) -> (SharedModel, Digest) {
    let model = SharedModel::new(model);
    let digest = Digest::with_config(model.clone(), &DigestConfig { max_iterations });
    (model, digest)
}

pub(crate) fn empty_model() -> SharedModel {
    SharedModel::new(json!({}))
}

/// Stop handle that counts how often its release actually ran
pub(crate) fn counting_stop(counter: &Arc<AtomicUsize>) -> StopWatching {
    let counter = Arc::clone(counter);
    StopWatching::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

pub(crate) fn noop_stop() -> StopWatching {
    StopWatching::new(|| {})
}
