use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;
use serde_json::Value;
use tracing_test::traced_test;

use super::*;
use crate::test_utils::digest_with;
use crate::test_utils::input_field;
use crate::test_utils::unkeyed_field;
use crate::test_utils::CallLog;
use crate::test_utils::RecordingReporter;
use crate::Digest;
use crate::EngineConfig;
use crate::Error;
use crate::ErrorCode;
use crate::FieldDescriptor;
use crate::FieldKey;
use crate::Listener;
use crate::SharedModel;
use crate::UsageError;
use crate::WatchCall;
use crate::WatcherSpec;

fn builder(digest: &Digest) -> FormBuilder {
    FormBuilder::new(Arc::new(digest.clone())).model(digest.model().clone())
}

#[test]
#[traced_test]
fn builds_with_resolved_keys_in_declaration_order() {
    let (_model, digest) = digest_with(json!({}));

    let form = builder(&digest)
        .field(unkeyed_field("input"))
        .field(input_field("email"))
        .field(unkeyed_field("select"))
        .build()
        .unwrap();

    let keys: Vec<_> = form.fields().iter().map(|field| field.key.clone()).collect();
    assert_eq!(
        keys,
        vec![Some(FieldKey::Index(0)), Some(FieldKey::from("email")), Some(FieldKey::Index(2))]
    );
    assert!(form.is_active());
    assert!(logs_contain("Form constructed"));
}

#[test]
fn looks_fields_up_by_key() {
    let (_model, digest) = digest_with(json!({}));
    let form = builder(&digest).field(input_field("email")).field(unkeyed_field("x")).build().unwrap();

    assert!(form.field(&FieldKey::from("email")).is_some());
    assert!(form.field(&FieldKey::Index(1)).is_some());
    assert!(form.field(&FieldKey::from("missing")).is_none());
}

#[test]
fn form_ids_come_from_the_injected_source() {
    let (_model, digest) = digest_with(json!({}));
    let mut ids = MockFormIdSource::new();
    ids.expect_next_id().times(1).return_const("custom_7".to_string());

    let form = builder(&digest).id_source(Arc::new(ids)).build().unwrap();

    assert_eq!(form.id(), "custom_7");
}

#[test]
fn default_ids_are_sequential_per_builder_source() {
    let (_model, digest) = digest_with(json!({}));
    let ids: Arc<dyn FormIdSource> = Arc::new(SequentialFormIds::default());

    let first = builder(&digest).id_source(Arc::clone(&ids)).build().unwrap();
    let second = builder(&digest).id_source(ids).build().unwrap();

    assert_eq!(first.id(), "formly_1");
    assert_eq!(second.id(), "formly_2");
}

#[test]
fn schema_violation_registers_nothing() {
    let (_model, digest) = digest_with(json!({}));
    let log = CallLog::new();
    let offending = FieldDescriptor::new()
        .with_key("bad")
        .with_attribute("label", json!("Bad"))
        .unwrap();

    let err = builder(&digest)
        .field(input_field("ok").with_watcher(WatcherSpec::new().listener_fn(log.listener("ok"))))
        .field(offending)
        .build()
        .unwrap_err();

    assert_eq!(err.code(), Some(ErrorCode::DisallowedFieldProperties));
    assert_eq!(digest.watcher_count(), 0);
    digest.run().unwrap();
    assert_eq!(log.len(), 0);
}

#[test]
fn missing_listener_keeps_earlier_watchers_and_skips_the_dispatcher() {
    let (_model, digest) = digest_with(json!({}));
    let reporter = Arc::new(RecordingReporter::new());

    let err = builder(&digest)
        .reporter(reporter.clone())
        .field(input_field("first").with_watcher(WatcherSpec::new().listener(Listener::Value(json!(1)))))
        .field(input_field("second").with_watcher(WatcherSpec::new()))
        .build()
        .unwrap_err();

    assert!(matches!(err, Error::Usage(UsageError::MissingListener { .. })));
    assert_eq!(digest.watcher_count(), 1);
    let reports = reporter.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].field.as_ref().and_then(|f| f.key.clone()), Some(FieldKey::from("second")));
}

#[test]
fn missing_model_fails_before_anything_is_subscribed() {
    let (_model, digest) = digest_with(json!({}));

    let err = FormBuilder::new(Arc::new(digest.clone()))
        .field(input_field("a").with_watcher(WatcherSpec::new().listener(Listener::Value(json!(1)))))
        .build()
        .unwrap_err();

    assert_eq!(err.code(), Some(ErrorCode::ModelRequired));
    assert_eq!(digest.watcher_count(), 0);
}

#[test]
fn deprecated_attributes_are_rejected() {
    let (_model, digest) = digest_with(json!({}));

    let err = builder(&digest).attribute("result", "vm.result").build().unwrap_err();

    assert_eq!(err.code(), Some(ErrorCode::DeprecatedFormAttribute));
    assert_eq!(digest.watcher_count(), 0);
}

#[test]
fn subscribes_watchers_plus_one_dispatcher() {
    let (_model, digest) = digest_with(json!({ "a": 1 }));

    let form = builder(&digest)
        .field(input_field("a").with_watchers([
            WatcherSpec::new().listener(Listener::Value(json!(1))),
            WatcherSpec::new().listener(Listener::Value(json!(2))),
        ]))
        .field(input_field("b"))
        .build()
        .unwrap();

    assert_eq!(form.watcher_count(), 2);
    assert_eq!(digest.watcher_count(), 3);
}

#[test]
fn model_changes_dispatch_to_fields_in_order() {
    let (model, digest) = digest_with(json!({ "x": 0 }));
    let log = CallLog::new();

    let _form = builder(&digest)
        .field(input_field("f1").with_expression_runner(log.runner("F1")))
        .field(input_field("f2").with_expression_runner(log.runner("F2")))
        .field(input_field("f3").with_expression_runner(log.runner("F3")))
        .build()
        .unwrap();
    digest.run().unwrap();
    log.clear();

    model.update(|m| m["x"] = json!(1));
    digest.run().unwrap();

    assert_eq!(log.entries(), vec!["F1", "F2", "F3"]);
}

#[test]
fn teardown_releases_every_subscription_once() {
    let (_model, digest) = digest_with(json!({ "a": 1 }));
    let log = CallLog::new();

    let mut form = builder(&digest)
        .field(input_field("a").with_watcher(WatcherSpec::new().listener_fn(log.listener("a"))))
        .field(input_field("b").with_expression_runner(log.runner("b")))
        .build()
        .unwrap();
    digest.run().unwrap();
    log.clear();

    assert_eq!(form.teardown(), 2);
    assert_eq!(form.teardown(), 0);
    assert!(!form.is_active());
    assert_eq!(digest.watcher_count(), 0);

    digest.apply(|m| m["a"] = json!(2)).unwrap();
    assert_eq!(log.len(), 0);
}

#[test]
fn dropping_the_form_releases_its_subscriptions() {
    let (_model, digest) = digest_with(json!({ "a": 1 }));

    let form = builder(&digest)
        .field(input_field("a").with_watcher(WatcherSpec::new().listener(Listener::Value(json!(1)))))
        .build()
        .unwrap();
    assert_eq!(digest.watcher_count(), 2);

    drop(form);

    assert_eq!(digest.watcher_count(), 0);
}

#[test]
fn watcher_stopped_by_its_listener_is_not_stopped_again() {
    let (_model, digest) = digest_with(json!({ "a": 1 }));

    let mut form = builder(&digest)
        .field(input_field("a").with_watcher(WatcherSpec::new().listener_fn(|call: WatchCall| {
            if let Some(stop) = &call.stop_watching {
                stop.stop();
            }
            Value::Null
        })))
        .build()
        .unwrap();
    digest.run().unwrap();
    assert_eq!(digest.watcher_count(), 1);

    // Only the dispatcher is left to stop
    assert_eq!(form.teardown(), 1);
}

#[test]
fn listener_sees_field_values_and_its_stop_handle() {
    let (model, digest) = digest_with(json!({ "email": "" }));
    let calls: Arc<Mutex<Vec<WatchCall>>> = Arc::default();

    let form = builder(&digest)
        .field(input_field("email").with_watcher(WatcherSpec::new().listener_fn({
            let calls = Arc::clone(&calls);
            move |call: WatchCall| {
                calls.lock().push(call);
                Value::Null
            }
        })))
        .build()
        .unwrap();
    digest.run().unwrap();

    model.update(|m| m["email"] = json!("a@b.c"));
    digest.run().unwrap();

    let calls = calls.lock();
    assert_eq!(calls.len(), 2);
    let change = &calls[1];
    assert_eq!(change.field.key, Some(FieldKey::from("email")));
    assert_eq!(change.args[0], json!("a@b.c"));
    assert_eq!(change.args[1], json!(""));
    assert_eq!(change.args[2], json!({ "email": "a@b.c" }));
    let handle = form.fields()[0].watcher[0].stop_watching().unwrap();
    assert!(change
        .stop_watching
        .as_ref()
        .is_some_and(|stop| stop.same_subscription(handle)));
}

#[test]
fn decodes_fields_from_json() {
    let (_model, digest) = digest_with(json!({}));

    let form = builder(&digest)
        .fields_json(json!([
            { "type": "input", "key": "email" },
            { "type": "checkbox", "watcher": { "listener": "onToggle" } },
        ]))
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(form.fields().len(), 2);
    assert_eq!(form.fields()[1].key, Some(FieldKey::Index(1)));
    assert_eq!(form.watcher_count(), 1);
}

#[test]
fn malformed_json_fields_fail_to_decode() {
    let (_model, digest) = digest_with(json!({}));

    let err = builder(&digest).fields_json(json!({ "not": "a list" })).unwrap_err();

    assert!(matches!(err, Error::Serialization(_)));
}

#[test]
fn config_drives_labels_reporter_and_ids() {
    let mut config = EngineConfig::default();
    config.form.id_prefix = "signup".into();
    config.form.first_id = 5;
    config.form.label_prefix = "Signup".into();
    config.reporting.error_prefix = "Signup Error".into();
    let model = SharedModel::new(json!({}));
    let digest = Digest::with_config(model.clone(), &config.digest);

    let form = FormBuilder::new(Arc::new(digest.clone()))
        .with_config(&config)
        .model(model.clone())
        .build()
        .unwrap();
    assert_eq!(form.id(), "signup_5");

    let err = FormBuilder::new(Arc::new(digest))
        .with_config(&config)
        .model(model)
        .field(input_field("z").with_watcher(WatcherSpec::new()))
        .build()
        .unwrap_err();
    assert!(err.to_string().starts_with("Signup Error: All field watchers must have a listener"));
}

#[test]
fn shares_the_host_model() {
    let (model, digest) = digest_with(json!({ "a": 1 }));
    let form = builder(&digest).build().unwrap();

    model.update(|m| m["a"] = json!(2));

    assert!(form.model().ptr_eq(&model));
    assert_eq!(form.model().read(|m| m["a"].clone()), json!(2));
}

#[test]
fn unkeyed_first_field_and_email_watcher_end_to_end() {
    let (_model, digest) = digest_with(json!({ "email": "a@b.com" }));
    let log = CallLog::new();

    let form = builder(&digest)
        .field(FieldDescriptor::new())
        .field(input_field("email").with_watcher(WatcherSpec::new().listener_fn(log.listener("fn"))))
        .build()
        .unwrap();

    assert_eq!(form.fields()[0].key, Some(FieldKey::Index(0)));
    digest.run().unwrap();

    assert_eq!(log.entries(), vec![r#"fn:"a@b.com""#]);
}

#[test]
fn failed_build_hands_back_surviving_watchers_for_release() {
    let (_model, digest) = digest_with(json!({ "first": 1 }));
    let log = CallLog::new();

    let err = builder(&digest)
        .field(input_field("first").with_watcher(WatcherSpec::new().listener_fn(log.listener("first"))))
        .field(input_field("second").with_watcher(WatcherSpec::new()))
        .build()
        .unwrap_err();
    assert_eq!(digest.watcher_count(), 1);

    let Error::Usage(usage) = err else {
        panic!("expected a usage error, got {err:?}");
    };
    let released = usage.subscribed().iter().filter(|handle| handle.stop()).count();

    assert_eq!(released, 1);
    assert_eq!(digest.watcher_count(), 0);
    digest.apply(|m| m["first"] = json!(2)).unwrap();
    assert_eq!(log.len(), 0);
}

#[test]
fn empty_expression_watches_the_field_slot() {
    let (_model, digest) = digest_with(json!({ "email": "a@b.c" }));
    let log = CallLog::new();

    let _form = builder(&digest)
        .field(input_field("email").with_watcher(
            WatcherSpec::new().expression_path("").listener_fn(log.listener("email")),
        ))
        .build()
        .unwrap();
    digest.run().unwrap();

    assert_eq!(log.entries(), vec![r#"email:"a@b.c""#]);
}

#[test]
fn scalar_keys_from_json_survive_construction() {
    let (_model, digest) = digest_with(json!({ "-1": "neg", "true": "yes" }));
    let log = CallLog::new();

    let form = builder(&digest)
        .fields_json(json!([{ "key": -1 }, { "key": 2.5 }, { "key": true }, { "key": false }]))
        .unwrap()
        .field(FieldDescriptor::new().with_key(true).with_watcher(WatcherSpec::new().listener_fn(log.listener("flag"))))
        .build()
        .unwrap();

    let keys: Vec<String> = form
        .fields()
        .iter()
        .map(|field| field.key.as_ref().map(ToString::to_string).unwrap_or_default())
        .collect();
    assert_eq!(keys, vec!["-1", "2.5", "true", "3", "true"]);

    digest.run().unwrap();
    assert_eq!(log.entries(), vec![r#"flag:"yes""#]);
}
