use serde_json::json;

use super::*;
use crate::DigestError;

#[test]
fn parses_dotted_bracketed_and_indexed_segments() {
    let path = ModelPath::parse("model.address['zip code'][\"x\"].items[2]").unwrap();

    assert_eq!(
        path.segments(),
        &[
            PathSegment::Key("address".into()),
            PathSegment::Key("zip code".into()),
            PathSegment::Key("x".into()),
            PathSegment::Key("items".into()),
            PathSegment::Index(2),
        ]
    );
}

#[test]
fn bare_root_has_no_segments() {
    let path: ModelPath = "model".parse().unwrap();
    assert!(path.segments().is_empty());
    assert_eq!(path.resolve(&json!({ "a": 1 })), json!({ "a": 1 }));
}

#[test]
fn default_path_escapes_quotes_and_backslashes() {
    let raw = ModelPath::for_key("it's\\here");
    assert_eq!(raw, "model['it\\'s\\\\here']");

    let path = ModelPath::parse(&raw).unwrap();
    assert_eq!(path.segments(), &[PathSegment::Key("it's\\here".into())]);
}

#[test]
fn numeric_key_path_reads_array_positions() {
    let path = ModelPath::parse(&ModelPath::for_key("1")).unwrap();

    assert_eq!(path.resolve(&json!(["a", "b"])), json!("b"));
    assert_eq!(path.resolve(&json!({ "1": "one" })), json!("one"));
}

#[test]
fn missing_members_resolve_to_null() {
    let path = ModelPath::parse("model.user.name").unwrap();

    assert_eq!(path.resolve(&json!({})), Value::Null);
    assert_eq!(path.resolve(&json!({ "user": "plain" })), Value::Null);
    assert_eq!(path.resolve(&json!({ "user": { "name": "Ada" } })), json!("Ada"));
}

#[test]
fn rejects_paths_outside_the_model() {
    for bad in ["scope.email", "models.email", "model.", "model['open", "model[x]", "model.a b"] {
        let err = ModelPath::parse(bad).unwrap_err();
        assert!(
            matches!(err, DigestError::InvalidExpression { ref expression, .. } if expression == bad),
            "{bad} should be rejected"
        );
    }
}

#[test]
fn display_round_trips_the_trimmed_source() {
    let path = ModelPath::parse("  model['email'] ").unwrap();
    assert_eq!(path.to_string(), "model['email']");
    assert_eq!(path.as_str(), "model['email']");
}
