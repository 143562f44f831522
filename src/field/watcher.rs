use std::fmt;
use std::sync::Arc;
use std::sync::OnceLock;

use serde::Deserialize;
use serde::Deserializer;
use serde_json::Value;

use crate::FieldDescriptor;
use crate::StopWatching;
use crate::WatchType;

/// User callback that is aware of the field it watches.
pub type FieldCallback = dyn Fn(WatchCall) -> Value + Send + Sync;

/// Arguments handed to a field-aware watch expression or listener.
///
/// The runtime's native arguments are kept in their original order, the
/// field goes in front and the watcher's stop handle goes last.
#[derive(Clone)]
pub struct WatchCall {
    pub field: Arc<FieldDescriptor>,
    /// Native arguments: `[model]` for expressions, `[new, old, model]` for listeners
    pub args: Vec<Value>,
    /// `None` until the watcher has been subscribed
    pub stop_watching: Option<StopWatching>,
}

impl WatchCall {
    pub fn arg(
        &self,
        index: usize,
    ) -> Option<&Value> {
        self.args.get(index)
    }
}

impl fmt::Debug for WatchCall {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("WatchCall")
            .field("field", &self.field.key)
            .field("args", &self.args)
            .field("stop_watching", &self.stop_watching.is_some())
            .finish()
    }
}

/// What a watcher observes.
#[derive(Clone)]
pub enum Expression {
    /// Resolved natively by the runtime, e.g. `model['email']`
    Path(String),
    Function(Arc<FieldCallback>),
}

impl Expression {
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(WatchCall) -> Value + Send + Sync + 'static,
    {
        Expression::Function(Arc::new(f))
    }
}

impl fmt::Debug for Expression {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Expression::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Expression::Function(_) => f.write_str("Function(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for Expression {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Expression::Path)
    }
}

/// What runs when the watched value changes.
#[derive(Clone)]
pub enum Listener {
    Function(Arc<FieldCallback>),
    /// Non-callable listener; forwarded to the runtime untouched
    Value(Value),
}

impl Listener {
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(WatchCall) -> Value + Send + Sync + 'static,
    {
        Listener::Function(Arc::new(f))
    }
}

impl fmt::Debug for Listener {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Listener::Function(_) => f.write_str("Function(..)"),
            Listener::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

/// One watcher declared on a field.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatcherSpec {
    /// Defaults to `model['{key}']`
    #[serde(default)]
    pub expression: Option<Expression>,

    /// Mandatory. A declared `null` still counts as present.
    #[serde(default, deserialize_with = "present_listener")]
    pub listener: Option<Listener>,

    /// Defaults to [`WatchType::Watch`]
    #[serde(default, rename = "type")]
    pub watch_type: Option<WatchType>,

    #[serde(default)]
    pub watch_deep: bool,

    #[serde(skip)]
    stop_watching: OnceLock<StopWatching>,
}

impl WatcherSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expression(
        mut self,
        expression: Expression,
    ) -> Self {
        self.expression = Some(expression);
        self
    }

    pub fn expression_path(
        self,
        path: impl Into<String>,
    ) -> Self {
        self.expression(Expression::Path(path.into()))
    }

    pub fn expression_fn<F>(
        self,
        f: F,
    ) -> Self
    where
        F: Fn(WatchCall) -> Value + Send + Sync + 'static,
    {
        self.expression(Expression::function(f))
    }

    pub fn listener(
        mut self,
        listener: Listener,
    ) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn listener_fn<F>(
        self,
        f: F,
    ) -> Self
    where
        F: Fn(WatchCall) -> Value + Send + Sync + 'static,
    {
        self.listener(Listener::function(f))
    }

    pub fn watch_type(
        mut self,
        watch_type: WatchType,
    ) -> Self {
        self.watch_type = Some(watch_type);
        self
    }

    pub fn deep(
        mut self,
        watch_deep: bool,
    ) -> Self {
        self.watch_deep = watch_deep;
        self
    }

    pub fn effective_type(&self) -> WatchType {
        self.watch_type.unwrap_or_default()
    }

    /// Handle attached once the watcher has been subscribed
    pub fn stop_watching(&self) -> Option<&StopWatching> {
        self.stop_watching.get()
    }

    /// Stores the subscription handle; hands it back if one is already attached.
    pub(crate) fn attach_stop_watching(
        &self,
        handle: StopWatching,
    ) -> Result<(), StopWatching> {
        self.stop_watching.set(handle)
    }
}

/// Cloning yields an unsubscribed spec: handles belong to one form only.
impl Clone for WatcherSpec {
    fn clone(&self) -> Self {
        Self {
            expression: self.expression.clone(),
            listener: self.listener.clone(),
            watch_type: self.watch_type,
            watch_deep: self.watch_deep,
            stop_watching: OnceLock::new(),
        }
    }
}

impl fmt::Debug for WatcherSpec {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("WatcherSpec")
            .field("expression", &self.expression)
            .field("listener", &self.listener)
            .field("watch_type", &self.watch_type)
            .field("watch_deep", &self.watch_deep)
            .field("subscribed", &self.stop_watching.get().is_some())
            .finish()
    }
}

fn present_listener<'de, D>(deserializer: D) -> Result<Option<Listener>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|value| Some(Listener::Value(value)))
}

/// `watcher` may be declared as one spec or as a list of specs.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<WatcherSpec>),
    One(WatcherSpec),
}

pub(crate) fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<WatcherSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    let watchers = Option::<OneOrMany>::deserialize(deserializer)?;
    Ok(match watchers {
        None => Vec::new(),
        Some(OneOrMany::Many(specs)) => specs,
        Some(OneOrMany::One(spec)) => vec![spec],
    })
}
