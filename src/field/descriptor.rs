use std::fmt;
use std::sync::Arc;
use std::sync::OnceLock;

use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

use super::watcher::one_or_many;
use crate::Attribute;
use crate::FieldKey;
use crate::WatcherSpec;

/// Field-level expression evaluation, attached by the field renderer.
pub type ExpressionHook = Arc<dyn Fn(&Value) + Send + Sync>;

/// Declarative configuration of one form field.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    #[serde(default, rename = "type")]
    pub field_type: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub template_url: Option<String>,
    /// Resolved to the field's position when unset or falsy
    #[serde(default)]
    pub key: Option<FieldKey>,
    #[serde(default)]
    pub model: Option<Value>,
    #[serde(default)]
    pub expression_properties: Option<Value>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub template_options: Option<Value>,
    #[serde(default)]
    pub wrapper: Option<Value>,
    #[serde(default)]
    pub model_options: Option<Value>,
    /// Always a list; a single declared spec becomes a one-element list
    #[serde(default, deserialize_with = "one_or_many")]
    pub watcher: Vec<WatcherSpec>,
    #[serde(default)]
    pub validators: Option<Value>,
    #[serde(default)]
    pub no_form_control: Option<bool>,
    #[serde(default)]
    pub hide: Option<bool>,
    #[serde(default)]
    pub ng_model_attrs: Option<Value>,

    /// Attributes outside the recognized set, in declaration order
    #[serde(flatten)]
    unrecognized: Map<String, Value>,

    #[serde(skip)]
    expression_runner: OnceLock<ExpressionHook>,
}

impl FieldDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a field declaration, keeping unknown attributes for validation
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    pub fn with_key(
        mut self,
        key: impl Into<FieldKey>,
    ) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_type(
        mut self,
        field_type: impl Into<String>,
    ) -> Self {
        self.field_type = Some(field_type.into());
        self
    }

    pub fn with_watcher(
        mut self,
        spec: WatcherSpec,
    ) -> Self {
        self.watcher.push(spec);
        self
    }

    pub fn with_watchers(
        mut self,
        specs: impl IntoIterator<Item = WatcherSpec>,
    ) -> Self {
        self.watcher.extend(specs);
        self
    }

    /// Sets an attribute by its wire name.
    ///
    /// Recognized names are decoded into their member; any other name is
    /// kept verbatim and will be rejected by schema validation.
    pub fn with_attribute(
        mut self,
        name: &str,
        value: Value,
    ) -> serde_json::Result<Self> {
        let Some(attribute) = Attribute::from_name(name) else {
            self.unrecognized.insert(name.to_string(), value);
            return Ok(self);
        };

        match attribute {
            Attribute::Type => self.field_type = serde_json::from_value(value)?,
            Attribute::Template => self.template = serde_json::from_value(value)?,
            Attribute::TemplateUrl => self.template_url = serde_json::from_value(value)?,
            Attribute::Key => self.key = serde_json::from_value(value)?,
            Attribute::Model => self.model = Some(value),
            Attribute::ExpressionProperties => self.expression_properties = Some(value),
            Attribute::Data => self.data = Some(value),
            Attribute::TemplateOptions => self.template_options = Some(value),
            Attribute::Wrapper => self.wrapper = Some(value),
            Attribute::ModelOptions => self.model_options = Some(value),
            Attribute::Watcher => self.watcher = one_or_many(value)?,
            Attribute::Validators => self.validators = Some(value),
            Attribute::NoFormControl => self.no_form_control = serde_json::from_value(value)?,
            Attribute::Hide => self.hide = serde_json::from_value(value)?,
            Attribute::NgModelAttrs => self.ng_model_attrs = Some(value),
        }
        Ok(self)
    }

    /// Recognized attributes this field declares, in canonical order
    pub fn attribute_names(&self) -> Vec<&'static str> {
        Attribute::ALL
            .into_iter()
            .filter(|attribute| self.declares(*attribute))
            .map(Attribute::name)
            .collect()
    }

    pub fn declares(
        &self,
        attribute: Attribute,
    ) -> bool {
        match attribute {
            Attribute::Type => self.field_type.is_some(),
            Attribute::Template => self.template.is_some(),
            Attribute::TemplateUrl => self.template_url.is_some(),
            Attribute::Key => self.key.is_some(),
            Attribute::Model => self.model.is_some(),
            Attribute::ExpressionProperties => self.expression_properties.is_some(),
            Attribute::Data => self.data.is_some(),
            Attribute::TemplateOptions => self.template_options.is_some(),
            Attribute::Wrapper => self.wrapper.is_some(),
            Attribute::ModelOptions => self.model_options.is_some(),
            Attribute::Watcher => !self.watcher.is_empty(),
            Attribute::Validators => self.validators.is_some(),
            Attribute::NoFormControl => self.no_form_control.is_some(),
            Attribute::Hide => self.hide.is_some(),
            Attribute::NgModelAttrs => self.ng_model_attrs.is_some(),
        }
    }

    /// Declared attribute names outside the recognized set
    pub fn unrecognized_attributes(&self) -> impl Iterator<Item = &str> {
        self.unrecognized
            .keys()
            .map(String::as_str)
            .filter(|name| !Attribute::is_recognized(name))
    }

    /// Builder form of [`Self::attach_expression_runner`]
    pub fn with_expression_runner<F>(
        self,
        f: F,
    ) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.attach_expression_runner(Arc::new(f));
        self
    }

    /// Attaches the field-level expression evaluation hook.
    ///
    /// Returns `false` when a hook is already attached; the first one wins.
    pub fn attach_expression_runner(
        &self,
        hook: ExpressionHook,
    ) -> bool {
        self.expression_runner.set(hook).is_ok()
    }

    pub fn has_expression_runner(&self) -> bool {
        self.expression_runner.get().is_some()
    }

    /// Evaluates the field's expressions against `model`.
    ///
    /// Returns `false` for fields without a hook.
    pub fn run_expressions(
        &self,
        model: &Value,
    ) -> bool {
        match self.expression_runner.get() {
            Some(hook) => {
                hook(model);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("key", &self.key)
            .field("type", &self.field_type)
            .field("watcher", &self.watcher)
            .field("unrecognized", &self.unrecognized)
            .finish_non_exhaustive()
    }
}

/// Compact, owned description of a field for error reports.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSummary {
    pub key: Option<FieldKey>,
    pub field_type: Option<String>,
    /// Every declared attribute name, recognized ones first
    pub attributes: Vec<String>,
}

impl From<&FieldDescriptor> for FieldSummary {
    fn from(field: &FieldDescriptor) -> Self {
        let attributes = field
            .attribute_names()
            .into_iter()
            .map(str::to_string)
            .chain(field.unrecognized_attributes().map(str::to_string))
            .collect();
        Self {
            key: field.key.clone(),
            field_type: field.field_type.clone(),
            attributes,
        }
    }
}

impl fmt::Display for FieldSummary {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match (&self.key, &self.field_type) {
            (Some(key), Some(field_type)) => write!(f, "field `{key}` of type `{field_type}`"),
            (Some(key), None) => write!(f, "field `{key}`"),
            (None, Some(field_type)) => write!(f, "unkeyed field of type `{field_type}`"),
            (None, None) => write!(f, "unkeyed field [{}]", self.attributes.join(", ")),
        }
    }
}
