use std::sync::Arc;

use serde_json::Value;

use super::instance::FormContext;
use crate::check_form_attributes;
use crate::constants::DEFAULT_LABEL_PREFIX;
use crate::ChangeDetector;
use crate::DefaultErrorReporter;
use crate::EngineConfig;
use crate::Error;
use crate::ErrorReporter;
use crate::FieldDescriptor;
use crate::FormAttributes;
use crate::FormIdSource;
use crate::FormInstance;
use crate::Result;
use crate::SequentialFormIds;
use crate::SharedModel;

/// Collects everything a form needs, then runs the construction pipeline.
///
/// # Example
/// ```ignore
/// let model = SharedModel::new(json!({ "email": "" }));
/// let digest = Arc::new(Digest::new(model.clone()));
/// let form = FormBuilder::new(digest)
///     .field(FieldDescriptor::new().with_key("email").with_type("input"))
///     .model(model)
///     .build()?;
/// ```
pub struct FormBuilder {
    detector: Arc<dyn ChangeDetector>,
    reporter: Arc<dyn ErrorReporter>,
    ids: Arc<dyn FormIdSource>,
    label_prefix: String,
    fields: Vec<FieldDescriptor>,
    model: Option<SharedModel>,
    attributes: FormAttributes,
}

impl FormBuilder {
    pub fn new(detector: Arc<dyn ChangeDetector>) -> Self {
        Self {
            detector,
            reporter: Arc::new(DefaultErrorReporter::default()),
            ids: Arc::new(SequentialFormIds::default()),
            label_prefix: DEFAULT_LABEL_PREFIX.to_string(),
            fields: Vec::new(),
            model: None,
            attributes: FormAttributes::default(),
        }
    }

    /// Takes reporter wording, id scheme and debug labels from `config`.
    ///
    /// Each call creates a fresh id counter; share one through
    /// [`Self::id_source`] when several forms must not collide.
    pub fn with_config(
        mut self,
        config: &EngineConfig,
    ) -> Self {
        self.reporter = Arc::new(DefaultErrorReporter::from_config(&config.reporting));
        self.ids = Arc::new(SequentialFormIds::from_config(&config.form));
        self.label_prefix = config.form.label_prefix.clone();
        self
    }

    pub fn reporter(
        mut self,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn id_source(
        mut self,
        ids: Arc<dyn FormIdSource>,
    ) -> Self {
        self.ids = ids;
        self
    }

    pub fn label_prefix(
        mut self,
        prefix: impl Into<String>,
    ) -> Self {
        self.label_prefix = prefix.into();
        self
    }

    pub fn field(
        mut self,
        field: FieldDescriptor,
    ) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(
        mut self,
        fields: impl IntoIterator<Item = FieldDescriptor>,
    ) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Appends fields decoded from a JSON array of field declarations
    pub fn fields_json(
        mut self,
        fields: Value,
    ) -> Result<Self> {
        let decoded: Vec<FieldDescriptor> = serde_json::from_value(fields)?;
        self.fields.extend(decoded);
        Ok(self)
    }

    pub fn model(
        mut self,
        model: SharedModel,
    ) -> Self {
        self.model = Some(model);
        self
    }

    /// Declares a host attribute on the form element
    pub fn attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.attributes.set(name, value);
        self
    }

    pub fn attributes(
        mut self,
        attributes: FormAttributes,
    ) -> Self {
        self.attributes = attributes;
        self
    }

    /// Checks the host attributes, assigns an id and constructs the form.
    ///
    /// Nothing is subscribed when the attribute check or schema validation
    /// fails.
    pub fn build(self) -> Result<FormInstance> {
        check_form_attributes(&self.attributes, self.model.as_ref(), self.reporter.as_ref())?;

        // Checked above
        let Some(model) = self.model else {
            return Err(Error::Fatal("form model missing after attribute check".into()));
        };

        let id = self.ids.next_id();
        FormInstance::construct(
            id,
            self.fields,
            model,
            FormContext {
                detector: self.detector.as_ref(),
                reporter: self.reporter.as_ref(),
                label_prefix: &self.label_prefix,
            },
        )
    }
}

impl std::fmt::Debug for FormBuilder {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("FormBuilder")
            .field("label_prefix", &self.label_prefix)
            .field("fields", &self.fields.len())
            .field("model", &self.model.is_some())
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}
