use std::sync::Arc;

use tracing::debug;

use crate::install_model_dispatcher;
use crate::resolve_keys;
use crate::validate_schema;
use crate::ChangeDetector;
use crate::ErrorReporter;
use crate::ExpressionWrapper;
use crate::FieldDescriptor;
use crate::FieldKey;
use crate::FieldList;
use crate::Result;
use crate::SharedModel;
use crate::StopWatching;
use crate::WatcherRegistry;

/// One rendered form: its fields, their subscriptions and the model binding.
///
/// Every subscription is released when the instance is torn down or dropped.
pub struct FormInstance {
    id: String,
    fields: FieldList,
    model: SharedModel,
    dispatcher: Option<StopWatching>,
    watcher_count: usize,
}

/// Collaborators a form is constructed with
pub(crate) struct FormContext<'a> {
    pub(crate) detector: &'a dyn ChangeDetector,
    pub(crate) reporter: &'a dyn ErrorReporter,
    pub(crate) label_prefix: &'a str,
}

impl FormInstance {
    /// validate schema → resolve keys → register watchers → install dispatcher
    pub(crate) fn construct(
        id: String,
        mut fields: Vec<FieldDescriptor>,
        model: SharedModel,
        ctx: FormContext<'_>,
    ) -> Result<Self> {
        validate_schema(&fields, ctx.reporter)?;
        resolve_keys(&mut fields);

        let fields: FieldList = fields.into_iter().map(Arc::new).collect();

        let registry =
            WatcherRegistry::new(ctx.detector, ctx.reporter, ExpressionWrapper::new(ctx.label_prefix));
        let watcher_count = registry.register(&fields)?;

        let dispatcher = install_model_dispatcher(ctx.detector, &fields, ctx.label_prefix)?;

        debug!(
            form_id = %id,
            fields = fields.len(),
            watchers = watcher_count,
            "Form constructed"
        );

        Ok(Self {
            id,
            fields,
            model,
            dispatcher: Some(dispatcher),
            watcher_count,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Fields in declaration order, keys resolved
    pub fn fields(&self) -> &[Arc<FieldDescriptor>] {
        &self.fields
    }

    pub fn field(
        &self,
        key: &FieldKey,
    ) -> Option<&Arc<FieldDescriptor>> {
        self.fields.iter().find(|field| field.key.as_ref() == Some(key))
    }

    pub fn model(&self) -> &SharedModel {
        &self.model
    }

    /// Field watchers subscribed at construction, excluding the model dispatcher
    pub fn watcher_count(&self) -> usize {
        self.watcher_count
    }

    pub fn is_active(&self) -> bool {
        self.dispatcher.is_some()
    }

    /// Invokes every stop handle this form holds. Returns how many handles
    /// were actually stopped by this call; later calls return 0.
    pub fn teardown(&mut self) -> usize {
        let Some(dispatcher) = self.dispatcher.take() else {
            return 0;
        };

        let mut stopped = usize::from(dispatcher.stop());
        for field in self.fields.iter() {
            for spec in &field.watcher {
                if let Some(handle) = spec.stop_watching() {
                    if handle.stop() {
                        stopped += 1;
                    }
                }
            }
        }

        debug!(
            form_id = %self.id,
            stopped,
            already_stopped = (self.watcher_count + 1).saturating_sub(stopped),
            "Form torn down"
        );
        stopped
    }
}

impl Drop for FormInstance {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for FormInstance {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("FormInstance")
            .field("id", &self.id)
            .field("fields", &self.fields.len())
            .field("watchers", &self.watcher_count)
            .field("active", &self.is_active())
            .finish()
    }
}
