use tracing::trace;

use crate::ChangeDetector;
use crate::Error;
use crate::ErrorCode;
use crate::ErrorReporter;
use crate::ExpressionWrapper;
use crate::FieldList;
use crate::Result;
use crate::StopWatching;
use crate::UsageError;

/// Subscribes every declared watcher of a field list.
pub struct WatcherRegistry<'a> {
    detector: &'a dyn ChangeDetector,
    reporter: &'a dyn ErrorReporter,
    wrapper: ExpressionWrapper,
}

impl<'a> WatcherRegistry<'a> {
    pub fn new(
        detector: &'a dyn ChangeDetector,
        reporter: &'a dyn ErrorReporter,
        wrapper: ExpressionWrapper,
    ) -> Self {
        Self {
            detector,
            reporter,
            wrapper,
        }
    }

    /// Subscribes in field order, then watcher order, and stores each
    /// returned handle on its spec. Returns the number of subscriptions.
    ///
    /// Not transactional: when a spec lacks its listener, watchers of earlier
    /// fields stay subscribed and their handles travel with the error.
    pub fn register(
        &self,
        fields: &FieldList,
    ) -> Result<usize> {
        let mut subscribed: Vec<StopWatching> = Vec::new();

        for field in fields.iter() {
            for (watcher_index, spec) in field.watcher.iter().enumerate() {
                if spec.listener.is_none() {
                    let report = self.reporter.field_error(
                        ErrorCode::MissingWatcherListener,
                        "All field watchers must have a listener",
                        field,
                    );
                    return Err(UsageError::MissingListener { report, subscribed }.into());
                }

                let expression = self.wrapper.expression(field, watcher_index);
                let listener = self.wrapper.listener(field, watcher_index);
                let handle =
                    self.detector
                        .subscribe(expression, listener, spec.effective_type(), spec.watch_deep)?;

                if let Err(handle) = spec.attach_stop_watching(handle.clone()) {
                    handle.stop();
                    return Err(Error::Fatal(format!(
                        "watcher {} of field {:?} is already subscribed",
                        watcher_index, field.key
                    )));
                }

                trace!(key = ?field.key, watcher_index, "Field watcher registered");
                subscribed.push(handle);
            }
        }

        Ok(subscribed.len())
    }
}
