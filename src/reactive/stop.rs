use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

type Release = Box<dyn FnOnce() + Send>;

/// Capability that cancels one watcher subscription.
///
/// Clones share the same underlying subscription; whichever clone stops
/// first runs the release, later calls do nothing.
#[derive(Clone)]
pub struct StopWatching {
    release: Arc<Mutex<Option<Release>>>,
}

impl StopWatching {
    pub fn new<F>(release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            release: Arc::new(Mutex::new(Some(Box::new(release)))),
        }
    }

    /// Cancels the subscription. Returns `true` only for the call that did it.
    pub fn stop(&self) -> bool {
        // Release outside the lock so it may re-enter this handle.
        let release = self.release.lock().take();
        match release {
            Some(release) => {
                release();
                true
            }
            None => false,
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.release.lock().is_none()
    }

    /// Whether both handles cancel the same subscription
    pub fn same_subscription(
        &self,
        other: &StopWatching,
    ) -> bool {
        Arc::ptr_eq(&self.release, &other.release)
    }
}

impl fmt::Debug for StopWatching {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("StopWatching")
            .field("stopped", &self.is_stopped())
            .finish()
    }
}
