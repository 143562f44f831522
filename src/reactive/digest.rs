//! Built-in dirty-checking change detector.
//!
//! Watchers are evaluated in subscription order. A pass that observes any
//! change is followed by another pass, since listeners may have mutated the
//! model, until a pass comes back clean or the iteration limit is hit.
//!
//! No lock is held while user code runs: listeners may mutate the model,
//! subscribe new watchers or stop existing ones, including themselves.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Weak;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;
use tracing::trace;

use super::ChangeDetector;
use super::ModelPath;
use super::NativeCallback;
use super::SharedModel;
use super::StopWatching;
use super::WatchExpression;
use super::WatchListener;
use super::WatchType;
use crate::DigestConfig;
use crate::DigestError;
use crate::Result;

/// How a watcher's successive values are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
    /// Full structural equality
    Structural,
    /// Container kind, length, keys and scalar members only
    Collection,
}

enum Getter {
    Path(ModelPath),
    Function(NativeCallback),
}

impl Getter {
    fn evaluate(
        &self,
        model: &SharedModel,
    ) -> Value {
        match self {
            Getter::Path(path) => model.read(|root| path.resolve(root)),
            Getter::Function(callback) => callback.call(vec![model.snapshot()]),
        }
    }
}

struct WatchEntry {
    id: u64,
    getter: Getter,
    listener: WatchListener,
    comparison: Comparison,
    /// `None` until the first evaluation
    last: Mutex<Option<Value>>,
    active: AtomicBool,
}

impl WatchEntry {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

struct DigestInner {
    model: SharedModel,
    watchers: Mutex<Vec<Arc<WatchEntry>>>,
    next_id: AtomicU64,
    max_iterations: usize,
    running: AtomicBool,
}

impl DigestInner {
    fn unsubscribe(
        &self,
        id: u64,
    ) {
        let mut watchers = self.watchers.lock();
        if let Some(pos) = watchers.iter().position(|entry| entry.id == id) {
            let entry = watchers.remove(pos);
            entry.active.store(false, Ordering::Release);
            trace!(watcher_id = id, "Watcher unsubscribed");
        }
    }
}

/// Dirty-checking runtime bound to one model.
///
/// Clones share the same watcher list.
#[derive(Clone)]
pub struct Digest {
    inner: Arc<DigestInner>,
}

impl std::fmt::Debug for Digest {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Digest")
            .field("watchers", &self.watcher_count())
            .field("max_iterations", &self.inner.max_iterations)
            .finish_non_exhaustive()
    }
}

/// Clears the `running` flag even when a listener panics.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Digest {
    pub fn new(model: SharedModel) -> Self {
        Self::with_config(model, &DigestConfig::default())
    }

    pub fn with_config(
        model: SharedModel,
        config: &DigestConfig,
    ) -> Self {
        Self {
            inner: Arc::new(DigestInner {
                model,
                watchers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                max_iterations: config.max_iterations,
                running: AtomicBool::new(false),
            }),
        }
    }

    pub fn model(&self) -> &SharedModel {
        &self.inner.model
    }

    /// Number of live subscriptions
    pub fn watcher_count(&self) -> usize {
        self.inner.watchers.lock().len()
    }

    /// Mutates the model, then digests.
    pub fn apply<R>(
        &self,
        f: impl FnOnce(&mut Value) -> R,
    ) -> Result<R> {
        let result = self.inner.model.update(f);
        self.run()?;
        Ok(result)
    }

    /// Runs passes until the model settles. Returns the number of passes.
    pub fn run(&self) -> Result<usize> {
        if self.inner.running.swap(true, Ordering::AcqRel) {
            return Err(DigestError::InProgress.into());
        }
        let _guard = RunGuard(&self.inner.running);

        let limit = self.inner.max_iterations;
        let mut passes = 0;
        loop {
            passes += 1;
            let dirty = self.pass();
            trace!(pass = passes, dirty, "Digest pass finished");
            if !dirty {
                debug!(passes, "Digest settled");
                return Ok(passes);
            }
            if passes > limit {
                return Err(DigestError::IterationLimit { limit }.into());
            }
        }
    }

    /// One sweep over the watchers; `true` if any listener fired.
    fn pass(&self) -> bool {
        let snapshot: Vec<Arc<WatchEntry>> = self.inner.watchers.lock().clone();
        let mut dirty = false;

        for entry in snapshot {
            // Stopped by an earlier listener in this pass
            if !entry.is_active() {
                continue;
            }

            let current = entry.getter.evaluate(&self.inner.model);
            let old = {
                let mut last = entry.last.lock();
                let unchanged = last
                    .as_ref()
                    .is_some_and(|previous| values_equal(entry.comparison, previous, &current));
                if unchanged {
                    continue;
                }
                last.replace(current.clone())
            };
            dirty = true;

            if let WatchListener::Function(callback) = &entry.listener {
                trace!(watcher_id = entry.id, label = callback.label(), "Watcher fired");
                // Initial call reports the current value as both new and old
                let old = old.unwrap_or_else(|| current.clone());
                callback.call(vec![current, old, self.inner.model.snapshot()]);
            }
        }

        dirty
    }
}

impl ChangeDetector for Digest {
    fn subscribe(
        &self,
        expression: WatchExpression,
        listener: WatchListener,
        watch_type: WatchType,
        deep: bool,
    ) -> Result<StopWatching> {
        let getter = match expression {
            WatchExpression::Path(path) => Getter::Path(ModelPath::parse(&path)?),
            WatchExpression::Function(callback) => Getter::Function(callback),
        };
        let comparison = match watch_type {
            WatchType::Watch => Comparison::Structural,
            WatchType::WatchCollection => Comparison::Collection,
        };

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let entry = Arc::new(WatchEntry {
            id,
            getter,
            listener,
            comparison,
            last: Mutex::new(None),
            active: AtomicBool::new(true),
        });
        self.inner.watchers.lock().push(entry);
        trace!(watcher_id = id, ?watch_type, deep, "Watcher subscribed");

        let weak: Weak<DigestInner> = Arc::downgrade(&self.inner);
        Ok(StopWatching::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.unsubscribe(id);
            }
        }))
    }
}

fn values_equal(
    comparison: Comparison,
    a: &Value,
    b: &Value,
) -> bool {
    match comparison {
        Comparison::Structural => a == b,
        Comparison::Collection => collection_equal(a, b),
    }
}

fn collection_equal(
    a: &Value,
    b: &Value,
) -> bool {
    match (a, b) {
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| member_equal(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(k, l)| y.get(k).is_some_and(|r| member_equal(l, r)))
        }
        _ => a == b,
    }
}

/// Nested containers only count as changed when their kind changes.
fn member_equal(
    a: &Value,
    b: &Value,
) -> bool {
    match (a, b) {
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => true,
        _ => a == b,
    }
}
