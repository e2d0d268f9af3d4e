//! Collaborators shared by a tool's preset library and project session.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::backend::KeyValueStore;
use crate::error::StoreError;
use crate::ids::{Clock, IdGenerator, SystemClock, UuidIds};
use crate::notify::{Action, LogNotifier, Notifier, StoreEvent};

/// Durable store, id source, clock and notifier in one cloneable handle.
#[derive(Clone)]
pub struct StoreContext {
    store: Arc<dyn KeyValueStore>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for StoreContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreContext").finish_non_exhaustive()
    }
}

impl StoreContext {
    /// Uses UUID ids, the system clock and `LogNotifier`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            ids: Arc::new(UuidIds),
            clock: Arc::new(SystemClock),
            notifier: Arc::new(LogNotifier),
        }
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub(crate) fn next_id(&self) -> String {
        self.ids.next_id()
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn notify(&self, event: StoreEvent) {
        self.notifier.notify(&event);
    }

    /// Reports a failed operation and hands the error back for propagation.
    pub(crate) fn fail(&self, tool: &str, action: Action, err: StoreError) -> StoreError {
        tracing::debug!(error = ?err, "Failed to {action} for {tool}");
        self.notify(StoreEvent::Failed {
            tool: tool.to_string(),
            action,
            message: err.to_string(),
        });
        err
    }
}
