//! Subscription registry and handles

use crate::error::{Error, Result};
use crate::query::filter;
use crate::storage::record::Record;
use rosterq::Condition;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

type QuerySender = UnboundedSender<Result<Vec<Record>>>;
type RecordSender = UnboundedSender<Result<Option<Record>>>;

struct QueryWatcher {
    id: u64,
    collection: String,
    conditions: Vec<Condition>,
    tx: QuerySender,
}

struct RecordWatcher {
    id: u64,
    collection: String,
    record_id: String,
    tx: RecordSender,
}

#[derive(Default)]
struct HubState {
    next_id: u64,
    queries: Vec<QueryWatcher>,
    records: Vec<RecordWatcher>,
}

/// Registry of live subscriptions, shared by all clones of a store handle.
///
/// The registry lock is held only for registration and bookkeeping; snapshot
/// reads happen in the store before publishing.
#[derive(Clone, Default)]
pub struct ChangeHub {
    inner: Arc<Mutex<HubState>>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, HubState> {
        // A poisoned lock only means another thread panicked mid-bookkeeping;
        // the registry itself is still a plain list.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a query watcher and deliver its initial snapshot.
    pub(crate) fn register_query(
        &self,
        collection: &str,
        conditions: Vec<Condition>,
        current: Vec<Record>,
    ) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let snapshot: Vec<Record> = current
            .into_iter()
            .filter(|record| filter::matches(&conditions, record))
            .collect();
        // The receiver is still in hand, so this send cannot fail.
        let _ = tx.send(Ok(snapshot));

        let mut state = self.state();
        state.next_id += 1;
        let id = state.next_id;
        state.queries.push(QueryWatcher {
            id,
            collection: collection.to_string(),
            conditions,
            tx,
        });
        tracing::debug!(collection, id, "query subscription registered");

        Subscription {
            id,
            hub: self.clone(),
            rx,
            active: true,
        }
    }

    /// Register a single-record watcher and deliver its initial value.
    pub(crate) fn register_record(
        &self,
        collection: &str,
        record_id: &str,
        current: Option<Record>,
    ) -> RecordSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(Ok(current));

        let mut state = self.state();
        state.next_id += 1;
        let id = state.next_id;
        state.records.push(RecordWatcher {
            id,
            collection: collection.to_string(),
            record_id: record_id.to_string(),
            tx,
        });
        tracing::debug!(collection, record_id, id, "record subscription registered");

        RecordSubscription {
            id,
            hub: self.clone(),
            rx,
            active: true,
        }
    }

    /// Whether any watcher is interested in the collection.
    pub(crate) fn has_watchers(&self, collection: &str) -> bool {
        let state = self.state();
        state.queries.iter().any(|w| w.collection == collection)
            || state.records.iter().any(|w| w.collection == collection)
    }

    /// Push a fresh snapshot of the collection to every watcher on it.
    /// Watchers whose receiver is gone are dropped.
    pub(crate) fn publish(&self, collection: &str, records: &[Record]) {
        let mut state = self.state();
        state.queries.retain(|w| {
            if w.collection != collection {
                return true;
            }
            let snapshot: Vec<Record> = records
                .iter()
                .filter(|record| filter::matches(&w.conditions, record))
                .cloned()
                .collect();
            w.tx.send(Ok(snapshot)).is_ok()
        });
        state.records.retain(|w| {
            if w.collection != collection {
                return true;
            }
            let current = records.iter().find(|r| r.id == w.record_id).cloned();
            w.tx.send(Ok(current)).is_ok()
        });
    }

    /// Deliver a terminal error to every watcher on the collection and drop
    /// them; each affected subscriber must re-subscribe.
    pub(crate) fn publish_error(&self, collection: &str, message: &str) {
        let mut state = self.state();
        state.queries.retain(|w| {
            if w.collection != collection {
                return true;
            }
            let _ = w.tx.send(Err(Error::SubscriptionFailed {
                collection: collection.to_string(),
                message: message.to_string(),
            }));
            false
        });
        state.records.retain(|w| {
            if w.collection != collection {
                return true;
            }
            let _ = w.tx.send(Err(Error::SubscriptionFailed {
                collection: collection.to_string(),
                message: message.to_string(),
            }));
            false
        });
        tracing::error!(collection, message, "subscriptions terminated");
    }

    fn remove(&self, id: u64) {
        let mut state = self.state();
        state.queries.retain(|w| w.id != id);
        state.records.retain(|w| w.id != id);
    }

    #[cfg(test)]
    pub(crate) fn watcher_count(&self) -> usize {
        let state = self.state();
        state.queries.len() + state.records.len()
    }
}

/// A live query subscription.
///
/// Yields the initial matching set immediately, then a fresh snapshot per
/// mutation, in mutation order. `unsubscribe` is idempotent; dropping the
/// handle also deregisters it.
pub struct Subscription {
    id: u64,
    hub: ChangeHub,
    rx: UnboundedReceiver<Result<Vec<Record>>>,
    active: bool,
}

impl Subscription {
    /// Wait for the next snapshot. Returns `None` once unsubscribed and the
    /// channel is drained, or after a terminal error has been yielded.
    pub async fn next(&mut self) -> Option<Result<Vec<Record>>> {
        self.rx.recv().await
    }

    /// Stop receiving updates. Calling this more than once has no effect.
    pub fn unsubscribe(&mut self) {
        if self.active {
            self.hub.remove(self.id);
            self.active = false;
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// A live single-record subscription; the payload is `None` once the record
/// is deleted (or if it never existed).
pub struct RecordSubscription {
    id: u64,
    hub: ChangeHub,
    rx: UnboundedReceiver<Result<Option<Record>>>,
    active: bool,
}

impl RecordSubscription {
    /// Wait for the next value.
    pub async fn next(&mut self) -> Option<Result<Option<Record>>> {
        self.rx.recv().await
    }

    /// Stop receiving updates. Calling this more than once has no effect.
    pub fn unsubscribe(&mut self) {
        if self.active {
            self.hub.remove(self.id);
            self.active = false;
        }
    }
}

impl Drop for RecordSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::record::Fields;
    use rosterq::{Literal, Operator};

    fn record(id: &str, year: &str) -> Record {
        let mut r = Record::new(id, Fields::new());
        r.set("yearLevel", year);
        r
    }

    #[tokio::test]
    async fn test_initial_snapshot_is_filtered() {
        let hub = ChangeHub::new();
        let conds = vec![Condition::new(
            "yearLevel",
            Operator::Eq,
            Literal::from("2nd Year"),
        )];
        let current = vec![record("a", "1st Year"), record("b", "2nd Year")];

        let mut sub = hub.register_query("students", conds, current);
        let initial = sub.next().await.unwrap().unwrap();
        assert_eq!(initial.len(), 1);
        assert_eq!(initial[0].id, "b");
    }

    #[tokio::test]
    async fn test_publish_reaches_matching_watchers() {
        let hub = ChangeHub::new();
        let mut sub = hub.register_query("students", Vec::new(), Vec::new());
        assert!(sub.next().await.unwrap().unwrap().is_empty());

        hub.publish("students", &[record("a", "1st Year")]);
        let snapshot = sub.next().await.unwrap().unwrap();
        assert_eq!(snapshot.len(), 1);

        // Other collections do not wake this watcher
        hub.publish("courses", &[record("x", "n/a")]);
        assert!(sub.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_record_watcher_sees_deletion_as_none() {
        let hub = ChangeHub::new();
        let mut sub = hub.register_record("students", "a", Some(record("a", "1st Year")));
        assert!(sub.next().await.unwrap().unwrap().is_some());

        hub.publish("students", &[]);
        assert!(sub.next().await.unwrap().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unsubscribe_is_idempotent() {
        let hub = ChangeHub::new();
        let mut sub = hub.register_query("students", Vec::new(), Vec::new());
        assert_eq!(hub.watcher_count(), 1);

        sub.unsubscribe();
        sub.unsubscribe();
        assert_eq!(hub.watcher_count(), 0);
    }

    #[tokio::test]
    async fn test_drop_deregisters() {
        let hub = ChangeHub::new();
        {
            let _sub = hub.register_query("students", Vec::new(), Vec::new());
            assert_eq!(hub.watcher_count(), 1);
        }
        assert_eq!(hub.watcher_count(), 0);
    }

    #[tokio::test]
    async fn test_error_terminates_subscription() {
        let hub = ChangeHub::new();
        let mut sub = hub.register_query("students", Vec::new(), Vec::new());
        let _ = sub.next().await;

        hub.publish_error("students", "disk on fire");
        assert!(sub.next().await.unwrap().is_err());
        assert_eq!(hub.watcher_count(), 0);
        // Channel is closed afterwards
        assert!(sub.next().await.is_none());
    }
}
