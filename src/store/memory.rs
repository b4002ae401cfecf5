//! In-memory live document store.
//!
//! Every mutation bumps a `watch` version counter. Each range subscription
//! re-evaluates its query when the version changes and emits the full
//! matching set only when that set differs from the last one it delivered.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::stream::{self, StreamExt};
use log::{debug, trace};
use serde_json::{Map, Value};
use tokio::sync::watch;

use crate::error_handling::StoreError;

use super::types::{lookup_path, Document, Snapshot, SnapshotStream};
use super::DocumentStore;

type Collection = BTreeMap<String, Map<String, Value>>;

#[derive(Default)]
struct StoreState {
    collections: HashMap<String, Collection>,
    failures: HashMap<String, StoreError>,
}

struct Inner {
    state: Mutex<StoreState>,
    changes: watch::Sender<u64>,
}

/// Range query served by one subscription.
#[derive(Debug, Clone)]
struct RangeQuery {
    collection: String,
    order_by: String,
    lower: String,
    upper: String,
}

/// Live in-memory document store.
///
/// Cloning is cheap and clones share the same data.
///
/// # Example
///
/// ```no_run
/// use geo_proximity::{Document, FirePoint, MemoryStore};
/// use serde_json::json;
///
/// let store = MemoryStore::new();
/// let point = FirePoint::new(40.7128, -74.0060).unwrap();
/// store.insert("places", Document::new("nyc", json!({"position": point.to_value()})));
/// ```
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        let (changes, _) = watch::channel(0);
        MemoryStore {
            inner: Arc::new(Inner {
                state: Mutex::new(StoreState::default()),
                changes,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn notify(&self) {
        self.inner.changes.send_modify(|version| *version += 1);
    }

    /// Inserts or replaces a document.
    pub fn insert(&self, collection: &str, document: Document) {
        {
            let mut state = self.lock();
            state
                .collections
                .entry(collection.to_string())
                .or_default()
                .insert(document.id, document.fields);
        }
        self.notify();
    }

    /// Removes a document, returning it if it existed.
    pub fn remove(&self, collection: &str, id: &str) -> Option<Document> {
        let removed = {
            let mut state = self.lock();
            state
                .collections
                .get_mut(collection)
                .and_then(|docs| docs.remove(id))
                .map(|fields| Document {
                    id: id.to_string(),
                    fields,
                })
        };
        if removed.is_some() {
            self.notify();
        }
        removed
    }

    /// Makes every subscription on `collection` report `error` and end.
    ///
    /// New subscriptions on the collection fail immediately as well.
    pub fn fail(&self, collection: &str, error: StoreError) {
        debug!("Failing subscriptions on collection {}: {}", collection, error);
        self.lock().failures.insert(collection.to_string(), error);
        self.notify();
    }

    /// Number of documents in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        self.lock()
            .collections
            .get(collection)
            .map_or(0, |docs| docs.len())
    }

    /// Returns `true` if `collection` holds no documents.
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Evaluates a range query against the current data.
    ///
    /// Documents without a string at the ordering field are excluded.
    fn evaluate(&self, query: &RangeQuery) -> Result<Snapshot, StoreError> {
        let state = self.lock();
        if let Some(error) = state.failures.get(&query.collection) {
            return Err(error.clone());
        }

        let Some(docs) = state.collections.get(&query.collection) else {
            return Ok(Vec::new());
        };

        let mut matches: Vec<(&str, &String, &Map<String, Value>)> = docs
            .iter()
            .filter_map(|(id, fields)| {
                let key = lookup_path(fields, &query.order_by)?.as_str()?;
                (query.lower.as_str() <= key && key < query.upper.as_str())
                    .then_some((key, id, fields))
            })
            .collect();
        matches.sort_by(|a, b| a.0.cmp(b.0).then_with(|| a.1.cmp(b.1)));

        Ok(matches
            .into_iter()
            .map(|(_, id, fields)| Document {
                id: id.clone(),
                fields: fields.clone(),
            })
            .collect())
    }
}

impl DocumentStore for MemoryStore {
    fn subscribe_range(
        &self,
        collection: &str,
        order_by: &str,
        lower: &str,
        upper: &str,
    ) -> SnapshotStream {
        let query = RangeQuery {
            collection: collection.to_string(),
            order_by: order_by.to_string(),
            lower: lower.to_string(),
            upper: upper.to_string(),
        };
        trace!(
            "Opening range subscription on {}.{} [{}, {})",
            query.collection,
            query.order_by,
            query.lower,
            query.upper
        );

        let store = self.clone();
        let changes = self.inner.changes.subscribe();
        let initial: Option<(watch::Receiver<u64>, Option<Snapshot>)> = Some((changes, None));

        stream::unfold(initial, move |state| {
            let store = store.clone();
            let query = query.clone();
            async move {
                let (mut changes, last) = state?;
                loop {
                    match store.evaluate(&query) {
                        // Terminal: the next poll sees `None` state and ends the stream
                        Err(error) => return Some((Err(error), None)),
                        Ok(snapshot) if last.as_ref() != Some(&snapshot) => {
                            return Some((Ok(snapshot.clone()), Some((changes, Some(snapshot)))));
                        }
                        Ok(_) => {}
                    }
                    if changes.changed().await.is_err() {
                        return None;
                    }
                }
            }
        })
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::timeout;

    fn doc(id: &str, hash: &str) -> Document {
        Document::new(id, json!({"loc": {"geohash": hash}, "name": id}))
    }

    async fn next(stream: &mut SnapshotStream) -> Result<Snapshot, StoreError> {
        timeout(Duration::from_secs(1), stream.next())
            .await
            .expect("timed out waiting for snapshot")
            .expect("stream ended")
    }

    fn ids(snapshot: &Snapshot) -> Vec<&str> {
        snapshot.iter().map(|d| d.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_initial_snapshot_is_prefix_range_in_order() {
        let store = MemoryStore::new();
        store.insert("places", doc("b", "u4pruyd"));
        store.insert("places", doc("a", "u4pruya"));
        store.insert("places", doc("c", "u4prv00"));
        store.insert("places", doc("z", "u4pr"));

        let mut sub = store.subscribe_range("places", "loc.geohash", "u4pru", "u4pru~");
        let snapshot = next(&mut sub).await.unwrap();
        assert_eq!(ids(&snapshot), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_emits_on_change_to_matching_set_only() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe_range("places", "loc.geohash", "s0", "s0~");
        assert!(next(&mut sub).await.unwrap().is_empty());

        // Outside the range: no emission
        store.insert("places", doc("far", "u00"));
        assert!(timeout(Duration::from_millis(50), sub.next()).await.is_err());

        store.insert("places", doc("near", "s01"));
        assert_eq!(ids(&next(&mut sub).await.unwrap()), vec!["near"]);

        store.remove("places", "near");
        assert!(next(&mut sub).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_distinct_from_empty_and_ends_stream() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe_range("places", "loc.geohash", "s0", "s0~");
        assert!(next(&mut sub).await.unwrap().is_empty());

        store.fail("places", StoreError::Unavailable("maintenance".into()));
        assert_eq!(
            next(&mut sub).await,
            Err(StoreError::Unavailable("maintenance".into()))
        );
        assert!(sub.next().await.is_none());
    }

    #[tokio::test]
    async fn test_documents_without_order_field_are_excluded() {
        let store = MemoryStore::new();
        store.insert("places", Document::new("nohash", json!({"loc": {}})));
        store.insert("places", Document::new("numeric", json!({"loc": {"geohash": 7}})));
        store.insert("places", doc("ok", "s00"));

        let mut sub = store.subscribe_range("places", "loc.geohash", "s", "s~");
        assert_eq!(ids(&next(&mut sub).await.unwrap()), vec!["ok"]);
        assert_eq!(store.len("places"), 3);
        assert!(store.is_empty("other"));
    }
}
