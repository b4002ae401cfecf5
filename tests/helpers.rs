// Shared test helpers: a scripted document store.
//
// Each range subscription is backed by an unbounded channel keyed by its lower
// bound (the cell). Tests push snapshots or errors into individual cells and
// observe when the engine tears a subscription down.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use futures::channel::mpsc;
use futures::{Stream, StreamExt};
use serde_json::json;

use geo_proximity::{Document, DocumentStore, FirePoint, Snapshot, SnapshotStream, StoreError};

type Item = Result<Snapshot, StoreError>;

/// A subscription request as seen by the store.
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)] // Fields are inspected by some test files only
pub struct Request {
    pub collection: String,
    pub order_by: String,
    pub lower: String,
    pub upper: String,
}

struct Feed {
    sender: mpsc::UnboundedSender<Item>,
    torn_down: Arc<AtomicBool>,
}

/// Store whose subscriptions are driven by the test.
#[derive(Default)]
pub struct ScriptedStore {
    feeds: Mutex<HashMap<String, Feed>>,
    requests: Mutex<Vec<Request>>,
    teardowns: Arc<AtomicUsize>,
}

struct TrackedSubscription {
    receiver: mpsc::UnboundedReceiver<Item>,
    torn_down: Arc<AtomicBool>,
    teardowns: Arc<AtomicUsize>,
}

impl Stream for TrackedSubscription {
    type Item = Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Item>> {
        self.receiver.poll_next_unpin(cx)
    }
}

impl Drop for TrackedSubscription {
    fn drop(&mut self) {
        // swap guards against counting one subscription twice
        if !self.torn_down.swap(true, Ordering::SeqCst) {
            self.teardowns.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[allow(dead_code)] // Not every test file uses every helper
impl ScriptedStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Cells (lower bounds) that have been subscribed, in subscription order.
    pub fn cells(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.lower.clone())
            .collect()
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    /// Delivers a snapshot to one cell. Returns false if it was torn down.
    pub fn push(&self, cell: &str, snapshot: Snapshot) -> bool {
        self.send(cell, Ok(snapshot))
    }

    /// Delivers an error to one cell.
    pub fn fail(&self, cell: &str, error: StoreError) -> bool {
        self.send(cell, Err(error))
    }

    /// Delivers the same snapshot (usually empty) to every subscribed cell.
    pub fn push_all(&self, snapshot: Snapshot) {
        for cell in self.cells() {
            self.push(&cell, snapshot.clone());
        }
    }

    /// Ends one cell's subscription from the store side.
    pub fn close(&self, cell: &str) {
        if let Some(feed) = self.feeds.lock().unwrap().get(cell) {
            feed.sender.close_channel();
        }
    }

    pub fn is_torn_down(&self, cell: &str) -> bool {
        self.feeds
            .lock()
            .unwrap()
            .get(cell)
            .map(|feed| feed.torn_down.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    pub fn teardown_count(&self) -> usize {
        self.teardowns.load(Ordering::SeqCst)
    }

    fn send(&self, cell: &str, item: Item) -> bool {
        let feeds = self.feeds.lock().unwrap();
        let feed = feeds
            .get(cell)
            .unwrap_or_else(|| panic!("cell {cell} was never subscribed"));
        feed.sender.unbounded_send(item).is_ok()
    }
}

impl DocumentStore for ScriptedStore {
    fn subscribe_range(
        &self,
        collection: &str,
        order_by: &str,
        lower: &str,
        upper: &str,
    ) -> SnapshotStream {
        let (sender, receiver) = mpsc::unbounded();
        let torn_down = Arc::new(AtomicBool::new(false));
        self.requests.lock().unwrap().push(Request {
            collection: collection.to_string(),
            order_by: order_by.to_string(),
            lower: lower.to_string(),
            upper: upper.to_string(),
        });
        self.feeds.lock().unwrap().insert(
            lower.to_string(),
            Feed {
                sender,
                torn_down: Arc::clone(&torn_down),
            },
        );
        TrackedSubscription {
            receiver,
            torn_down,
            teardowns: Arc::clone(&self.teardowns),
        }
        .boxed()
    }
}

/// A record with a point stored under `field`.
#[allow(dead_code)]
pub fn record(id: &str, field: &str, lat: f64, lng: f64) -> Document {
    let point = FirePoint::new(lat, lng).expect("valid test coordinate");
    let mut fields = serde_json::Map::new();
    fields.insert(field.to_string(), point.to_value());
    fields.insert("label".to_string(), json!(id));
    Document {
        id: id.to_string(),
        fields,
    }
}
