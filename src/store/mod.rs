//! Document store contract.
//!
//! The proximity engine never reads a store directly: it only opens live
//! range subscriptions through [`DocumentStore`] and consumes the full
//! snapshots they deliver. [`MemoryStore`] is a live in-memory implementation
//! used by the CLI and the tests.

mod memory;
mod types;

use std::sync::Arc;

// Re-export public API
pub use memory::MemoryStore;
pub use types::{lookup_path, Document, Snapshot, SnapshotStream};

/// A document store able to serve live string range scans.
///
/// Implementations must deliver the complete matching set on subscribe and on
/// every change, ordered by `order_by` ascending, and report failures as
/// `Err` items rather than empty snapshots. Bounds are inclusive-lower,
/// exclusive-upper. Dropping the returned stream ends the subscription.
pub trait DocumentStore: Send + Sync + 'static {
    /// Subscribes to documents of `collection` whose `order_by` field lies in
    /// `[lower, upper)`.
    fn subscribe_range(
        &self,
        collection: &str,
        order_by: &str,
        lower: &str,
        upper: &str,
    ) -> SnapshotStream;
}

impl<S: DocumentStore + ?Sized> DocumentStore for Arc<S> {
    fn subscribe_range(
        &self,
        collection: &str,
        order_by: &str,
        lower: &str,
        upper: &str,
    ) -> SnapshotStream {
        (**self).subscribe_range(collection, order_by, lower, upper)
    }
}
