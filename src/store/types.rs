//! Document and snapshot types exchanged with a store.

use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error_handling::StoreError;
use crate::geohash::FirePoint;

/// A record as delivered by a store snapshot.
///
/// Serializes flat: `{"id": ..., ...fields}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier within its collection
    pub id: String,
    /// Payload fields
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// Creates a document from an id and a JSON object.
    ///
    /// Non-object values are stored under a `value` field.
    pub fn new(id: impl Into<String>, fields: Value) -> Self {
        let fields = match fields {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        Document {
            id: id.into(),
            fields,
        }
    }

    /// Looks up a dotted field path (`"position"`, `"meta.location"`).
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        lookup_path(&self.fields, path)
    }

    /// Reads the [`FirePoint`] stored at `field`, if the field holds one.
    pub fn point(&self, field: &str) -> Option<FirePoint> {
        self.get_path(field)
            .and_then(|value| FirePoint::deserialize(value).ok())
    }
}

/// Resolves a dotted path inside a JSON object.
pub fn lookup_path<'a>(fields: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = fields.get(segments.next()?)?;
    segments.try_fold(first, |value, segment| value.get(segment))
}

/// Full result set of one range subscription at one point in time.
pub type Snapshot = Vec<Document>;

/// Live sequence of snapshots delivered by a store subscription.
///
/// Dropping the stream tears the subscription down.
pub type SnapshotStream = BoxStream<'static, Result<Snapshot, StoreError>>;
