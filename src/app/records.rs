//! Record file loading for the CLI.

use anyhow::{bail, Context, Result};
use log::warn;
use serde_json::{Map, Value};

use crate::geohash::FirePoint;
use crate::store::Document;

/// Parses a JSON array or JSON-lines record file.
///
/// Blank lines and lines starting with `#` are ignored in JSON-lines input.
/// Records without a string or numeric `id` get `record-<n>`. A point field
/// holding only `{"latitude", "longitude"}` is completed with its geohash.
pub fn parse_records(text: &str, field: &str) -> Result<Vec<Document>> {
    let values: Vec<Value> = if text.trim_start().starts_with('[') {
        serde_json::from_str(text).context("Failed to parse JSON array of records")?
    } else {
        text.lines()
            .enumerate()
            .filter(|(_, line)| {
                let trimmed = line.trim();
                !trimmed.is_empty() && !trimmed.starts_with('#')
            })
            .map(|(n, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("Failed to parse record on line {}", n + 1))
            })
            .collect::<Result<_>>()?
    };

    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| to_document(index, value, field))
        .collect()
}

fn to_document(index: usize, value: Value, field: &str) -> Result<Document> {
    let Value::Object(mut fields) = value else {
        bail!("Record {} is not a JSON object", index);
    };

    let id = match fields.remove("id") {
        Some(Value::String(id)) => id,
        Some(Value::Number(n)) => n.to_string(),
        _ => format!("record-{index}"),
    };

    complete_point(&mut fields, field)
        .with_context(|| format!("Record {id} has an invalid {field:?} point"))?;

    Ok(Document { id, fields })
}

/// Adds a geohash to a bare latitude/longitude object at `field`.
fn complete_point(fields: &mut Map<String, Value>, field: &str) -> Result<()> {
    let Some(slot) = lookup_path_mut(fields, field) else {
        warn!("Record has no {:?} field; it will never match a query", field);
        return Ok(());
    };
    if serde_json::from_value::<FirePoint>(slot.clone()).is_ok() {
        return Ok(());
    }

    let coordinate = |key: &str| slot.get(key).and_then(Value::as_f64);
    match (coordinate("latitude"), coordinate("longitude")) {
        (Some(latitude), Some(longitude)) => {
            *slot = FirePoint::new(latitude, longitude)?.to_value();
            Ok(())
        }
        _ => {
            warn!("Field {:?} holds no coordinate; record will never match", field);
            Ok(())
        }
    }
}

fn lookup_path_mut<'a>(fields: &'a mut Map<String, Value>, path: &str) -> Option<&'a mut Value> {
    let mut segments = path.split('.');
    let first = fields.get_mut(segments.next()?)?;
    segments.try_fold(first, |value, segment| value.get_mut(segment))
}
