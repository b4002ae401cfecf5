//! One-shot query run used by the CLI.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use log::info;
use serde_json::Value;

use crate::client::GeoClient;
use crate::config::Config;
use crate::error_handling::GeoQueryError;
use crate::geojson::to_geojson;
use crate::query::{get, QueryOptions};
use crate::store::MemoryStore;

use super::records::parse_records;

/// Results of a CLI query run.
#[derive(Debug, Clone)]
pub struct QueryReport {
    /// Records loaded from the input file
    pub loaded: usize,
    /// Features or hits in the output
    pub matched: usize,
    /// Annotated records or a GeoJSON FeatureCollection
    pub output: Value,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
}

/// Loads the configured record file and runs one proximity query over it.
///
/// The query is resolved with [`get`], so its subscriptions are released as
/// soon as the first result is available. Ctrl-C cancels the query.
///
/// # Errors
///
/// Fails if the input cannot be read or parsed, if the query arguments are
/// invalid, or if the query is interrupted before producing a result.
pub async fn run_query(config: Config) -> Result<QueryReport> {
    let start = Instant::now();

    let text = tokio::fs::read_to_string(&config.input)
        .await
        .with_context(|| format!("Failed to read {}", config.input.display()))?;
    let records = parse_records(&text, &config.field)?;
    let loaded = records.len();
    info!("Loaded {} records into {}", loaded, config.collection);

    let store = Arc::new(MemoryStore::new());
    for record in records {
        store.insert(&config.collection, record);
    }

    let client = GeoClient::new(store);
    let center = client.point(config.lat, config.lng)?;
    let options = QueryOptions::default()
        .with_units(&config.units)?
        .with_log(config.log_query);
    let results = client
        .query(config.collection.as_str())
        .within(&center, config.radius, &config.field, options)?;

    let (matched, output) = if config.geojson {
        let collection = tokio::select! {
            result = get(to_geojson(results, config.field.as_str(), config.include_props)) => result?,
            _ = tokio::signal::ctrl_c() => return Err(GeoQueryError::Cancelled.into()),
        };
        (collection.features.len(), serde_json::to_value(&collection)?)
    } else {
        let hits = tokio::select! {
            result = get(results) => result?,
            _ = tokio::signal::ctrl_c() => return Err(GeoQueryError::Cancelled.into()),
        };
        (hits.len(), serde_json::to_value(&hits)?)
    };

    Ok(QueryReport {
        loaded,
        matched,
        output,
        elapsed_seconds: start.elapsed().as_secs_f64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn write_records(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        for line in lines {
            writeln!(file, "{line}").expect("Failed to write record");
        }
        file
    }

    fn config(path: &std::path::Path, extra: &[&str]) -> Config {
        let mut args = vec![
            "geo_proximity".to_string(),
            path.display().to_string(),
            "--lat".into(),
            "0".into(),
            "--lng".into(),
            "0".into(),
            "--radius".into(),
            "1".into(),
        ];
        args.extend(extra.iter().map(|s| s.to_string()));
        Config::parse_from(args)
    }

    #[tokio::test]
    async fn test_run_query_outputs_sorted_hits() {
        let file = write_records(&[
            r#"{"id": "b", "position": {"latitude": 0.0081, "longitude": 0.0}}"#,
            r#"{"id": "a", "position": {"latitude": 0.0, "longitude": 0.0045}}"#,
            r#"{"id": "c", "position": {"latitude": 0.45, "longitude": 0.0}}"#,
        ]);
        let report = run_query(config(file.path(), &[])).await.unwrap();
        assert_eq!(report.loaded, 3);
        assert_eq!(report.matched, 2);
        assert_eq!(report.output[0]["id"], "a");
        assert_eq!(report.output[1]["id"], "b");
        assert!(report.output[0]["hitMetadata"]["distance"].as_f64().unwrap() < 0.51);
    }

    #[tokio::test]
    async fn test_run_query_geojson() {
        let file = write_records(&[
            r#"{"id": "a", "position": {"latitude": 0.0, "longitude": 0.0045}}"#,
        ]);
        let report = run_query(config(file.path(), &["--geojson"])).await.unwrap();
        assert_eq!(report.output["type"], "FeatureCollection");
        assert_eq!(
            report.output["features"][0]["geometry"]["coordinates"],
            serde_json::json!([0.0045, 0.0])
        );
        assert_eq!(report.output["features"][0]["properties"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_run_query_rejects_unsupported_units() {
        let file = write_records(&[]);
        let err = run_query(config(file.path(), &["--units", "mi"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GeoQueryError>(),
            Some(GeoQueryError::InvalidArgument(_))
        ));
    }
}
