//! Per-call query options and diagnostics.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Units, EDGE_BUFFER_FACTOR};
use crate::error_handling::GeoQueryError;
use crate::geohash::GeoPoint;

/// Diagnostics for one combine cycle of a live query.
#[derive(Debug, Clone, PartialEq)]
pub struct CombineReport {
    /// 1-based combine cycle number
    pub cycle: u64,
    /// Query center
    pub center: GeoPoint,
    /// Requested radius (km)
    pub radius: f64,
    /// Number of cells scanned
    pub cells: usize,
    /// Records across all cell snapshots, before the radius filter
    pub hits: usize,
    /// Records kept by the radius filter
    pub within_radius: usize,
    /// Time since the query was issued
    pub elapsed: Duration,
    /// Time spent in this combine cycle
    pub cycle_time: Duration,
}

/// Callback receiving a [`CombineReport`] after each combine cycle.
pub type DiagnosticHook = Arc<dyn Fn(&CombineReport) + Send + Sync>;

/// Options accepted by [`GeoQuery::within`](crate::GeoQuery::within).
///
/// Diagnostics are produced when `log` is set or a hook is installed. With a
/// hook, reports go to the hook; otherwise they are written through `log`.
/// Neither affects results.
#[derive(Clone)]
pub struct QueryOptions {
    /// Distance units (kilometers only)
    pub units: Units,
    /// Emit per-cycle diagnostics
    pub log: bool,
    /// Radius multiplier applied before filtering (must be finite and >= 1)
    pub edge_buffer: f64,
    /// Optional per-call diagnostics sink
    pub diagnostics: Option<DiagnosticHook>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        QueryOptions {
            units: Units::Kilometers,
            log: false,
            edge_buffer: EDGE_BUFFER_FACTOR,
            diagnostics: None,
        }
    }
}

impl fmt::Debug for QueryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOptions")
            .field("units", &self.units)
            .field("log", &self.log)
            .field("edge_buffer", &self.edge_buffer)
            .field("diagnostics", &self.diagnostics.is_some())
            .finish()
    }
}

impl QueryOptions {
    /// Sets the units from a name such as `"km"`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for any unit other than kilometers.
    pub fn with_units(mut self, units: &str) -> Result<Self, GeoQueryError> {
        self.units = Units::parse(units)?;
        Ok(self)
    }

    /// Enables or disables diagnostics logging.
    pub fn with_log(mut self, log: bool) -> Self {
        self.log = log;
        self
    }

    /// Overrides the edge buffer factor.
    pub fn with_edge_buffer(mut self, factor: f64) -> Self {
        self.edge_buffer = factor;
        self
    }

    /// Installs a diagnostics hook.
    pub fn with_diagnostics<F>(mut self, hook: F) -> Self
    where
        F: Fn(&CombineReport) + Send + Sync + 'static,
    {
        self.diagnostics = Some(Arc::new(hook));
        self
    }

    pub(crate) fn reports_enabled(&self) -> bool {
        self.log || self.diagnostics.is_some()
    }

    pub(crate) fn validate(&self) -> Result<(), GeoQueryError> {
        if !self.edge_buffer.is_finite() || self.edge_buffer < 1.0 {
            return Err(GeoQueryError::InvalidArgument(format!(
                "edge buffer must be a finite factor >= 1, got {}",
                self.edge_buffer
            )));
        }
        Ok(())
    }
}
