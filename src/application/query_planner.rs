// Query planner - Resolution-aware range queries that never fail the caller
use crate::application::telemetry_repository::{StoreQueryError, TelemetryRepository};
use crate::domain::dashboard::ExportTable;
use crate::domain::metric::MetricCatalog;
use crate::domain::telemetry::{EXPORT_HOURS, QueryStep, QueryWindow, TimeSeriesPoint};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct QueryPlanner {
    repository: Arc<dyn TelemetryRepository>,
    catalog: Arc<MetricCatalog>,
    query_timeout: Duration,
    export_timeout: Duration,
}

impl QueryPlanner {
    pub fn new(
        repository: Arc<dyn TelemetryRepository>,
        catalog: Arc<MetricCatalog>,
        query_timeout: Duration,
        export_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            catalog,
            query_timeout,
            export_timeout,
        }
    }

    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    /// Series for `metric` over the last `lookback_hours`, oldest first.
    /// Store errors and timeouts degrade to an empty series.
    pub async fn query_range(&self, metric: &str, lookback_hours: u32) -> Vec<TimeSeriesPoint> {
        let window = QueryWindow::new(metric, lookback_hours);
        self.run(&window, self.query_timeout).await
    }

    async fn run(&self, window: &QueryWindow, timeout: Duration) -> Vec<TimeSeriesPoint> {
        tracing::debug!(
            metric = %window.metric,
            hours = window.lookback_hours,
            step = %window.step,
            max_points = window.max_points(),
            "Executing range query"
        );

        let result = match tokio::time::timeout(timeout, self.repository.query_range(window)).await {
            Ok(result) => result,
            Err(_) => Err(StoreQueryError::Timeout),
        };

        match result {
            Ok(points) => points,
            Err(e) => {
                tracing::error!(metric = %window.metric, error = %e, "Time-series query failed");
                Vec::new()
            }
        }
    }

    /// Every catalog metric over 30 days at a 5 minute step, assembled into
    /// one table aligned on the first metric with data.
    pub async fn bulk_export(&self) -> ExportTable {
        let queries = self.catalog.definitions().iter().map(|def| async move {
            let window = QueryWindow::with_step(&def.metric, EXPORT_HOURS, QueryStep::FiveMinutes);
            let points = self.run(&window, self.export_timeout).await;
            (def.name.clone(), def.header(), points)
        });

        let table = ExportTable::assemble(join_all(queries).await);
        tracing::info!(
            rows = table.row_count(),
            columns = table.columns.len(),
            "Assembled bulk export"
        );
        table
    }
}
