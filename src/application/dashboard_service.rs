// Dashboard service - Current reading and history for the dashboard API
use crate::application::device_reader::{DeviceError, DeviceReader, read_with_timeout};
use crate::application::query_planner::QueryPlanner;
use crate::domain::dashboard::{ExportTable, History};
use crate::domain::metric::{MetricCatalog, ScaledReading};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct DashboardService {
    reader: Arc<dyn DeviceReader>,
    catalog: Arc<MetricCatalog>,
    planner: QueryPlanner,
    current_timeout: Duration,
}

impl DashboardService {
    pub fn new(
        reader: Arc<dyn DeviceReader>,
        catalog: Arc<MetricCatalog>,
        planner: QueryPlanner,
        current_timeout: Duration,
    ) -> Self {
        Self {
            reader,
            catalog,
            planner,
            current_timeout,
        }
    }

    /// Live reading straight from the device. Failures surface to the caller.
    pub async fn current_reading(&self) -> Result<ScaledReading, DeviceError> {
        let raw = read_with_timeout(self.reader.as_ref(), self.current_timeout).await?;
        Ok(self.catalog.scale_reading(&raw))
    }

    /// Every catalog metric over the last `hours`. Metrics without data come
    /// back as empty series.
    pub async fn history(&self, hours: u32) -> History {
        let hours = hours.max(1);
        let queries = self.catalog.definitions().iter().map(|def| async move {
            let points = self.planner.query_range(&def.metric, hours).await;
            (def.name.clone(), points)
        });

        History::assemble(join_all(queries).await)
    }

    pub async fn export(&self) -> ExportTable {
        self.planner.bulk_export().await
    }
}
