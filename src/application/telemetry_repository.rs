// Repository trait for time-series store access
use crate::domain::telemetry::{QueryWindow, TimeSeriesPoint};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StoreWriteError {
    #[error("failed to reach time-series store: {0}")]
    Transport(String),
    #[error("time-series store rejected write with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreQueryError {
    #[error("failed to reach time-series store: {0}")]
    Transport(String),
    #[error("time-series store query failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed time-series store response: {0}")]
    Malformed(String),
    #[error("time-series store reported '{status}': {error}")]
    Unsuccessful { status: String, error: String },
    #[error("time-series store query timed out")]
    Timeout,
}

#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// Push exposition lines; succeeds only when the store accepts the whole batch
    async fn write_lines(&self, lines: &[String]) -> Result<(), StoreWriteError>;

    /// Ranged query for one metric, oldest first. An empty result is `Ok(vec![])`.
    async fn query_range(
        &self,
        window: &QueryWindow,
    ) -> Result<Vec<TimeSeriesPoint>, StoreQueryError>;
}
