// Collector service - Poll the device, scale, encode and push to the store
use crate::application::device_reader::{DeviceError, DeviceReader, read_with_timeout};
use crate::application::telemetry_repository::{StoreWriteError, TelemetryRepository};
use crate::domain::metric::MetricCatalog;
use crate::infrastructure::exposition::encode_exposition;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Result of one `Polling` phase. Every variant returns the loop to `Idle`.
#[derive(Debug)]
pub enum CycleOutcome {
    Written { metrics: usize, summary: String },
    /// The device answered but no data-point matched the catalog
    NoMatchedChannels,
    DeviceFailed(DeviceError),
    /// The device was read but the store refused the batch
    WriteFailed { error: StoreWriteError, summary: String },
}

impl CycleOutcome {
    fn log(&self) {
        match self {
            CycleOutcome::Written { metrics, summary } => {
                tracing::info!(metrics, "Wrote metrics to time-series store");
                tracing::info!("Current: {}", summary);
            }
            CycleOutcome::NoMatchedChannels => {
                tracing::warn!("No data points to write, skipping this cycle");
            }
            CycleOutcome::DeviceFailed(e) => {
                tracing::error!(error = %e, "Failed to read sensor");
            }
            CycleOutcome::WriteFailed { error, summary } => {
                tracing::error!(%error, "Failed to write to time-series store");
                tracing::info!("Current: {}", summary);
            }
        }
    }
}

#[derive(Clone)]
pub struct CollectorService {
    reader: Arc<dyn DeviceReader>,
    repository: Arc<dyn TelemetryRepository>,
    catalog: Arc<MetricCatalog>,
    sensor_class: String,
    interval: Duration,
    read_timeout: Duration,
}

impl CollectorService {
    pub fn new(
        reader: Arc<dyn DeviceReader>,
        repository: Arc<dyn TelemetryRepository>,
        catalog: Arc<MetricCatalog>,
        sensor_class: String,
        interval: Duration,
        read_timeout: Duration,
    ) -> Self {
        Self {
            reader,
            repository,
            catalog,
            sensor_class,
            interval,
            read_timeout,
        }
    }

    /// A single poll cycle. Never retries; the next tick is the retry.
    pub async fn collect_once(&self) -> CycleOutcome {
        let raw = match read_with_timeout(self.reader.as_ref(), self.read_timeout).await {
            Ok(raw) => raw,
            Err(e) => return CycleOutcome::DeviceFailed(e),
        };

        let reading = self.catalog.scale_reading(&raw);
        if reading.is_empty() {
            return CycleOutcome::NoMatchedChannels;
        }
        let timestamp_ms = chrono::Utc::now().timestamp_millis();
        let lines = encode_exposition(&reading, &self.sensor_class, timestamp_ms);

        match self.repository.write_lines(&lines).await {
            Ok(()) => CycleOutcome::Written {
                metrics: reading.len(),
                summary: reading.summary(),
            },
            Err(error) => CycleOutcome::WriteFailed {
                error,
                summary: reading.summary(),
            },
        }
    }

    /// Poll every `interval` until `shutdown` flips. Ticks are measured from
    /// the start of each cycle; an overrunning cycle is followed immediately.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Starting aquarium collector");

        loop {
            let started = Instant::now();
            self.collect_once().await.log();

            let delay = next_delay(self.interval, started.elapsed());
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => {
                    tracing::info!("Collector stopping");
                    return;
                }
            }
        }
    }
}

/// Time left until the next cycle should start; zero when the cycle overran.
pub fn next_delay(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}
