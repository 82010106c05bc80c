// Device reader port - the opaque "read current values" capability
use crate::domain::metric::RawReading;
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum DeviceError {
    #[error("device unreachable: {0}")]
    Unreachable(String),
    #[error("device read timed out after {0:?}")]
    Timeout(Duration),
    #[error("malformed device response: {0}")]
    Malformed(String),
    /// The device answered with an explicit `Error` payload
    #[error("{0}")]
    Reported(String),
    #[error("no protocol version accepted: {}", .0.join("; "))]
    Exhausted(Vec<String>),
}

#[async_trait]
pub trait DeviceReader: Send + Sync {
    async fn read_raw(&self) -> Result<RawReading, DeviceError>;
}

/// Run `read_raw` bounded by `timeout`.
pub async fn read_with_timeout(
    reader: &dyn DeviceReader,
    timeout: Duration,
) -> Result<RawReading, DeviceError> {
    match tokio::time::timeout(timeout, reader.read_raw()).await {
        Ok(result) => result,
        Err(_) => Err(DeviceError::Timeout(timeout)),
    }
}
