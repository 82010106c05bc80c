// Device bridge - reads the sensor through a local device-driver HTTP bridge
use crate::application::device_reader::{DeviceError, DeviceReader};
use crate::domain::metric::RawReading;
use crate::infrastructure::config::DeviceSettings;
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Device protocol version, e.g. 3.5
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProtocolVersion(pub f64);

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// Try `attempt` for each candidate in order and return the first success
/// with the candidate that produced it.
pub async fn first_success<C, T, F, Fut>(candidates: &[C], mut attempt: F) -> Result<(T, C), DeviceError>
where
    C: Copy + fmt::Display,
    F: FnMut(C) -> Fut,
    Fut: Future<Output = Result<T, DeviceError>>,
{
    let mut failures = Vec::with_capacity(candidates.len());

    for &candidate in candidates {
        match attempt(candidate).await {
            Ok(value) => return Ok((value, candidate)),
            Err(e) => {
                tracing::debug!(candidate = %candidate, error = %e, "Candidate rejected");
                failures.push((candidate, e));
            }
        }
    }

    match failures.len() {
        0 => Err(DeviceError::Exhausted(Vec::new())),
        1 => Err(failures.remove(0).1),
        _ => Err(DeviceError::Exhausted(
            failures
                .into_iter()
                .map(|(candidate, e)| format!("{}: {}", candidate, e))
                .collect(),
        )),
    }
}

/// Interpret a device `status()` payload: an explicit `Error` key is a hard
/// failure; otherwise data-points come from `dps` or the top-level map.
/// Non-integer data-points are skipped.
pub fn parse_status(payload: &serde_json::Value) -> Result<RawReading, DeviceError> {
    let object = payload
        .as_object()
        .ok_or_else(|| DeviceError::Malformed("status payload is not an object".to_string()))?;

    if let Some(error) = object.get("Error") {
        let cause = match error {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(DeviceError::Reported(cause));
    }

    let dps = match object.get("dps") {
        Some(dps) => dps
            .as_object()
            .ok_or_else(|| DeviceError::Malformed("dps is not an object".to_string()))?,
        None => object,
    };

    Ok(dps
        .iter()
        .filter_map(|(channel, value)| value.as_i64().map(|raw| (channel.clone(), raw)))
        .collect())
}

pub struct HttpDeviceBridge {
    client: reqwest::Client,
    base_url: String,
    settings: DeviceSettings,
    versions: Vec<ProtocolVersion>,
}

impl HttpDeviceBridge {
    pub fn new(settings: DeviceSettings) -> Self {
        let versions = settings
            .protocol_versions
            .iter()
            .copied()
            .map(ProtocolVersion)
            .collect();

        Self {
            client: reqwest::Client::new(),
            base_url: settings.bridge_url.trim_end_matches('/').to_string(),
            settings,
            versions,
        }
    }

    async fn status(&self, version: ProtocolVersion, timeout: Duration) -> Result<RawReading, DeviceError> {
        let version = version.to_string();
        let response = self
            .client
            .get(format!("{}/status", self.base_url))
            .query(&[
                ("id", self.settings.device_id.as_str()),
                ("ip", self.settings.device_ip.as_str()),
                ("key", self.settings.local_key.as_str()),
                ("version", version.as_str()),
            ])
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DeviceError::Timeout(timeout)
                } else {
                    DeviceError::Unreachable(e.to_string())
                }
            })?;

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| DeviceError::Malformed(e.to_string()))?;

        parse_status(&payload)
    }
}

/// Share of the read budget given to each protocol attempt, so a stalled
/// version still leaves time for the next candidates.
fn attempt_timeout(budget: Duration, candidates: usize) -> Duration {
    budget / u32::try_from(candidates.max(1)).unwrap_or(u32::MAX)
}

#[async_trait]
impl DeviceReader for HttpDeviceBridge {
    async fn read_raw(&self) -> Result<RawReading, DeviceError> {
        let timeout = attempt_timeout(self.settings.read_timeout(), self.versions.len());
        let (raw, version) = first_success(&self.versions, |v| self.status(v, timeout)).await?;
        tracing::debug!(%version, channels = raw.len(), "Read device status");
        Ok(raw)
    }
}
