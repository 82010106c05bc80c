// VictoriaMetrics repository implementation
use crate::application::telemetry_repository::{StoreQueryError, StoreWriteError, TelemetryRepository};
use crate::domain::telemetry::{QueryWindow, TimeSeriesPoint};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct VictoriaRepository {
    client: reqwest::Client,
    host: String,
    write_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct QueryRangeResponse {
    status: String,
    #[serde(default)]
    data: Option<QueryRangeData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryRangeData {
    #[serde(default)]
    result: Vec<QueryRangeSeries>,
}

#[derive(Debug, Deserialize)]
struct QueryRangeSeries {
    #[serde(default)]
    values: Vec<(f64, serde_json::Value)>,
}

impl VictoriaRepository {
    pub fn new(host: String, write_timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: host.trim_end_matches('/').to_string(),
            write_timeout,
        }
    }

    fn import_url(&self) -> String {
        format!("{}/api/v1/import/prometheus", self.host)
    }

    fn build_query_url(&self, window: &QueryWindow) -> String {
        format!(
            "{}/api/v1/query_range?query={}&start={}&end=now&step={}",
            self.host,
            urlencoding::encode(&window.metric),
            urlencoding::encode(&window.start()),
            window.step
        )
    }
}

/// Decode a `query_range` body. Only the first result series is used; sample
/// values that are null or not a finite number become absent points.
fn parse_query_response(body: &[u8]) -> Result<Vec<TimeSeriesPoint>, StoreQueryError> {
    let response: QueryRangeResponse =
        serde_json::from_slice(body).map_err(|e| StoreQueryError::Malformed(e.to_string()))?;

    if response.status != "success" {
        return Err(StoreQueryError::Unsuccessful {
            status: response.status,
            error: response.error.unwrap_or_default(),
        });
    }

    let Some(series) = response.data.and_then(|d| d.result.into_iter().next()) else {
        return Ok(Vec::new());
    };

    Ok(series
        .values
        .into_iter()
        .map(|(ts, raw)| {
            let time_ms = (ts * 1000.0).round() as i64;
            match sample_value(&raw) {
                Some(value) => TimeSeriesPoint::new(time_ms, value),
                None => TimeSeriesPoint::absent(time_ms),
            }
        })
        .collect())
}

fn sample_value(raw: &serde_json::Value) -> Option<f64> {
    let value = match raw {
        serde_json::Value::String(s) => s.parse::<f64>().ok()?,
        serde_json::Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

#[async_trait]
impl TelemetryRepository for VictoriaRepository {
    async fn write_lines(&self, lines: &[String]) -> Result<(), StoreWriteError> {
        let response = self
            .client
            .post(self.import_url())
            .timeout(self.write_timeout)
            .body(lines.join("\n"))
            .send()
            .await
            .map_err(|e| StoreWriteError::Transport(e.to_string()))?;

        // The import endpoint answers 204 on success; anything else means the batch was not stored
        if response.status() != StatusCode::NO_CONTENT {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreWriteError::Rejected { status, body });
        }

        tracing::debug!(lines = lines.len(), "Pushed exposition lines");
        Ok(())
    }

    async fn query_range(&self, window: &QueryWindow) -> Result<Vec<TimeSeriesPoint>, StoreQueryError> {
        let url = self.build_query_url(window);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| StoreQueryError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| StoreQueryError::Transport(e.to_string()))?;

        if !status.is_success() {
            // VictoriaMetrics reports query errors as JSON with a 4xx/5xx status
            if let Err(e @ StoreQueryError::Unsuccessful { .. }) = parse_query_response(&body) {
                return Err(e);
            }
            return Err(StoreQueryError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        parse_query_response(&body)
    }
}
