// Telemetry data domain models
use std::fmt;

/// Look-back window used by the range inference engine (7 days)
pub const BASELINE_HOURS: u32 = 168;

/// Look-back window of the bulk export (30 days)
pub const EXPORT_HOURS: u32 = 30 * 24;

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesPoint {
    pub time_ms: i64,
    /// `None` when the store returned a null or unparseable sample
    pub value: Option<f64>,
}

impl TimeSeriesPoint {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self {
            time_ms,
            value: Some(value),
        }
    }

    pub fn absent(time_ms: i64) -> Self {
        Self {
            time_ms,
            value: None,
        }
    }
}

/// Present, finite values of a series in order.
pub fn present_values(points: &[TimeSeriesPoint]) -> Vec<f64> {
    points
        .iter()
        .filter_map(|p| p.value)
        .filter(|v| v.is_finite())
        .collect()
}

/// Aggregation step of a ranged query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStep {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    OneHour,
}

impl QueryStep {
    /// Coarser steps for longer windows keep a series around 2000 points or fewer.
    pub fn for_lookback(hours: u32) -> Self {
        match hours {
            0..=6 => QueryStep::OneMinute,
            7..=24 => QueryStep::FiveMinutes,
            25..=168 => QueryStep::FifteenMinutes,
            _ => QueryStep::OneHour,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStep::OneMinute => "1m",
            QueryStep::FiveMinutes => "5m",
            QueryStep::FifteenMinutes => "15m",
            QueryStep::OneHour => "1h",
        }
    }

    pub fn seconds(&self) -> u32 {
        match self {
            QueryStep::OneMinute => 60,
            QueryStep::FiveMinutes => 300,
            QueryStep::FifteenMinutes => 900,
            QueryStep::OneHour => 3600,
        }
    }
}

impl fmt::Display for QueryStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A relative `[now - lookback, now]` range query for one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryWindow {
    pub metric: String,
    pub lookback_hours: u32,
    pub step: QueryStep,
}

impl QueryWindow {
    /// Window with the step chosen from the look-back. Hours below 1 are raised to 1.
    pub fn new(metric: impl Into<String>, lookback_hours: u32) -> Self {
        let lookback_hours = lookback_hours.max(1);
        Self {
            metric: metric.into(),
            lookback_hours,
            step: QueryStep::for_lookback(lookback_hours),
        }
    }

    /// Window with a fixed step, used by the bulk export.
    pub fn with_step(metric: impl Into<String>, lookback_hours: u32, step: QueryStep) -> Self {
        Self {
            metric: metric.into(),
            lookback_hours: lookback_hours.max(1),
            step,
        }
    }

    pub fn start(&self) -> String {
        format!("-{}h", self.lookback_hours)
    }

    /// Upper bound on the number of points the store can return.
    pub fn max_points(&self) -> u64 {
        u64::from(self.lookback_hours).saturating_mul(3600) / u64::from(self.step.seconds()) + 1
    }
}
