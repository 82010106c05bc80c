// Range inference service - Preset bands overridden by the tank's own baseline
use crate::application::query_planner::QueryPlanner;
use crate::domain::range::{DynamicRule, RangeBand, derive_band};
use crate::domain::tank::TankPreset;
use crate::domain::telemetry::{BASELINE_HOURS, present_values};
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RangeError {
    #[error("unknown tank preset '{0}'")]
    UnknownPreset(String),
}

#[derive(Clone)]
pub struct RangeService {
    planner: QueryPlanner,
    presets: Arc<Vec<TankPreset>>,
}

impl RangeService {
    pub fn new(planner: QueryPlanner, presets: Arc<Vec<TankPreset>>) -> Self {
        Self { planner, presets }
    }

    pub fn presets(&self) -> &[TankPreset] {
        &self.presets
    }

    /// Bands for every param of the preset. Params with a dynamic rule are
    /// re-derived from the last 7 days; an empty baseline keeps the preset band.
    pub async fn infer_ranges(&self, tank_type: &str) -> Result<BTreeMap<String, RangeBand>, RangeError> {
        let preset = self
            .presets
            .iter()
            .find(|p| p.name == tank_type)
            .ok_or_else(|| RangeError::UnknownPreset(tank_type.to_string()))?;

        let bands = preset.ranges.iter().map(|(param, static_band)| async move {
            let samples = match self.baseline_metric(param) {
                Some(metric) => present_values(&self.planner.query_range(metric, BASELINE_HOURS).await),
                None => Vec::new(),
            };
            let band = derive_band(param, static_band, &samples);
            tracing::debug!(
                param = %param,
                samples = samples.len(),
                dynamic = band.is_dynamic(),
                "Derived range band"
            );
            (param.clone(), band)
        });

        Ok(join_all(bands).await.into_iter().collect())
    }

    /// Metric to query for `param`, only when a dynamic rule exists for it.
    fn baseline_metric(&self, param: &str) -> Option<&str> {
        DynamicRule::for_param(param)?;
        self.planner
            .catalog()
            .by_name(param)
            .map(|def| def.metric.as_str())
    }
}
