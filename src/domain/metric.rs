// Metric catalog domain model - channel ids to named, scaled metrics
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

/// One sensor data-point as the service knows it.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MetricDefinition {
    /// Device data-point id, e.g. "106"
    pub channel: String,
    /// Short canonical name, e.g. "ph"
    pub name: String,
    /// Time-series identifier, e.g. "aquarium_ph"
    pub metric: String,
    pub label: String,
    #[serde(default)]
    pub unit: String,
    pub scale: f64,
}

impl MetricDefinition {
    /// Column header used by exports, e.g. "EC (µS/cm)"
    pub fn header(&self) -> String {
        if self.unit.is_empty() {
            self.label.clone()
        } else {
            format!("{} ({})", self.label, self.unit)
        }
    }
}

/// Raw integer values keyed by channel id, as returned by one device read.
pub type RawReading = HashMap<String, i64>;

#[derive(Debug, Clone, PartialEq)]
pub struct ScaledValue {
    pub name: String,
    pub metric: String,
    pub value: f64,
}

/// Scaled values of one poll, in catalog order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScaledReading {
    pub values: Vec<ScaledValue>,
}

impl ScaledReading {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.iter().find(|v| v.name == name).map(|v| v.value)
    }

    /// "temperature=25.30, ph=7.23"
    pub fn summary(&self) -> String {
        self.values
            .iter()
            .map(|v| format!("{}={:.2}", v.name, v.value))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CatalogError {
    #[error("metric catalog is empty")]
    Empty,
    #[error("duplicate channel id '{0}' in metric catalog")]
    DuplicateChannel(String),
    #[error("duplicate metric name '{0}' in metric catalog")]
    DuplicateName(String),
    #[error("metric '{name}' has invalid scale {scale}")]
    InvalidScale { name: String, scale: f64 },
}

/// Immutable channel-id lookup table, built once at startup.
#[derive(Debug, Clone)]
pub struct MetricCatalog {
    definitions: Vec<MetricDefinition>,
    by_channel: HashMap<String, usize>,
}

impl MetricCatalog {
    pub fn new(definitions: Vec<MetricDefinition>) -> Result<Self, CatalogError> {
        if definitions.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut by_channel = HashMap::with_capacity(definitions.len());
        let mut names = HashSet::new();
        let mut metrics = HashSet::new();

        for (idx, def) in definitions.iter().enumerate() {
            if !def.scale.is_finite() || def.scale == 0.0 {
                return Err(CatalogError::InvalidScale {
                    name: def.name.clone(),
                    scale: def.scale,
                });
            }
            if by_channel.insert(def.channel.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateChannel(def.channel.clone()));
            }
            if !names.insert(def.name.as_str()) {
                return Err(CatalogError::DuplicateName(def.name.clone()));
            }
            if !metrics.insert(def.metric.as_str()) {
                return Err(CatalogError::DuplicateName(def.metric.clone()));
            }
        }

        Ok(Self {
            definitions,
            by_channel,
        })
    }

    pub fn definitions(&self) -> &[MetricDefinition] {
        &self.definitions
    }

    pub fn by_name(&self, name: &str) -> Option<&MetricDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name(name).is_some()
    }

    /// Scale a single raw value. Unknown channels yield `None`.
    pub fn scale(&self, channel: &str, raw: i64) -> Option<f64> {
        self.by_channel
            .get(channel)
            .map(|&idx| raw as f64 * self.definitions[idx].scale)
    }

    /// Scale every known channel of a raw reading; unknown channels are dropped.
    pub fn scale_reading(&self, raw: &RawReading) -> ScaledReading {
        let values = self
            .definitions
            .iter()
            .filter_map(|def| {
                raw.get(&def.channel).map(|&value| ScaledValue {
                    name: def.name.clone(),
                    metric: def.metric.clone(),
                    value: value as f64 * def.scale,
                })
            })
            .collect();

        ScaledReading { values }
    }
}
