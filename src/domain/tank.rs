// Tank preset domain model - named profiles of static parameter ranges
use serde::Deserialize;
use std::collections::BTreeMap;

/// Static safe range of one parameter, authored offline.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StaticBand {
    pub min: f64,
    pub max: f64,
    pub ideal_min: f64,
    pub ideal_max: f64,
    #[serde(default)]
    pub unit: String,
}

impl StaticBand {
    pub fn is_ordered(&self) -> bool {
        self.min <= self.ideal_min && self.ideal_min <= self.ideal_max && self.ideal_max <= self.max
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TankPreset {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Keyed by canonical metric name
    pub ranges: BTreeMap<String, StaticBand>,
}

impl TankPreset {
    /// Converts "planted_freshwater" to "Planted Freshwater"
    pub fn display_name(&self) -> String {
        self.name
            .split('_')
            .filter(|s| !s.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }
}
