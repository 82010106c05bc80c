// Service configuration - loaded once at startup and injected into components
use crate::domain::metric::{CatalogError, MetricCatalog, MetricDefinition};
use crate::domain::tank::TankPreset;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

const DEFAULT_CONFIG: &str = "config/aquarium";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid metric catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("failed to read tank presets from {path}: {source}")]
    PresetsIo {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse tank presets: {0}")]
    PresetsParse(#[from] toml::de::Error),
    #[error("invalid tank presets: {0}")]
    Presets(String),
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub device: DeviceSettings,
    pub store: StoreSettings,
    pub collector: CollectorSettings,
    pub presets_file: String,
    pub metrics: Vec<MetricDefinition>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeviceSettings {
    pub bridge_url: String,
    pub device_id: String,
    pub device_ip: String,
    pub local_key: String,
    pub protocol_versions: Vec<f64>,
    pub sensor_class: String,
    pub read_timeout_secs: u64,
    pub current_timeout_secs: u64,
}

impl DeviceSettings {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn current_timeout(&self) -> Duration {
        Duration::from_secs(self.current_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreSettings {
    pub url: String,
    pub write_timeout_secs: u64,
    pub query_timeout_secs: u64,
    pub export_timeout_secs: u64,
}

impl StoreSettings {
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn export_timeout(&self) -> Duration {
        Duration::from_secs(self.export_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CollectorSettings {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl CollectorSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl AppConfig {
    pub fn catalog(&self) -> Result<MetricCatalog, ConfigError> {
        Ok(MetricCatalog::new(self.metrics.clone())?)
    }
}

fn with_defaults(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    builder
        .set_default("server.bind", "0.0.0.0:5000")?
        .set_default("device.bridge_url", "http://localhost:8888")?
        .set_default("device.protocol_versions", vec![3.5])?
        .set_default("device.sensor_class", "seafront_8in1")?
        .set_default("device.read_timeout_secs", 10)?
        .set_default("device.current_timeout_secs", 5)?
        .set_default("store.url", "http://localhost:8428")?
        .set_default("store.write_timeout_secs", 10)?
        .set_default("store.query_timeout_secs", 10)?
        .set_default("store.export_timeout_secs", 60)?
        .set_default("collector.enabled", true)?
        .set_default("collector.interval_secs", 300)?
        .set_default("presets_file", "config/tank_presets.toml")
}

/// Load from `AQUARIUM_CONFIG` (a path without extension), or `config/aquarium`.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    let path = std::env::var("AQUARIUM_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG.to_string());
    let settings = with_defaults(config::Config::builder())?
        .add_source(config::File::with_name(&path))
        .build()?;

    let app_config: AppConfig = settings.try_deserialize()?;
    validate(&app_config)?;
    Ok(app_config)
}

fn validate(app_config: &AppConfig) -> Result<(), ConfigError> {
    if app_config.device.protocol_versions.is_empty() {
        return Err(ConfigError::Load(config::ConfigError::Message(
            "device.protocol_versions must list at least one version".to_string(),
        )));
    }
    if app_config.collector.interval_secs == 0 {
        return Err(ConfigError::Load(config::ConfigError::Message(
            "collector.interval_secs must be positive".to_string(),
        )));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct PresetsFile {
    #[serde(default)]
    presets: Vec<TankPreset>,
}

pub fn load_tank_presets(path: impl AsRef<Path>, catalog: &MetricCatalog) -> Result<Vec<TankPreset>, ConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::PresetsIo {
        path: path.display().to_string(),
        source,
    })?;
    parse_tank_presets(&contents, catalog)
}

pub fn parse_tank_presets(contents: &str, catalog: &MetricCatalog) -> Result<Vec<TankPreset>, ConfigError> {
    let file: PresetsFile = toml::from_str(contents)?;
    if file.presets.is_empty() {
        return Err(ConfigError::Presets("no presets defined".to_string()));
    }

    let mut names = HashSet::new();
    for preset in &file.presets {
        if !names.insert(preset.name.as_str()) {
            return Err(ConfigError::Presets(format!("duplicate preset '{}'", preset.name)));
        }
        for (param, band) in &preset.ranges {
            if !catalog.contains_name(param) {
                return Err(ConfigError::Presets(format!(
                    "preset '{}' references unknown parameter '{}'",
                    preset.name, param
                )));
            }
            if !band.is_ordered() {
                return Err(ConfigError::Presets(format!(
                    "preset '{}' has unordered band for '{}'",
                    preset.name, param
                )));
            }
        }
    }

    Ok(file.presets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metric::tests::seafront_catalog;

    const SAMPLE: &str = r#"
[server]
bind = "127.0.0.1:5000"

[device]
device_id = "abc123"
device_ip = "192.168.0.215"
local_key = "secret"
protocol_versions = [3.5, 3.4]

[store]
url = "http://victoria:8428"

[collector]
interval_secs = 60

[[metrics]]
channel = "106"
name = "ph"
metric = "aquarium_ph"
label = "pH"
scale = 0.01

[[metrics]]
channel = "131"
name = "orp"
metric = "aquarium_orp_mv"
label = "ORP"
unit = "mV"
scale = 1
"#;

    fn parse(contents: &str) -> Result<AppConfig, ConfigError> {
        let settings = with_defaults(config::Config::builder())?
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?;
        let app_config: AppConfig = settings.try_deserialize()?;
        validate(&app_config)?;
        Ok(app_config)
    }

    #[test]
    fn test_parse_config_with_defaults() {
        let app_config = parse(SAMPLE).unwrap();

        assert_eq!(app_config.device.protocol_versions, vec![3.5, 3.4]);
        assert_eq!(app_config.device.sensor_class, "seafront_8in1");
        assert_eq!(app_config.device.read_timeout(), Duration::from_secs(10));
        assert_eq!(app_config.device.current_timeout(), Duration::from_secs(5));
        assert_eq!(app_config.store.url, "http://victoria:8428");
        assert_eq!(app_config.store.export_timeout(), Duration::from_secs(60));
        assert_eq!(app_config.collector.interval(), Duration::from_secs(60));
        assert!(app_config.collector.enabled);

        let catalog = app_config.catalog().unwrap();
        assert_eq!(catalog.scale("131", 300), Some(300.0));
        assert_eq!(catalog.by_name("orp").unwrap().unit, "mV");
    }

    #[test]
    fn test_missing_device_credentials_is_an_error() {
        let without_device = SAMPLE.replace("device_id = \"abc123\"\n", "");
        assert!(parse(&without_device).is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let zero = SAMPLE.replace("interval_secs = 60", "interval_secs = 0");
        assert!(parse(&zero).is_err());
    }

    #[test]
    fn test_duplicate_catalog_channel_rejected() {
        let duplicated = SAMPLE.replace("channel = \"131\"", "channel = \"106\"");
        let app_config = parse(&duplicated).unwrap();
        assert!(matches!(app_config.catalog(), Err(ConfigError::Catalog(_))));
    }

    const PRESETS: &str = r#"
[[presets]]
name = "freshwater"
description = "Tropical community tank"

[presets.ranges.ph]
min = 6.0
max = 8.0
ideal_min = 6.8
ideal_max = 7.5

[presets.ranges.temperature]
min = 20.0
max = 30.0
ideal_min = 24.0
ideal_max = 27.0
unit = "°C"

[[presets]]
name = "reef"
description = "Mixed reef"

[presets.ranges.ph]
min = 7.8
max = 8.5
ideal_min = 8.1
ideal_max = 8.3
"#;

    #[test]
    fn test_parse_tank_presets() {
        let presets = parse_tank_presets(PRESETS, &seafront_catalog()).unwrap();

        assert_eq!(presets.len(), 2);
        assert_eq!(presets[0].name, "freshwater");
        assert_eq!(presets[0].ranges["temperature"].unit, "°C");
        assert_eq!(presets[1].ranges["ph"].ideal_min, 8.1);
    }

    #[test]
    fn test_presets_reject_unknown_param() {
        let unknown = PRESETS.replace("[presets.ranges.temperature]", "[presets.ranges.ammonia]");
        let err = parse_tank_presets(&unknown, &seafront_catalog()).unwrap_err();
        assert!(err.to_string().contains("unknown parameter 'ammonia'"));
    }

    #[test]
    fn test_presets_reject_unordered_band() {
        let unordered = PRESETS.replace("ideal_min = 8.1", "ideal_min = 8.4");
        assert!(matches!(
            parse_tank_presets(&unordered, &seafront_catalog()),
            Err(ConfigError::Presets(_))
        ));
    }

    #[test]
    fn test_presets_reject_duplicates_and_empty() {
        let duplicated = PRESETS.replace("name = \"reef\"", "name = \"freshwater\"");
        assert!(parse_tank_presets(&duplicated, &seafront_catalog()).is_err());
        assert!(parse_tank_presets("", &seafront_catalog()).is_err());
    }

    #[test]
    fn test_shipped_config_files_are_valid() {
        let app_config = parse(include_str!("../../config/aquarium.toml")).unwrap();
        let catalog = app_config.catalog().unwrap();
        assert_eq!(catalog.definitions().len(), 7);
        assert_eq!(catalog.scale("106", 723), Some(723.0 * 0.01));

        let presets = parse_tank_presets(include_str!("../../config/tank_presets.toml"), &catalog).unwrap();
        assert!(presets.iter().any(|p| p.name == "reef"));
    }
}
