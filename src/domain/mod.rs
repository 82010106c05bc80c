// Domain layer - Catalog, readings, ranges and presets
pub mod dashboard;
pub mod metric;
pub mod range;
pub mod tank;
pub mod telemetry;
