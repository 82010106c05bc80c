// Application layer - Use cases and the ports they depend on
pub mod collector_service;
pub mod dashboard_service;
pub mod device_reader;
pub mod query_planner;
pub mod range_service;
pub mod telemetry_repository;
