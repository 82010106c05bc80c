// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod csv_stream;
pub mod device_bridge;
pub mod exposition;
pub mod http_response;
pub mod victoria_repository;
