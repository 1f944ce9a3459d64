// Application layer - Use cases over an injected data source
pub mod catalog_service;
pub mod dashboard_service;
pub mod snapshot_service;
pub mod usage_repository;
