// Library for tests to access modules

pub mod config;
pub mod docker_repo;
pub mod error;
pub mod log_frame;
pub mod models;
pub mod prometheus_repo;
pub mod public_ip;
pub mod routes;
pub mod runtime;
pub mod service;
pub mod sysinfo_repo;
pub mod version;
