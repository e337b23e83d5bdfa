pub mod config;
pub mod routes;

pub use config::{AppConfig, ConfigLoadError, ConfigOrigin, LoadedConfig, DEFAULT_CONFIG_PATH};
pub use routes::{impact_router, parse_evaluation_request, ApiError, SharedEngine};
