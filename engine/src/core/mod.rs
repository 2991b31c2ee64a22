//! Core application infrastructure

pub mod cli;
pub mod config;
pub mod constants;
pub mod storage;

pub use crate::app::CoreApp;
pub use cli::{CliConfig, Commands};
pub use config::{AnalyticsBackend, AppConfig};
pub use storage::AppStorage;

// Re-export service enum from data layer
pub use crate::data::AnalyticsService;
