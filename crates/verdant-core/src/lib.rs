//! Configuration and service container for the Verdant climate impact toolkit.
//!
//! - [`config`] -- [`VerdantConfig`], loaded from `verdant-config.yaml`
//! - [`toolkit`] -- [`ClimateToolkit`], built once from the config and
//!   passed by reference to consumers

pub mod config;
pub mod toolkit;

pub use config::{ConfigError, LogFormat, LoggingConfig, VerdantConfig};
pub use toolkit::{
    ClimateToolkit, ToolkitError, TrackedActivity, TrackedLetter, TrackedPurchase,
};
