//! Configuration loading and validation.
//!
//! All runtime behavior is driven by a single YAML file: device API
//! access, inventory table locations, filter rules, resolver settings
//! and the output stage. Validation happens once at startup; nothing is
//! re-read during processing.

mod loader;
mod types;

pub use types::{
    ApiConfig, Column, Config, DisplayMode, InventoryConfig, OutputConfig, ResolveConfig,
    TelemetryConfig,
};
