use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::filter::RuleConfig;

/// Root configuration for fwpol
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Device management API access
    pub api: ApiConfig,

    /// Inventory table locations
    #[serde(default)]
    pub inventory: InventoryConfig,

    /// Client-side record filters, one rule per field
    #[serde(default)]
    pub filters: BTreeMap<String, RuleConfig>,

    /// Resolution stage settings
    #[serde(default)]
    pub resolve: ResolveConfig,

    /// Output stage settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging settings
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Device API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// API base URL
    pub base_url: String,

    /// Bearer token
    pub token: String,

    /// Verify the device TLS certificate
    #[serde(default = "default_true")]
    pub verify_tls: bool,

    /// Request timeout
    #[serde(default = "default_api_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Virtual domain to query
    #[serde(default)]
    pub vdom: Option<String>,
}

/// Paths to the three exported inventory tables
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryConfig {
    /// Address objects CSV
    #[serde(default)]
    pub addresses: Option<PathBuf>,

    /// Custom services CSV
    #[serde(default)]
    pub services: Option<PathBuf>,

    /// Service groups CSV
    #[serde(default)]
    pub service_groups: Option<PathBuf>,
}

/// Resolution stage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ResolveConfig {
    /// Send src/dst addresses through the name resolver
    #[serde(default = "default_true")]
    pub addresses: bool,

    /// Send services through the service resolver
    #[serde(default = "default_true")]
    pub services: bool,

    /// Display mode for resolved fields
    #[serde(default)]
    pub display: DisplayMode,

    /// Per-query DNS timeout
    #[serde(default = "default_dns_timeout", with = "humantime_serde")]
    pub dns_timeout: Duration,

    /// Maximum records resolving concurrently
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Deadline for the whole resolution stage
    #[serde(default, with = "humantime_serde::opt")]
    pub run_timeout: Option<Duration>,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            addresses: true,
            services: true,
            display: DisplayMode::default(),
            dns_timeout: default_dns_timeout(),
            concurrency: default_concurrency(),
            run_timeout: None,
        }
    }
}

/// How resolved fields are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// `name[address]` / `name(ports)`
    #[default]
    Full,
    /// Resolved literal only, falling back to the original identifier
    Address,
}

/// Output stage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Output directory
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Write a CSV file
    #[serde(default = "default_true")]
    pub csv: bool,

    /// CSV filename; timestamped when unset
    #[serde(default)]
    pub filename: Option<String>,

    /// Print a console table
    #[serde(default)]
    pub console: bool,

    /// Maximum console column width before clipping
    #[serde(default = "default_max_col_width")]
    pub max_col_width: usize,

    /// Columns, in output order
    #[serde(default = "Column::default_set")]
    pub columns: Vec<Column>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            csv: true,
            filename: None,
            console: false,
            max_col_width: default_max_col_width(),
            columns: Column::default_set(),
        }
    }
}

/// Output columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Id,
    Name,
    SrcIntf,
    DstIntf,
    SrcAddr,
    DstAddr,
    Service,
    Action,
    Status,
    Schedule,
    LogTraffic,
}

impl Column {
    /// Header written to CSV and the console table.
    pub fn header(&self) -> &'static str {
        match self {
            Column::Id => "policyid",
            Column::Name => "name",
            Column::SrcIntf => "srcintf",
            Column::DstIntf => "dstintf",
            Column::SrcAddr => "srcaddr",
            Column::DstAddr => "dstaddr",
            Column::Service => "service",
            Column::Action => "action",
            Column::Status => "status",
            Column::Schedule => "schedule",
            Column::LogTraffic => "logtraffic",
        }
    }

    pub(crate) fn default_set() -> Vec<Column> {
        vec![
            Column::Id,
            Column::Name,
            Column::SrcIntf,
            Column::DstIntf,
            Column::SrcAddr,
            Column::DstAddr,
            Column::Service,
            Column::Action,
            Column::Status,
        ]
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Log level when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Structured JSON logs instead of human-readable output
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_api_timeout() -> Duration {
    Duration::from_secs(20)
}

fn default_dns_timeout() -> Duration {
    Duration::from_secs(3)
}

fn default_concurrency() -> usize {
    16
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./output")
}

fn default_max_col_width() -> usize {
    80
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Humantime serde support module
mod humantime_serde {
    use serde::{self, Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub mod opt {
        use serde::{self, Deserialize, Deserializer};
        use std::time::Duration;

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<String>::deserialize(deserializer)? {
                Some(s) => humantime::parse_duration(&s)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}
