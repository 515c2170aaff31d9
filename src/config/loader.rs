use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

use super::types::Config;
use crate::filter::FilterSpec;

impl Config {
    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        debug!(path = %path.display(), "loading configuration");

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        Self::from_yaml(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config =
            serde_yaml::from_str(yaml).context("failed to parse YAML configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            anyhow::bail!("api.base_url must not be empty");
        }
        if self.api.token.trim().is_empty() {
            anyhow::bail!("api.token must not be empty");
        }

        if self.resolve.concurrency == 0 {
            anyhow::bail!("resolve.concurrency must be at least 1");
        }

        if self.output.columns.is_empty() {
            anyhow::bail!("output.columns must not be empty");
        }

        // Surface unknown filter fields and malformed rules now, not
        // once records are already in hand.
        FilterSpec::compile(&self.filters).context("invalid filter configuration")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DisplayMode;
    use std::time::Duration;

    #[test]
    fn minimal_config() {
        let yaml = r#"
api:
  base_url: "https://fw.example.net/api/v2"
  token: "secret"
"#;

        let config = Config::from_yaml(yaml).unwrap();
        assert!(config.api.verify_tls);
        assert_eq!(config.api.timeout, Duration::from_secs(20));
        assert!(config.filters.is_empty());
        assert_eq!(config.resolve.concurrency, 16);
        assert_eq!(config.resolve.display, DisplayMode::Full);
        assert_eq!(config.output.columns.len(), 9);
    }

    #[test]
    fn full_config() {
        let yaml = r#"
api:
  base_url: "https://fw.example.net/api/v2"
  token: "secret"
  verify_tls: false
  timeout: 5s
  vdom: root
inventory:
  addresses: ./inv/addresses.csv
filters:
  status: { not_in: [disable] }
  srcintf: { equals: port1 }
resolve:
  display: address
  dns_timeout: 500ms
  concurrency: 4
  run_timeout: 2m
output:
  console: true
  columns: [id, name, service, status]
telemetry:
  log_level: debug
"#;

        let config = Config::from_yaml(yaml).unwrap();
        assert!(!config.api.verify_tls);
        assert_eq!(config.api.vdom.as_deref(), Some("root"));
        assert_eq!(config.resolve.display, DisplayMode::Address);
        assert_eq!(config.resolve.dns_timeout, Duration::from_millis(500));
        assert_eq!(config.resolve.run_timeout, Some(Duration::from_secs(120)));
        assert_eq!(config.output.columns.len(), 4);
        assert_eq!(config.telemetry.log_level, "debug");
    }

    #[test]
    fn missing_token_fails() {
        let yaml = r#"
api:
  base_url: "https://fw.example.net/api/v2"
  token: ""
"#;

        let result = Config::from_yaml(yaml);
        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("api.token"));
    }

    #[test]
    fn unknown_filter_field_fails() {
        let yaml = r#"
api:
  base_url: "https://fw.example.net/api/v2"
  token: "secret"
filters:
  uuid: { equals: x }
"#;

        let result = Config::from_yaml(yaml);
        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("unknown filter field"));
    }

    #[test]
    fn unknown_display_mode_fails() {
        let yaml = r#"
api:
  base_url: "https://fw.example.net/api/v2"
  token: "secret"
resolve:
  display: fancy
"#;

        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn zero_concurrency_fails() {
        let yaml = r#"
api:
  base_url: "https://fw.example.net/api/v2"
  token: "secret"
resolve:
  concurrency: 0
"#;

        let result = Config::from_yaml(yaml);
        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("concurrency"));
    }
}
