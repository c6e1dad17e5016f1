use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use yaml_rust2::Yaml;

use crate::yaml_include::{emit_yaml, load_yaml_with_includes};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config include chain too deep at {0}")]
    IncludeDepth(PathBuf),
    #[error("invalid yaml: {0}")]
    Scan(#[from] yaml_rust2::ScanError),
    #[error("failed to re-emit merged yaml: {0}")]
    Emit(#[from] yaml_rust2::EmitError),
    #[error("failed to deserialize config: {0}")]
    Deserialize(#[from] serde_yml::Error),
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    pub project_name: String,
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            project_name: "ecom".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Saturating range a continuous feature is clipped to before rescaling.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct RangeConfig {
    pub min: f64,
    pub max: f64,
}

impl RangeConfig {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EncoderConfig {
    pub order_value: RangeConfig,
    pub cart_item_count: RangeConfig,
    pub merchant_return_rate: RangeConfig,
    pub merchant_order_count: RangeConfig,
    pub product_categories: Vec<String>,
    pub phone_prefixes: Vec<String>,
    pub browsers: Vec<String>,
    pub operating_systems: Vec<String>,
    pub devices: Vec<String>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            order_value: RangeConfig::new(0.0, 20_000.0),
            cart_item_count: RangeConfig::new(0.0, 20.0),
            merchant_return_rate: RangeConfig::new(0.0, 1.0),
            merchant_order_count: RangeConfig::new(0.0, 1_000.0),
            product_categories: strings(&["clothing", "cosmetics", "electronics", "groceries"]),
            phone_prefixes: strings(&["013", "015", "016", "017", "018", "019"]),
            browsers: strings(&["Chrome", "Opera", "Firefox", "Safari", "Edge"]),
            operating_systems: strings(&["Windows", "Android", "iOS", "Mac OS X"]),
            devices: strings(&["phone", "desktop", "tablet"]),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    /// Dataset used when a prediction arrives before any explicit fit
    pub dataset_path: PathBuf,
    /// Top-level key holding the order records in the dataset file
    pub dataset_key: String,
    /// Held-out evaluation only runs above this many records
    pub evaluation_min_records: usize,
    pub test_fraction: f64,
    pub seed: u64,
    pub decision_threshold: f64,
    /// Inverse L2 regularization strength
    pub regularization: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub enrichment_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("test_data.json"),
            dataset_key: "orders".to_string(),
            evaluation_min_records: 50,
            test_fraction: 0.2,
            seed: 42,
            decision_threshold: 0.5,
            regularization: 1.0,
            max_iterations: 1000,
            tolerance: 1e-6,
            enrichment_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DistrictConfig {
    pub threshold: f64,
}

impl Default for DistrictConfig {
    fn default() -> Self {
        Self { threshold: 80.0 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub order_info_url: String,
    pub asn_lookup_url: String,
    pub timeout_ms: u64,
    /// Substrings of an ASN organization that mark the target country
    pub target_country_markers: Vec<String>,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            order_info_url: "http://localhost:5000/order".to_string(),
            asn_lookup_url: "https://ipinfo.io/".to_string(),
            timeout_ms: 5_000,
            target_country_markers: strings(&["Bangladesh", "BD"]),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub common: CommonConfig,
    pub encoder: EncoderConfig,
    pub engine: EngineConfig,
    pub district: DistrictConfig,
    pub enrichment: EnrichmentConfig,
}

impl Config {
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = load_yaml_with_includes(config_path.as_ref())?;
        if matches!(yaml, Yaml::Null) {
            return Ok(Self::default());
        }

        let contents = emit_yaml(&yaml)?;
        let config = serde_yml::from_str(&contents)?;

        Ok(config)
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.engine.dataset_key, "orders");
        assert_eq!(config.engine.seed, 42);
        assert_eq!(config.engine.evaluation_min_records, 50);
        assert_eq!(config.district.threshold, 80.0);
        assert_eq!(config.encoder.order_value, RangeConfig::new(0.0, 20_000.0));
        assert_eq!(config.enrichment.timeout_ms, 5_000);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dev.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"engine:\n  seed: 7\nencoder:\n  order_value:\n    min: 100\n    max: 50000\n")
            .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.engine.seed, 7);
        assert_eq!(config.engine.test_fraction, 0.2);
        assert_eq!(config.encoder.order_value, RangeConfig::new(100.0, 50_000.0));
        assert_eq!(config.encoder.phone_prefixes.len(), 6);
    }

    #[test]
    fn test_empty_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.yaml");
        std::fs::File::create(&path).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.common.log_level, "info");
    }
}
