//! Configuration loading from TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global configuration for pubgraph
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub benchmark: BenchmarkConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub pace: bool,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub api_key: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: pubgraph_pubmed::config::DEFAULT_BASE_URL.to_string(),
            timeout_secs: pubgraph_pubmed::config::DEFAULT_TIMEOUT.as_secs(),
            pace: true,
            api_key: std::env::var("NCBI_API_KEY").ok().filter(|k| !k.is_empty()),
        }
    }
}

impl FetchConfig {
    /// Fetcher configuration rooted at `cache_dir`
    pub fn to_pubmed(&self, cache_dir: PathBuf, pace: bool) -> pubgraph_pubmed::Config {
        pubgraph_pubmed::Config {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            cache_dir: Some(cache_dir),
            pace_delays: self.pace && pace,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// `pubmed-diabetes.zip` or an extracted `pubmed-diabetes/data` directory
    pub dataset: PathBuf,
    pub shuffle: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("data/pubmed-diabetes.zip"),
            shuffle: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub default_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_dir: PathBuf::from("output"),
        }
    }
}

/// `api_key = "${NCBI_API_KEY}"` reads the key from the environment
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Empty values, and unset variables, become `None`
fn expand_env_var(s: &str) -> Option<String> {
    let value = if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()?
    } else {
        s.to_string()
    };
    (!value.is_empty()).then_some(value)
}

impl Config {
    /// `./pubgraph.toml`, then the per-user config file, then defaults
    pub fn load() -> Result<Self> {
        let user = directories::ProjectDirs::from("", "", "pubgraph")
            .map(|dirs| dirs.config_dir().join("config.toml"));
        let candidates = std::iter::once(PathBuf::from("pubgraph.toml")).chain(user);

        for path in candidates {
            if path.is_file() {
                return Self::from_file(&path);
            }
        }
        log::debug!("No pubgraph.toml found, using built-in defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        let config = toml::from_str::<Config>(&text)
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        log::info!("Config: {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.fetch.timeout_secs, 30);
        assert!(config.fetch.pace);
        assert!(config.fetch.base_url.contains("efetch.fcgi"));
        assert!(config.benchmark.shuffle);
        assert_eq!(config.output.default_dir, PathBuf::from("output"));
    }

    #[test]
    fn expand_env_var_simple() {
        std::env::set_var("PUBGRAPH_TEST_KEY", "abc123");
        assert_eq!(
            expand_env_var("${PUBGRAPH_TEST_KEY}"),
            Some("abc123".to_string())
        );
        std::env::remove_var("PUBGRAPH_TEST_KEY");
    }

    #[test]
    fn expand_env_var_literal() {
        assert_eq!(expand_env_var("literal"), Some("literal".to_string()));
    }

    #[test]
    fn expand_env_var_missing_or_empty() {
        assert_eq!(expand_env_var("${NONEXISTENT_VAR_12345}"), None);
        assert_eq!(expand_env_var(""), None);
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
[fetch]
base_url = "http://localhost:8080/efetch?id="
timeout_secs = 5
pace = false
api_key = "literal-key"

[benchmark]
dataset = "/tmp/pubmed-diabetes"
shuffle = false
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.fetch.base_url, "http://localhost:8080/efetch?id=");
        assert_eq!(config.fetch.timeout_secs, 5);
        assert!(!config.fetch.pace);
        assert_eq!(config.fetch.api_key.as_deref(), Some("literal-key"));
        assert_eq!(config.benchmark.dataset, PathBuf::from("/tmp/pubmed-diabetes"));
        assert!(!config.benchmark.shuffle);
        // unspecified section keeps defaults
        assert_eq!(config.output.default_dir, PathBuf::from("output"));
    }

    #[test]
    fn pacing_needs_both_config_and_flag() {
        let fetch = FetchConfig {
            api_key: None,
            ..Default::default()
        };
        let pm = fetch.to_pubmed(PathBuf::from("out/cache"), false);
        assert!(!pm.pace_delays);
        assert_eq!(pm.cache_dir, Some(PathBuf::from("out/cache")));
        assert_eq!(pm.timeout, Duration::from_secs(30));

        assert!(fetch.to_pubmed(PathBuf::from("c"), true).pace_delays);
    }
}
