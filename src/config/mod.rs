use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::errors::{AppError, AppResult};

pub mod channel_list;
pub mod defaults;
pub mod duration_serde;

pub use channel_list::{ChannelList, GroupConflict, SourceList};

use defaults::*;

/// When the aggregator may stop visiting sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopCondition {
    /// Visit every source so each channel collects every URL on offer
    #[default]
    Exhaustive,
    /// Stop before the next source once every channel has at least one URL
    AllFound,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub inputs: InputConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub aggregation: AggregationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Locations of the channel list and source list files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_channels_file")]
    pub channels_file: PathBuf,
    #[serde(default = "default_sources_file")]
    pub sources_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Total request timeout per source
    #[serde(default = "default_fetch_timeout", with = "duration_serde::duration")]
    pub timeout: Duration,
    /// Pause between consecutive sources
    #[serde(default = "default_pacing_delay", with = "duration_serde::duration")]
    pub pacing_delay: Duration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregationConfig {
    #[serde(default)]
    pub stop_condition: StopCondition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

fn default_channels_file() -> PathBuf {
    PathBuf::from(DEFAULT_CHANNELS_FILE)
}

fn default_sources_file() -> PathBuf {
    PathBuf::from(DEFAULT_SOURCES_FILE)
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS)
}

fn default_pacing_delay() -> Duration {
    Duration::from_secs(DEFAULT_PACING_DELAY_SECS)
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            channels_file: default_channels_file(),
            sources_file: default_sources_file(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: default_fetch_timeout(),
            pacing_delay: default_pacing_delay(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

impl FetchConfig {
    pub fn validate(&self) -> AppResult<()> {
        if self.timeout.is_zero() {
            return Err(AppError::configuration("fetch.timeout must be greater than zero"));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration, writing a default file first if none exists
    pub fn load_from_file<P: AsRef<Path>>(config_file: P) -> AppResult<Self> {
        let config_file = config_file.as_ref();
        let config = if config_file.exists() {
            let contents = std::fs::read_to_string(config_file)?;
            toml::from_str::<Self>(&contents).map_err(|e| {
                AppError::configuration(format!(
                    "invalid config file {}: {e}",
                    config_file.display()
                ))
            })?
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)
                .map_err(|e| AppError::internal(format!("failed to render default config: {e}")))?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file.display());
            default_config
        };

        config.fetch.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.inputs.channels_file, PathBuf::from("channels.json"));
        assert_eq!(config.inputs.sources_file, PathBuf::from("sources.json"));
        assert_eq!(config.fetch.timeout, Duration::from_secs(10));
        assert_eq!(config.fetch.pacing_delay, Duration::from_secs(1));
        assert_eq!(config.aggregation.stop_condition, StopCondition::Exhaustive);
        assert_eq!(config.output.path, PathBuf::from("simple.m3u"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [fetch]
            pacing_delay = "0s"

            [aggregation]
            stop_condition = "all_found"
            "#,
        )
        .unwrap();

        assert_eq!(config.fetch.pacing_delay, Duration::ZERO);
        assert_eq!(config.fetch.timeout, Duration::from_secs(10));
        assert_eq!(config.aggregation.stop_condition, StopCondition::AllFound);
        assert_eq!(config.output.path, PathBuf::from("simple.m3u"));
    }

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_from_file(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.fetch.timeout, Duration::from_secs(10));

        // The written file must load back to the same values
        let reloaded = Config::load_from_file(&path).unwrap();
        assert_eq!(reloaded.fetch.user_agent, config.fetch.user_agent);
        assert_eq!(reloaded.output.path, config.output.path);
    }

    #[test]
    fn test_invalid_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[fetch\ntimeout = ").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[fetch]\ntimeout = \"0s\"\n").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }
}
