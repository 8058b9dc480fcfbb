//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use mtag_core::TimelineGeometry;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    #[serde(default)]
    pub timeline: TimelineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Size of the text timeline, in columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    pub width: f64,
    pub side_padding: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Largest gap, in seconds, that still extends the latest logged entry.
    pub merge_gap_secs: i64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("timeline", &self.timeline)
            .field("logging", &self.logging)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("mtag.db"),
            timeline: TimelineConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            width: 98.0,
            side_padding: 1.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { merge_gap_secs: 5 }
    }
}

impl TimelineConfig {
    pub fn geometry(&self) -> TimelineGeometry {
        TimelineGeometry::new(self.width, self.side_padding)
    }
}

impl LoggingConfig {
    /// The merge gap, or `None` when negative or out of range.
    pub fn merge_gap(&self) -> Option<TimeDelta> {
        TimeDelta::try_seconds(self.merge_gap_secs).filter(|gap| *gap >= TimeDelta::zero())
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (MTAG_*), nested keys split on "__"
        figment = figment.merge(Env::prefixed("MTAG_").split("__"));

        let config: Self = figment.extract()?;
        if config.logging.merge_gap().is_none() {
            return Err(figment::Error::from(format!(
                "logging.merge_gap_secs out of range: {}",
                config.logging.merge_gap_secs
            )));
        }
        Ok(config)
    }
}

/// Returns the platform-specific config directory for mtag.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("mtag"))
}

/// Returns the platform-specific data directory for mtag.
///
/// On Linux: `~/.local/share/mtag`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("mtag"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_data_path_ends_with_mtag() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "mtag");
    }

    #[test]
    fn test_default_config_uses_data_dir_for_db() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.database_path, data_dir.join("mtag.db"));
    }

    #[test]
    fn test_default_timeline_and_logging() {
        let config = Config::default();
        assert_eq!(config.timeline, TimelineConfig { width: 98.0, side_padding: 1.0 });
        assert_eq!(config.logging.merge_gap(), Some(TimeDelta::seconds(5)));

        let geometry = config.timeline.geometry();
        assert!((geometry.width() - 98.0).abs() < f64::EPSILON);
        assert!((geometry.side_padding() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_merge_gap_out_of_range_is_none() {
        for merge_gap_secs in [i64::MAX, i64::MIN, -1] {
            let logging = LoggingConfig { merge_gap_secs };
            assert_eq!(logging.merge_gap(), None, "{merge_gap_secs}");
        }
        assert_eq!(
            LoggingConfig { merge_gap_secs: 0 }.merge_gap(),
            Some(TimeDelta::zero())
        );
    }

    #[test]
    fn test_out_of_range_merge_gap_is_rejected_on_load() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[logging]\nmerge_gap_secs = 9223372036854775807\n").unwrap();

        let err = Config::load_from(Some(&path)).unwrap_err();

        assert!(err.to_string().contains("logging.merge_gap_secs out of range"), "{err}");
    }

    #[test]
    fn test_explicit_config_file_overrides_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "database_path = \"/tmp/elsewhere.db\"\n\n[timeline]\nwidth = 50.0\nside_padding = 2.0\n",
        )
        .unwrap();

        let config = Config::load_from(Some(&path)).unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/elsewhere.db"));
        assert_eq!(config.timeline, TimelineConfig { width: 50.0, side_padding: 2.0 });
        assert_eq!(config.logging, LoggingConfig::default());
    }
}
