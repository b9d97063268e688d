//! Dashboard configuration: optional TOML file merged with command-line flags.
//!
//! Precedence is flags, then the file, then built-in defaults. A missing file
//! at the default location is not an error; a missing file passed explicitly is.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockcast_core::data::DEFAULT_USER_AGENT;
use stockcast_core::forecast::ForecastConfig;
use stockcast_core::pipeline::clamp_horizon;
use stockcast_core::DashboardInputs;

pub const DEFAULT_CATALOG_PATH: &str = "resources/nasdaq_tickers.csv";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Which market-data provider the dashboard talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    Synthetic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    pub kind: ProviderKind,
    pub user_agent: String,
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Initial control values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsSection {
    pub symbol: Option<String>,
    pub start: Option<NaiveDate>,
    pub horizon_days: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub catalog_path: Option<PathBuf>,
    pub defaults: DefaultsSection,
    pub forecast: ForecastConfig,
    pub provider: ProviderSection,
}

impl DashboardConfig {
    /// `$CONFIG_DIR/stockcast/config.toml`, when the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stockcast").join("config.toml"))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load the explicit file if given, else the default file if it exists,
    /// else built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Apply command-line overrides on top of this file's values.
    pub fn resolve(mut self, overrides: Overrides, today: NaiveDate) -> Settings {
        if overrides.synthetic {
            self.provider.kind = ProviderKind::Synthetic;
        }
        let start = overrides
            .start
            .or(self.defaults.start)
            .unwrap_or_else(DashboardInputs::default_start);
        let horizon = overrides
            .horizon
            .or(self.defaults.horizon_days)
            .map_or(DashboardInputs::DEFAULT_HORIZON_DAYS, clamp_horizon);

        Settings {
            catalog_path: overrides
                .catalog
                .or(self.catalog_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_PATH)),
            symbol: overrides.symbol.or(self.defaults.symbol),
            start,
            end: overrides.end.unwrap_or(today),
            horizon_days: horizon,
            forecast: self.forecast,
            provider: self.provider,
        }
    }
}

/// Values given on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub catalog: Option<PathBuf>,
    pub symbol: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub horizon: Option<i64>,
    pub synthetic: bool,
}

/// Fully resolved startup settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub catalog_path: PathBuf,
    /// Falls back to the first catalog entry when unset.
    pub symbol: Option<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub horizon_days: u32,
    pub forecast: ForecastConfig,
    pub provider: ProviderSection,
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockcast_core::forecast::SeasonalityToggle;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config = DashboardConfig::from_toml("").unwrap();
        assert_eq!(config, DashboardConfig::default());

        let settings = config.resolve(Overrides::default(), today());
        assert_eq!(settings.catalog_path, PathBuf::from(DEFAULT_CATALOG_PATH));
        assert_eq!(settings.symbol, None);
        assert_eq!(settings.start, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(settings.end, today());
        assert_eq!(settings.horizon_days, 60);
        assert_eq!(settings.provider.kind, ProviderKind::Yahoo);
    }

    #[test]
    fn file_sections_parse() {
        let config = DashboardConfig::from_toml(
            r#"
            catalog_path = "/srv/tickers.csv"

            [defaults]
            symbol = "MSFT"
            start = "2022-06-01"
            horizon_days = 30

            [forecast]
            interval_width = 0.95
            weekly = "off"

            [provider]
            kind = "synthetic"
            "#,
        )
        .unwrap();
        assert_eq!(config.catalog_path, Some(PathBuf::from("/srv/tickers.csv")));
        assert_eq!(config.defaults.symbol.as_deref(), Some("MSFT"));
        assert_eq!(config.forecast.interval_width, 0.95);
        assert_eq!(config.forecast.weekly, SeasonalityToggle::Off);
        assert_eq!(config.forecast.n_changepoints, 25);
        assert_eq!(config.provider.kind, ProviderKind::Synthetic);
        assert_eq!(config.provider.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn flags_beat_file() {
        let config = DashboardConfig::from_toml(
            "[defaults]\nsymbol = \"MSFT\"\nhorizon_days = 30\n",
        )
        .unwrap();
        let overrides = Overrides {
            symbol: Some("NVDA".into()),
            horizon: Some(900),
            synthetic: true,
            ..Overrides::default()
        };
        let settings = config.resolve(overrides, today());
        assert_eq!(settings.symbol.as_deref(), Some("NVDA"));
        assert_eq!(settings.horizon_days, 365);
        assert_eq!(settings.provider.kind, ProviderKind::Synthetic);
    }

    #[test]
    fn unknown_provider_is_a_parse_error() {
        assert!(DashboardConfig::from_toml("[provider]\nkind = \"bloomberg\"\n").is_err());
    }

    #[test]
    fn explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let err = DashboardConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("nope.toml"));
    }

    #[test]
    fn explicit_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[defaults]\nsymbol = \"AMD\"\n").unwrap();
        let config = DashboardConfig::load(Some(&path)).unwrap();
        assert_eq!(config.defaults.symbol.as_deref(), Some("AMD"));
    }
}
