use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::i18n;

pub const MIN_POLL_INTERVAL_SECS: u64 = 5;
pub const MAX_POLL_INTERVAL_SECS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5566".to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PollConfig {
    pub interval_secs: u64,
    /// Number of tag categories shown next to "all"
    pub category_limit: usize,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: MIN_POLL_INTERVAL_SECS,
            category_limit: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => f.write_str("light"),
            Theme::Dark => f.write_str("dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => bail!("Unknown theme '{}', expected light or dark", other),
        }
    }
}

/// Presentation preferences, read at startup and written on change
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Preferences {
    pub theme: Theme,
    pub language: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            language: i18n::DEFAULT_LANGUAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            // Use XDG config directory on Linux
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("appstore-cli")
        } else {
            // Use home directory with dot prefix on Windows/Mac
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".appstore-cli")
        };

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;
            info!("Created config directory: {:?}", config_dir);
        }

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from: {:?}", path);

        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str::<Config>(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            info!("Config file doesn't exist, using defaults");
            Self::default()
        };

        config.path = Some(path.to_path_buf());
        config.normalize();
        Ok(config)
    }

    /// Clamp out-of-range values instead of rejecting the file
    fn normalize(&mut self) {
        let interval = self
            .poll
            .interval_secs
            .clamp(MIN_POLL_INTERVAL_SECS, MAX_POLL_INTERVAL_SECS);
        if interval != self.poll.interval_secs {
            warn!(
                "poll interval {}s out of range, using {}s",
                self.poll.interval_secs, interval
            );
            self.poll.interval_secs = interval;
        }

        if !i18n::is_supported(&self.preferences.language) {
            warn!(
                "unsupported language '{}', falling back to {}",
                self.preferences.language,
                i18n::DEFAULT_LANGUAGE
            );
            self.preferences.language = i18n::DEFAULT_LANGUAGE.to_string();
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => Self::get_config_path()?,
        };
        debug!("Saving config to: {:?}", path);

        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;
        fs::write(&path, content).with_context(|| format!("Failed to write config file: {:?}", path))?;

        info!("Config saved successfully");
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll.interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_secs.max(1))
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        info!("Setting theme to: {}", theme);
        self.preferences.theme = theme;
        self.save()
    }

    pub fn set_language(&mut self, language: &str) -> Result<()> {
        if !i18n::is_supported(language) {
            bail!(
                "Unsupported language '{}', expected one of: {}",
                language,
                i18n::SUPPORTED_LANGUAGES.join(", ")
            );
        }
        info!("Setting language to: {}", language);
        self.preferences.language = language.to_string();
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("appstore-cli-{}.toml", Uuid::new_v4()))
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load_from(&temp_path()).unwrap();
        assert_eq!(config.poll.interval_secs, 5);
        assert_eq!(config.preferences.language, "en");
        assert_eq!(config.preferences.theme, Theme::Light);
    }

    #[test]
    fn test_out_of_range_values_are_normalized() {
        let path = temp_path();
        fs::write(
            &path,
            "[poll]\ninterval_secs = 60\n\n[preferences]\ntheme = \"dark\"\nlanguage = \"xx\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.poll.interval_secs, 10);
        assert_eq!(config.preferences.language, "en");
        assert_eq!(config.preferences.theme, Theme::Dark);
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_preferences_persist() {
        let path = temp_path();
        let mut config = Config::load_from(&path).unwrap();
        config.set_theme(Theme::Dark).unwrap();
        config.set_language("zh-CHT").unwrap();
        assert!(config.set_language("klingon").is_err());

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.preferences.theme, Theme::Dark);
        assert_eq!(reloaded.preferences.language, "zh-CHT");
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_theme_parse() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("blue".parse::<Theme>().is_err());
    }
}
