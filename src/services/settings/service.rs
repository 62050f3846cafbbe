use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::models::settings::{AppConfig, TitleFormat};

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variables that override values from the config file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub image_width: Option<String>,
    pub image_height: Option<String>,
    pub title_format: Option<String>,
    pub check_interval_minutes: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|value| !value.trim().is_empty());
        Self {
            image_width: read("IMAGE_WIDTH"),
            image_height: read("IMAGE_HEIGHT"),
            title_format: read("TITLE_FORMAT"),
            check_interval_minutes: read("CALENDAR_CHECK_INTERVAL"),
        }
    }

    pub fn apply(&self, config: &mut AppConfig) -> Result<()> {
        if let Some(value) = &self.image_width {
            config.layout.image_width = parse_number("IMAGE_WIDTH", value)?;
        }
        if let Some(value) = &self.image_height {
            config.layout.image_height = parse_number("IMAGE_HEIGHT", value)?;
        }
        if let Some(value) = &self.title_format {
            config.layout.title_format = TitleFormat::parse(value)
                .ok_or_else(|| anyhow!("TITLE_FORMAT must be english or korean, got {:?}", value))?;
        }
        if let Some(value) = &self.check_interval_minutes {
            config.poller.interval_minutes = parse_number("CALENDAR_CHECK_INTERVAL", value)?;
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| anyhow!("{} must be a non-negative integer, got {:?}", name, value))
}

/// Reads and writes the application config file
pub struct SettingsService {
    path: PathBuf,
}

impl SettingsService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Per-user config location, e.g. `~/.config/calendar-image/config.toml`
    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "calendar-image")
            .context("Failed to determine the config directory")?;
        Ok(dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn from_default_location() -> Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config file; a missing file yields the defaults.
    pub fn load(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            log::info!("No config at {:?}, using defaults", self.path);
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read config file: {:?}", self.path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", self.path))?;

        log::debug!("Loaded config from {:?}", self.path);
        Ok(config)
    }

    /// Load, apply environment overrides, then validate.
    pub fn load_with_overrides(&self, overrides: &EnvOverrides) -> Result<AppConfig> {
        let mut config = self.load()?;
        overrides.apply(&mut config)?;
        config
            .validate()
            .map_err(|e| anyhow!("Invalid configuration: {}", e))?;
        Ok(config)
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        config
            .validate()
            .map_err(|e| anyhow!("Invalid configuration: {}", e))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write config file: {:?}", self.path))?;
        Ok(())
    }
}
