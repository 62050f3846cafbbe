// Settings service module
// Loads the application configuration from config.toml and the environment

mod service;

pub use service::{EnvOverrides, SettingsService, CONFIG_FILE_NAME};
