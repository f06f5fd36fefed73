// ABOUTME: Configuration file loading, validation, and hierarchical merging for imgcat
// ABOUTME: Supports TOML config files in XDG, home and project locations

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use termplot::Passthrough;

/// Default cap on downloaded image size: 32 MiB
pub const DEFAULT_MAX_DOWNLOAD_BYTES: u64 = 32 * 1024 * 1024;

const CONFIG_DIR: &str = "termplot";
const CONFIG_FILE: &str = "config.toml";
const PROJECT_CONFIG_FILE: &str = "termplot.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub pixels_per_row: Option<u32>,
    #[serde(default)]
    pub row_margin: Option<u16>,
    #[serde(default)]
    pub preserve_aspect_ratio: Option<bool>,
    #[serde(default, deserialize_with = "validate_passthrough")]
    pub passthrough: Option<Passthrough>,
    #[serde(default)]
    pub max_download_bytes: Option<u64>,
    #[serde(default)]
    pub quiet: Option<bool>,
}

impl Config {
    /// Load configuration from the standard locations, then `explicit` if given.
    ///
    /// Missing standard files are skipped; an explicit file must exist and parse.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::load_from_paths(&Self::get_config_paths())?;

        if let Some(path) = explicit {
            config = config.merge(Self::load_from_file(path)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file paths in order of increasing precedence
    pub fn load_from_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut config = Config::default();

        for path in paths {
            let path = path.as_ref();
            if !path.is_file() {
                continue;
            }

            // Later paths override earlier ones
            let file_config = Self::load_from_file(path)?;
            log::debug!("Loaded config from {}", path.display());
            config = config.merge(file_config);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a single file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content).with_context(|| {
            format!(
                "Failed to parse TOML config file: {}",
                path.as_ref().display()
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Standard config file paths in order of precedence (lowest first)
    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. XDG config home
        if let Some(config_home) = std::env::var_os("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(config_home).join(CONFIG_DIR).join(CONFIG_FILE));
        }

        // 2. User config directory fallback
        if let Some(home_dir) = dirs::home_dir() {
            let path = home_dir.join(".config").join(CONFIG_DIR).join(CONFIG_FILE);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }

        // 3. Project-specific config (highest precedence)
        if let Ok(current_dir) = std::env::current_dir() {
            paths.push(current_dir.join(PROJECT_CONFIG_FILE));
        }

        paths
    }

    /// Merge this config with another, giving precedence to the other config
    pub fn merge(self, other: Config) -> Config {
        Config {
            pixels_per_row: other.pixels_per_row.or(self.pixels_per_row),
            row_margin: other.row_margin.or(self.row_margin),
            preserve_aspect_ratio: other.preserve_aspect_ratio.or(self.preserve_aspect_ratio),
            passthrough: other.passthrough.or(self.passthrough),
            max_download_bytes: other.max_download_bytes.or(self.max_download_bytes),
            quiet: other.quiet.or(self.quiet),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.pixels_per_row == Some(0) {
            return Err(anyhow!("pixels_per_row must be at least 1"));
        }

        if self.max_download_bytes == Some(0) {
            return Err(anyhow!("max_download_bytes must be at least 1"));
        }

        Ok(())
    }

    pub fn max_download_bytes(&self) -> u64 {
        self.max_download_bytes.unwrap_or(DEFAULT_MAX_DOWNLOAD_BYTES)
    }
}

fn validate_passthrough<'de, D>(deserializer: D) -> Result<Option<Passthrough>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<String>::deserialize(deserializer)? {
        Some(mode) => mode.parse().map(Some).map_err(D::Error::custom),
        None => Ok(None),
    }
}
