use crate::collision::DEFAULT_COLLISION_LIMIT;
use crate::exif_reader::EmbeddedExifProbe;
use crate::exiftool::{ExifToolProbe, DEFAULT_EXIFTOOL};
use crate::metadata::{MetadataProbe, NoMetadata};
use crate::naming::DEFAULT_UNIQUE_ID_RETRIES;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MetadataBackend {
    Exiftool,
    Embedded,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub metadata_backend: MetadataBackend,
    pub exiftool_command: String,
    pub metadata_timeout_secs: u64,
    pub collision_limit: u32,
    pub unique_id_retries: u32,
    pub recursive_default: bool,
    pub include_hidden_default: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            metadata_backend: MetadataBackend::Exiftool,
            exiftool_command: DEFAULT_EXIFTOOL.to_string(),
            metadata_timeout_secs: 10,
            collision_limit: DEFAULT_COLLISION_LIMIT,
            unique_id_retries: DEFAULT_UNIQUE_ID_RETRIES,
            recursive_default: false,
            include_hidden_default: false,
        }
    }
}

impl AppConfig {
    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.metadata_timeout_secs)
    }

    /// Builds the configured metadata backend. An exiftool that cannot be
    /// started yields an unavailable probe, not an error.
    pub fn build_probe(&self) -> Box<dyn MetadataProbe> {
        match self.metadata_backend {
            MetadataBackend::Exiftool => Box::new(ExifToolProbe::detect(
                &self.exiftool_command,
                self.metadata_timeout(),
            )),
            MetadataBackend::Embedded => Box::new(EmbeddedExifProbe),
            MetadataBackend::None => Box::new(NoMetadata),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
}

pub fn app_paths() -> Result<AppPaths> {
    let proj = ProjectDirs::from("com", "media-renamer", "media-renamer")
        .context("could not determine the OS configuration directory")?;
    let config_dir = proj.config_dir().to_path_buf();
    Ok(AppPaths {
        config_path: config_dir.join("config.toml"),
        config_dir,
    })
}

pub fn load_config() -> Result<AppConfig> {
    let paths = app_paths()?;
    if !paths.config_path.exists() {
        return Ok(AppConfig::default());
    }
    load_config_from(&paths.config_path)
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read config file: {}", path.display()))?;

    let config = toml::from_str::<AppConfig>(&raw)
        .with_context(|| format!("could not parse config file: {}", path.display()))?;
    Ok(config)
}

pub fn save_config(config: &AppConfig) -> Result<()> {
    let paths = app_paths()?;
    fs::create_dir_all(&paths.config_dir).with_context(|| {
        format!(
            "could not create config directory: {}",
            paths.config_dir.display()
        )
    })?;
    let body = toml::to_string_pretty(config).context("could not serialize config")?;
    fs::write(&paths.config_path, body).with_context(|| {
        format!(
            "could not write config file: {}",
            paths.config_path.display()
        )
    })?;
    Ok(())
}
