//! Configuration loading for cukehtml

mod schema;

pub use schema::{Config, DEFAULT_OUTPUT_DIR};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = ".cukehtmlrc.json";

/// Find and load the config file. Searches the working directory then parents.
pub fn load_config(work_dir: &Path, custom_path: Option<&Path>) -> Result<Config> {
    let path = if let Some(p) = custom_path {
        let path = if p.is_absolute() {
            p.to_path_buf()
        } else {
            work_dir.join(p)
        };
        if path.exists() {
            Some(path)
        } else {
            anyhow::bail!("Config file not found: {}", path.display());
        }
    } else {
        find_config_in_parents(work_dir)
    };

    match path {
        Some(path) => load_config_file(&path),
        None => Ok(Config {
            base_dir: Some(work_dir.to_path_buf()),
            ..Config::default()
        }),
    }
}

/// Load a single config file; relative paths in it resolve against its directory
fn load_config_file(config_path: &Path) -> Result<Config> {
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
    let mut config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in config: {}", config_path.display()))?;

    config.base_dir = Some(
        config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    );
    tracing::debug!(path = %config_path.display(), "loaded config");
    Ok(config)
}

/// Search for .cukehtmlrc.json in directory and its parents
fn find_config_in_parents(mut dir: &Path) -> Option<PathBuf> {
    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

/// Write a default config into `dir`. Refuses to overwrite an existing one.
pub fn write_default_config(dir: &Path, output_dir: Option<&str>) -> Result<PathBuf> {
    let path = dir.join(CONFIG_FILENAME);
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }

    let config = Config {
        output_dir: Some(output_dir.unwrap_or(DEFAULT_OUTPUT_DIR).to_string()),
        ..Config::default()
    };
    let content = serde_json::to_string_pretty(&config).context("Failed to serialize config")?;
    fs::write(&path, content + "\n")
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
