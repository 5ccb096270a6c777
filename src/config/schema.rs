//! Config schema and deserialization

use crate::assets::AssetBundle;
use crate::reporter::ReportOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Report directory used when neither the CLI nor the config names one
pub const DEFAULT_OUTPUT_DIR: &str = "cucumber-html-report";

/// Root config structure for .cukehtmlrc.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Report directory (relative to the config file)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,

    /// Directory whose files replace builtin viewer assets of the same path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets_dir: Option<String>,

    /// Pretty-print report.json
    #[serde(default)]
    pub pretty_json: bool,

    /// Extra MIME type -> attachment extension mappings
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mime_extensions: BTreeMap<String, String>,

    /// Directory relative paths are resolved against (the config file's)
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Config {
    /// Merge CLI overrides into config. CLI values take precedence.
    pub fn merge_with_cli(
        mut self,
        cli_output: Option<&Path>,
        cli_assets: Option<&Path>,
        cli_pretty: bool,
    ) -> Self {
        // CLI paths are already relative to the working directory
        if let Some(out) = cli_output {
            self.output_dir = Some(absolute_or_cwd(out));
        }
        if let Some(assets) = cli_assets {
            self.assets_dir = Some(absolute_or_cwd(assets));
        }
        if cli_pretty {
            self.pretty_json = true;
        }
        self
    }

    /// Effective report directory
    pub fn output_dir(&self) -> PathBuf {
        let dir = self.output_dir.as_deref().unwrap_or(DEFAULT_OUTPUT_DIR);
        self.resolve(dir)
    }

    /// Effective custom assets directory, if any
    pub fn assets_dir(&self) -> Option<PathBuf> {
        self.assets_dir.as_deref().map(|d| self.resolve(d))
    }

    /// Build writer options: builtin assets overlaid with the custom assets directory
    pub fn report_options(&self) -> Result<ReportOptions> {
        let mut assets = AssetBundle::builtin();
        if let Some(dir) = self.assets_dir() {
            let custom = AssetBundle::from_dir(&dir)
                .with_context(|| format!("Failed to load assets from {}", dir.display()))?;
            assets = assets.overlay(custom);
        }

        let mime_extensions = self
            .mime_extensions
            .iter()
            .map(|(mime, ext)| {
                (
                    mime.trim().to_ascii_lowercase(),
                    ext.trim_start_matches('.').to_string(),
                )
            })
            .collect();

        Ok(ReportOptions {
            pretty_json: self.pretty_json,
            mime_extensions,
            assets,
        })
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        match &self.base_dir {
            Some(base) if p.is_relative() => base.join(p),
            _ => p.to_path_buf(),
        }
    }
}

fn absolute_or_cwd(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}
