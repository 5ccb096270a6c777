//! Static viewer assets
//!
//! The report viewer is a fixed set of files compiled into the binary. The
//! writer receives an [`AssetBundle`] explicitly, so callers can swap or
//! override individual files without touching the manifest.

use crate::error::{ReportError, Result};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Subdirectories created in the output directory before assets are copied
pub const ASSET_DIRS: [&str; 5] = ["js", "css", "img", "fonts", "pages"];

macro_rules! asset_table {
    ($($path:literal),* $(,)?) => {
        /// Relative path of every static viewer file, in copy order
        pub const ASSET_MANIFEST: &[&str] = &[$($path),*];

        const BUILTIN: &[(&str, &[u8])] = &[
            $(($path, include_bytes!(concat!("../assets/", $path)) as &[u8])),*
        ];
    };
}

asset_table![
    "index.html",
    "pages/feature.html",
    "pages/features.html",
    "css/style.css",
    "css/lightbox.css",
    "js/config.js",
    "js/dateAndTime.js",
    "js/charts.js",
    "js/lightbox.js",
    "js/app.js",
    "img/loading.gif",
    "img/controls.png",
    "fonts/report-icons.svg",
];

/// Mapping from relative asset path to file content
#[derive(Debug, Clone, Default)]
pub struct AssetBundle {
    files: BTreeMap<String, Cow<'static, [u8]>>,
}

impl AssetBundle {
    /// Empty bundle
    pub fn new() -> Self {
        Self::default()
    }

    /// The viewer files compiled into this crate
    pub fn builtin() -> Self {
        let files = BUILTIN
            .iter()
            .map(|(path, bytes)| (path.to_string(), Cow::Borrowed(*bytes)))
            .collect();
        Self { files }
    }

    /// Load every file below `root`, keyed by its `/`-separated relative path
    pub fn from_dir(root: &Path) -> Result<Self> {
        let mut bundle = Self::new();

        for entry in WalkDir::new(root).follow_links(true) {
            let entry = entry.map_err(|e| ReportError::Io {
                path: e.path().unwrap_or(root).to_path_buf(),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = match entry.path().strip_prefix(root) {
                Ok(rel) => rel,
                Err(_) => continue,
            };
            let key = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            let bytes = fs::read(entry.path()).map_err(|source| ReportError::Io {
                path: entry.path().to_path_buf(),
                source,
            })?;
            bundle.insert(key, bytes);
        }

        tracing::debug!(root = %root.display(), files = bundle.len(), "loaded asset directory");
        Ok(bundle)
    }

    /// Add or replace a single file
    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Cow<'static, [u8]>>) {
        self.files.insert(path.into(), bytes.into());
    }

    /// Files in `other` replace files of the same path in `self`
    pub fn overlay(mut self, other: AssetBundle) -> Self {
        self.files.extend(other.files);
        self
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(|b| b.as_ref())
    }

    /// Look up a manifest entry, failing when the bundle lacks it
    pub fn require(&self, path: &str) -> Result<&[u8]> {
        self.get(path).ok_or_else(|| ReportError::ResourceMissing {
            path: PathBuf::from(path),
        })
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
