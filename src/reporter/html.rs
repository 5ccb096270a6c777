//! HTML report writer: materializes a browsable report directory
//!
//! Result formatting is delegated to [`JsonFormatter`], which writes
//! `report.json`. This writer stores attachments as numbered files next to
//! it and, once the run is done, copies the static viewer that reads the
//! JSON in the browser.

use super::json::{EmbedSink, JsonFormatter};
use crate::assets::{AssetBundle, ASSET_DIRS, ASSET_MANIFEST};
use crate::error::Result;
use crate::output::{copy_stream, ensure_dir, write_bytes, ReportFile};
use crate::{RunEvent, RunSummary};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the result document inside the report directory
pub const JSON_REPORT_FILENAME: &str = "report.json";

/// Knobs for a report run
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Pretty-print `report.json`
    pub pretty_json: bool,
    /// Extra MIME type to file extension mappings for attachments
    pub mime_extensions: BTreeMap<String, String>,
    /// Viewer files copied on completion
    pub assets: AssetBundle,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            pretty_json: false,
            mime_extensions: BTreeMap::new(),
            assets: AssetBundle::builtin(),
        }
    }
}

/// Attachment files of one run, numbered from 1
#[derive(Debug)]
struct Attachments {
    dir: PathBuf,
    next_index: u32,
}

impl Attachments {
    fn written(&self) -> usize {
        (self.next_index - 1) as usize
    }
}

impl EmbedSink for Attachments {
    fn embed(&mut self, extension: &str, mime_type: &str, data: &[u8]) -> Result<String> {
        let safe = safe_extension(extension);
        if safe != extension {
            tracing::warn!(extension, replacement = %safe, "unsafe attachment extension");
        }
        let file_name = format!("embedded{}.{}", self.next_index, safe);
        self.next_index += 1;

        write_bytes(&self.dir.join(&file_name), data)?;
        tracing::debug!(file = %file_name, mime_type, bytes = data.len(), "wrote attachment");

        Ok(file_name)
    }
}

/// Extension reduced to a plain file-name suffix: no separators, no
/// leading or trailing dots, `bin` when nothing is left
fn safe_extension(extension: &str) -> String {
    let kept: String = extension
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .take(16)
        .collect();
    match kept.trim_matches('.') {
        "" => "bin".to_string(),
        ext => ext.to_string(),
    }
}

/// Writes a report directory for a single run.
///
/// Lifecycle: [`new`](Self::new) creates the directory and opens
/// `report.json`; [`handle`](Self::handle) and [`on_embed`](Self::on_embed)
/// may be called any number of times; [`done`](Self::done) consumes the
/// writer, so nothing can be written after the report is finalized.
#[derive(Debug)]
pub struct HtmlReportWriter {
    dir: PathBuf,
    json_out: ReportFile,
    formatter: JsonFormatter,
    attachments: Attachments,
    assets: AssetBundle,
}

impl HtmlReportWriter {
    /// Create the report directory (with parents) and open the JSON sink
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        Self::with_options(dir, ReportOptions::default())
    }

    pub fn with_options(dir: impl AsRef<Path>, options: ReportOptions) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        ensure_dir(&dir)?;
        let json_out = ReportFile::create(&dir.join(JSON_REPORT_FILENAME))?;

        let mut formatter = JsonFormatter::new().with_mime_extensions(options.mime_extensions);
        if options.pretty_json {
            formatter = formatter.pretty();
        }

        tracing::debug!(dir = %dir.display(), "opened report");
        Ok(Self {
            attachments: Attachments {
                dir: dir.clone(),
                next_index: 1,
            },
            dir,
            json_out,
            formatter,
            assets: options.assets,
        })
    }

    /// Report directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of attachment files written so far
    pub fn attachments_written(&self) -> usize {
        self.attachments.written()
    }

    /// Forward one run event to the JSON formatter
    pub fn handle(&mut self, event: RunEvent) -> Result<()> {
        self.formatter.handle(event, &mut self.attachments)
    }

    /// Forward a sequence of run events, stopping at the first failure
    pub fn handle_all<I>(&mut self, events: I) -> Result<()>
    where
        I: IntoIterator<Item = RunEvent>,
    {
        for event in events {
            self.handle(event)?;
        }
        Ok(())
    }

    /// Store an attachment as `embedded<N>.<extension>` and return that name.
    ///
    /// The MIME type is only logged; it does not influence the file name.
    pub fn on_embed(&mut self, extension: &str, mime_type: &str, data: &[u8]) -> Result<String> {
        self.attachments.embed(extension, mime_type, data)
    }

    /// Finalize `report.json` and copy the viewer into the report directory
    pub fn done(self) -> Result<RunSummary> {
        let Self {
            dir,
            json_out,
            formatter,
            attachments,
            assets,
        } = self;

        let features = formatter.finish(json_out)?;
        let copied = copy_report_files(&dir, &assets)?;

        let summary = RunSummary::from_features(&features, attachments.written());
        tracing::info!(
            dir = %dir.display(),
            features = summary.features,
            attachments = summary.attachments,
            assets = copied,
            "report written"
        );
        Ok(summary)
    }
}

/// Create the asset subdirectories and copy every manifest entry from
/// `assets`. Returns the number of files copied.
fn copy_report_files(dir: &Path, assets: &AssetBundle) -> Result<usize> {
    for sub in ASSET_DIRS {
        ensure_dir(&dir.join(sub))?;
    }

    for path in ASSET_MANIFEST {
        let source = assets.require(path)?;
        let out = ReportFile::create(&dir.join(path))?;
        let bytes = copy_stream(source, Path::new(path), out)?;
        tracing::debug!(asset = *path, bytes, "copied asset");
    }

    Ok(ASSET_MANIFEST.len())
}
