//! JSON result formatter
//!
//! Owns the result document schema. Run events are folded into a list of
//! [`Feature`]s held in memory; the document is written to the sink in one
//! piece when the run finishes. Attachment bytes never enter the document:
//! an [`EmbedSink`] persists them and the formatter records the returned
//! file name.

use crate::error::{ReportError, Result};
use crate::output::{absolute, ReportFile};
use crate::{Element, ElementType, Embedding, Feature, Hook, RunEvent, Step};
use std::collections::BTreeMap;

/// Receives attachment payloads and decides where they live
pub trait EmbedSink {
    /// Persist `data` and return the name the document should reference
    fn embed(&mut self, extension: &str, mime_type: &str, data: &[u8]) -> Result<String>;
}

/// File extension for a MIME type. `extra` takes precedence over the
/// built-in table.
pub fn extension_for_mime(mime_type: &str, extra: &BTreeMap<String, String>) -> String {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if let Some(ext) = extra.get(&essence) {
        return ext.clone();
    }

    let known = match essence.as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/svg+xml" => Some("svg"),
        "image/webp" => Some("webp"),
        "image/bmp" => Some("bmp"),
        "text/plain" => Some("txt"),
        "text/html" => Some("html"),
        "text/css" => Some("css"),
        "text/csv" => Some("csv"),
        "text/xml" | "application/xml" => Some("xml"),
        "application/json" => Some("json"),
        "application/javascript" | "text/javascript" => Some("js"),
        "application/pdf" => Some("pdf"),
        "application/zip" => Some("zip"),
        "application/octet-stream" => Some("bin"),
        "video/mp4" => Some("mp4"),
        "video/webm" => Some("webm"),
        _ => None,
    };
    if let Some(ext) = known {
        return ext.to_string();
    }

    // Unknown type: fall back to a sanitized subtype
    let subtype = essence
        .split_once('/')
        .map(|(_, sub)| sub)
        .unwrap_or_default();
    let subtype = subtype.split('+').next().unwrap_or_default();
    let ext: String = subtype
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(16)
        .collect();
    if ext.is_empty() {
        "bin".to_string()
    } else {
        ext
    }
}

/// Formatter that builds the cucumber JSON document
#[derive(Debug, Default)]
pub struct JsonFormatter {
    features: Vec<Feature>,
    uri: Option<String>,
    /// Step that embeddings and text output currently land on
    cursor: Option<usize>,
    /// First step of the current element that may still run
    turn: usize,
    pending_embeddings: Vec<Embedding>,
    pending_output: Vec<String>,
    mime_extensions: BTreeMap<String, String>,
    pretty: bool,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable pretty-printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Extra MIME type to extension mappings
    pub fn with_mime_extensions(mut self, extensions: BTreeMap<String, String>) -> Self {
        self.mime_extensions = extensions;
        self
    }

    /// The document built so far
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Extension the formatter assigns to attachments of `mime_type`
    pub fn extension_for(&self, mime_type: &str) -> String {
        extension_for_mime(mime_type, &self.mime_extensions)
    }

    /// Fold one run event into the document
    pub fn handle(&mut self, event: RunEvent, sink: &mut dyn EmbedSink) -> Result<()> {
        match event {
            RunEvent::Uri { uri } => {
                self.flush_pending();
                self.uri = Some(uri);
            }
            RunEvent::Feature(mut feature) => {
                self.flush_pending();
                if let Some(uri) = self.uri.take() {
                    feature.uri = uri;
                }
                if feature.id.is_empty() {
                    feature.id = slug(&feature.name);
                }
                self.features.push(feature);
                self.cursor = None;
            }
            RunEvent::Background(element) => {
                self.start_element(element, ElementType::Background)?
            }
            RunEvent::Scenario(element) => self.start_element(element, ElementType::Scenario)?,
            RunEvent::Step(step) => self.current_element("step")?.steps.push(step),
            RunEvent::Match(step_match) => {
                let index = self.running_step("match")?;
                let step = &mut self.current_element("match")?.steps[index];
                step.step_match = Some(step_match);
                self.cursor = Some(index);
                self.flush_pending();
            }
            RunEvent::Result(result) => {
                let index = self.end_step("result")?;
                self.current_element("result")?.steps[index].result = Some(result);
            }
            RunEvent::Unfinished => {
                self.end_step("unfinished step")?;
            }
            RunEvent::Before(hook) => {
                let hook = self.take_pending_into(hook);
                self.current_element("before hook")?.before.push(hook);
                self.cursor = None;
            }
            RunEvent::After(hook) => {
                let hook = self.take_pending_into(hook);
                self.current_element("after hook")?.after.push(hook);
                self.cursor = None;
            }
            RunEvent::Embedding { mime_type, data } => {
                let extension = self.extension_for(&mime_type);
                let file_name = sink.embed(&extension, &mime_type, &data)?;
                let embedding = Embedding {
                    mime_type,
                    data: file_name,
                };
                match self.cursor_step() {
                    Some(step) => step.embeddings.push(embedding),
                    None => self.pending_embeddings.push(embedding),
                }
            }
            RunEvent::Write { text } => match self.cursor_step() {
                Some(step) => step.output.push(text),
                None => self.pending_output.push(text),
            },
            RunEvent::Eof => {
                self.flush_pending();
                self.cursor = None;
            }
        }
        Ok(())
    }

    /// Serialize the document into `out` and close it
    pub fn finish(mut self, mut out: ReportFile) -> Result<Vec<Feature>> {
        self.flush_pending();

        let written = if self.pretty {
            serde_json::to_writer_pretty(&mut out, &self.features)
        } else {
            serde_json::to_writer(&mut out, &self.features)
        };
        written.map_err(|e| {
            if e.is_io() {
                out.io_error(e.into())
            } else {
                ReportError::Serialize {
                    path: absolute(out.path()),
                    source: e,
                }
            }
        })?;
        out.write_all_bytes(b"\n")?;
        out.finish()?;

        Ok(self.features)
    }

    fn start_element(&mut self, mut element: Element, kind: ElementType) -> Result<()> {
        // Leftovers belong to the element that is ending
        self.flush_pending();
        let feature = self.features.last_mut().ok_or_else(|| {
            ReportError::invalid_event(format!("{} before any feature", kind_name(kind)))
        })?;
        element.element_type = kind;
        if element.id.is_empty() && kind == ElementType::Scenario {
            element.id = format!("{};{}", feature.id, slug(&element.name));
        }
        feature.elements.push(element);
        self.cursor = None;
        self.turn = 0;
        Ok(())
    }

    fn current_element(&mut self, what: &str) -> Result<&mut Element> {
        self.features
            .last_mut()
            .and_then(|f| f.elements.last_mut())
            .ok_or_else(|| ReportError::invalid_event(format!("{what} before any scenario")))
    }

    /// Index of the first step at or after the turn still waiting for a result
    fn running_step(&mut self, what: &str) -> Result<usize> {
        let turn = self.turn;
        self.current_element(what)?
            .steps
            .iter()
            .enumerate()
            .skip(turn)
            .find(|(_, s)| s.result.is_none())
            .map(|(index, _)| index)
            .ok_or_else(|| ReportError::invalid_event(format!("{what} without a pending step")))
    }

    /// Close the matched (or next pending) step: buffered attachments land
    /// on it and later matches target the steps after it.
    fn end_step(&mut self, what: &str) -> Result<usize> {
        let index = match self.cursor {
            Some(index) => index,
            None => self.running_step(what)?,
        };
        self.cursor = Some(index);
        self.flush_pending();
        self.cursor = None;
        self.turn = index + 1;
        Ok(index)
    }

    fn cursor_step(&mut self) -> Option<&mut Step> {
        let index = self.cursor?;
        self.features
            .last_mut()?
            .elements
            .last_mut()?
            .steps
            .get_mut(index)
    }

    fn take_pending_into(&mut self, mut hook: Hook) -> Hook {
        hook.embeddings.append(&mut self.pending_embeddings);
        hook.output.append(&mut self.pending_output);
        hook
    }

    /// Attach buffered embeddings and output to the cursor step, or to the
    /// last step or hook of the current element when there is no cursor.
    fn flush_pending(&mut self) {
        if self.pending_embeddings.is_empty() && self.pending_output.is_empty() {
            return;
        }

        let mut embeddings = std::mem::take(&mut self.pending_embeddings);
        let mut output = std::mem::take(&mut self.pending_output);

        if let Some(step) = self.cursor_step() {
            step.embeddings.append(&mut embeddings);
            step.output.append(&mut output);
            return;
        }

        let element = self.features.last_mut().and_then(|f| f.elements.last_mut());
        if let Some(element) = element {
            if let Some(hook) = element.after.last_mut() {
                hook.embeddings.append(&mut embeddings);
                hook.output.append(&mut output);
                return;
            }
            if let Some(step) = element.steps.last_mut() {
                step.embeddings.append(&mut embeddings);
                step.output.append(&mut output);
                return;
            }
        }

        tracing::warn!(
            embeddings = embeddings.len(),
            output = output.len(),
            "dropping attachments with no step or hook to attach to"
        );
    }
}

fn kind_name(kind: ElementType) -> &'static str {
    match kind {
        ElementType::Scenario => "scenario",
        ElementType::Background => "background",
    }
}

/// Cucumber-style id: lowercase, whitespace collapsed to `-`
fn slug(name: &str) -> String {
    name.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}
