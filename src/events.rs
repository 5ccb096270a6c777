//! Run events
//!
//! A test runner reports progress as a flat stream of events. Events can be
//! fed to the writer directly, read from newline-delimited JSON, or replayed
//! from an existing cucumber JSON document.

use crate::{Element, Feature, Hook, Match, Step, StepResult};
use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use std::io::BufRead;

/// One notification from the test runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    /// Source file of the next feature
    Uri { uri: String },
    Feature(Feature),
    Background(Element),
    Scenario(Element),
    /// Step announced ahead of execution
    Step(Step),
    /// Step definition matched for the step about to run
    Match(Match),
    /// Outcome of the running step
    Result(StepResult),
    /// The running step ended without an outcome (e.g. an interrupted run);
    /// later matches and results belong to the steps after it
    Unfinished,
    Before(Hook),
    After(Hook),
    /// Attachment emitted by the running step or hook
    Embedding {
        mime_type: String,
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
    },
    /// Text output emitted by the running step or hook
    Write { text: String },
    /// End of the current feature file
    Eof,
}

mod base64_bytes {
    use super::BASE64;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        super::decode_base64(&encoded).map_err(serde::de::Error::custom)
    }
}

/// Decode base64 that may be wrapped across lines
fn decode_base64(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    BASE64.decode(compact)
}

/// Read newline-delimited JSON events. Blank lines are skipped.
pub fn read_events<R: BufRead>(reader: R) -> Result<Vec<RunEvent>> {
    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read event line {}", index + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let event: RunEvent = serde_json::from_str(trimmed)
            .with_context(|| format!("Invalid event on line {}", index + 1))?;
        events.push(event);
    }
    Ok(events)
}

/// Parse a cucumber JSON document
pub fn parse_document(content: &str) -> Result<Vec<Feature>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(content).context("Invalid cucumber JSON document")
}

/// Replay a finished cucumber JSON document as the event stream that would
/// have produced it. Embedded base64 payloads are decoded so the writer can
/// store them as files.
pub fn events_from_document(features: &[Feature]) -> Result<Vec<RunEvent>> {
    let mut events = Vec::new();

    for feature in features {
        events.push(RunEvent::Uri {
            uri: feature.uri.clone(),
        });
        events.push(RunEvent::Feature(Feature {
            elements: Vec::new(),
            ..feature.clone()
        }));

        for element in &feature.elements {
            let header = Element {
                before: Vec::new(),
                steps: Vec::new(),
                after: Vec::new(),
                ..element.clone()
            };
            events.push(match element.element_type {
                crate::ElementType::Background => RunEvent::Background(header),
                crate::ElementType::Scenario => RunEvent::Scenario(header),
            });

            for step in &element.steps {
                events.push(RunEvent::Step(Step {
                    step_match: None,
                    result: None,
                    embeddings: Vec::new(),
                    output: Vec::new(),
                    ..step.clone()
                }));
            }

            for hook in &element.before {
                replay_hook(hook, &mut events, RunEvent::Before)
                    .with_context(|| format!("Before hook of '{}'", element.name))?;
            }

            for step in &element.steps {
                if let Some(ref step_match) = step.step_match {
                    events.push(RunEvent::Match(step_match.clone()));
                }
                replay_attachments(&step.embeddings, &step.output, &mut events)
                    .with_context(|| format!("Step '{}{}'", step.keyword, step.name))?;
                events.push(match step.result {
                    Some(ref result) => RunEvent::Result(result.clone()),
                    None => RunEvent::Unfinished,
                });
            }

            for hook in &element.after {
                replay_hook(hook, &mut events, RunEvent::After)
                    .with_context(|| format!("After hook of '{}'", element.name))?;
            }
        }

        events.push(RunEvent::Eof);
    }

    Ok(events)
}

fn replay_hook(
    hook: &Hook,
    events: &mut Vec<RunEvent>,
    wrap: fn(Hook) -> RunEvent,
) -> Result<()> {
    replay_attachments(&hook.embeddings, &hook.output, events)?;
    events.push(wrap(Hook {
        embeddings: Vec::new(),
        output: Vec::new(),
        ..hook.clone()
    }));
    Ok(())
}

fn replay_attachments(
    embeddings: &[crate::Embedding],
    output: &[String],
    events: &mut Vec<RunEvent>,
) -> Result<()> {
    for embedding in embeddings {
        let data = decode_base64(&embedding.data)
            .with_context(|| format!("Embedding of type {} is not base64", embedding.mime_type))?;
        events.push(RunEvent::Embedding {
            mime_type: embedding.mime_type.clone(),
            data,
        });
    }
    for text in output {
        events.push(RunEvent::Write { text: text.clone() });
    }
    Ok(())
}
