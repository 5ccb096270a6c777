//! Edge case tests: odd event orders and inputs must not panic or corrupt numbering.

use cukehtml::events::{parse_document, read_events};
use cukehtml::{Element, Feature, HtmlReportWriter, ReportError, RunEvent, Step};
use proptest::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn step_before_any_feature_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let mut writer = HtmlReportWriter::new(tmp.path()).unwrap();
    let err = writer.handle(RunEvent::Step(Step::default())).unwrap_err();
    assert!(matches!(err, ReportError::InvalidEvent { .. }));
    assert!(err.to_string().contains("step before any scenario"));
}

#[test]
fn result_without_pending_step_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let mut writer = HtmlReportWriter::new(tmp.path()).unwrap();
    writer
        .handle_all(vec![
            RunEvent::Feature(Feature::default()),
            RunEvent::Scenario(Element::default()),
        ])
        .unwrap();
    let err = writer
        .handle(RunEvent::Result(cukehtml::StepResult::new(
            cukehtml::Status::Passed,
        )))
        .unwrap_err();
    assert!(err.to_string().contains("without a pending step"));
}

#[test]
fn embedding_with_nothing_to_attach_still_writes_file() {
    let tmp = TempDir::new().unwrap();
    let mut writer = HtmlReportWriter::new(tmp.path()).unwrap();
    writer
        .handle(RunEvent::Embedding {
            mime_type: "application/x-weird+json".to_string(),
            data: b"{}".to_vec(),
        })
        .unwrap();
    let summary = writer.done().unwrap();

    assert_eq!(summary.attachments, 1);
    assert!(tmp.path().join("embedded1.xweird").is_file());
}

#[test]
fn empty_document_is_empty_run() {
    assert!(parse_document("").unwrap().is_empty());
    assert!(parse_document("  \n").unwrap().is_empty());
    assert!(parse_document("[]").unwrap().is_empty());
}

#[test]
fn truncated_document_is_an_error() {
    let err = parse_document(r#"[{"name": "Half"#).unwrap_err();
    assert!(err.to_string().contains("Invalid cucumber JSON document"));
}

#[test]
fn bad_event_line_names_line_number() {
    let input = "{\"event\":\"eof\"}\n\n{\"event\":\"teleport\"}\n";
    let err = read_events(input.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("line 3"));
}

#[test]
fn non_base64_embedding_event_is_rejected() {
    let input = r#"{"event":"embedding","mime_type":"image/png","data":"***"}"#;
    assert!(read_events(input.as_bytes()).is_err());
}

#[test]
fn dropping_writer_without_done_leaves_empty_report() {
    let tmp = TempDir::new().unwrap();
    {
        let mut writer = HtmlReportWriter::new(tmp.path()).unwrap();
        writer.on_embed("txt", "text/plain", b"kept").unwrap();
    }
    assert_eq!(
        fs::read_to_string(tmp.path().join("embedded1.txt")).unwrap(),
        "kept"
    );
    assert!(!tmp.path().join("index.html").exists());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn attachments_are_numbered_in_call_order(
        payloads in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 1..12)
    ) {
        let tmp = TempDir::new().unwrap();
        let mut writer = HtmlReportWriter::new(tmp.path()).unwrap();

        for (i, payload) in payloads.iter().enumerate() {
            let name = writer.on_embed("bin", "application/octet-stream", payload).unwrap();
            prop_assert_eq!(name, format!("embedded{}.bin", i + 1));
        }
        prop_assert_eq!(writer.attachments_written(), payloads.len());

        for (i, payload) in payloads.iter().enumerate() {
            let stored = fs::read(tmp.path().join(format!("embedded{}.bin", i + 1))).unwrap();
            prop_assert_eq!(&stored, payload);
        }
    }
}
