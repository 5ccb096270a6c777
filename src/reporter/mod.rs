//! Reporter module for output formatting

pub mod console;
pub mod html;
pub mod json;

pub use console::ConsoleReporter;
pub use html::{HtmlReportWriter, ReportOptions, JSON_REPORT_FILENAME};
pub use json::{extension_for_mime, EmbedSink, JsonFormatter};
