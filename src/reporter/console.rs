//! Console reporter with colored output

use crate::{RunSummary, Status, StatusCounts};
use colored::Colorize;
use std::path::Path;

/// Reporter for terminal output
pub struct ConsoleReporter {
    /// Whether to use colors
    use_colors: bool,
    /// Whether to show verbose output
    verbose: bool,
}

impl ConsoleReporter {
    /// Create a new console reporter
    pub fn new() -> Self {
        Self {
            use_colors: true,
            verbose: false,
        }
    }

    /// Disable colors
    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    /// Enable verbose output
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Print the summary of a written report
    pub fn report(&self, summary: &RunSummary, dir: &Path) {
        print!("{}", self.render(summary, dir));
    }

    /// Report in quiet mode (one line)
    pub fn report_quiet(&self, summary: &RunSummary, dir: &Path) {
        println!("{}", self.render_quiet(summary, dir));
    }

    /// Multi-line summary text
    pub fn render(&self, summary: &RunSummary, dir: &Path) -> String {
        let mut lines = vec![
            String::new(),
            self.bold(&format!("Cucumber report: {}", dir.join("index.html").display())),
            "─".repeat(60),
            format!("   Features:    {}", summary.features),
            format!("   Scenarios:   {}", self.counts_line(&summary.scenarios)),
            format!("   Steps:       {}", self.counts_line(&summary.steps)),
            format!("   Attachments: {}", summary.attachments),
            format!("   Duration:    {}", format_duration(summary.duration_nanos)),
        ];
        if self.verbose {
            lines.push(format!("   Generated:   {}", summary.generated_at));
        }
        lines.push(String::new());

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    /// One-line summary text
    pub fn render_quiet(&self, summary: &RunSummary, dir: &Path) -> String {
        let verdict = if summary.is_success() {
            self.paint("passed", Status::Passed)
        } else {
            self.paint("failed", Status::Failed)
        };
        format!(
            "{}: {} ({}/{} scenarios passed)",
            dir.display(),
            verdict,
            summary.scenarios.passed,
            summary.scenarios.total()
        )
    }

    fn counts_line(&self, counts: &StatusCounts) -> String {
        let total = counts.total();
        if total == 0 {
            return "0".to_string();
        }
        let parts: Vec<String> = Status::ALL
            .iter()
            .filter(|s| counts.get(**s) > 0)
            .map(|s| self.paint(&format!("{} {}", counts.get(*s), s), *s))
            .collect();
        format!("{} ({})", total, parts.join(", "))
    }

    fn paint(&self, text: &str, status: Status) -> String {
        if !self.use_colors {
            return text.to_string();
        }
        match status {
            Status::Passed => text.green().to_string(),
            Status::Failed => text.red().bold().to_string(),
            Status::Skipped => text.cyan().to_string(),
            Status::Pending => text.yellow().to_string(),
            Status::Undefined => text.magenta().to_string(),
            Status::Ambiguous => text.red().to_string(),
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.use_colors {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Human-readable duration from nanoseconds
pub fn format_duration(nanos: u64) -> String {
    let millis = nanos / 1_000_000;
    if millis < 1_000 {
        return format!("{}ms", millis);
    }
    let secs = millis as f64 / 1_000.0;
    if secs < 60.0 {
        return format!("{:.2}s", secs);
    }
    let whole = millis / 1_000;
    format!("{}m {}s", whole / 60, whole % 60)
}
