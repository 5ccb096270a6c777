//! cukehtml: render Cucumber results as a static HTML report

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use cukehtml::assets::{AssetBundle, ASSET_MANIFEST};
use cukehtml::config::{load_config, write_default_config, CONFIG_FILENAME};
use cukehtml::events::{events_from_document, parse_document, read_events};
use cukehtml::reporter::ConsoleReporter;
use cukehtml::{HtmlReportWriter, RunEvent};
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// cukehtml: static HTML reports for Cucumber runs
#[derive(Parser, Debug)]
#[command(name = "cukehtml")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Log more (-v debug, -vv trace). RUST_LOG is honored when not given.
    #[arg(long, short, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write an HTML report bundle from a cucumber JSON document or event stream
    Render {
        /// Cucumber JSON file, or newline-delimited events with --events ("-" for stdin)
        input: PathBuf,

        /// Treat INPUT as newline-delimited JSON run events
        #[arg(long)]
        events: bool,

        /// Report directory (default: from config, else cucumber-html-report)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Directory with files that replace builtin viewer assets
        #[arg(long)]
        assets: Option<PathBuf>,

        /// Pretty-print report.json
        #[arg(long)]
        pretty: bool,

        /// Path to config file (default: search .cukehtmlrc.json in current dir and parents)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Quiet mode (one-line summary)
        #[arg(long, short)]
        quiet: bool,

        /// Exit 1 when any scenario did not pass
        #[arg(long)]
        strict: bool,
    },

    /// List the builtin viewer assets
    Assets,

    /// Create .cukehtmlrc.json with defaults
    Init {
        /// Directory in which to create config (default: current)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Report directory to record in the config
        #[arg(long)]
        output_dir: Option<String>,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);
    if args.no_color {
        colored::control::set_override(false);
    }

    match args.command {
        Commands::Render {
            input,
            events,
            output,
            assets,
            pretty,
            config,
            quiet,
            strict,
        } => {
            let work_dir = std::env::current_dir().context("Failed to get current directory")?;
            let config = load_config(&work_dir, config.as_deref())?.merge_with_cli(
                output.as_deref(),
                assets.as_deref(),
                pretty,
            );

            let run_events = load_events(&input, events)?;
            let out_dir = config.output_dir();
            let options = config.report_options()?;

            let mut writer = HtmlReportWriter::with_options(&out_dir, options)?;
            writer.handle_all(run_events)?;
            let summary = writer.done()?;

            let mut reporter = ConsoleReporter::new();
            if args.no_color {
                reporter = reporter.without_colors();
            }
            if args.verbose > 0 {
                reporter = reporter.verbose();
            }
            if quiet {
                reporter.report_quiet(&summary, &out_dir);
            } else {
                reporter.report(&summary, &out_dir);
            }

            if strict && !summary.is_success() {
                return Ok(ExitCode::from(1));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Assets => {
            let bundle = AssetBundle::builtin();
            for path in ASSET_MANIFEST {
                let size = bundle.get(path).map(<[u8]>::len).unwrap_or(0);
                println!("{:>8}  {}", size, path);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Init { dir, output_dir } => {
            let dir = dir.unwrap_or_else(|| PathBuf::from("."));
            let path = write_default_config(&dir, output_dir.as_deref())
                .with_context(|| format!("Cannot create {}", CONFIG_FILENAME))?;
            eprintln!("{}: Created {}", "Info".blue(), path.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Read run events from a cucumber JSON document or an NDJSON event stream
fn load_events(input: &Path, ndjson: bool) -> Result<Vec<RunEvent>> {
    let reader: Box<dyn BufRead> = if input == Path::new("-") {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = std::fs::File::open(input)
            .with_context(|| format!("Failed to read {}", input.display()))?;
        Box::new(BufReader::new(file))
    };

    if ndjson {
        return read_events(reader)
            .with_context(|| format!("Failed to parse events from {}", input.display()));
    }

    let mut content = String::new();
    let mut reader = reader;
    reader
        .read_to_string(&mut content)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let features = parse_document(&content)
        .with_context(|| format!("Failed to parse {}", input.display()))?;
    tracing::debug!(features = features.len(), "parsed cucumber document");
    events_from_document(&features)
}
