//! `mediation-debug`: resolves breakpoints in a flow document from the command line.
//!
//! The document is a JSON-serialized element tree (see `parsers::dom::Element`).
//!
//! ```bash
//! mediation-debug resolve order-api.json --line 12 --line 27
//! mediation-debug step-over order-api.json --line 12
//! ```

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use mediation_flow_debugger::config::{ConfigOverrides, DebuggerConfig};
use mediation_flow_debugger::debugger::{Breakpoint, DebugInfo, DebuggerHelper, StepOverInfo};
use mediation_flow_debugger::logging;
use mediation_flow_debugger::parsers::Element;

#[derive(Parser)]
#[command(name = "mediation-debug")]
#[command(about = "Resolve breakpoints in mediation flows to mediator positions", long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter for stderr (falls back to RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Disable ANSI colors in log output
    #[arg(long, global = true)]
    no_color: bool,

    /// Also write a session log file
    #[arg(long, global = true)]
    log_file: bool,

    /// Print single-line JSON
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve breakpoints to mediator positions
    Resolve {
        /// Document path, or `-` for stdin
        document: PathBuf,

        /// 0-based breakpoint line; repeat for a batch
        #[arg(short, long = "line", required = true)]
        lines: Vec<u32>,
    },

    /// Show where one step from a suspended mediator can land
    StepOver {
        /// Document path, or `-` for stdin
        document: PathBuf,

        /// 0-based line of the suspended mediator
        #[arg(short, long)]
        line: u32,
    },
}

#[derive(Serialize)]
struct ResolvedBreakpoint<'a> {
    line: u32,
    #[serde(flatten)]
    info: &'a DebugInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    command: Option<Value>,
}

#[derive(Serialize)]
struct StepOverOutput<'a> {
    step: &'a StepOverInfo,
    breakpoints: Vec<ResolvedBreakpoint<'a>>,
}

fn read_document(path: &Path) -> Result<Element> {
    let contents = if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).context("failed to read document from stdin")?;
        buffer
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read document {:?}", path))?
    };
    serde_json::from_str(&contents).with_context(|| format!("document {:?} is not a valid element tree", path))
}

fn resolved<'a>(breakpoint: &Breakpoint, info: &'a DebugInfo) -> ResolvedBreakpoint<'a> {
    ResolvedBreakpoint { line: breakpoint.line, info, command: info.to_json() }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty { serde_json::to_string_pretty(value)? } else { serde_json::to_string(value)? };
    println!("{}", out);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let overrides = ConfigOverrides {
        log_level: cli.log_level.clone(),
        no_color: cli.no_color.then_some(true),
        file_logging: cli.log_file.then_some(true),
        pretty: cli.compact.then_some(false),
    };
    let config = DebuggerConfig::load(cli.config.as_deref(), overrides).context("failed to load config")?;
    let _guard = logging::init_logger(config.no_color, config.log_level.as_deref(), config.file_logging)
        .context("failed to initialize logging")?;

    match cli.command {
        Commands::Resolve { document, lines } => {
            let helper = DebuggerHelper::from_document(&read_document(&document)?)?;
            info!("Resolving {} breakpoints in {}", lines.len(), helper.artifact_name());

            let breakpoints: Vec<Breakpoint> = lines.into_iter().map(Breakpoint::new).collect();
            let results = helper.debug_info_batch(&breakpoints);
            let output: Vec<_> = breakpoints
                .iter()
                .filter_map(|b| results.get(b).map(|info| resolved(b, info)))
                .collect();
            print_json(&output, config.pretty)
        }
        Commands::StepOver { document, line } => {
            let helper = DebuggerHelper::from_document(&read_document(&document)?)?;
            let breakpoint = Breakpoint::new(line);
            let targets = helper.step_over_breakpoints(&breakpoint)?;
            let breakpoints = targets.breakpoints.iter().map(|(b, info)| resolved(b, info)).collect();
            print_json(&StepOverOutput { step: &targets.step, breakpoints }, config.pretty)
        }
    }
}
