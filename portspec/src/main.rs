use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use portspec::connection::{Connection, ConnectionDoc, Verdict};
use portspec::diag::{DiagLevel, Diagnostic};
use portspec::{parser, AttributeSource, NodeAttrs};

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "portspec",
    version,
    about = "Check dtype/shape compatibility between pipeline node ports"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Log filter (RUST_LOG syntax)
    #[arg(long, default_value = "warn", global = true)]
    log: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether a source port may connect to a target port
    Check(CheckArgs),
    /// Resolve a shape against node attributes
    Resolve(ResolveArgs),
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Connection document (JSON)
    #[arg(long, conflicts_with_all = ["source", "target"])]
    file: Option<PathBuf>,

    /// Source port, e.g. 'float32[-1, bands]'
    #[arg(long, required_unless_present = "file")]
    source: Option<String>,

    /// Target port, e.g. 'Tensor[-1, 61]' or 'Tensor[-1]...' for a variadic port
    #[arg(long, required_unless_present = "file")]
    target: Option<String>,

    /// Source node attribute NAME=VALUE (repeatable)
    #[arg(long = "source-attr", value_parser = NodeAttrs::parse_assignment)]
    source_attrs: Vec<(String, Value)>,

    /// Target node attribute NAME=VALUE (repeatable)
    #[arg(long = "target-attr", value_parser = NodeAttrs::parse_assignment)]
    target_attrs: Vec<(String, Value)>,

    /// Source node identifier
    #[arg(long)]
    source_id: Option<String>,

    /// Target node identifier
    #[arg(long)]
    target_id: Option<String>,
}

#[derive(Args, Debug)]
struct ResolveArgs {
    /// Shape, e.g. '[batch, 3, -1]'
    #[arg(long)]
    shape: String,

    /// Node attribute NAME=VALUE (repeatable)
    #[arg(long = "attr", value_parser = NodeAttrs::parse_assignment)]
    attrs: Vec<(String, Value)>,

    /// Node identifier
    #[arg(long)]
    id: Option<String>,
}

/// Build a node from CLI flags. No flags means no node at all.
fn node_from(id: Option<String>, attrs: Vec<(String, Value)>) -> Option<NodeAttrs> {
    if id.is_none() && attrs.is_empty() {
        return None;
    }
    Some(NodeAttrs {
        id,
        attrs: attrs.into_iter().collect(),
    })
}

fn run_check(args: CheckArgs, format: OutputFormat) -> Result<ExitCode> {
    let conn = match &args.file {
        Some(path) => ConnectionDoc::load(path)?.into_connection()?,
        None => Connection {
            source: parser::parse_spec(args.source.as_deref().unwrap_or_default())?,
            source_node: node_from(args.source_id, args.source_attrs),
            target: parser::parse_target(args.target.as_deref().unwrap_or_default())?,
            target_node: node_from(args.target_id, args.target_attrs),
        },
    };
    debug!(source = ?conn.source, target = ?conn.target, "checking connection");

    let result = conn.check();
    let warnings = conn.warnings();
    match format {
        OutputFormat::Json => {
            let verdict = Verdict::from(&result).with_warnings(warnings);
            println!("{}", serde_json::to_string_pretty(&verdict)?);
        }
        OutputFormat::Text => {
            for warning in &warnings {
                eprintln!("portspec: {warning}");
            }
            match &result {
                Ok(()) => println!("compatible"),
                Err(reason) => eprintln!("portspec: {}", Diagnostic::from(reason)),
            }
        }
    }
    Ok(if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn run_resolve(args: ResolveArgs, format: OutputFormat) -> Result<ExitCode> {
    let shape = parser::parse_shape(&args.shape)?;
    let node = node_from(args.id, args.attrs);
    let result = portspec::resolve(&shape, node.as_ref().map(|n| n as &dyn AttributeSource));

    match (format, &result) {
        (OutputFormat::Json, Ok(dims)) => println!("{}", json!({ "resolved": dims })),
        (OutputFormat::Json, Err(err)) => {
            println!("{}", json!({ "resolved": null, "error": err.to_string() }))
        }
        (OutputFormat::Text, Ok(dims)) => {
            let dims: Vec<String> = dims.iter().map(i64::to_string).collect();
            println!("[{}]", dims.join(", "));
        }
        (OutputFormat::Text, Err(err)) => {
            eprintln!("portspec: {}", Diagnostic::new(DiagLevel::Error, err.to_string()))
        }
    }
    Ok(if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cli.log))
        .with_writer(std::io::stderr)
        .init();

    let outcome = match cli.command {
        Command::Check(args) => run_check(args, cli.format).context("check failed"),
        Command::Resolve(args) => run_resolve(args, cli.format).context("resolve failed"),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("portspec: error: {e:#}");
            ExitCode::from(2)
        }
    }
}
