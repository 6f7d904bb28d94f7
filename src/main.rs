use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::{info, warn};

use sublinks::models::Node;
use sublinks::utils::base64::base64_encode;
use sublinks::{ParseOptions, SubscriptionParser};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One share link per line
    Links,
    /// JSON array of nodes
    Json,
    /// Base64-wrapped link list
    Base64,
}

/// Normalize a proxy subscription into canonical share links
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Subscription file to read; stdin when omitted
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Subscription name used for node origin and name prefixing
    #[arg(short, long, value_name = "NAME")]
    name: Option<String>,

    /// Exclude rule block (one rule per line)
    #[arg(short, long, value_name = "RULES")]
    exclude: Option<String>,

    /// Read the exclude rule block from a file
    #[arg(long, value_name = "FILE", conflicts_with = "exclude")]
    exclude_file: Option<PathBuf>,

    /// Prefix node names with the subscription name
    #[arg(short, long)]
    prepend_sub_name: bool,

    /// Settings file (.toml, .yaml, .yml or .json)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Links)]
    format: OutputFormat,
}

fn main() {
    // Initialize the logger
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let options = load_options(&args)?;
    let content = read_input(args.input.as_deref())?;
    let name = args
        .name
        .clone()
        .or_else(|| {
            args.input
                .as_deref()
                .and_then(Path::file_stem)
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_default();

    let nodes = SubscriptionParser::new().parse(&content, &name, &options);
    if nodes.is_empty() {
        warn!("No nodes found in subscription '{}'", name);
    } else {
        info!("Emitting {} nodes as {:?}", nodes.len(), args.format);
    }

    println!("{}", render(&nodes, args.format)?);
    Ok(())
}

/// Settings file values, overridden by command line flags.
fn load_options(args: &Args) -> Result<ParseOptions> {
    let mut options = match &args.config {
        Some(path) => ParseOptions::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => ParseOptions::default(),
    };

    if let Some(path) = &args.exclude_file {
        let rules = fs::read_to_string(path)
            .with_context(|| format!("failed to read exclude rules from {}", path.display()))?;
        options.exclude = Some(rules);
    } else if let Some(rules) = &args.exclude {
        options.exclude = Some(rules.clone());
    }
    if args.prepend_sub_name {
        options.prepend_sub_name = true;
    }
    Ok(options)
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => {
            let bytes =
                fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        None => {
            let mut bytes = Vec::new();
            io::stdin()
                .read_to_end(&mut bytes)
                .context("failed to read stdin")?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

fn render(nodes: &[Node], format: OutputFormat) -> Result<String> {
    let links = || {
        nodes
            .iter()
            .map(|node| node.url.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    };
    Ok(match format {
        OutputFormat::Links => links(),
        OutputFormat::Json => serde_json::to_string_pretty(nodes)?,
        OutputFormat::Base64 => base64_encode(&links()),
    })
}
