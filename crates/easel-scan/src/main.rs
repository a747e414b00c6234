use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use easel_resources::{Blacklist, LoadMode, ResourceRegistry, ResourceType};
use easel_scan::{ScanOptions, Scanner};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "easel-scan")]
struct Args {
    /// Additional directories or bundles to load resources from
    #[arg(long = "path", value_name = "PATH")]
    extra_paths: Vec<PathBuf>,

    /// Restrict loading to the given resource types (e.g. filters, palettes)
    #[arg(long = "type", value_name = "TYPE", value_parser = parse_type)]
    types: Vec<ResourceType>,

    /// Skip the standard resource locations
    #[arg(long)]
    no_default_roots: bool,

    /// Replace presets that are already registered
    #[arg(long)]
    rescan: bool,

    /// Print the load report as JSON
    #[arg(long)]
    json: bool,

    /// Blacklist file; defaults to the one in the user config directory
    #[arg(long, value_name = "FILE")]
    blacklist: Option<PathBuf>,
}

fn parse_type(value: &str) -> Result<ResourceType, String> {
    match ResourceType::from_tag(value) {
        ResourceType::Other(tag) => Err(format!("unsupported resource type: {tag}")),
        known => Ok(known),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    let args = Args::parse();
    let blacklist_path = match args.blacklist {
        Some(path) => path,
        None => Blacklist::default_path().context("locating blacklist")?,
    };
    let blacklist = Blacklist::open(&blacklist_path)
        .with_context(|| format!("opening blacklist {}", blacklist_path.display()))?;

    let registry = Arc::new(ResourceRegistry::new());
    let scanner = Scanner::new(Arc::clone(&registry)).with_blacklist(Arc::new(blacklist));
    let options = ScanOptions {
        types: args.types,
        extra_paths: args.extra_paths,
        use_default_roots: !args.no_default_roots,
        mode: if args.rescan {
            LoadMode::Rescan
        } else {
            LoadMode::Initial
        },
    };
    let report = scanner.scan(&options);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    for preset in registry.snapshot() {
        println!("{} ({})", preset.id, preset.resource_type);
    }
    for failure in &report.failures {
        eprintln!("failed: {} [{}]: {}", failure.url, failure.location, failure.error);
    }
    for storage in &report.unavailable {
        eprintln!("unavailable: {}: {}", storage.location, storage.error);
    }
    eprintln!("{}", report.summary());
    Ok(())
}
