// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

//! Fixes discontinuities in a pedestrian network digitized per grid tile.
//!
//! Beware: unless `--output` is given, the links layer is rewritten in place.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use walknet::config::StitchConfig;
use walknet::layers::{LinkLayer, read_node_layer};
use walknet::stitch_seams;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the merged nodes layer (GeoJSON)
    #[arg(env = "IVY_NODES")]
    nodes: PathBuf,

    /// Path to the merged links layer (GeoJSON)
    #[arg(env = "IVY_LINKS")]
    links: PathBuf,

    /// Write the rewritten links here instead of overwriting the input
    #[arg(long, env = "IVY_OUTPUT")]
    output: Option<PathBuf>,

    /// JSON file with tolerance and attribute names
    #[arg(long, env = "IVY_CONFIG")]
    config: Option<PathBuf>,

    /// Half-width of the window used to find a broken pair's partner
    #[arg(long)]
    tolerance: Option<f64>,

    /// Also write the run report as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let config = match &args.config {
        Some(path) => StitchConfig::load(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => StitchConfig::default(),
    }
    .with_tolerance(args.tolerance)?;

    let nodes = read_node_layer(&args.nodes, &config.fields)
        .with_context(|| format!("loading nodes layer {}", args.nodes.display()))?;

    let destination = args.output.clone().unwrap_or_else(|| args.links.clone());
    let mut layer = LinkLayer::open(&args.links, &destination)
        .with_context(|| format!("loading links layer {}", args.links.display()))?;
    let mut links = layer.links(&config.fields)?;

    println!(
        "Loaded {} nodes and {} links, stitching tile seams...",
        nodes.len(),
        layer.len()
    );

    let report = stitch_seams(&nodes, &mut links, &mut layer, &config)
        .context("no link changes were committed")?;

    if let Some(path) = &args.report {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &report)?;
        println!("Exported report to {}", path.display());
    }

    println!("{}", report);

    Ok(())
}
