//! Single-node host for pcgex point processors.
//!
//! Loads point collections from JSON, binds them to the node's input pins,
//! ticks the node until it reports done, then writes every output pin back
//! to JSON. Node configuration problems are logged by the node itself and
//! produce an empty output file; only I/O and parse failures exit non-zero.

mod config;
mod io;

use anyhow::Result;
use clap::Parser;
use pcgex_plugin::run_to_completion;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use io::PointFile;

/// Runs one point processing node over JSON point collections.
#[derive(Parser, Debug)]
#[command(name = "pcgex")]
#[command(about = "Runs one point processing node over JSON point collections")]
struct Args {
	/// Path to the node configuration TOML file.
	#[arg(short, long)]
	config: PathBuf,

	/// Input points JSON file.
	#[arg(short, long)]
	input: PathBuf,

	/// Output points JSON file.
	#[arg(short, long)]
	output: PathBuf,

	/// Give up after this many ticks.
	#[arg(long, default_value_t = 1_000_000)]
	max_ticks: usize,
}

fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let args = Args::parse();
	let written = run(&args)?;
	info!(collections = written, output = %args.output.display(), "done");
	Ok(())
}

/// Returns the number of collections written.
fn run(args: &Args) -> Result<usize> {
	let config = Config::load(&args.config)?;
	let inputs = PointFile::load(&args.input)?.into_inputs()?;

	let mut node = config.build_node(inputs);
	info!(node = node.name(), input = %args.input.display(), "running");

	match run_to_completion(node.as_mut(), args.max_ticks) {
		Some(ticks) => info!(node = node.name(), ticks, "node finished"),
		None => warn!(node = node.name(), "writing partial outputs"),
	}

	let outputs = node.take_outputs();
	PointFile::from_outputs(&outputs).save(&args.output)?;
	Ok(outputs.len())
}
