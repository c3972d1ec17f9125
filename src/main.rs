#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::style)]

use anyhow::Context;
use clap::Parser;
use switchyard::cli::Args;
use switchyard::pipeline;
use switchyard::settings::ConvertConfig;
use tracing::Level;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let is_verbose = args.verbose;
    tracing_subscriber::fmt()
        .with_max_level(if is_verbose {
            Level::TRACE
        } else {
            Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args).await {
        tracing::error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let settings = match args.config.as_deref() {
        Some(path) => {
            tracing::info!("Loading converter config from: {}", path);
            Some(ConvertConfig::load(path).await?)
        }
        None => None,
    };

    let input = args
        .input
        .as_deref()
        .or_else(|| settings.as_ref().and_then(|s| s.input.as_deref()))
        .context("No input given; pass --input or set `input` in the config")?;

    // A config file implies its output path; otherwise print to stdout.
    let output = args
        .output
        .as_deref()
        .or_else(|| settings.as_ref().map(|s| s.output.as_str()));

    let defaults = ConvertConfig::default();
    let set = pipeline::run(settings.as_ref().unwrap_or(&defaults), input).await?;
    pipeline::write_output(&set, output).await?;

    tracing::info!("Conversion complete!");
    Ok(())
}
