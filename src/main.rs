//! tiff-layers - Photoshop layer metadata from layered TIFF files.
//!
//! Results go to stdout; logs go to stderr so JSON output stays parseable.

use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tiff_layers::{
    config::{Cli, Command, InspectConfig, LayersConfig, OutputFormat},
    extract::read_file,
    inspect::inspect_path,
    ExtractOptions, LayerCache, LayerSource, TiffLayerData,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = cli.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let options = cli.extract_options();
    match cli.command {
        Command::Layers(config) => run_layers(config, options),
        Command::Inspect(config) => run_inspect(config, options),
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "tiff_layers=debug"
    } else {
        "tiff_layers=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_json<T: Serialize>(value: &T) -> bool {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            true
        }
        Err(e) => {
            error!("Failed to serialize output: {}", e);
            false
        }
    }
}

// =============================================================================
// Layers Command
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileResult<'a> {
    path: String,
    #[serde(flatten)]
    data: &'a TiffLayerData,
}

fn run_layers(config: LayersConfig, options: ExtractOptions) -> ExitCode {
    let cache = LayerCache::with_options(config.cache_entries, options);
    let mut extracted = Vec::new();
    let mut failed = 0usize;

    for path in &config.paths {
        let result = read_file(path, &options).and_then(|data| cache.get_or_extract(data));
        match result {
            Ok(data) => {
                info!(
                    path = %path.display(),
                    layers = data.total_layers,
                    "Extracted layers"
                );
                extracted.push((path.display().to_string(), data));
            }
            Err(e) => {
                error!(path = %path.display(), "Failed to extract layers: {}", e);
                failed += 1;
            }
        }
    }

    let printed = match config.format {
        OutputFormat::Json => {
            let results: Vec<FileResult<'_>> = extracted
                .iter()
                .map(|(path, data)| FileResult {
                    path: path.clone(),
                    data,
                })
                .collect();
            print_json(&results)
        }
        OutputFormat::Text => {
            for (path, data) in &extracted {
                print_layer_table(path, data);
            }
            true
        }
    };

    if failed > 0 || !printed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_layer_table(path: &str, data: &TiffLayerData) {
    println!("{}", path);
    println!(
        "  {}x{}, {} channel(s), {} bit, {}",
        data.width, data.height, data.channels, data.bits_per_channel, data.color_mode
    );
    if let Some(ref software) = data.software {
        println!("  software: {}", software);
    }
    match data.source {
        LayerSource::Canonical => {}
        LayerSource::Fallback { resource_id, skip } => {
            println!("  layers recovered from resource {} (skip {})", resource_id, skip)
        }
        LayerSource::NotFound => println!("  no layer data found"),
    }
    println!(
        "  {} layer(s){}",
        data.total_layers,
        if data.has_transparency {
            ", non-normal blending"
        } else {
            ""
        }
    );

    for (index, layer) in data.layers.iter().enumerate() {
        println!(
            "  {:>3}  {:<32} {:>6}x{:<6} at ({}, {})  {} {:>3}{}",
            index + 1,
            layer.name,
            layer.width,
            layer.height,
            layer.left,
            layer.top,
            layer.blend_mode,
            layer.opacity,
            if layer.visible { "" } else { "  hidden" }
        );
    }
    println!();
}

// =============================================================================
// Inspect Command
// =============================================================================

fn run_inspect(config: InspectConfig, options: ExtractOptions) -> ExitCode {
    let report = match inspect_path(&config.path, &options) {
        Ok(report) => report,
        Err(e) => {
            error!(path = %config.path.display(), "Failed to inspect file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match config.format {
        OutputFormat::Json => {
            if !print_json(&report) {
                return ExitCode::FAILURE;
            }
        }
        OutputFormat::Text => print!("{}", report),
    }

    ExitCode::SUCCESS
}
