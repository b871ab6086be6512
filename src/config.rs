//! Command-line configuration for the `tiff-layers` binary.
//!
//! Options come from command-line arguments via clap, with environment
//! variable fallbacks under the `TIFF_LAYERS_` prefix:
//!
//! - `TIFF_LAYERS_MAX_FILE_SIZE` - Largest input accepted, in bytes (default: 512 MiB)
//! - `TIFF_LAYERS_FORMAT` - Output format, `text` or `json` (default: text)
//! - `TIFF_LAYERS_CACHE_ENTRIES` - Extraction results kept in memory (default: 64)
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use tiff_layers::config::{Cli, Command};
//!
//! let cli = Cli::parse();
//! match cli.command {
//!     Command::Layers(config) => println!("{} file(s)", config.paths.len()),
//!     Command::Inspect(config) => println!("{}", config.path.display()),
//! }
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::cache::DEFAULT_CACHE_ENTRIES;
use crate::extract::{ExtractOptions, DEFAULT_MAX_INPUT_SIZE};

// =============================================================================
// CLI Structure
// =============================================================================

/// Extract Photoshop layer metadata from layered TIFF files.
#[derive(Parser, Debug, Clone)]
#[command(name = "tiff-layers")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Reject inputs larger than this many bytes.
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_MAX_INPUT_SIZE,
        env = "TIFF_LAYERS_MAX_FILE_SIZE"
    )]
    pub max_file_size: u64,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List the layers of one or more TIFF files.
    Layers(LayersConfig),

    /// Dump the directory and resource structure of a TIFF file.
    Inspect(InspectConfig),
}

/// Output rendering for both commands.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Text,

    /// Pretty-printed JSON
    Json,
}

// =============================================================================
// Layers Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct LayersConfig {
    /// TIFF files to read.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, env = "TIFF_LAYERS_FORMAT")]
    pub format: OutputFormat,

    /// Extraction results kept in memory, keyed by file content.
    #[arg(long, default_value_t = DEFAULT_CACHE_ENTRIES, env = "TIFF_LAYERS_CACHE_ENTRIES")]
    pub cache_entries: usize,
}

// =============================================================================
// Inspect Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct InspectConfig {
    /// TIFF file to inspect.
    pub path: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, env = "TIFF_LAYERS_FORMAT")]
    pub format: OutputFormat,
}

// =============================================================================
// Validation
// =============================================================================

impl Cli {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_file_size == 0 {
            return Err("max_file_size must be greater than 0".to_string());
        }

        if let Command::Layers(ref layers) = self.command {
            if layers.cache_entries == 0 {
                return Err("cache_entries must be greater than 0".to_string());
            }
        }

        Ok(())
    }

    /// Extraction limits derived from the global flags.
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            max_input_size: self.max_file_size,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
