//! platform-variant - report the container platform of this host
//!
//! Prints `os/arch[/variant]` the way image registries name platforms,
//! reading the ARM variant from /proc/cpuinfo on Linux.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use platform_variant::config::Config;
use platform_variant::hardware::{init_variant_with, normalize_variant, CpuInfoSource, Platform};

/// Report the container platform of this host
#[derive(Parser)]
#[command(name = "platform-variant")]
#[command(version)]
#[command(about = "Detect the OS, architecture and ARM variant used for image matching")]
struct Cli {
    /// Read CPU info from this file instead of the configured one
    #[arg(long, global = true)]
    cpuinfo: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect and print the platform specifier (default)
    Detect {
        /// Print the platform as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the raw value of a cpuinfo field
    Lookup {
        /// Field label, matched case-insensitively (defaults to the configured field)
        field: Option<String>,
    },

    /// Print the variant name for a raw "CPU architecture" value
    Normalize {
        /// Raw value (e.g., "7", "5TEJ")
        raw: String,
    },

    /// Show the config path and effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = Config::load();
    let config = config_or_default(&loaded);

    init_logging(&config);
    if let Err(err) = &loaded {
        tracing::warn!(error = %err, "ignoring config file, using defaults");
    }

    let cpuinfo_path = cli
        .cpuinfo
        .unwrap_or_else(|| config.detection.cpuinfo_path.clone());
    let source = CpuInfoSource::new(&cpuinfo_path);

    match cli.command {
        Some(Commands::Detect { json }) => print_platform(&source, json)?,
        None => print_platform(&source, false)?,
        Some(Commands::Lookup { field }) => {
            let field = field.unwrap_or_else(|| config.detection.field.clone());
            match source.lookup(&Platform::current(), &field) {
                Ok(value) => println!("{}", value),
                Err(err) => {
                    eprintln!(
                        "{} {}",
                        "Lookup failed:".bright_red(),
                        err.to_string().bright_red()
                    );
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Normalize { raw }) => {
            println!("{}", normalize_variant(&raw));
        }
        Some(Commands::Config) => {
            let config = loaded?;
            let path = Config::config_path()?;
            let status = if path.exists() {
                ""
            } else {
                " (not found, using defaults)"
            };
            println!("{} {}{}", "Config:".bright_cyan(), path.display(), status.dimmed());
            println!();
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

/// Unreadable or malformed config never blocks detection
fn config_or_default(loaded: &Result<Config>) -> Config {
    loaded.as_ref().cloned().unwrap_or_default()
}

/// Install a stderr subscriber; RUST_LOG wins over the configured filter
fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_platform(source: &CpuInfoSource, json: bool) -> Result<()> {
    let platform = Platform::current();
    let variant = init_variant_with(&platform, source);
    let platform = platform.with_variant(variant);

    if json {
        println!("{}", serde_json::to_string_pretty(&platform)?);
    } else {
        println!("{}", platform.specifier());
    }

    Ok(())
}
