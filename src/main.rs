//! terrajava - command-line front end
//!
//! Resolves class bytes from a classpath and runs the native-method example.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use terrajava::accumulator::{Accumulator, AccumulatorNatives};
use terrajava::classpath::{ResourceResolver, SearchPath};
use terrajava::config::TerraConfig;
use terrajava::ffi::{LibraryLoader, NativeClass};
use tracing_subscriber::EnvFilter;

/// Bytes per line in `--hex` output
const HEX_LINE_BYTES: usize = 32;

#[derive(Parser)]
#[command(name = "tj")]
#[command(version)]
#[command(about = "Terra-Java compiler bridge utilities", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a class name to its class file bytes
    #[command(name = "class-bytes")]
    ClassBytes {
        /// Fully-qualified class name, e.g. a.b.C
        name: String,

        /// Classpath to search (platform path list); defaults to
        /// terrajava.toml, then $CLASSPATH
        #[arg(short, long)]
        classpath: Option<String>,

        /// Dump the bytes as hex
        #[arg(long)]
        hex: bool,

        /// Write the bytes to a file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the Accumulator native-method example
    Accumulator {
        /// Extra directories to search for the extension library
        #[arg(short = 'L', long = "library-path")]
        library_path: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::ClassBytes {
            name,
            classpath,
            hex,
            output,
        } => cmd_class_bytes(&name, classpath.as_deref(), hex, output.as_ref()),
        Commands::Accumulator { library_path } => cmd_accumulator(&library_path),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_class_bytes(
    name: &str,
    classpath: Option<&str>,
    hex: bool,
    output: Option<&PathBuf>,
) -> Result<()> {
    let search = match classpath {
        Some(list) => SearchPath::parse(list),
        None => TerraConfig::load_from_cwd()
            .context("Failed to load terrajava.toml")?
            .search_path(),
    };

    let resolver = ResourceResolver::new(&search);
    let bytes = resolver
        .class_bytes(name)
        .with_context(|| format!("Failed to resolve {}", name))?
        .with_context(|| {
            format!(
                "Class {} not found on classpath ({} entries)",
                name,
                search.len()
            )
        })?;

    if let Some(path) = output {
        fs::write(path, &bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote {} bytes to {}", bytes.len(), path.display());
    } else if hex {
        for line in bytes.chunks(HEX_LINE_BYTES) {
            println!("{}", hex::encode(line));
        }
    } else {
        println!("{}: {} bytes", name, bytes.len());
    }

    Ok(())
}

fn cmd_accumulator(library_path: &[PathBuf]) -> Result<()> {
    let local_class;
    let mut acc = if library_path.is_empty() {
        Accumulator::new()
    } else {
        let mut loader = LibraryLoader::system();
        for dir in library_path.iter().rev() {
            loader.prepend_search_path(dir);
        }
        local_class = NativeClass::<AccumulatorNatives>::new(loader);
        Accumulator::with_class(&local_class)
    };

    acc.add(25)?;
    acc.sqrt()?;
    println!("{:?}", acc.value());
    println!("{}", acc.is_pos()?);

    Ok(())
}
