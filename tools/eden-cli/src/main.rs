//! edenbin - Eden binary level tool
//!
//! Bakes scene manifests into `.edenbin` levels and inspects them.

use anyhow::Result;
use clap::{Parser, Subcommand};
use level_common::LevelReader;
use std::path::PathBuf;

use eden_cli::{bake, inspect, manifest::SceneManifest};

#[derive(Parser)]
#[command(name = "edenbin")]
#[command(about = "Eden binary level tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bake a scene manifest into a binary level
    Bake {
        /// Path to the scene manifest
        #[arg(default_value = "scene.toml")]
        manifest: PathBuf,

        /// Output .edenbin file (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate a scene manifest without baking
    Validate {
        /// Path to the scene manifest
        #[arg(default_value = "scene.toml")]
        manifest: PathBuf,
    },

    /// Print the header, tables and objects of a binary level
    Inspect {
        /// Input .edenbin file
        file: PathBuf,
    },

    /// Exit with status 0 if the file is a loadable binary level
    Check {
        /// Input .edenbin file
        file: PathBuf,
    },

    /// Print the binary level path for a source level
    Path {
        /// Source level file
        source: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match &cli.command {
        Commands::Bake { verbose: true, .. } => tracing::Level::DEBUG,
        _ => tracing::Level::INFO,
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match cli.command {
        Commands::Bake {
            manifest, output, ..
        } => {
            let report = bake::bake(&manifest, output.as_deref())?;
            tracing::info!(
                "Baked {:?}: {} bytes ({} meshes, {} textures, {} objects, {} strings)",
                report.output,
                report.bytes,
                report.meshes,
                report.textures,
                report.objects,
                report.strings
            );
        }

        Commands::Validate { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let scene = SceneManifest::load(&manifest)?;
            tracing::info!("Manifest is valid ({} objects)", scene.objects.len());
        }

        Commands::Inspect { file } => {
            inspect::inspect(&file)?;
        }

        Commands::Check { file } => {
            if !LevelReader::exists(&file) {
                tracing::warn!("{:?} is not a valid binary level", file);
                std::process::exit(1);
            }
            tracing::info!("{:?} is a valid binary level", file);
        }

        Commands::Path { source } => {
            println!("{}", LevelReader::binary_path(&source).display());
        }
    }

    Ok(())
}
