//! Command-line arguments
//!
// Copyright (c) 2025 Tommy Olsen
// Licensed under the MIT License.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bin-to-ecs-converter")]
#[command(author, version, about = "Converts Intellivision BIN+CFG images to ECS files")]
pub struct Cli {
    /// Path to config file (default: ./bin2ecs.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert BIN images (and their .cfg files) to ECS
    Convert {
        /// BIN files or directories containing BIN files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Mapper profile for images without .cfg or catalog entry
        #[arg(short, long)]
        mapper: Option<String>,

        /// Additional title catalog (may be repeated)
        #[arg(long = "catalog")]
        catalogs: Vec<PathBuf>,

        /// Directory for the .ecs files (default: next to each input)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Overwrite existing .ecs files
        #[arg(short, long)]
        force: bool,

        /// Search directories recursively
        #[arg(short, long)]
        recursive: bool,
    },

    /// Show the block table of an ECS file
    Inspect {
        /// ECS file to inspect
        #[arg(required = true)]
        file: PathBuf,
    },

    /// List the built-in mapper profiles
    Mappers,

    /// Print the catalog digest of BIN images
    Digest {
        /// BIN files to digest
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}
