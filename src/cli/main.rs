//! Command-line interface for the BIN to ECS Converter
//!
//! Usage: bin-to-ecs-converter convert <file.bin|dir>...
//!
// Copyright (c) 2025 Tommy Olsen
// Licensed under the MIT License.

mod args;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use args::{Cli, Commands};
use bin_to_ecs_converter::block::BlockClass;
use bin_to_ecs_converter::catalog::{self, Catalog};
use bin_to_ecs_converter::config::{Config, VERSION};
use bin_to_ecs_converter::convert_bin::{ConvertBin, collect_bin_files};
use bin_to_ecs_converter::mapper;
use bin_to_ecs_converter::parse_ecs::EcsImage;
use bin_to_ecs_converter::segment::{BLOCK_WORDS, Page};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick a level from the verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "bin_to_ecs_converter=trace".to_string()
        } else {
            "bin_to_ecs_converter=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Convert {
            inputs,
            mapper,
            catalogs,
            output_dir,
            force,
            recursive,
        } => {
            let mut config = Config::load_or_default(cli.config.as_deref())?;
            if mapper.is_some() {
                config.fallback_mapper = mapper;
            }
            if output_dir.is_some() {
                config.output_dir = output_dir;
            }
            config.catalogs.extend(catalogs);
            config.overwrite |= force;
            config.recursive |= recursive;
            run_convert(config, &inputs)
        }
        Commands::Inspect { file } => inspect(&file).map(|_| ExitCode::SUCCESS),
        Commands::Mappers => {
            list_mappers();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Digest { files } => digest(&files).map(|_| ExitCode::SUCCESS),
    }
}

fn run_convert(config: Config, inputs: &[PathBuf]) -> Result<ExitCode> {
    // Validate the fallback before touching any file
    config.fallback_profile()?;

    let catalog = catalog::install_global(Catalog::load_all(&config.catalogs)?)?;

    let files = collect_bin_files(inputs, config.recursive);
    if files.is_empty() {
        eprintln!("Error: no .bin files found");
        return Ok(ExitCode::FAILURE);
    }

    println!("BIN to ECS Converter v{}", VERSION);
    println!();

    let converter = ConvertBin::new(config, catalog);
    let summary = converter.convert_all(&files);

    for report in &summary.converted {
        println!(
            "✓ {} -> {} ({}; {} static, {} paged blocks, {} bytes)",
            report.input.display(),
            report.output.display(),
            report.source,
            report.static_blocks,
            report.paged_blocks,
            report.bytes_written
        );
    }
    for (input, e) in &summary.failed {
        eprintln!("✗ {}: {}", input.display(), e);
    }

    println!();
    println!("{} converted, {} failed", summary.converted.len(), summary.failed.len());

    Ok(if summary.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn inspect(file: &Path) -> Result<()> {
    let ecs = EcsImage::import(file).with_context(|| format!("Failed to read {}", file.display()))?;

    println!("{}: ECS version {}, {} payload bytes", file.display(), ecs.version(), ecs.payload_len());
    for (index, class) in ecs.blocks().iter().enumerate() {
        if *class == BlockClass::Unset {
            continue;
        }
        let start = index as u32 * BLOCK_WORDS;
        println!("  ${:04X}-${:04X}  {}", start, start + BLOCK_WORDS - 1, class);
    }

    let pages: Vec<String> = Page::all()
        .filter(|&p| ecs.blocks().iter().any(|b| b.has_page(p)))
        .map(|p| p.to_string())
        .collect();
    if !pages.is_empty() {
        println!("  pages in use: {}", pages.join(", "));
    }
    Ok(())
}

fn list_mappers() {
    for profile in mapper::profiles() {
        println!("Mapper {}: {}", profile.name, profile.description);
        for segment in profile.segments {
            println!("    {}", segment);
        }
    }
}

fn digest(files: &[PathBuf]) -> Result<()> {
    for file in files {
        let image = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
        println!("{}  {}", catalog::content_digest(&image), file.display());
    }
    Ok(())
}
