//! BIN converter main API
//!
//! Converts Intellivision BIN images (with optional .cfg) to ECS files.
//!
// Copyright (c) 2025 Tommy Olsen
// Licensed under the MIT License.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::ecs_builder::EcsBuilder;
use crate::error::{Error, Result};
use crate::parse_cfg::ParseCfg;
use crate::resolver::{SegmentResolver, SegmentSource};

/// Outcome of one successful conversion
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub source: SegmentSource,
    pub static_blocks: usize,
    pub paged_blocks: usize,
    pub bytes_written: usize,
}

/// Outcome of a batch; failures never stop the batch
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub converted: Vec<ConversionReport>,
    pub failed: Vec<(PathBuf, Error)>,
}

impl BatchSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct ConvertBin<'a> {
    config: Config,
    catalog: &'a Catalog,
}

impl<'a> ConvertBin<'a> {
    /// Create a new converter with the given configuration and catalog
    pub fn new(config: Config, catalog: &'a Catalog) -> Self {
        Self { config, catalog }
    }

    /// Companion .cfg for a BIN image
    pub fn cfg_path_for(input: &Path) -> PathBuf {
        input.with_extension("cfg")
    }

    /// Convert one BIN image to its default output path
    pub fn convert_file(&self, input: &Path) -> Result<ConversionReport> {
        let output = self.config.output_path_for(input);
        self.convert(input, &output)
    }

    /// Convert a BIN image to an ECS file
    ///
    /// Nothing is written unless the whole container could be built.
    pub fn convert(&self, input: &Path, output: &Path) -> Result<ConversionReport> {
        if output.exists() && !self.config.overwrite {
            return Err(Error::OutputExists(output.to_path_buf()));
        }

        let image = fs::read(input)?;

        let cfg_path = Self::cfg_path_for(input);
        let explicit = if cfg_path.is_file() {
            info!("Converting {} + {} -> {}", input.display(), cfg_path.display(), output.display());
            Some(ParseCfg::import(&cfg_path)?.parse())
        } else {
            info!("Converting {} -> {}", input.display(), output.display());
            None
        };

        let resolver = SegmentResolver::new(self.catalog).with_fallback(self.config.fallback_profile()?);
        let resolved = resolver.resolve(&image, explicit)?;

        let mut builder = EcsBuilder::new();
        for segment in &resolved.segments {
            builder.add_segment(segment, &image)?;
        }

        if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let bytes_written = builder.make_ecs(output)?;

        Ok(ConversionReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            source: resolved.source,
            static_blocks: builder.static_block_count(),
            paged_blocks: builder.paged_block_count(),
            bytes_written,
        })
    }

    /// Convert each input independently
    pub fn convert_all(&self, inputs: &[PathBuf]) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for input in inputs {
            match self.convert_file(input) {
                Ok(report) => summary.converted.push(report),
                Err(e) => {
                    error!("{}: {}", input.display(), e);
                    summary.failed.push((input.clone(), e));
                }
            }
        }
        summary
    }
}

/// Expand the given paths into a sorted list of BIN files.
///
/// Files are taken as given; directories contribute their `*.bin` files.
/// Arguments containing `*`, `?` or `[` that do not name an existing path are
/// expanded as glob patterns first.
pub fn collect_bin_files<P: AsRef<Path>>(paths: &[P], recursive: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        for path in expand_filespec(path.as_ref()) {
            if path.is_dir() {
                let walker = WalkDir::new(&path).max_depth(if recursive { usize::MAX } else { 1 });
                for entry in walker.into_iter() {
                    match entry {
                        Ok(entry) if entry.file_type().is_file() && is_bin(entry.path()) => {
                            files.push(entry.into_path());
                        }
                        Ok(_) => {}
                        Err(e) => warn!("Skipping unreadable entry: {}", e),
                    }
                }
            } else {
                if !is_bin(&path) {
                    warn!("{} does not have a .bin extension", path.display());
                }
                files.push(path);
            }
        }
    }
    files.sort();
    files.dedup();
    files
}

fn is_glob(path: &Path) -> bool {
    path.to_string_lossy().contains(['*', '?', '['])
}

fn expand_filespec(path: &Path) -> Vec<PathBuf> {
    if path.exists() || !is_glob(path) {
        return vec![path.to_path_buf()];
    }

    let pattern = path.to_string_lossy();
    let matches = match glob::glob(&pattern) {
        Ok(paths) => paths,
        Err(e) => {
            warn!("Invalid file pattern '{}': {}", pattern, e);
            return Vec::new();
        }
    };

    let mut expanded = Vec::new();
    for entry in matches {
        match entry {
            Ok(path) => expanded.push(path),
            Err(e) => warn!("Skipping unreadable entry: {}", e),
        }
    }
    if expanded.is_empty() {
        warn!("No files match '{}'", pattern);
    }
    expanded
}

fn is_bin(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("bin"))
        .unwrap_or(false)
}
