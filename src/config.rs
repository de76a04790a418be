//! Global configuration for the BIN to ECS converter
//!
//! Settings come from an optional `bin2ecs.toml`:
//!
//! ```toml
//! catalogs = ["titles.toml"]
//! fallback_mapper = "0"
//! overwrite = false
//! output_dir = "out"
//! recursive = false
//! ```
//!
// Copyright (c) 2025 Tommy Olsen
// Licensed under the MIT License.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::mapper::{self, MapperProfile};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default config file name
pub const CONFIG_FILE_NAME: &str = "bin2ecs.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extra title catalogs, merged in order
    pub catalogs: Vec<PathBuf>,
    /// Mapper profile for images that are neither described nor catalogued
    pub fallback_mapper: Option<String>,
    /// Replace existing .ecs files
    pub overwrite: bool,
    /// Write output here instead of next to the input
    pub output_dir: Option<PathBuf>,
    /// Descend into subdirectories when given a directory
    pub recursive: bool,
}

impl Config {
    /// Load configuration from a TOML file. Relative catalog paths are
    /// resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read {}: {}", path.display(), e)))?;
        let mut config: Config = toml::from_str(&text)?;

        if let Some(base) = path.parent() {
            for catalog in config.catalogs.iter_mut() {
                if catalog.is_relative() {
                    *catalog = base.join(&*catalog);
                }
            }
        }

        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from the given path, or from default locations, or return defaults
    ///
    /// - `./bin2ecs.toml`
    /// - `bin2ecs.toml` next to the executable
    pub fn load_or_default(custom_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = custom_path {
            return Self::load(path);
        }

        let mut candidates = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Ok(dir) = Self::get_exe_dir() {
            candidates.push(dir.join(CONFIG_FILE_NAME));
        }

        for path in candidates {
            if path.is_file() {
                return Self::load(&path);
            }
        }

        Ok(Self::default())
    }

    fn validate(&self) -> Result<()> {
        self.fallback_profile().map(|_| ())
    }

    /// Resolve the configured fallback mapper
    pub fn fallback_profile(&self) -> Result<Option<&'static MapperProfile>> {
        self.fallback_mapper
            .as_deref()
            .map(mapper::find_profile)
            .transpose()
    }

    /// Output path for an input image: same stem, `.ecs` extension
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        let ecs = input.with_extension("ecs");
        match (&self.output_dir, ecs.file_name()) {
            (Some(dir), Some(name)) => dir.join(name),
            _ => ecs,
        }
    }

    /// Get the directory containing the executable
    fn get_exe_dir() -> Result<PathBuf> {
        let exe_path = std::env::current_exe()?;
        exe_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::config("Failed to get executable directory"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_output_path_next_to_input() {
        let config = Config::default();
        assert_eq!(config.output_path_for(Path::new("roms/game.bin")), PathBuf::from("roms/game.ecs"));
    }

    #[test]
    fn test_output_path_in_output_dir() {
        let config = Config {
            output_dir: Some(PathBuf::from("out")),
            ..Config::default()
        };
        assert_eq!(config.output_path_for(Path::new("roms/game.BIN")), PathBuf::from("out/game.ecs"));
    }

    #[test]
    fn test_load_resolves_catalog_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "catalogs = [\"titles.toml\"]\nfallback_mapper = \"3\"\noverwrite = true\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.catalogs, vec![dir.path().join("titles.toml")]);
        assert!(config.overwrite);
        assert_eq!(config.fallback_profile().unwrap().unwrap().name, "3");
    }

    #[test]
    fn test_load_rejects_unknown_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "fallback_mapper = \"banana\"\n").unwrap();
        assert_matches!(Config::load(&path), Err(Error::UnknownProfile(_)));
    }

    #[test]
    fn test_load_rejects_unknown_key_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "overwrite = \"yes\"\n").unwrap();
        assert_matches!(Config::load(&path), Err(Error::Toml(_)));
    }
}
