//! Title catalog: content digest to mapper profile
//!
//! BIN images without a .cfg file are identified by the SHA-256 digest of the
//! whole image. The catalog maps known digests to one of the built-in mapper
//! profiles. Catalog files are TOML:
//!
//! ```toml
//! [[title]]
//! name = "Some Cartridge"
//! digest = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
//! mapper = "0"
//! ```
//!
//! The process-wide catalog is installed once at startup and read-only after.
//!
// Copyright (c) 2025 Tommy Olsen
// Licensed under the MIT License.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::mapper::{self, MapperProfile};

static GLOBAL: OnceLock<Catalog> = OnceLock::new();

/// One known title
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub name: String,
    pub digest: String,
    pub profile: &'static MapperProfile,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    title: Vec<TitleRecord>,
}

#[derive(Debug, Deserialize)]
struct TitleRecord {
    name: String,
    digest: String,
    mapper: String,
}

#[derive(Debug, Default, Clone)]
pub struct Catalog {
    entries: HashMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(text)?;
        let mut catalog = Catalog::new();
        for record in file.title {
            let digest = normalize_digest(&record.digest)
                .ok_or_else(|| Error::config(format!("title '{}' has an invalid digest '{}'", record.name, record.digest)))?;
            let profile = mapper::find_profile(&record.mapper)?;
            catalog.insert(CatalogEntry {
                name: record.name,
                digest,
                profile,
            });
        }
        Ok(catalog)
    }

    /// Load a catalog file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let catalog = Self::from_toml_str(&text)
            .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded {} catalog titles from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Load and merge several catalog files; later files win
    pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut catalog = Catalog::new();
        for path in paths {
            catalog.merge(Self::load(path.as_ref())?);
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, entry: CatalogEntry) -> Option<CatalogEntry> {
        self.entries.insert(entry.digest.clone(), entry)
    }

    pub fn merge(&mut self, other: Catalog) {
        for (_, entry) in other.entries {
            if let Some(old) = self.insert(entry) {
                debug!("Catalog entry '{}' overridden", old.name);
            }
        }
    }

    pub fn lookup(&self, digest: &str) -> Option<&CatalogEntry> {
        self.entries.get(&digest.to_ascii_lowercase())
    }

    /// Digest the image and look it up
    pub fn identify(&self, image: &[u8]) -> (String, Option<&CatalogEntry>) {
        let digest = content_digest(image);
        let entry = self.lookup(&digest);
        (digest, entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Install the process-wide catalog. Fails if one is already installed.
pub fn install_global(catalog: Catalog) -> Result<&'static Catalog> {
    GLOBAL
        .set(catalog)
        .map_err(|_| Error::config("catalog already installed"))?;
    Ok(global())
}

/// The process-wide catalog (empty if none was installed)
pub fn global() -> &'static Catalog {
    GLOBAL.get_or_init(Catalog::new)
}

/// SHA-256 digest of the whole image as lowercase hex
pub fn content_digest(image: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(image);
    hex::encode(hasher.finalize())
}

fn normalize_digest(digest: &str) -> Option<String> {
    let digest = digest.trim().to_ascii_lowercase();
    if digest.len() == 64 && digest.bytes().all(|b| b.is_ascii_hexdigit()) {
        Some(digest)
    } else {
        None
    }
}
