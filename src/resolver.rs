//! Segment resolver
//!
//! Decides which segments describe a BIN image: the explicit .cfg if one was
//! given, otherwise the catalog profile matching the image digest, otherwise a
//! caller-supplied fallback profile.
//!
// Copyright (c) 2025 Tommy Olsen
// Licensed under the MIT License.

use std::fmt;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::catalog::{self, Catalog};
use crate::error::{Error, Result};
use crate::mapper::MapperProfile;
use crate::parse_cfg::ParsedCfg;
use crate::segment::SegmentSet;

/// Where the resolved segments came from
#[derive(Debug, Clone)]
pub enum SegmentSource {
    Explicit { path: Option<PathBuf>, skipped: usize },
    Catalog { title: String, mapper: &'static str },
    Fallback { mapper: &'static str },
}

impl fmt::Display for SegmentSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SegmentSource::Explicit { path: Some(path), .. } => write!(f, "{}", path.display()),
            SegmentSource::Explicit { path: None, .. } => write!(f, "explicit segments"),
            SegmentSource::Catalog { title, mapper } => write!(f, "catalog '{}' (mapper {})", title, mapper),
            SegmentSource::Fallback { mapper } => write!(f, "mapper {}", mapper),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedSegments {
    pub segments: SegmentSet,
    pub source: SegmentSource,
}

pub struct SegmentResolver<'a> {
    catalog: &'a Catalog,
    fallback: Option<&'static MapperProfile>,
}

impl<'a> SegmentResolver<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog, fallback: None }
    }

    /// Profile to use when neither a .cfg nor the catalog identifies the image
    pub fn with_fallback(mut self, profile: Option<&'static MapperProfile>) -> Self {
        self.fallback = profile;
        self
    }

    pub fn resolve(&self, image: &[u8], explicit: Option<ParsedCfg>) -> Result<ResolvedSegments> {
        if let Some(cfg) = explicit {
            if !cfg.segments.is_empty() {
                debug!("Using {} explicit segments", cfg.segments.len());
                let skipped = cfg.skipped();
                return Ok(ResolvedSegments {
                    segments: cfg.segments,
                    source: SegmentSource::Explicit { path: cfg.path, skipped },
                });
            }
            debug!("Explicit configuration has no segments, trying catalog");
        }

        let digest = catalog::content_digest(image);
        if let Some(entry) = self.catalog.lookup(&digest) {
            info!("Identified '{}' (mapper {})", entry.name, entry.profile.name);
            return Ok(ResolvedSegments {
                segments: entry.profile.segment_set(),
                source: SegmentSource::Catalog {
                    title: entry.name.clone(),
                    mapper: entry.profile.name,
                },
            });
        }

        if let Some(profile) = self.fallback {
            info!("No catalog match for {}, using mapper {}", digest, profile.name);
            return Ok(ResolvedSegments {
                segments: profile.segment_set(),
                source: SegmentSource::Fallback { mapper: profile.name },
            });
        }

        Err(Error::UnresolvedMapping { digest })
    }
}
