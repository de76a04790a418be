//! Built-in mapper profiles
//!
//! The standard jzIntv memory maps used by Intellivision BIN images that ship
//! without a .cfg file. Profiles are static data and never change at runtime.
//!
// Copyright (c) 2025 Tommy Olsen
// Licensed under the MIT License.

use crate::error::{Error, Result};
use crate::segment::{RamWidth, Segment, SegmentSet};

/// A named, fixed segment layout
#[derive(Debug)]
pub struct MapperProfile {
    pub name: &'static str,
    pub description: &'static str,
    pub segments: &'static [Segment],
}

impl MapperProfile {
    pub fn segment_set(&self) -> SegmentSet {
        self.segments.iter().cloned().collect()
    }

    /// Number of image words the profile reads
    pub fn image_words(&self) -> u32 {
        self.segments
            .iter()
            .filter_map(|s| s.source_offset().map(|offset| offset + s.word_count()))
            .max()
            .unwrap_or(0)
    }
}

const fn rom(source_offset: u32, word_count: u32, load_address: u32) -> Segment {
    Segment::Static {
        source_offset,
        word_count,
        load_address,
    }
}

const fn ram8(load_address: u32, word_count: u32) -> Segment {
    Segment::Ram {
        word_count,
        load_address,
        width: RamWidth::Bits8,
    }
}

static PROFILES: &[MapperProfile] = &[
    MapperProfile {
        name: "0",
        description: "Standard 16K: $5000, $D000, $F000",
        segments: &[rom(0x0000, 0x2000, 0x5000), rom(0x2000, 0x1000, 0xD000), rom(0x3000, 0x1000, 0xF000)],
    },
    MapperProfile {
        name: "1",
        description: "20K: $5000, $D000-$FFFF",
        segments: &[rom(0x0000, 0x2000, 0x5000), rom(0x2000, 0x3000, 0xD000)],
    },
    MapperProfile {
        name: "2",
        description: "24K: $5000, $9000-$BFFF, $D000",
        segments: &[rom(0x0000, 0x2000, 0x5000), rom(0x2000, 0x3000, 0x9000), rom(0x5000, 0x1000, 0xD000)],
    },
    MapperProfile {
        name: "3",
        description: "20K: $5000, $9000, $D000, $F000",
        segments: &[
            rom(0x0000, 0x2000, 0x5000),
            rom(0x2000, 0x1000, 0x9000),
            rom(0x3000, 0x1000, 0xD000),
            rom(0x4000, 0x1000, 0xF000),
        ],
    },
    MapperProfile {
        name: "4",
        description: "8K at $5000 with 8-bit RAM at $D000",
        segments: &[rom(0x0000, 0x2000, 0x5000), ram8(0xD000, 0x400)],
    },
    MapperProfile {
        name: "5",
        description: "24K: $5000-$7FFF, $9000-$BFFF",
        segments: &[rom(0x0000, 0x3000, 0x5000), rom(0x3000, 0x3000, 0x9000)],
    },
    MapperProfile {
        name: "6",
        description: "8K at $6000",
        segments: &[rom(0x0000, 0x2000, 0x6000)],
    },
    MapperProfile {
        name: "7",
        description: "8K at $4800",
        segments: &[rom(0x0000, 0x2000, 0x4800)],
    },
    MapperProfile {
        name: "8",
        description: "8K split: $5000, $7000",
        segments: &[rom(0x0000, 0x1000, 0x5000), rom(0x1000, 0x1000, 0x7000)],
    },
    MapperProfile {
        name: "9",
        description: "24K: $5000, $9000, $D000, $F000 with 8-bit RAM at $8800",
        segments: &[
            rom(0x0000, 0x2000, 0x5000),
            rom(0x2000, 0x2000, 0x9000),
            rom(0x4000, 0x1000, 0xD000),
            rom(0x5000, 0x1000, 0xF000),
            ram8(0x8800, 0x800),
        ],
    },
];

/// All built-in profiles
pub fn profiles() -> &'static [MapperProfile] {
    PROFILES
}

/// Look up a built-in profile by name
pub fn find_profile(name: &str) -> Result<&'static MapperProfile> {
    let name = name.trim();
    PROFILES
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| Error::UnknownProfile(name.to_string()))
}
