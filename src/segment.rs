//! Memory segment model
//!
//! A segment maps a range of 16-bit words from the BIN image into the 64K-word
//! Intellivision address space. Segments are either static, paged (one of 16
//! bank-switched pages) or RAM (no backing data, only a bit width).
//!
// Copyright (c) 2025 Tommy Olsen
// Licensed under the MIT License.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;

use crate::error::{Error, Result};

/// Words per block (2K words = 4096 bytes)
pub const BLOCK_WORDS: u32 = 0x800;
/// Number of blocks covering the 64K-word address space
pub const BLOCK_COUNT: usize = 32;
/// Number of selectable pages per paged block
pub const PAGE_COUNT: usize = 16;
/// Size of the address space in words
pub const ADDRESS_SPACE_WORDS: u32 = BLOCK_WORDS * BLOCK_COUNT as u32;
pub const BYTES_PER_WORD: usize = 2;
/// Size of one block payload in bytes
pub const BLOCK_BYTES: usize = BLOCK_WORDS as usize * BYTES_PER_WORD;

/// Page number 0-15
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Page(u8);

impl Page {
    pub fn new(number: u32) -> Option<Self> {
        if (number as usize) < PAGE_COUNT {
            Some(Self(number as u8))
        } else {
            None
        }
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// All pages in ascending order
    pub fn all() -> impl Iterator<Item = Page> {
        (0..PAGE_COUNT as u8).map(Page)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Data width of a RAM segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RamWidth {
    Bits8,
    Bits16,
}

impl RamWidth {
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            8 => Some(RamWidth::Bits8),
            16 => Some(RamWidth::Bits16),
            _ => None,
        }
    }

    pub fn bits(self) -> u16 {
        match self {
            RamWidth::Bits8 => 8,
            RamWidth::Bits16 => 16,
        }
    }
}

impl fmt::Display for RamWidth {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// A memory segment descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Always-mapped ROM
    Static {
        source_offset: u32,
        word_count: u32,
        load_address: u32,
    },
    /// Bank-switched ROM occupying one page
    Paged {
        source_offset: u32,
        word_count: u32,
        load_address: u32,
        page: Page,
    },
    /// Writable memory, no payload
    Ram {
        word_count: u32,
        load_address: u32,
        width: RamWidth,
    },
}

impl Segment {
    pub fn load_address(&self) -> u32 {
        match *self {
            Segment::Static { load_address, .. }
            | Segment::Paged { load_address, .. }
            | Segment::Ram { load_address, .. } => load_address,
        }
    }

    pub fn word_count(&self) -> u32 {
        match *self {
            Segment::Static { word_count, .. }
            | Segment::Paged { word_count, .. }
            | Segment::Ram { word_count, .. } => word_count,
        }
    }

    /// Word offset into the source image (None for RAM)
    pub fn source_offset(&self) -> Option<u32> {
        match *self {
            Segment::Static { source_offset, .. } | Segment::Paged { source_offset, .. } => {
                Some(source_offset)
            }
            Segment::Ram { .. } => None,
        }
    }

    pub fn page(&self) -> Option<Page> {
        match *self {
            Segment::Paged { page, .. } => Some(page),
            _ => None,
        }
    }

    pub fn key(&self) -> SegmentKey {
        SegmentKey {
            address: self.load_address(),
            page: self.page(),
        }
    }

    /// Check alignment and bounds of the segment within the address space
    pub fn validate(&self) -> Result<()> {
        let address = self.load_address();
        if address % BLOCK_WORDS != 0 || address >= ADDRESS_SPACE_WORDS {
            return Err(Error::MisalignedAddress { address });
        }
        let words = self.word_count();
        if address as u64 + words as u64 > ADDRESS_SPACE_WORDS as u64 {
            return Err(Error::AddressOverflow { address, words });
        }
        Ok(())
    }

    /// Blocks covered by this segment, including a trailing partial block.
    /// Empty for zero-length segments.
    pub fn block_range(&self) -> Result<RangeInclusive<usize>> {
        self.validate()?;
        let start = (self.load_address() / BLOCK_WORDS) as usize;
        match self.word_count() {
            0 => Ok(RangeInclusive::new(1, 0)),
            words => {
                let end = ((self.load_address() + words - 1) / BLOCK_WORDS) as usize;
                Ok(start..=end)
            }
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let last = |start: u32| (start as u64 + self.word_count() as u64).saturating_sub(1);
        match self {
            Segment::Static { source_offset, .. } => write!(
                f,
                "${:04X}-${:04X} -> ${:04X}",
                source_offset,
                last(*source_offset),
                self.load_address()
            ),
            Segment::Paged { source_offset, page, .. } => write!(
                f,
                "${:04X}-${:04X} -> ${:04X} page {}",
                source_offset,
                last(*source_offset),
                self.load_address(),
                page
            ),
            Segment::Ram { width, .. } => {
                write!(f, "${:04X}-${:04X} RAM {}", self.load_address(), last(self.load_address()), width)
            }
        }
    }
}

/// Ordering key: address first, then "no page" before pages 0..15
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentKey {
    pub address: u32,
    pub page: Option<Page>,
}

/// Ordered segment collection where later entries replace earlier ones with
/// the same key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentSet {
    segments: BTreeMap<SegmentKey, Segment>,
}

impl SegmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a segment, returning the one it replaced (if any)
    pub fn insert(&mut self, segment: Segment) -> Option<Segment> {
        self.segments.insert(segment.key(), segment)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.values()
    }
}

impl FromIterator<Segment> for SegmentSet {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        let mut set = SegmentSet::new();
        for segment in iter {
            set.insert(segment);
        }
        set
    }
}

impl<'a> IntoIterator for &'a SegmentSet {
    type Item = &'a Segment;
    type IntoIter = std::collections::btree_map::Values<'a, SegmentKey, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.values()
    }
}
