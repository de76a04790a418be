//! Block classification and detail word encoding
//!
//! Every 2K-word block of the address space carries a one-byte type tag and a
//! two-byte detail word in the ECS header tables.
//!
// Copyright (c) 2025 Tommy Olsen
// Licensed under the MIT License.

use std::fmt;

use crate::segment::{Page, RamWidth};

pub const TAG_STATIC: u8 = b'S';
pub const TAG_PAGED: u8 = b'P';
pub const TAG_RAM: u8 = b'R';
pub const TAG_UNSET: u8 = 0;

/// Set of pages present in a paged block, bit N = page N
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageMask(u16);

impl PageMask {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn with(self, page: Page) -> Self {
        Self(self.0 | (1 << page.number()))
    }

    pub fn contains(self, page: Page) -> bool {
        self.0 & (1 << page.number()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn pages(self) -> impl Iterator<Item = Page> {
        Page::all().filter(move |&p| self.contains(p))
    }

    /// Detail bytes as stored in the file: pages 8-15 in the first byte,
    /// pages 0-7 in the second.
    pub fn to_detail_bytes(self) -> [u8; 2] {
        let mut detail = [0u8; 2];
        for page in self.pages() {
            let byte = if page.number() < 8 { 1 } else { 0 };
            detail[byte] |= 1 << (page.number() & 7);
        }
        detail
    }

    pub fn from_detail_bytes(detail: [u8; 2]) -> Self {
        Self(((detail[0] as u16) << 8) | detail[1] as u16)
    }
}

impl fmt::Display for PageMask {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let pages: Vec<String> = self.pages().map(|p| p.to_string()).collect();
        write!(f, "{}", pages.join(","))
    }
}

/// Classification of one block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockClass {
    #[default]
    Unset,
    Static,
    Paged { pages: PageMask },
    Ram { width: RamWidth },
}

impl BlockClass {
    pub fn tag(&self) -> u8 {
        match self {
            BlockClass::Unset => TAG_UNSET,
            BlockClass::Static => TAG_STATIC,
            BlockClass::Paged { .. } => TAG_PAGED,
            BlockClass::Ram { .. } => TAG_RAM,
        }
    }

    pub fn detail_bytes(&self) -> [u8; 2] {
        match self {
            BlockClass::Unset | BlockClass::Static => [0, 0],
            BlockClass::Paged { pages } => pages.to_detail_bytes(),
            BlockClass::Ram { width } => width.bits().to_be_bytes(),
        }
    }

    /// Decode a type tag and detail word read from a container
    pub fn from_raw(tag: u8, detail: [u8; 2]) -> Result<Self, String> {
        match tag {
            TAG_UNSET => Ok(BlockClass::Unset),
            TAG_STATIC => Ok(BlockClass::Static),
            TAG_PAGED => {
                let pages = PageMask::from_detail_bytes(detail);
                if pages.is_empty() {
                    return Err("paged block with no pages".to_string());
                }
                Ok(BlockClass::Paged { pages })
            }
            TAG_RAM => {
                let bits = u16::from_be_bytes(detail);
                RamWidth::from_bits(bits as u32)
                    .map(|width| BlockClass::Ram { width })
                    .ok_or_else(|| format!("RAM width {} (expected 8 or 16)", bits))
            }
            other => Err(format!("unknown block type 0x{:02X}", other)),
        }
    }

    /// Merge another classification into this block.
    /// Returns None when the two cannot share a block.
    pub fn merge(&self, incoming: BlockClass) -> Option<BlockClass> {
        match (*self, incoming) {
            (BlockClass::Unset, next) => Some(next),
            (BlockClass::Static, BlockClass::Static) => Some(BlockClass::Static),
            (BlockClass::Paged { pages: a }, BlockClass::Paged { pages: b }) => {
                Some(BlockClass::Paged { pages: PageMask(a.0 | b.0) })
            }
            (BlockClass::Ram { width: a }, BlockClass::Ram { width: b }) if a == b => Some(*self),
            _ => None,
        }
    }

    pub fn has_page(&self, page: Page) -> bool {
        matches!(self, BlockClass::Paged { pages } if pages.contains(page))
    }
}

impl fmt::Display for BlockClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BlockClass::Unset => write!(f, "unset"),
            BlockClass::Static => write!(f, "static"),
            BlockClass::Paged { pages } => write!(f, "paged [{}]", pages),
            BlockClass::Ram { width } => write!(f, "RAM {}", width),
        }
    }
}
