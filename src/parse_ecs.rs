//! ECS container reader
//!
//! Decodes the header tables of an ECS file and locates the payload of each
//! static and paged block.
//!
// Copyright (c) 2025 Tommy Olsen
// Licensed under the MIT License.

use std::fs;
use std::path::Path;

use crate::block::BlockClass;
use crate::ecs_builder::{DETAIL_TABLE_OFFSET, ECS_MAGIC, PAYLOAD_OFFSET, TYPE_TABLE_OFFSET};
use crate::error::{Error, Result};
use crate::segment::{BLOCK_BYTES, BLOCK_COUNT, PAGE_COUNT, Page};

/// A decoded ECS container
#[derive(Debug, Clone)]
pub struct EcsImage {
    raw: Vec<u8>,
    version: u8,
    blocks: [BlockClass; BLOCK_COUNT],
    static_offsets: [Option<usize>; BLOCK_COUNT],
    paged_offsets: [[Option<usize>; BLOCK_COUNT]; PAGE_COUNT],
}

impl EcsImage {
    pub fn import(file_path: &Path) -> Result<Self> {
        let raw = fs::read(file_path)?;
        Self::parse(raw)
    }

    pub fn parse(raw: Vec<u8>) -> Result<Self> {
        if raw.len() < PAYLOAD_OFFSET {
            return Err(Error::invalid_container(format!(
                "file is {} bytes, header needs {}",
                raw.len(),
                PAYLOAD_OFFSET
            )));
        }
        if &raw[0..7] != ECS_MAGIC {
            return Err(Error::invalid_container("missing ECSINTV identifier"));
        }
        let version = raw[7];
        if !version.is_ascii_digit() {
            return Err(Error::invalid_container(format!("bad version byte 0x{:02X}", version)));
        }

        let mut blocks = [BlockClass::Unset; BLOCK_COUNT];
        for (index, block) in blocks.iter_mut().enumerate() {
            let tag = raw[TYPE_TABLE_OFFSET + index];
            let at = DETAIL_TABLE_OFFSET + index * 2;
            *block = BlockClass::from_raw(tag, [raw[at], raw[at + 1]])
                .map_err(|e| Error::invalid_container(format!("block {}: {}", index, e)))?;
        }

        // Assign payload offsets in file order
        let mut offset = PAYLOAD_OFFSET;
        let mut static_offsets = [None; BLOCK_COUNT];
        for (index, block) in blocks.iter().enumerate() {
            if matches!(block, BlockClass::Static) {
                static_offsets[index] = Some(offset);
                offset += BLOCK_BYTES;
            }
        }
        let mut paged_offsets = [[None; BLOCK_COUNT]; PAGE_COUNT];
        for page in Page::all() {
            for (index, block) in blocks.iter().enumerate() {
                if block.has_page(page) {
                    paged_offsets[page.index()][index] = Some(offset);
                    offset += BLOCK_BYTES;
                }
            }
        }

        if offset != raw.len() {
            return Err(Error::invalid_container(format!(
                "tables describe {} bytes but file has {}",
                offset,
                raw.len()
            )));
        }

        Ok(Self {
            raw,
            version,
            blocks,
            static_offsets,
            paged_offsets,
        })
    }

    /// Version digit as a number
    pub fn version(&self) -> u8 {
        self.version - b'0'
    }

    pub fn blocks(&self) -> &[BlockClass; BLOCK_COUNT] {
        &self.blocks
    }

    pub fn static_block(&self, block: usize) -> Option<&[u8]> {
        let start = (*self.static_offsets.get(block)?)?;
        Some(&self.raw[start..start + BLOCK_BYTES])
    }

    pub fn paged_block(&self, page: Page, block: usize) -> Option<&[u8]> {
        let start = (*self.paged_offsets[page.index()].get(block)?)?;
        Some(&self.raw[start..start + BLOCK_BYTES])
    }

    pub fn payload_len(&self) -> usize {
        self.raw.len() - PAYLOAD_OFFSET
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs_builder::EcsBuilder;
    use crate::segment::{Segment, SegmentSet};
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_empty_container() {
        let data = EcsBuilder::new().generate_ecs_data();
        let ecs = EcsImage::parse(data).unwrap();
        assert_eq!(ecs.version(), 0);
        assert_eq!(ecs.payload_len(), 0);
        assert!(ecs.blocks().iter().all(|b| *b == BlockClass::Unset));
    }

    #[test]
    fn test_locate_blocks() {
        let image: Vec<u8> = [vec![1u8; BLOCK_BYTES], vec![2u8; BLOCK_BYTES]].concat();
        let segments: SegmentSet = [
            Segment::Static { source_offset: 0, word_count: 0x800, load_address: 0x5000 },
            Segment::Paged {
                source_offset: 0x800,
                word_count: 0x800,
                load_address: 0x7000,
                page: Page::new(2).unwrap(),
            },
        ]
        .into_iter()
        .collect();
        let ecs = EcsImage::parse(EcsBuilder::build(&segments, &image).unwrap()).unwrap();

        assert!(ecs.static_block(10).unwrap().iter().all(|&b| b == 1));
        assert!(ecs.static_block(14).is_none());
        assert!(ecs.paged_block(Page::new(2).unwrap(), 14).unwrap().iter().all(|&b| b == 2));
        assert!(ecs.paged_block(Page::new(1).unwrap(), 14).is_none());
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut data = EcsBuilder::new().generate_ecs_data();
        data[0] = b'X';
        assert_matches!(EcsImage::parse(data), Err(Error::InvalidContainer(_)));
    }

    #[test]
    fn test_rejects_truncated_payload() {
        let mut data = EcsBuilder::new().generate_ecs_data();
        data[TYPE_TABLE_OFFSET] = b'S';
        assert_matches!(EcsImage::parse(data), Err(Error::InvalidContainer(_)));
    }

    #[test]
    fn test_rejects_short_file() {
        assert_matches!(EcsImage::parse(b"ECSINTV0".to_vec()), Err(Error::InvalidContainer(_)));
    }
}
