//! ECS container builder
//!
//! Lays segments out over the 32 blocks of the Intellivision address space and
//! serializes the result as an ECS file:
//!
//! ```text
//! [00..06] "ECSINTV"
//! [07]     ASCII version digit
//! [08..0F] reserved
//! [10..2F] block type per block ('S', 'P', 'R' or 0)
//! [30..6F] block detail word per block, big-endian
//! [70..  ] static blocks by address, then paged blocks for page 0..15
//! ```
//!
// Copyright (c) 2025 Tommy Olsen
// Licensed under the MIT License.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::block::{BlockClass, PageMask};
use crate::error::{Error, Result};
use crate::segment::{
    ADDRESS_SPACE_WORDS, BLOCK_BYTES, BLOCK_COUNT, BYTES_PER_WORD, PAGE_COUNT, Page, Segment,
    SegmentSet,
};

pub const ECS_MAGIC: &[u8; 7] = b"ECSINTV";
pub const ECS_VERSION: u8 = b'0';
pub const HEADER_SIZE: usize = 16;
pub const TYPE_TABLE_OFFSET: usize = 0x10;
pub const DETAIL_TABLE_OFFSET: usize = 0x30;
pub const PAYLOAD_OFFSET: usize = 0x70;

const BUFFER_BYTES: usize = ADDRESS_SPACE_WORDS as usize * BYTES_PER_WORD;
static ZERO_BLOCK: [u8; BLOCK_BYTES] = [0u8; BLOCK_BYTES];

/// Scratch image of the whole address space for one page (or static content)
type PageBuffer = Box<[u8]>;

fn new_buffer() -> PageBuffer {
    vec![0u8; BUFFER_BYTES].into_boxed_slice()
}

fn block_slice(buffer: Option<&PageBuffer>, block: usize) -> &[u8] {
    match buffer {
        Some(buf) => &buf[block * BLOCK_BYTES..(block + 1) * BLOCK_BYTES],
        None => &ZERO_BLOCK,
    }
}

/// Builder for ECS container files
pub struct EcsBuilder {
    blocks: [BlockClass; BLOCK_COUNT],
    static_buffer: Option<PageBuffer>,
    page_buffers: [Option<PageBuffer>; PAGE_COUNT],
}

impl Default for EcsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EcsBuilder {
    pub fn new() -> Self {
        Self {
            blocks: [BlockClass::Unset; BLOCK_COUNT],
            static_buffer: None,
            page_buffers: Default::default(),
        }
    }

    /// Lay out every segment in key order and return the container bytes
    pub fn build(segments: &SegmentSet, image: &[u8]) -> Result<Vec<u8>> {
        let mut builder = Self::new();
        for segment in segments {
            builder.add_segment(segment, image)?;
        }
        Ok(builder.generate_ecs_data())
    }

    /// Add one segment. On error the builder is left unchanged.
    pub fn add_segment(&mut self, segment: &Segment, image: &[u8]) -> Result<()> {
        let range = segment.block_range()?;
        let requested = match segment {
            Segment::Static { .. } => BlockClass::Static,
            Segment::Paged { page, .. } => BlockClass::Paged {
                pages: PageMask::empty().with(*page),
            },
            Segment::Ram { width, .. } => BlockClass::Ram { width: *width },
        };

        // Check every block before touching anything
        let mut merged = Vec::with_capacity(range.clone().count());
        for block in range.clone() {
            let existing = self.blocks[block];
            let next = existing
                .merge(requested)
                .ok_or(Error::ConflictingBlockClassification { block, existing, requested })?;
            merged.push((block, next));
        }

        debug!(%segment, blocks = ?range, "layout segment");

        match *segment {
            Segment::Static { source_offset, word_count, load_address } => {
                let buffer = self.static_buffer.get_or_insert_with(new_buffer);
                copy_words(buffer, image, source_offset, word_count, load_address);
            }
            Segment::Paged { source_offset, word_count, load_address, page } => {
                let buffer = self.page_buffers[page.index()].get_or_insert_with(new_buffer);
                copy_words(buffer, image, source_offset, word_count, load_address);
            }
            Segment::Ram { .. } => {}
        }

        for (block, class) in merged {
            self.blocks[block] = class;
        }
        Ok(())
    }

    pub fn blocks(&self) -> &[BlockClass; BLOCK_COUNT] {
        &self.blocks
    }

    pub fn static_block_count(&self) -> usize {
        self.blocks.iter().filter(|b| matches!(b, BlockClass::Static)).count()
    }

    /// Number of paged block payloads, summed over all pages
    pub fn paged_block_count(&self) -> usize {
        Page::all()
            .map(|page| self.blocks.iter().filter(|b| b.has_page(page)).count())
            .sum()
    }

    /// Size of the container this builder will produce
    pub fn container_size(&self) -> usize {
        PAYLOAD_OFFSET + BLOCK_BYTES * (self.static_block_count() + self.paged_block_count())
    }

    /// Generate the complete ECS file data
    pub fn generate_ecs_data(&self) -> Vec<u8> {
        let mut output = Vec::with_capacity(self.container_size());

        output.extend_from_slice(&self.create_file_header());

        for class in &self.blocks {
            output.push(class.tag());
        }
        for class in &self.blocks {
            output.extend_from_slice(&class.detail_bytes());
        }

        for (index, class) in self.blocks.iter().enumerate() {
            if matches!(class, BlockClass::Static) {
                output.extend_from_slice(block_slice(self.static_buffer.as_ref(), index));
            }
        }

        for page in Page::all() {
            let buffer = self.page_buffers[page.index()].as_ref();
            for (index, class) in self.blocks.iter().enumerate() {
                if class.has_page(page) {
                    output.extend_from_slice(block_slice(buffer, index));
                }
            }
        }

        output
    }

    /// Write the ECS file to disk. The data goes to a temporary file next to
    /// the destination which is renamed into place once complete.
    pub fn make_ecs(&self, output_file: &Path) -> Result<usize> {
        let data = self.generate_ecs_data();
        let dir = match output_file.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(&data)?;
        temp.as_file().sync_all()?;
        temp.persist(output_file).map_err(|e| Error::Io(e.error))?;
        Ok(data.len())
    }

    /// Create the 16-byte file header
    fn create_file_header(&self) -> [u8; HEADER_SIZE] {
        let mut header = [0u8; HEADER_SIZE];
        header[0..7].copy_from_slice(ECS_MAGIC);
        header[7] = ECS_VERSION;
        header
    }
}

/// Copy big-endian words from the image into a page buffer. Missing image data
/// is zero-filled.
fn copy_words(buffer: &mut [u8], image: &[u8], source_offset: u32, word_count: u32, load_address: u32) {
    let len = word_count as usize * BYTES_PER_WORD;
    let dest_start = load_address as usize * BYTES_PER_WORD;
    let dest = &mut buffer[dest_start..dest_start + len];

    let src_start = (source_offset as usize * BYTES_PER_WORD).min(image.len());
    let src_end = (src_start + len).min(image.len());
    let available = src_end - src_start;

    dest[..available].copy_from_slice(&image[src_start..src_end]);
    if available < len {
        warn!(
            "Image ends before ${:04X}-${:04X}: {} of {} words zero-filled",
            source_offset,
            source_offset as u64 + word_count as u64 - 1,
            (len - available) / BYTES_PER_WORD,
            word_count
        );
        dest[available..].fill(0);
    }
}
