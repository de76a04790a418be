//! jzIntv-style .cfg parser
//!
//! Reads the `[mapping]` and `[memattr]` sections of a BIN companion .cfg file
//! and turns them into a segment set. Other sections (`[vars]`, `[keys]`,
//! `[macro]`, ...) are ignored.
//!
//! ```text
//! [mapping]
//! $0000 - $1FFF = $5000
//! $2000 - $2FFF = $9000 PAGE 3
//!
//! [memattr]
//! $D000 - $D3FF = RAM 8
//! ```
//!
//! Malformed lines are skipped and reported, never fatal.
//!
// Copyright (c) 2025 Tommy Olsen
// Licensed under the MIT License.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::segment::{ADDRESS_SPACE_WORDS, Page, RamWidth, Segment, SegmentSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Mapping,
    MemAttr,
    Other,
}

/// Result of parsing a .cfg file
#[derive(Debug, Default)]
pub struct ParsedCfg {
    pub path: Option<PathBuf>,
    pub segments: SegmentSet,
    /// Skipped lines, each an `Error::MalformedDescriptor`
    pub malformed: Vec<Error>,
}

impl ParsedCfg {
    pub fn skipped(&self) -> usize {
        self.malformed.len()
    }
}

pub struct ParseCfg {
    text: String,
    file_path: Option<PathBuf>,
}

impl ParseCfg {
    pub fn import(file_path: &Path) -> Result<Self> {
        let text = fs::read_to_string(file_path)?;
        Ok(Self {
            text,
            file_path: Some(file_path.to_path_buf()),
        })
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            file_path: None,
        }
    }

    pub fn parse(&self) -> ParsedCfg {
        let mut section = Section::Other;
        let mut parsed = ParsedCfg {
            path: self.file_path.clone(),
            ..ParsedCfg::default()
        };

        for (index, raw) in self.text.lines().enumerate() {
            let line = strip_comment(raw).trim().to_lowercase();
            if line.is_empty() {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                section = match line[1..line.len() - 1].trim() {
                    "mapping" => Section::Mapping,
                    "memattr" => Section::MemAttr,
                    _ => Section::Other,
                };
                continue;
            }

            let tokens: Vec<&str> = line.split_whitespace().collect();
            let result = match section {
                Section::Mapping => parse_mapping(&tokens),
                Section::MemAttr => parse_memattr(&tokens),
                Section::Other => continue,
            };

            match result {
                Ok(segment) => {
                    debug!(line = index + 1, %segment, "cfg segment");
                    if let Some(old) = parsed.segments.insert(segment) {
                        debug!(line = index + 1, replaced = %old, "cfg entry replaces earlier entry");
                    }
                }
                Err(reason) => {
                    let err = Error::MalformedDescriptor {
                        line: index + 1,
                        text: raw.trim().to_string(),
                        reason,
                    };
                    warn!("{}", err);
                    parsed.malformed.push(err);
                }
            }
        }

        parsed
    }
}

/// Parse `START - END = LOC [PAGE N]`
fn parse_mapping(tokens: &[&str]) -> std::result::Result<Segment, String> {
    if tokens.len() < 5 || tokens[1] != "-" || tokens[3] != "=" {
        return Err("expected 'START - END = LOC [PAGE N]'".to_string());
    }
    let start = parse_hex(tokens[0])?;
    let end = parse_hex(tokens[2])?;
    let load_address = parse_hex(tokens[4])?;
    let word_count = range_len(start, end)?;

    match tokens.get(5) {
        Some(&"page") => {
            let number = tokens
                .get(6)
                .ok_or_else(|| "PAGE without a page number".to_string())
                .and_then(|t| parse_hex(t))?;
            let page = Page::new(number).ok_or_else(|| format!("page {} out of range 0-15", number))?;
            Ok(Segment::Paged {
                source_offset: start,
                word_count,
                load_address,
                page,
            })
        }
        _ => Ok(Segment::Static {
            source_offset: start,
            word_count,
            load_address,
        }),
    }
}

/// Parse `START - END = RAM WIDTH`
fn parse_memattr(tokens: &[&str]) -> std::result::Result<Segment, String> {
    if tokens.len() < 6 || tokens[1] != "-" || tokens[3] != "=" || tokens[4] != "ram" {
        return Err("expected 'START - END = RAM WIDTH'".to_string());
    }
    let load_address = parse_hex(tokens[0])?;
    let end = parse_hex(tokens[2])?;
    let word_count = range_len(load_address, end)?;
    let bits: u32 = tokens[5]
        .parse()
        .map_err(|_| format!("invalid RAM width '{}'", tokens[5]))?;
    let width = RamWidth::from_bits(bits).ok_or_else(|| format!("RAM width {} must be 8 or 16", bits))?;

    Ok(Segment::Ram {
        word_count,
        load_address,
        width,
    })
}

/// Parse a hex number with optional `$` or `0x` prefix
pub fn parse_hex(token: &str) -> std::result::Result<u32, String> {
    let cleaned = token
        .strip_prefix('$')
        .or_else(|| token.strip_prefix("0x"))
        .unwrap_or(token);
    if cleaned.is_empty() {
        return Err(format!("invalid hex number '{}'", token));
    }
    u32::from_str_radix(cleaned, 16).map_err(|_| format!("invalid hex number '{}'", token))
}

fn range_len(start: u32, end: u32) -> std::result::Result<u32, String> {
    let words = end
        .checked_sub(start)
        .ok_or_else(|| format!("range end ${:04X} is before start ${:04X}", end, start))?
        .checked_add(1)
        .filter(|&words| words <= ADDRESS_SPACE_WORDS)
        .ok_or_else(|| format!("range ${:04X}-${:04X} is larger than the address space", start, end))?;
    Ok(words)
}

fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_mapping_and_memattr() {
        let cfg = "\
[mapping]
$0000 - $1FFF = $5000
$2000 - $2FFF = $9000 PAGE 3

[memattr]
$D000 - $D3FF = RAM 8
";
        let parsed = ParseCfg::from_text(cfg).parse();
        assert_eq!(parsed.skipped(), 0);

        let segments: Vec<_> = parsed.segments.iter().cloned().collect();
        assert_eq!(
            segments,
            vec![
                Segment::Static { source_offset: 0, word_count: 0x2000, load_address: 0x5000 },
                Segment::Paged {
                    source_offset: 0x2000,
                    word_count: 0x1000,
                    load_address: 0x9000,
                    page: Page::new(3).unwrap(),
                },
                Segment::Ram { word_count: 0x400, load_address: 0xD000, width: RamWidth::Bits8 },
            ]
        );
    }

    #[test]
    fn test_numbers_without_dollar_are_hex() {
        let parsed = ParseCfg::from_text("[MAPPING]\n0 - 7ff = 6000\n").parse();
        let seg = parsed.segments.iter().next().unwrap();
        assert_eq!(seg.load_address(), 0x6000);
        assert_eq!(seg.word_count(), 0x800);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let cfg = "\
[mapping]
$0000 $1FFF $5000
$2000 - $1000 = $9000
$3000 - $3FFF = $A000 PAGE 10
$3000 - $3FFF = $A000 PAGE
$4000 - $4FFF = $D000
[memattr]
$8000 - $83FF = RAM 12
$8000 - $83FF = ROM 8
";
        let parsed = ParseCfg::from_text(cfg).parse();
        assert_eq!(parsed.segments.len(), 1);
        assert_eq!(parsed.skipped(), 6);
        assert_matches!(&parsed.malformed[0], Error::MalformedDescriptor { line: 2, .. });
        assert!(parsed.malformed.iter().all(Error::is_recoverable));
    }

    #[test]
    fn test_memattr_replaces_mapping_at_same_address() {
        let cfg = "\
[mapping]
$2000 - $2FFF = $D000
[memattr]
$D000 - $D3FF = RAM 16
";
        let parsed = ParseCfg::from_text(cfg).parse();
        assert_eq!(parsed.segments.len(), 1);
        assert_matches!(
            parsed.segments.iter().next(),
            Some(Segment::Ram { width: RamWidth::Bits16, .. })
        );
    }

    #[test]
    fn test_comments_and_other_sections_ignored() {
        let cfg = "\
; header comment
[vars]
name = \"Test\"
[mapping]
$0000 - $0FFF = $5000 ; main rom
[macro]
[0000] run
";
        let parsed = ParseCfg::from_text(cfg).parse();
        assert_eq!(parsed.segments.len(), 1);
        assert_eq!(parsed.skipped(), 0);
    }

    #[test]
    fn test_parse_hex_prefixes() {
        assert_eq!(parse_hex("$D000"), Ok(0xD000));
        assert_eq!(parse_hex("0xd000"), Ok(0xD000));
        assert_eq!(parse_hex("d000"), Ok(0xD000));
        assert!(parse_hex("$").is_err());
        assert!(parse_hex("zz").is_err());
        assert!(parse_hex("$$5000").is_err());
        assert!(parse_hex("0x0x5000").is_err());
        assert!(parse_hex("$0x5000").is_err());
    }

    #[test]
    fn test_oversized_ranges_are_skipped() {
        let cfg = "\
[mapping]
$0 - $FFFFFFFF = $5000
$0 - $10000 = $0000
$0 - $FFFF = $0000
[memattr]
$0 - $FFFFFFFF = RAM 8
";
        let parsed = ParseCfg::from_text(cfg).parse();
        assert_eq!(parsed.skipped(), 3);
        assert_matches!(&parsed.malformed[0], Error::MalformedDescriptor { line: 2, .. });
        assert_matches!(&parsed.malformed[1], Error::MalformedDescriptor { line: 3, .. });
        assert_eq!(parsed.segments.len(), 1);
        assert_eq!(parsed.segments.iter().next().unwrap().word_count(), 0x10000);
    }
}
