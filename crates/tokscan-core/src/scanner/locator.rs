//! Locating the vocabulary region.
//!
//! The vocabulary is assumed to be contiguous, to begin at the earliest
//! special-token string and to be followed by zero padding. This holds for
//! the SentencePiece-based GGUF files the tool targets but is not checked.

use super::find_subsequence;
use std::fmt;
use std::ops::Range;
use tracing::{debug, info};

/// Half-open byte range `[start, end)` believed to hold the vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    /// First byte of the region
    pub start: usize,
    /// One past the last byte of the region
    pub end: usize,
}

impl Region {
    /// Creates a region, swapping the bounds if they are reversed
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Size of the region in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if the region holds no bytes
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if `offset` lies inside the region
    pub fn contains(&self, offset: usize) -> bool {
        (self.start..self.end).contains(&offset)
    }

    /// Returns the region as a slice range
    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// First occurrence of a special token in the buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialTokenMatch {
    /// The token bytes that were searched for
    pub token: Vec<u8>,
    /// Absolute offset of the first occurrence
    pub offset: usize,
}

impl fmt::Display for SpecialTokenMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b'{}' at offset 0x{:x}", self.token.escape_ascii(), self.offset)
    }
}

/// Outcome of region detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionReport {
    /// The detected region
    pub region: Region,
    /// Special tokens found, in the order they were searched for
    pub matches: Vec<SpecialTokenMatch>,
}

impl RegionReport {
    /// Returns true if no special token matched and the scan started at 0
    pub fn is_fallback(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Locates the vocabulary region.
///
/// The region starts at the lowest offset among the first occurrences of
/// `special_tokens` (or at 0 when none occur) and ends where a zero run
/// first grows longer than `null_run_threshold`.
pub fn locate<T: AsRef<[u8]>>(
    data: &[u8],
    special_tokens: &[T],
    null_run_threshold: usize,
) -> RegionReport {
    let matches: Vec<SpecialTokenMatch> = special_tokens
        .iter()
        .filter_map(|token| {
            let token: &[u8] = token.as_ref();
            find_subsequence(data, token).map(|offset| SpecialTokenMatch {
                token: token.to_vec(),
                offset,
            })
        })
        .inspect(|m| debug!("Found special token {}", m))
        .collect();

    let start = matches.iter().map(|m| m.offset).min().unwrap_or_else(|| {
        info!("No special tokens found, scanning from offset 0");
        0
    });
    let end = find_region_end(data, start, null_run_threshold);

    debug!(
        "Vocabulary region 0x{:x}..0x{:x} ({} bytes)",
        start,
        end,
        end - start
    );

    RegionReport {
        region: Region::new(start, end),
        matches,
    }
}

/// Returns the offset of the zero byte that pushes a zero run past
/// `threshold`, or `data.len()` if no run gets that long.
pub fn find_region_end(data: &[u8], start: usize, threshold: usize) -> usize {
    let mut run = 0usize;

    for (position, &byte) in data.iter().enumerate().skip(start) {
        if byte == 0 {
            run += 1;
            if run > threshold {
                return position;
            }
        } else {
            run = 0;
        }
    }

    data.len()
}
