//! Splitting the vocabulary region into token records.

use super::find_subsequence;
use super::locator::Region;
use std::fmt;
use std::iter::FusedIterator;
use tracing::trace;

/// UTF-8 encoding of U+2581 (`▁`), the SentencePiece word-boundary symbol
pub const BOUNDARY_MARKER: [u8; 3] = [0xE2, 0x96, 0x81];

/// Text shown for tokens whose bytes are not valid UTF-8
pub const DECODE_ERROR: &str = "[decode error]";

const DEFAULT_LOOKAHEAD: usize = 100;

fn is_printable(byte: u8) -> bool {
    (32..=126).contains(&byte)
}

/// A span of the region that starts with a boundary marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenRecord<'a> {
    /// Absolute offset of the boundary marker
    pub offset: usize,
    /// Raw bytes, marker included
    pub bytes: &'a [u8],
}

impl<'a> TokenRecord<'a> {
    /// Length of the captured span in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the record holds no bytes
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Absolute offset one past the last byte
    pub fn end(&self) -> usize {
        self.offset + self.bytes.len()
    }

    /// Bytes following the boundary marker
    pub fn content(&self) -> &'a [u8] {
        &self.bytes[BOUNDARY_MARKER.len()..]
    }

    /// Decodes the span as UTF-8
    pub fn text(&self) -> TokenText<'a> {
        match std::str::from_utf8(self.bytes) {
            Ok(text) => TokenText::Text(text),
            Err(_) => TokenText::Undecodable,
        }
    }
}

/// Decoded form of a token record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenText<'a> {
    /// The span is valid UTF-8
    Text(&'a str),
    /// The span is not valid UTF-8
    Undecodable,
}

impl<'a> TokenText<'a> {
    /// Returns the text if it decoded
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Self::Text(text) => Some(*text),
            Self::Undecodable => None,
        }
    }
}

impl fmt::Display for TokenText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or(DECODE_ERROR))
    }
}

/// Lazy, forward-only iterator over the token records of a region
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    data: &'a [u8],
    end: usize,
    cursor: usize,
    lookahead: usize,
}

/// Segments `region` of `data` into token records.
///
/// The region is clamped to the buffer.
pub fn segment(data: &[u8], region: Region) -> Tokens<'_> {
    let end = region.end.min(data.len());
    Tokens {
        data,
        end,
        cursor: region.start.min(end),
        lookahead: DEFAULT_LOOKAHEAD,
    }
}

impl<'a> Tokens<'a> {
    /// Sets how many bytes past a marker are examined for token content
    pub fn lookahead_limit(mut self, limit: usize) -> Self {
        self.lookahead = limit;
        self
    }

    /// Absolute offset where the next search begins
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Grows a span from the marker at `marker`.
    ///
    /// Returns the end of the content and whether a printable byte was seen.
    fn extend_span(&self, marker: usize) -> (usize, bool) {
        let content_start = marker + BOUNDARY_MARKER.len();
        let limit = self.end.min(content_start.saturating_add(self.lookahead));
        let mut content_end = content_start;
        let mut printable = false;

        while content_end < limit {
            let byte = self.data[content_end];
            if byte == 0 || self.data[content_end..].starts_with(&BOUNDARY_MARKER) {
                break;
            }
            printable |= is_printable(byte);
            content_end += 1;
        }

        (content_end, printable)
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = TokenRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor + BOUNDARY_MARKER.len() < self.end {
            let Some(relative) = find_subsequence(&self.data[self.cursor..self.end], &BOUNDARY_MARKER)
            else {
                break;
            };
            let marker = self.cursor + relative;
            let (content_end, printable) = self.extend_span(marker);

            if printable && content_end - marker > BOUNDARY_MARKER.len() {
                self.cursor = content_end;
                trace!(
                    "Accepted token at 0x{:x} ({} bytes)",
                    marker,
                    content_end - marker
                );
                return Some(TokenRecord {
                    offset: marker,
                    bytes: &self.data[marker..content_end],
                });
            }

            trace!("Rejected marker at 0x{:x}", marker);
            self.cursor = marker + 1;
        }

        self.cursor = self.end;
        None
    }
}

impl FusedIterator for Tokens<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const M: [u8; 3] = BOUNDARY_MARKER;

    fn whole(data: &[u8]) -> Region {
        Region::new(0, data.len())
    }

    fn build(parts: &[&[u8]]) -> Vec<u8> {
        parts.concat()
    }

    #[test]
    fn test_marker_is_word_boundary_symbol() {
        assert_eq!(&BOUNDARY_MARKER, "\u{2581}".as_bytes());
    }

    #[test]
    fn test_single_token_terminated_by_null() {
        let data = build(&[&M, b"hello", b"\x00", b"tail"]);
        let records: Vec<_> = segment(&data, whole(&data)).collect();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].offset, 0);
        assert_eq!(records[0].len(), 8);
        assert_eq!(records[0].content(), b"hello");
        assert_eq!(records[0].text(), TokenText::Text("\u{2581}hello"));
    }

    #[test]
    fn test_adjacent_markers() {
        let data = build(&[&M, &M, b"ab", b"\x00"]);
        let mut tokens = segment(&data, whole(&data));

        // The first marker has no content and is skipped
        let record = tokens.next().unwrap();
        assert_eq!(record.offset, 3);
        assert_eq!(record.bytes, build(&[&M, b"ab"]).as_slice());
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_rejected_marker_resumes_one_byte_later() {
        let data = build(&[&M, &M, b"\x00\x00\x00\x00"]);
        let mut tokens = segment(&data, whole(&data));
        assert_eq!(tokens.next(), None);
        assert_eq!(tokens.cursor(), data.len());
    }

    #[test]
    fn test_non_printable_content_is_rejected() {
        let data = build(&[&M, b"\x01\x02\x03", b"\x00", &M, b"ok", b"\x00"]);
        let records: Vec<_> = segment(&data, whole(&data)).collect();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].offset, 7);
    }

    #[test]
    fn test_k_tokens_in_order() {
        let words: [&[u8]; 4] = [b"the", b"quick", b"brown", b"fox"];
        let mut data = b"\xff\xff".to_vec();
        for word in words {
            data.extend_from_slice(&[0x00, 0x00, 0x00, 0x07]);
            data.extend_from_slice(&M);
            data.extend_from_slice(word);
        }
        data.push(0);

        let region = whole(&data);
        let first: Vec<_> = segment(&data, region).collect();
        let second: Vec<_> = segment(&data, region).collect();

        assert_eq!(first.len(), words.len());
        assert_eq!(first, second);
        assert!(first.windows(2).all(|w| w[0].offset < w[1].offset));
        for (record, word) in first.iter().zip(words) {
            assert_eq!(record.content(), word);
            assert!(record.offset >= region.start);
            assert!(record.end() <= region.end);
        }
    }

    #[test]
    fn test_lookahead_limit_caps_span() {
        let mut data = M.to_vec();
        data.extend(std::iter::repeat(b'a').take(150));

        let records: Vec<_> = segment(&data, whole(&data)).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].len(), 103);

        let short: Vec<_> = segment(&data, whole(&data)).lookahead_limit(4).collect();
        assert_eq!(short[0].len(), 7);
    }

    #[test]
    fn test_span_stops_at_region_end() {
        let data = build(&[&M, b"abcdef"]);
        let records: Vec<_> = segment(&data, Region::new(0, 6)).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content(), b"abc");
    }

    #[test]
    fn test_marker_in_last_three_bytes_never_matches() {
        let data = build(&[b"xyz", &M]);
        assert_eq!(segment(&data, whole(&data)).count(), 0);
    }

    #[test]
    fn test_region_outside_buffer_is_clamped() {
        let data = build(&[&M, b"word"]);
        let records: Vec<_> = segment(&data, Region::new(0, 1_000)).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(segment(&data, Region::new(500, 1_000)).count(), 0);
    }

    #[test]
    fn test_undecodable_token_is_kept() {
        let data = build(&[&M, b"ab\xff\xfe", b"\x00"]);
        let records: Vec<_> = segment(&data, whole(&data)).collect();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text(), TokenText::Undecodable);
        assert_eq!(records[0].text().to_string(), DECODE_ERROR);
    }
}
