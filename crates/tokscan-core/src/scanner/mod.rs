//! Heuristic scanning of embedded vocabulary tables.
//!
//! Container files carry their vocabulary as a run of length-prefixed
//! strings somewhere between the metadata header and the tensor data. The
//! scanner does not parse that header. It recovers the table by looking for
//! the byte patterns a SentencePiece-style vocabulary leaves behind.
//!
//! ## Algorithm Overview
//!
//! 1. Find the earliest special token (`<pad>`, `<eos>`, ...) and treat it as
//!    the start of the vocabulary region
//! 2. Walk forward to the first long run of zero bytes to bound the region
//! 3. Split the region on the `▁` word-boundary marker, keeping spans that
//!    contain printable text
//! 4. Decode the bytes just before each span as little- and big-endian
//!    integers to suggest the token's vocabulary index
//!
//! Every step is a best-effort guess over opaque bytes. Nothing here is
//! validated against the container's declared layout.

mod infer;
mod locator;
mod segment;

use crate::error::{Error, Result};
use tracing::{debug, trace};

pub use infer::{infer, probe_at, Endianness, IdentifierCandidate, Probe};
pub use locator::{find_region_end, locate, Region, RegionReport, SpecialTokenMatch};
pub use segment::{segment, TokenRecord, TokenText, Tokens, BOUNDARY_MARKER, DECODE_ERROR};

/// Special tokens used to find the start of the vocabulary
pub const DEFAULT_SPECIAL_TOKENS: &[&str] = &["<pad>", "<eos>", "<unk>", "<end_of_turn>"];

/// Configuration for the scanner
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Literal special-token strings that bootstrap region detection
    pub special_tokens: Vec<Vec<u8>>,
    /// A zero run longer than this ends the vocabulary region
    pub null_run_threshold: usize,
    /// Maximum number of content bytes read after a boundary marker
    pub lookahead_limit: usize,
    /// Number of bytes before a token probed for identifiers
    pub id_window: usize,
    /// Exclusive upper bound for a plausible token identifier
    pub id_ceiling: u32,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            special_tokens: DEFAULT_SPECIAL_TOKENS
                .iter()
                .map(|token| token.as_bytes().to_vec())
                .collect(),
            null_run_threshold: 100,
            lookahead_limit: 100,
            id_window: 8,
            id_ceiling: 100_000,
        }
    }
}

impl ScannerConfig {
    /// Creates a new scanner config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the special-token set
    pub fn special_tokens<I, T>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Vec<u8>>,
    {
        self.special_tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the zero-run length that terminates the region
    pub fn null_run_threshold(mut self, threshold: usize) -> Self {
        self.null_run_threshold = threshold;
        self
    }

    /// Sets the per-token look-ahead limit
    pub fn lookahead_limit(mut self, limit: usize) -> Self {
        self.lookahead_limit = limit;
        self
    }

    /// Sets the identifier probe window
    pub fn id_window(mut self, window: usize) -> Self {
        self.id_window = window;
        self
    }

    /// Sets the identifier plausibility ceiling
    pub fn id_ceiling(mut self, ceiling: u32) -> Self {
        self.id_ceiling = ceiling;
        self
    }

    /// Checks that every setting can produce a meaningful scan
    pub fn validate(&self) -> Result<()> {
        if self.special_tokens.iter().any(Vec::is_empty) {
            return Err(Error::invalid_config("special tokens must not be empty"));
        }
        if self.lookahead_limit == 0 {
            return Err(Error::invalid_config("lookahead limit must be at least 1"));
        }
        if self.id_window < 4 {
            return Err(Error::invalid_config(format!(
                "identifier window of {} bytes cannot hold a 32-bit value",
                self.id_window
            )));
        }
        Ok(())
    }
}

/// Vocabulary scanner bound to one configuration
#[derive(Debug, Clone)]
pub struct Scanner {
    config: ScannerConfig,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    /// Creates a new scanner with default configuration
    pub fn new() -> Self {
        Self {
            config: ScannerConfig::default(),
        }
    }

    /// Creates a new scanner with custom configuration
    pub fn with_config(config: ScannerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the active configuration
    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Locates the vocabulary region in `data`
    pub fn locate(&self, data: &[u8]) -> RegionReport {
        debug!("Locating vocabulary in {} bytes", data.len());
        locate(data, &self.config.special_tokens, self.config.null_run_threshold)
    }

    /// Splits `region` into token records
    pub fn segment<'a>(&self, data: &'a [u8], region: Region) -> Tokens<'a> {
        trace!("Segmenting region 0x{:x}..0x{:x}", region.start, region.end);
        segment(data, region).lookahead_limit(self.config.lookahead_limit)
    }

    /// Suggests identifiers for the token starting at `token_offset`
    pub fn infer(
        &self,
        data: &[u8],
        token_offset: usize,
        region_start: usize,
    ) -> Vec<IdentifierCandidate> {
        infer(
            data,
            token_offset,
            region_start,
            self.config.id_window,
            self.config.id_ceiling,
        )
    }
}

/// Find a subsequence within a byte slice
pub(crate) fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
