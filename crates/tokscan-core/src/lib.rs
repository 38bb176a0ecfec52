//! # tokscan-core
//!
//! A library for recovering the vocabulary table embedded in model-weight
//! container files (GGUF and similar) without parsing the container.
//!
//! This crate provides the core functionality for:
//! - Locating the vocabulary region from special-token strings and padding
//! - Segmenting the region into tokens on the `▁` word-boundary marker
//! - Guessing each token's numeric identifier from nearby bytes
//! - Rendering the results as a diagnostic listing
//!
//! ## Architecture
//!
//! - [`source`]: Read-only, memory-mapped access to the input file
//! - [`scanner`]: Region detection, segmentation and identifier inference
//! - [`listing`]: Token selection and output formatting
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use tokscan_core::{MappedFile, Scanner};
//!
//! let file = MappedFile::open("model.gguf")?;
//! let scanner = Scanner::new();
//! let report = scanner.locate(&file);
//!
//! for record in scanner.segment(&file, report.region).take(10) {
//!     let ids = scanner.infer(&file, record.offset, report.region.start);
//!     println!("0x{:08x} {} {:?}", record.offset, record.text(), ids);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod error;
pub mod listing;
pub mod scanner;
pub mod source;

// Re-export primary types for convenience
pub use error::{Error, Result};
pub use listing::{write_listing, ListingEntry, ListingWriter, Selection, TableWriter, TextWriter};
pub use scanner::{
    Endianness, IdentifierCandidate, Probe, Region, RegionReport, Scanner, ScannerConfig,
    SpecialTokenMatch, TokenRecord, TokenText,
};
pub use source::MappedFile;

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
