//! Rendering scan results.
//!
//! [`write_listing`] drives a [`Scanner`] over a located region and hands
//! each stage to a [`ListingWriter`]. Two writers are provided:
//! [`TableWriter`] prints the full diagnostic table and [`TextWriter`]
//! prints only the decoded token text.

use crate::scanner::{IdentifierCandidate, RegionReport, Scanner, SpecialTokenMatch, TokenRecord};
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

/// Width of the hex column before truncation
pub const HEX_WIDTH: usize = 40;

const RULE_WIDTH: usize = 130;

/// Which accepted tokens to display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Accepted tokens discarded before display
    pub skip: usize,
    /// Maximum number of tokens displayed
    pub count: usize,
    requested_skip: usize,
    windowed: bool,
}

impl Selection {
    /// Shows `count` tokens after skipping `skip`
    pub fn new(count: usize, skip: usize) -> Self {
        Self {
            skip,
            count,
            requested_skip: skip,
            windowed: false,
        }
    }

    /// Shows `window` tokens centered on position `skip`
    pub fn centered(skip: usize, window: usize) -> Self {
        Self {
            skip: skip.saturating_sub(window / 2),
            count: window,
            requested_skip: skip,
            windowed: true,
        }
    }

    /// Builds a selection from command-line style arguments.
    ///
    /// A non-zero `window` overrides `count` and centers on `skip`.
    pub fn from_args(count: usize, skip: usize, window: usize) -> Self {
        if window > 0 {
            Self::centered(skip, window)
        } else {
            Self::new(count, skip)
        }
    }

    /// Returns true if the selection was centered on a position
    pub fn is_windowed(&self) -> bool {
        self.windowed
    }

    /// The position the user asked for, before centering
    pub fn requested_skip(&self) -> usize {
        self.requested_skip
    }
}

/// One displayed token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry<'a> {
    /// Position of the token among all accepted tokens
    pub index: usize,
    /// The token span
    pub record: TokenRecord<'a>,
    /// Identifier guesses for the token
    pub candidates: Vec<IdentifierCandidate>,
}

/// Receives each stage of a listing
///
/// Every method has a no-op default so writers only implement what they
/// render.
pub trait ListingWriter {
    /// Describe the input file
    fn write_source(&mut self, path: &Path, size: u64) -> io::Result<()> {
        let _ = (path, size);
        Ok(())
    }

    /// Report a special-token hit from region detection
    fn write_special_token(&mut self, found: &SpecialTokenMatch) -> io::Result<()> {
        let _ = found;
        Ok(())
    }

    /// Report the detected region
    fn write_region(&mut self, report: &RegionReport) -> io::Result<()> {
        let _ = report;
        Ok(())
    }

    /// Start the token table
    fn write_header(&mut self, selection: &Selection) -> io::Result<()> {
        let _ = selection;
        Ok(())
    }

    /// Write one token
    fn write_entry(&mut self, entry: &ListingEntry<'_>) -> io::Result<()> {
        let _ = entry;
        Ok(())
    }

    /// Finish the token table
    fn write_footer(&mut self, written: usize) -> io::Result<()> {
        let _ = written;
        Ok(())
    }
}

/// Writes the selected tokens of `data` and returns how many were written.
///
/// Tokens before the selection are segmented but not probed for
/// identifiers. The listing ends early if the region runs out.
pub fn write_listing<W: ListingWriter + ?Sized>(
    scanner: &Scanner,
    data: &[u8],
    report: &RegionReport,
    selection: Selection,
    writer: &mut W,
) -> io::Result<usize> {
    for found in &report.matches {
        writer.write_special_token(found)?;
    }
    writer.write_region(report)?;
    writer.write_header(&selection)?;

    let mut written = 0;
    for (n, record) in scanner
        .segment(data, report.region)
        .skip(selection.skip)
        .take(selection.count)
        .enumerate()
    {
        let candidates = scanner.infer(data, record.offset, report.region.start);
        writer.write_entry(&ListingEntry {
            index: selection.skip + n,
            record,
            candidates,
        })?;
        written += 1;
    }

    if written < selection.count {
        debug!(
            "Region exhausted after {} of {} requested tokens",
            written, selection.count
        );
    }

    writer.write_footer(written)?;
    Ok(written)
}

/// Space-separated hex bytes, cut to `max_len` characters with `...` or
/// padded to exactly `max_len`.
pub fn hexdump(data: &[u8], max_len: usize) -> String {
    let hex = data
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<_>>()
        .join(" ");

    if hex.len() > max_len {
        format!("{}...", &hex[..max_len])
    } else {
        format!("{hex:<max_len$}")
    }
}

/// Joins candidates as `value(LE|BE)` separated by `, `
pub fn format_candidates(candidates: &[IdentifierCandidate]) -> String {
    candidates
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Formats `n` with `,` between groups of three digits
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Writes the full diagnostic table
#[derive(Debug)]
pub struct TableWriter<W> {
    out: W,
}

impl<W: Write> TableWriter<W> {
    /// Creates a table writer over `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn rule(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", "-".repeat(RULE_WIDTH))
    }
}

impl<W: Write> ListingWriter for TableWriter<W> {
    fn write_source(&mut self, path: &Path, size: u64) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "Analyzing file: {}", path.display())?;
        writeln!(self.out, "File size: {} bytes", group_thousands(size))
    }

    fn write_special_token(&mut self, found: &SpecialTokenMatch) -> io::Result<()> {
        writeln!(self.out, "Found special token {found}")
    }

    fn write_region(&mut self, report: &RegionReport) -> io::Result<()> {
        let region = report.region;
        if report.is_fallback() {
            writeln!(self.out, "No special tokens found; scanning from offset 0x0")?;
        }
        writeln!(
            self.out,
            "Vocabulary section: 0x{:x} to 0x{:x} ({} bytes)",
            region.start,
            region.end,
            group_thousands(region.len() as u64)
        )
    }

    fn write_header(&mut self, selection: &Selection) -> io::Result<()> {
        writeln!(self.out)?;
        if selection.is_windowed() {
            writeln!(
                self.out,
                "Showing window of {} tokens around position {}:",
                selection.count,
                selection.requested_skip()
            )?;
        } else {
            writeln!(
                self.out,
                "Listing {} meaningful tokens (skipping {}):",
                selection.count, selection.skip
            )?;
        }
        self.rule()?;
        writeln!(
            self.out,
            "{:>4} {:>10} {:>4} {:42} {:25} {}",
            "#", "Offset", "Len", "Raw Hex", "Token IDs", "Token Text"
        )?;
        self.rule()
    }

    fn write_entry(&mut self, entry: &ListingEntry<'_>) -> io::Result<()> {
        let record = &entry.record;
        writeln!(
            self.out,
            "{:4} 0x{:08x} {:4} {} {:25} {}",
            entry.index,
            record.offset,
            record.len(),
            hexdump(record.bytes, HEX_WIDTH),
            format_candidates(&entry.candidates),
            record.text()
        )
    }

    fn write_footer(&mut self, _written: usize) -> io::Result<()> {
        self.rule()?;
        self.out.flush()
    }
}

/// Writes only the decoded text of each token, one per line
#[derive(Debug)]
pub struct TextWriter<W> {
    out: W,
}

impl<W: Write> TextWriter<W> {
    /// Creates a text writer over `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ListingWriter for TextWriter<W> {
    fn write_entry(&mut self, entry: &ListingEntry<'_>) -> io::Result<()> {
        writeln!(self.out, "{}", entry.record.text())
    }

    fn write_footer(&mut self, _written: usize) -> io::Result<()> {
        self.out.flush()
    }
}
