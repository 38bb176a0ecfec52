//! Read-only access to the container file.
//!
//! [`MappedFile`] maps the input into memory so that only the pages the
//! scanner touches are paged in. The map is released when the value is
//! dropped, which covers early returns and partially consumed listings.

use crate::error::{Error, Result};
use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::ops::Deref;
use std::path::Path;
use tracing::{debug, trace};

#[derive(Debug)]
enum Backing {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

/// An immutable byte buffer backed either by a memory map or by memory
#[derive(Debug)]
pub struct MappedFile {
    backing: Backing,
}

impl MappedFile {
    /// Opens `path` read-only and maps it into memory.
    ///
    /// Empty files are not mapped (a zero-length map is not portable); they
    /// produce an empty buffer instead.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::file_open(path, e))?;
        let len = file
            .metadata()
            .map_err(|e| Error::file_open(path, e))?
            .len();

        if len == 0 {
            debug!("{} is empty, skipping mmap", path.display());
            return Ok(Self::from_bytes(Vec::new()));
        }

        // SAFETY: the map is read-only and the file is never written through
        // this process. Concurrent truncation by another process is outside
        // what a diagnostic tool can guard against.
        #[allow(unsafe_code)]
        let mmap = unsafe { MmapOptions::new().map(&file) }.map_err(|e| Error::file_map(path, e))?;

        trace!("Mapped {} bytes from {}", mmap.len(), path.display());
        Ok(Self {
            backing: Backing::Mapped(mmap),
        })
    }

    /// Wraps an in-memory buffer
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            backing: Backing::Owned(data.into()),
        }
    }

    /// Returns the full buffer
    pub fn as_bytes(&self) -> &[u8] {
        match &self.backing {
            Backing::Mapped(mmap) => &mmap[..],
            Backing::Owned(data) => data.as_slice(),
        }
    }

    /// Returns true if the buffer is a live memory map
    pub fn is_mapped(&self) -> bool {
        matches!(self.backing, Backing::Mapped(_))
    }
}

impl Deref for MappedFile {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for MappedFile {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}
