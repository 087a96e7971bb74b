//! Archive access.
//!
//! The unrar function only needs a forward-only cursor over entry headers and
//! the ability to pull the current entry's bytes. [`ArchiveOpener`] and
//! [`RarArchive`] describe that surface; the crate provides
//!
//! - [`MemoryArchive`] - entries held in memory, for hosts that already have
//!   the archive contents and for tests
//! - `UnrarOpener` - the native unrar library (feature `unrar`)

mod memory;
#[cfg(feature = "unrar")]
mod native;

pub use memory::{MemoryArchive, MemoryEntry, MemoryOpener};
#[cfg(feature = "unrar")]
pub use native::{UnrarArchive, UnrarOpener};

use std::path::Path;

use crate::error::Result;
use crate::value::EntryKind;

/// Metadata of one archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryHeader {
    name: String,
    unicode_name: Option<String>,
    directory: bool,
    encrypted: bool,
    unpacked_size: u64,
}

impl EntryHeader {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unicode_name: None,
            directory: false,
            encrypted: false,
            unpacked_size: 0,
        }
    }

    pub fn directory(mut self, directory: bool) -> Self {
        self.directory = directory;
        self
    }

    pub fn encrypted(mut self, encrypted: bool) -> Self {
        self.encrypted = encrypted;
        self
    }

    pub fn with_unicode_name(mut self, name: impl Into<String>) -> Self {
        self.unicode_name = Some(name.into());
        self
    }

    pub fn with_unpacked_size(mut self, size: u64) -> Self {
        self.unpacked_size = size;
        self
    }

    /// The name handed to user functions: the unicode name when the archive
    /// stores one, otherwise the plain name.
    pub fn file_name(&self) -> &str {
        self.unicode_name.as_deref().unwrap_or(&self.name)
    }

    pub fn raw_name(&self) -> &str {
        &self.name
    }

    pub fn is_unicode(&self) -> bool {
        self.unicode_name.is_some()
    }

    pub fn is_directory(&self) -> bool {
        self.directory
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    pub fn unpacked_size(&self) -> u64 {
        self.unpacked_size
    }

    pub fn kind(&self) -> EntryKind {
        EntryKind::from_directory_flag(self.directory)
    }
}

/// An open archive.
///
/// Entries are visited in archive order. [`extract`](Self::extract) may only
/// be called for the header most recently returned by
/// [`next_entry`](Self::next_entry); entries that are not extracted are
/// skipped when the cursor advances.
pub trait RarArchive {
    /// Whether the archive as a whole is encrypted (encrypted headers).
    fn is_encrypted(&self) -> bool;

    /// Advance to the next entry. `None` once the archive is exhausted.
    fn next_entry(&mut self) -> Result<Option<EntryHeader>>;

    /// Read the current entry's bytes in full.
    fn extract(&mut self, entry: &EntryHeader) -> Result<Vec<u8>>;

    /// Release the archive handle.
    fn close(&mut self) -> Result<()>;
}

/// Opens archives by path.
pub trait ArchiveOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn RarArchive>>;
}
