//! In-memory archives.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use super::{ArchiveOpener, EntryHeader, RarArchive};
use crate::error::{ArchiveOperation, Error, Result};

/// One entry of a [`MemoryArchive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryEntry {
    header: EntryHeader,
    data: Vec<u8>,
}

impl MemoryEntry {
    pub fn file(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        let data = data.into();
        let header = EntryHeader::new(name).with_unpacked_size(data.len() as u64);
        Self { header, data }
    }

    pub fn folder(name: impl Into<String>) -> Self {
        Self {
            header: EntryHeader::new(name).directory(true),
            data: Vec::new(),
        }
    }

    pub fn encrypted(mut self) -> Self {
        self.header = self.header.encrypted(true);
        self
    }

    pub fn with_unicode_name(mut self, name: impl Into<String>) -> Self {
        self.header = self.header.with_unicode_name(name);
        self
    }

    pub fn header(&self) -> &EntryHeader {
        &self.header
    }
}

/// An archive whose entries are already in memory.
#[derive(Debug, Clone)]
pub struct MemoryArchive {
    path: PathBuf,
    entries: Vec<MemoryEntry>,
    encrypted: bool,
    position: usize,
    current: Option<usize>,
    closed: bool,
}

impl Default for MemoryArchive {
    fn default() -> Self {
        Self::new("memory.rar")
    }
}

impl MemoryArchive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
            encrypted: false,
            position: 0,
            current: None,
            closed: false,
        }
    }

    pub fn with_entry(mut self, entry: MemoryEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn push(&mut self, entry: MemoryEntry) {
        self.entries.push(entry);
    }

    /// Mark the whole archive as encrypted.
    pub fn encrypted(mut self, encrypted: bool) -> Self {
        self.encrypted = encrypted;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self, operation: ArchiveOperation) -> Result<()> {
        if self.closed {
            return Err(Error::archive(
                operation,
                &self.path,
                io::Error::other("archive is closed"),
            ));
        }
        Ok(())
    }
}

impl RarArchive for MemoryArchive {
    fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    fn next_entry(&mut self) -> Result<Option<EntryHeader>> {
        self.ensure_open(ArchiveOperation::ReadHeader)?;
        match self.entries.get(self.position) {
            Some(entry) => {
                self.current = Some(self.position);
                self.position += 1;
                Ok(Some(entry.header.clone()))
            }
            None => {
                self.current = None;
                Ok(None)
            }
        }
    }

    fn extract(&mut self, entry: &EntryHeader) -> Result<Vec<u8>> {
        self.ensure_open(ArchiveOperation::Extract)?;
        let index = self
            .current
            .take()
            .filter(|&i| self.entries[i].header == *entry)
            .ok_or_else(|| {
                Error::archive(
                    ArchiveOperation::Extract,
                    &self.path,
                    format!("'{}' is not the current entry", entry.file_name()),
                )
            })?;
        Ok(self.entries[index].data.clone())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.current = None;
        Ok(())
    }
}

/// Serves [`MemoryArchive`]s registered under a path.
#[derive(Debug, Clone, Default)]
pub struct MemoryOpener {
    archives: HashMap<PathBuf, MemoryArchive>,
}

impl MemoryOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `archive` under its own path.
    pub fn insert(&mut self, archive: MemoryArchive) {
        self.archives.insert(archive.path.clone(), archive);
    }

    pub fn with_archive(mut self, archive: MemoryArchive) -> Self {
        self.insert(archive);
        self
    }
}

impl ArchiveOpener for MemoryOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn RarArchive>> {
        let archive = self.archives.get(path).cloned().ok_or_else(|| {
            Error::archive(
                ArchiveOperation::Open,
                path,
                io::Error::new(io::ErrorKind::NotFound, "no such archive"),
            )
        })?;
        Ok(Box::new(archive))
    }
}
