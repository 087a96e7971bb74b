//! Archives read through the native unrar library.

use std::mem;
use std::path::{Path, PathBuf};

use tracing::debug;
use unrar::error::{Code, UnrarError};
use unrar::{Archive, CursorBeforeFile, CursorBeforeHeader, OpenArchive, Process};

use super::{ArchiveOpener, EntryHeader, RarArchive};
use crate::error::{ArchiveOperation, Error, Result};

/// Opens archives from the local filesystem with the unrar library.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnrarOpener;

impl ArchiveOpener for UnrarOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn RarArchive>> {
        Ok(Box::new(UnrarArchive::open(path)?))
    }
}

/// Position of the unrar cursor. The library encodes it in the handle's type,
/// so the handle moves between variants as the archive is walked.
enum Cursor {
    BeforeHeader(OpenArchive<Process, CursorBeforeHeader>),
    BeforeFile(OpenArchive<Process, CursorBeforeFile>),
    Exhausted,
    Closed,
}

/// An archive opened for processing.
pub struct UnrarArchive {
    path: PathBuf,
    encrypted: bool,
    cursor: Cursor,
}

impl UnrarArchive {
    pub fn open(path: &Path) -> Result<Self> {
        match Archive::new(path).open_for_processing() {
            Ok(handle) => Ok(Self {
                path: path.to_path_buf(),
                encrypted: handle.has_encrypted_headers(),
                cursor: Cursor::BeforeHeader(handle),
            }),
            // Archives with encrypted headers cannot even be listed without a
            // password; the library reports that at open time.
            Err(err) if err.code == Code::MissingPassword => {
                debug!(path = %path.display(), "archive headers are encrypted");
                Ok(Self {
                    path: path.to_path_buf(),
                    encrypted: true,
                    cursor: Cursor::Closed,
                })
            }
            Err(err) => Err(wrap(ArchiveOperation::Open, path, err)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn fail(&self, operation: ArchiveOperation, err: UnrarError) -> Error {
        wrap(operation, &self.path, err)
    }
}

fn wrap(operation: ArchiveOperation, path: &Path, err: UnrarError) -> Error {
    Error::archive(operation, path, err)
}

fn header_of(handle: &OpenArchive<Process, CursorBeforeFile>) -> EntryHeader {
    let entry = handle.entry();
    let name = entry.filename.to_string_lossy().replace('\\', "/");
    let mut header = EntryHeader::new(name.clone())
        .directory(entry.is_directory())
        .encrypted(entry.is_encrypted())
        .with_unpacked_size(entry.unpacked_size);
    if !name.is_ascii() {
        header = header.with_unicode_name(name);
    }
    header
}

impl RarArchive for UnrarArchive {
    fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    fn next_entry(&mut self) -> Result<Option<EntryHeader>> {
        let handle = match mem::replace(&mut self.cursor, Cursor::Exhausted) {
            Cursor::BeforeHeader(handle) => handle,
            Cursor::BeforeFile(pending) => pending
                .skip()
                .map_err(|e| self.fail(ArchiveOperation::ReadHeader, e))?,
            Cursor::Exhausted => return Ok(None),
            Cursor::Closed => {
                self.cursor = Cursor::Closed;
                return Err(Error::archive(
                    ArchiveOperation::ReadHeader,
                    &self.path,
                    "archive is closed",
                ));
            }
        };

        match handle
            .read_header()
            .map_err(|e| self.fail(ArchiveOperation::ReadHeader, e))?
        {
            Some(pending) => {
                let header = header_of(&pending);
                self.cursor = Cursor::BeforeFile(pending);
                Ok(Some(header))
            }
            None => Ok(None),
        }
    }

    fn extract(&mut self, entry: &EntryHeader) -> Result<Vec<u8>> {
        let pending = match mem::replace(&mut self.cursor, Cursor::Exhausted) {
            Cursor::BeforeFile(pending) => pending,
            other => {
                self.cursor = other;
                return Err(Error::archive(
                    ArchiveOperation::Extract,
                    &self.path,
                    format!("'{}' is not the current entry", entry.file_name()),
                ));
            }
        };

        if entry.is_directory() {
            let next = pending
                .skip()
                .map_err(|e| self.fail(ArchiveOperation::Extract, e))?;
            self.cursor = Cursor::BeforeHeader(next);
            return Ok(Vec::new());
        }

        let (data, next) = pending
            .read()
            .map_err(|e| self.fail(ArchiveOperation::Extract, e))?;
        self.cursor = Cursor::BeforeHeader(next);
        Ok(data)
    }

    fn close(&mut self) -> Result<()> {
        // Dropping the handle closes it; unrar does not report close failures.
        self.cursor = Cursor::Closed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("__fixtures__")
            .join(name)
    }

    fn open(name: &str) -> UnrarArchive {
        UnrarArchive::open(&fixture(name)).unwrap()
    }

    #[test]
    fn test_read_stored_entries() {
        let mut archive = open("stored.rar");
        assert!(!archive.is_encrypted());

        let hello = archive.next_entry().unwrap().unwrap();
        assert_eq!(hello.file_name(), "hello.txt");
        assert_eq!(hello.unpacked_size(), 12);
        assert!(!hello.is_directory());
        assert!(!hello.is_unicode());
        assert_eq!(archive.extract(&hello).unwrap(), b"hello world\n");

        let note = archive.next_entry().unwrap().unwrap();
        assert_eq!(note.file_name(), "note.xml");
        assert_eq!(archive.extract(&note).unwrap(), b"<note>hi</note>");

        assert!(archive.next_entry().unwrap().is_none());
        assert!(archive.next_entry().unwrap().is_none());
        archive.close().unwrap();
    }

    #[test]
    fn test_unextracted_entry_is_skipped() {
        let mut archive = open("stored.rar");
        let hello = archive.next_entry().unwrap().unwrap();
        let note = archive.next_entry().unwrap().unwrap();
        assert_eq!(note.file_name(), "note.xml");
        assert_eq!(archive.extract(&note).unwrap(), b"<note>hi</note>");
        assert!(matches!(
            archive.extract(&hello),
            Err(Error::Archive {
                operation: ArchiveOperation::Extract,
                ..
            })
        ));
    }

    #[test]
    fn test_folder_and_unicode_names() {
        let mut archive = open("folder.rar");

        let docs = archive.next_entry().unwrap().unwrap();
        assert_eq!(docs.file_name(), "docs");
        assert!(docs.is_directory());
        assert!(archive.extract(&docs).unwrap().is_empty());

        let index = archive.next_entry().unwrap().unwrap();
        assert_eq!(index.file_name(), "docs/index.xml");
        assert!(!index.is_directory());
        assert_eq!(archive.extract(&index).unwrap(), b"<index/>");

        let accented = archive.next_entry().unwrap().unwrap();
        assert_eq!(accented.file_name(), "données.txt");
        assert!(accented.is_unicode());
        assert_eq!(archive.extract(&accented).unwrap(), "café".as_bytes());

        assert!(archive.next_entry().unwrap().is_none());
    }

    #[test]
    fn test_encrypted_entry_can_be_skipped() {
        let mut archive = open("encrypted_entry.rar");
        assert!(!archive.is_encrypted());

        let one = archive.next_entry().unwrap().unwrap();
        assert!(!one.is_encrypted());
        assert_eq!(archive.extract(&one).unwrap(), b"1");

        let secret = archive.next_entry().unwrap().unwrap();
        assert_eq!(secret.file_name(), "secret.txt");
        assert!(secret.is_encrypted());

        let three = archive.next_entry().unwrap().unwrap();
        assert_eq!(three.file_name(), "three.txt");
        assert_eq!(archive.extract(&three).unwrap(), b"3");
        assert!(archive.next_entry().unwrap().is_none());
    }

    #[test]
    fn test_encrypted_headers_mark_archive_encrypted() {
        let mut archive = open("encrypted_headers.rar");
        assert!(archive.is_encrypted());
        archive.close().unwrap();
        assert!(archive.next_entry().is_err());
    }

    #[test]
    fn test_closed_archive_rejects_reads() {
        let mut archive = open("stored.rar");
        archive.close().unwrap();
        assert!(matches!(
            archive.next_entry(),
            Err(Error::Archive {
                operation: ArchiveOperation::ReadHeader,
                ..
            })
        ));
    }

    #[test]
    fn test_open_missing_file() {
        let err = UnrarArchive::open(Path::new("/nonexistent/archive.rar"))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            Error::Archive {
                operation: ArchiveOperation::Open,
                ..
            }
        ));
    }

    #[test]
    fn test_open_not_an_archive() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"definitely not a rar archive").unwrap();
        assert!(UnrarOpener.open(file.path()).is_err());
    }
}
