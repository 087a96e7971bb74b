//! RAR extraction for an XML database query engine.
//!
//! Implements `rar:unrar`, which walks a RAR archive and hands each entry to
//! two caller-supplied functions: a filter that decides whether the entry is
//! processed, and a store function that either receives the decoded data or
//! returns a database path the entry is written to.
//!
//! ```
//! use xmldb_rar::{FunctionReference, MemoryStore, QueryContext, Sequence, Subject};
//! use xmldb_rar::{MemoryArchive, MemoryEntry, MemoryOpener, UnrarCall, UnrarFunction};
//!
//! let archive = MemoryArchive::new("/data/archive.rar")
//!     .with_entry(MemoryEntry::file("notes/a.xml", "<note>hi</note>"));
//! let unrar = UnrarFunction::new(MemoryOpener::new().with_archive(archive));
//!
//! let mut store = MemoryStore::new();
//! let mut ctx = QueryContext::new(Subject::dba("admin"), &mut store);
//! let filter = FunctionReference::new("local:all", 3, |_| Ok(Sequence::one(true)));
//! let names = FunctionReference::new("local:name", 4, |args: &[Sequence]| Ok(args[0].clone()));
//!
//! let entries = unrar.eval(UnrarCall::new("/data/archive.rar", filter, names), &mut ctx)?;
//! assert_eq!(entries.first().map(|item| item.string_value()).as_deref(), Some("notes/a.xml"));
//! # Ok::<(), xmldb_rar::Error>(())
//! ```
//!
//! With the `unrar` feature, `UnrarFunction::default()` reads archives from
//! the filesystem instead.
//!
//! ## Features
//! - `unrar` (default) - Reads archives through the `unrar` library
//! - `cli` - The `xmldb-unrar` command line tool

pub mod archive;
pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod function;
pub mod markup;
pub mod mime;
pub mod module;
pub mod store;
pub mod unrar_function;
pub mod value;

pub use archive::{ArchiveOpener, EntryHeader, MemoryArchive, MemoryEntry, MemoryOpener, RarArchive};
pub use config::ModuleConfig;
pub use context::{QueryContext, Subject};
pub use error::{ArchiveOperation, Error, Result};
pub use function::{FunctionReference, StoreStrategy};
pub use markup::{decode_entry, Document, EntryData};
pub use module::RarModule;
pub use store::{CollectionPath, DocumentStore, FsStore, MemoryStore, Resource, ResourceContent};
pub use unrar_function::{UnrarCall, UnrarFunction};
pub use value::{Base64Binary, EntryKind, Item, Sequence};

#[cfg(feature = "unrar")]
pub use archive::{UnrarArchive, UnrarOpener};
