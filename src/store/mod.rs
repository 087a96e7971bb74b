//! The document store the path-returning form writes into.
//!
//! A store is a hierarchy of collections holding resources. Every write made by
//! the unrar function goes through [`ResourceWriter`], which resolves the path
//! returned by the user function against the root collection.

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use std::fmt;

use tracing::debug;

use crate::error::{Error, Result};
use crate::markup::Document;
use crate::mime::MimeTable;

/// Location of a collection: the segments below the store root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(Vec<String>);

impl CollectionPath {
    /// Normalize `path`: empty and `.` segments are dropped, `..` is rejected.
    pub fn parse(path: &str) -> Result<Self> {
        let mut segments = Vec::new();
        for segment in path.split(['/', '\\']) {
            match segment {
                "" | "." => {}
                ".." => {
                    return Err(Error::InvalidTargetPath {
                        path: path.to_owned(),
                        reason: "parent segments are not allowed",
                    })
                }
                s => segments.push(s.to_owned()),
            }
        }
        Ok(Self(segments))
    }

    /// Resolve a user-returned `target` below `root`.
    ///
    /// Relative targets are appended to `root`; absolute targets must already
    /// lie under it.
    pub fn resolve(root: &Self, target: &str) -> Result<Self> {
        let parsed = Self::parse(target)?;
        if target.starts_with('/') {
            if !parsed.starts_with(root) {
                return Err(Error::InvalidTargetPath {
                    path: target.to_owned(),
                    reason: "absolute path outside the root collection",
                });
            }
            Ok(parsed)
        } else {
            Ok(root.join(&parsed))
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.0.starts_with(&prefix.0)
    }

    pub fn join(&self, other: &Self) -> Self {
        let mut segments = self.0.clone();
        segments.extend(other.0.iter().cloned());
        Self(segments)
    }

    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_owned());
        Self(segments)
    }

    pub fn parent(&self) -> Option<Self> {
        self.0
            .split_last()
            .map(|(_, parent)| Self(parent.to_vec()))
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Every non-empty prefix of the path, shortest first.
    pub fn ancestors_inclusive(&self) -> impl Iterator<Item = Self> + '_ {
        (1..=self.0.len()).map(move |n| Self(self.0[..n].to_vec()))
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResourceContent {
    Xml(Document),
    Binary(Vec<u8>),
}

impl ResourceContent {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Xml(doc) => doc.as_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }

    pub fn is_xml(&self) -> bool {
        matches!(self, Self::Xml(_))
    }
}

/// A resource to be stored in a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub name: String,
    pub content: ResourceContent,
    pub mime_type: Option<String>,
}

/// Hierarchical collection/resource storage.
pub trait DocumentStore {
    /// Create `path` and every missing ancestor. Existing collections are kept.
    fn create_collection(&mut self, path: &CollectionPath) -> Result<()>;

    /// Store `resource` in an existing collection, replacing a resource of the
    /// same name.
    fn store_resource(&mut self, collection: &CollectionPath, resource: Resource) -> Result<()>;
}

/// Performs the writes of the path-returning store form.
pub struct ResourceWriter<'a> {
    store: &'a mut dyn DocumentStore,
    root: &'a CollectionPath,
    mime_table: &'a MimeTable,
}

impl<'a> ResourceWriter<'a> {
    pub fn new(
        store: &'a mut dyn DocumentStore,
        root: &'a CollectionPath,
        mime_table: &'a MimeTable,
    ) -> Self {
        Self {
            store,
            root,
            mime_table,
        }
    }

    /// Ensure the collection named by `target` exists.
    pub fn write_folder(&mut self, target: &str) -> Result<CollectionPath> {
        let path = CollectionPath::resolve(self.root, target)?;
        debug!(collection = %path, "creating collection");
        self.store.create_collection(&path)?;
        Ok(path)
    }

    /// Store `bytes` as the resource named by `target`, creating its parent
    /// collections. Bytes that are not a document are stored as binary.
    pub fn write_resource(&mut self, target: &str, bytes: Vec<u8>) -> Result<CollectionPath> {
        let path = CollectionPath::resolve(self.root, target)?;
        let parent = path.parent().filter(|parent| parent.starts_with(self.root));
        let (Some(name), Some(collection)) = (path.last(), parent) else {
            return Err(Error::InvalidTargetPath {
                path: target.to_owned(),
                reason: "path does not name a resource",
            });
        };
        let name = name.to_owned();

        self.store.create_collection(&collection)?;

        let mime_type = self.mime_table.content_type_for(&name);
        let content = match Document::parse(&bytes) {
            Ok(doc) => ResourceContent::Xml(doc),
            Err(err) => {
                debug!(resource = %path, error = %err, "storing as binary resource");
                ResourceContent::Binary(bytes)
            }
        };
        debug!(resource = %path, xml = content.is_xml(), mime = ?mime_type, "storing resource");
        self.store.store_resource(
            &collection,
            Resource {
                name,
                content,
                mime_type,
            },
        )?;
        Ok(path)
    }
}
