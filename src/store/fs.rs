//! A store that mirrors collections as directories.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{CollectionPath, DocumentStore, Resource};
use crate::error::{Error, Result};

/// Per-collection file recording resource content types.
pub const CONTENT_TYPES_FILE: &str = ".content-types.json";

/// Collections are directories under `base`, resources are files.
#[derive(Debug, Clone)]
pub struct FsStore {
    base: PathBuf,
}

impl FsStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Directory backing `collection`.
    pub fn directory(&self, collection: &CollectionPath) -> PathBuf {
        collection
            .segments()
            .iter()
            .fold(self.base.clone(), |dir, segment| dir.join(segment))
    }

    /// Content type recorded for `name` in `collection`.
    pub fn content_type(&self, collection: &CollectionPath, name: &str) -> Result<Option<String>> {
        let mut types = self.read_content_types(&self.directory(collection))?;
        Ok(types.remove(name))
    }

    fn read_content_types(&self, dir: &Path) -> Result<BTreeMap<String, String>> {
        let file = dir.join(CONTENT_TYPES_FILE);
        if !file.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read(&file)?;
        serde_json::from_slice(&raw)
            .map_err(|e| Error::Store(format!("corrupt {}: {e}", file.display())))
    }

    fn write_content_types(&self, dir: &Path, types: &BTreeMap<String, String>) -> Result<()> {
        let raw = serde_json::to_vec_pretty(types)
            .map_err(|e| Error::Store(format!("cannot encode content types: {e}")))?;
        fs::write(dir.join(CONTENT_TYPES_FILE), raw)?;
        Ok(())
    }
}

impl DocumentStore for FsStore {
    fn create_collection(&mut self, path: &CollectionPath) -> Result<()> {
        fs::create_dir_all(self.directory(path))?;
        Ok(())
    }

    fn store_resource(&mut self, collection: &CollectionPath, resource: Resource) -> Result<()> {
        let dir = self.directory(collection);
        if !dir.is_dir() {
            return Err(Error::Store(format!(
                "collection {collection} does not exist"
            )));
        }
        if resource.name == CONTENT_TYPES_FILE {
            return Err(Error::Store(format!(
                "resource name {CONTENT_TYPES_FILE} is reserved"
            )));
        }

        fs::write(dir.join(&resource.name), resource.content.as_bytes())?;

        let mut types = self.read_content_types(&dir)?;
        let changed = match resource.mime_type {
            Some(mime) => types.insert(resource.name, mime.clone()).as_ref() != Some(&mime),
            None => types.remove(&resource.name).is_some(),
        };
        if changed {
            self.write_content_types(&dir, &types)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::Document;
    use crate::store::ResourceContent;

    #[test]
    fn test_writes_files_and_content_types() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FsStore::new(tmp.path());
        let collection = CollectionPath::parse("/db/a/b").unwrap();
        store.create_collection(&collection).unwrap();

        store
            .store_resource(
                &collection,
                Resource {
                    name: "c.xml".to_string(),
                    content: ResourceContent::Xml(Document::parse(b"<c/>").unwrap()),
                    mime_type: Some("application/xml".to_string()),
                },
            )
            .unwrap();

        let file = tmp.path().join("db/a/b/c.xml");
        assert_eq!(fs::read(file).unwrap(), b"<c/>");
        assert_eq!(
            store.content_type(&collection, "c.xml").unwrap().as_deref(),
            Some("application/xml")
        );
    }

    #[test]
    fn test_missing_collection() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FsStore::new(tmp.path());
        let err = store
            .store_resource(
                &CollectionPath::parse("/db/none").unwrap(),
                Resource {
                    name: "x".to_string(),
                    content: ResourceContent::Binary(Vec::new()),
                    mime_type: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }
}
